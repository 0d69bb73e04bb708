use super::statistics::{Counter, StatisticsAggregator};
use qrmatch_domain::{DecodedMessage, DnsMessage, MatchKey, MatchedPair, Timestamp};
use rustc_hash::FxHashMap;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use tracing::{debug, trace};

/// Result of feeding one decoded message to the correlator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A response consumed its pending query.
    Matched(MatchedPair),
    /// A query is now waiting for its response.
    Pending,
    /// A response arrived with no pending query to consume.
    OrphanedResponse(DnsMessage),
    /// A query arrived while an identical one was already pending.
    RetransmitOrDuplicate,
}

/// A query evicted without ever meeting its response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedOutQuery {
    pub query: DnsMessage,
    pub deadline: Timestamp,
    pub retransmissions: u32,
}

/// Per-instance tallies. Unlike the shared statistics these belong to one
/// capture stream, so the pending-set accounting can be checked exactly.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CorrelatorCounters {
    pub queries_seen: u64,
    pub responses_seen: u64,
    pub duplicate_queries: u64,
    pub matched: u64,
    pub timed_out: u64,
    pub orphaned_responses: u64,
    pub out_of_order: u64,
}

impl CorrelatorCounters {
    /// Queries that opened a pending entry.
    pub fn distinct_queries(&self) -> u64 {
        self.queries_seen - self.duplicate_queries
    }
}

#[derive(Debug)]
struct PendingQuery {
    query: DnsMessage,
    deadline: Timestamp,
    seq: u64,
    retransmissions: u32,
}

/// Pairs queries with responses for one capture stream.
///
/// Pending queries live in a map keyed by [`MatchKey`] and in a deadline
/// index ordered by `(deadline, seq)`. Both are only touched together inside
/// `&mut self` methods, so an entry is in both or in neither.
#[derive(Debug)]
pub struct Correlator {
    pending: FxHashMap<MatchKey, PendingQuery>,
    deadlines: BTreeMap<(Timestamp, u64), MatchKey>,
    next_seq: u64,
    query_timeout: Duration,
    high_water: Option<Timestamp>,
    high_water_advanced_at: Instant,
    counters: CorrelatorCounters,
    stats: Arc<StatisticsAggregator>,
}

impl Correlator {
    pub fn new(query_timeout: Duration, stats: Arc<StatisticsAggregator>) -> Self {
        Self {
            pending: FxHashMap::default(),
            deadlines: BTreeMap::new(),
            next_seq: 0,
            query_timeout,
            high_water: None,
            high_water_advanced_at: Instant::now(),
            counters: CorrelatorCounters::default(),
            stats,
        }
    }

    pub fn query_timeout(&self) -> Duration {
        self.query_timeout
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Highest capture timestamp processed so far.
    pub fn high_water_mark(&self) -> Option<Timestamp> {
        self.high_water
    }

    pub fn counters(&self) -> CorrelatorCounters {
        self.counters
    }

    /// Estimated capture time at wall instant `wall_now`: the high-water mark
    /// moved forward by the wall time elapsed since it last advanced. This
    /// lets a timer age out pending queries on a stream that went quiet.
    pub fn capture_clock_at(&self, wall_now: Instant) -> Option<Timestamp> {
        self.high_water.map(|mark| {
            mark.saturating_add(wall_now.saturating_duration_since(self.high_water_advanced_at))
        })
    }

    pub fn process(&mut self, message: DecodedMessage) -> Outcome {
        self.observe_timestamp(message.timestamp());

        match message {
            DecodedMessage::Query(query) => self.process_query(query),
            DecodedMessage::Response(response) => self.process_response(response),
        }
    }

    fn observe_timestamp(&mut self, timestamp: Timestamp) {
        match self.high_water {
            Some(mark) if timestamp < mark => {
                self.counters.out_of_order += 1;
                self.stats.increment(Counter::OutOfOrderPacket);
                trace!(
                    timestamp = %timestamp,
                    high_water = %mark,
                    "Message captured out of order"
                );
            }
            Some(mark) if timestamp == mark => {}
            _ => {
                self.high_water = Some(timestamp);
                self.high_water_advanced_at = Instant::now();
            }
        }
    }

    fn process_query(&mut self, query: DnsMessage) -> Outcome {
        self.counters.queries_seen += 1;
        let key = query.match_key();

        let Some(existing) = self.pending.get_mut(&key) else {
            self.insert_pending(key, query);
            return Outcome::Pending;
        };

        existing.retransmissions += 1;
        self.counters.duplicate_queries += 1;

        // Keep the earliest sighting. The deadline stays where the pending
        // entry put it.
        if query.timestamp < existing.query.timestamp {
            existing.query = query;
        }

        debug!(key = %key, "Duplicate query while pending");
        Outcome::RetransmitOrDuplicate
    }

    fn insert_pending(&mut self, key: MatchKey, query: DnsMessage) {
        let seq = self.next_seq;
        self.next_seq += 1;
        let deadline = self.deadline_for(query.timestamp);

        self.deadlines.insert((deadline, seq), key.clone());
        self.pending.insert(
            key,
            PendingQuery {
                query,
                deadline,
                seq,
                retransmissions: 0,
            },
        );
    }

    /// A late query waits the full timeout from the high-water mark, not
    /// from its own timestamp; otherwise it could expire on insertion.
    fn deadline_for(&self, timestamp: Timestamp) -> Timestamp {
        let anchor = match self.high_water {
            Some(mark) => mark.max(timestamp),
            None => timestamp,
        };
        anchor.saturating_add(self.query_timeout)
    }

    fn remove_pending(&mut self, key: &MatchKey) -> Option<PendingQuery> {
        let entry = self.pending.remove(key)?;
        self.deadlines.remove(&(entry.deadline, entry.seq));
        Some(entry)
    }

    fn process_response(&mut self, response: DnsMessage) -> Outcome {
        self.counters.responses_seen += 1;
        let key = response.match_key();

        match self.remove_pending(&key) {
            Some(entry) => {
                self.counters.matched += 1;
                self.stats.increment(Counter::QrPair);
                Outcome::Matched(MatchedPair::new(
                    entry.query,
                    response,
                    entry.retransmissions,
                ))
            }
            None => {
                self.counters.orphaned_responses += 1;
                self.stats.increment(Counter::ResponseWithoutQuery);
                trace!(key = %key, "Response without pending query");
                Outcome::OrphanedResponse(response)
            }
        }
    }

    /// Evicts every pending query whose deadline is at or before `now`,
    /// earliest deadline first.
    pub fn sweep(&mut self, now: Timestamp) -> Vec<TimedOutQuery> {
        let mut expired = Vec::new();

        while let Some((&(deadline, _), _)) = self.deadlines.first_key_value() {
            if deadline > now {
                break;
            }
            if let Some(timed_out) = self.evict_first() {
                expired.push(timed_out);
            }
        }

        if !expired.is_empty() {
            debug!(
                evicted = expired.len(),
                pending = self.pending.len(),
                now = %now,
                "Pending queries timed out"
            );
        }
        expired
    }

    /// Evicts every pending query regardless of deadline. Used at shutdown so
    /// queries still waiting are reported rather than lost.
    pub fn drain(&mut self) -> Vec<TimedOutQuery> {
        let mut drained = Vec::with_capacity(self.pending.len());
        while let Some(timed_out) = self.evict_first() {
            drained.push(timed_out);
        }
        drained
    }

    fn evict_first(&mut self) -> Option<TimedOutQuery> {
        let (_, key) = self.deadlines.pop_first()?;
        let entry = self.pending.remove(&key)?;

        self.counters.timed_out += 1;
        self.stats.increment(Counter::QueryWithoutResponse);

        Some(TimedOutQuery {
            query: entry.query,
            deadline: entry.deadline,
            retransmissions: entry.retransmissions,
        })
    }
}

/// Handle sharing one [`Correlator`] between the capture path and the sweep
/// timer. The lock covers a single correlator call and is never held while
/// output is submitted.
#[derive(Debug, Clone)]
pub struct SharedCorrelator {
    inner: Arc<Mutex<Correlator>>,
}

impl SharedCorrelator {
    pub fn new(correlator: Correlator) -> Self {
        Self {
            inner: Arc::new(Mutex::new(correlator)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Correlator> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn process(&self, message: DecodedMessage) -> Outcome {
        self.lock().process(message)
    }

    /// Evicts the queries that expired by the time `message` was captured,
    /// then processes it, under one lock acquisition.
    pub fn process_and_sweep(&self, message: DecodedMessage) -> (Outcome, Vec<TimedOutQuery>) {
        let mut correlator = self.lock();
        let now = match correlator.high_water_mark() {
            Some(mark) => mark.max(message.timestamp()),
            None => message.timestamp(),
        };
        let expired = correlator.sweep(now);
        let outcome = correlator.process(message);
        (outcome, expired)
    }

    pub fn sweep(&self, now: Timestamp) -> Vec<TimedOutQuery> {
        self.lock().sweep(now)
    }

    /// Sweeps at the estimated capture time. Returns nothing until the
    /// stream has delivered its first message.
    pub fn sweep_idle(&self, wall_now: Instant) -> Vec<TimedOutQuery> {
        let mut correlator = self.lock();
        match correlator.capture_clock_at(wall_now) {
            Some(now) => correlator.sweep(now),
            None => Vec::new(),
        }
    }

    pub fn drain(&self) -> Vec<TimedOutQuery> {
        self.lock().drain()
    }

    pub fn pending_len(&self) -> usize {
        self.lock().pending_len()
    }

    pub fn counters(&self) -> CorrelatorCounters {
        self.lock().counters()
    }

    pub fn high_water_mark(&self) -> Option<Timestamp> {
        self.lock().high_water_mark()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use qrmatch_domain::{Question, Transport};

    fn body(id: u16, secs: u64) -> DnsMessage {
        DnsMessage {
            id,
            question: Question::new("example.com", 1, 1),
            client: "10.0.0.2:5353".parse().unwrap(),
            server: "10.0.0.1:53".parse().unwrap(),
            transport: Transport::Udp,
            timestamp: Timestamp::from_secs(secs),
            raw: None,
        }
    }

    fn correlator() -> Correlator {
        Correlator::new(Duration::from_secs(5), Arc::new(StatisticsAggregator::new()))
    }

    #[test]
    fn test_map_and_deadline_index_stay_in_step() {
        let mut c = correlator();
        c.process(DecodedMessage::Query(body(1, 0)));
        c.process(DecodedMessage::Query(body(2, 1)));
        c.process(DecodedMessage::Response(body(1, 2)));

        assert_eq!(c.pending.len(), 1);
        assert_eq!(c.deadlines.len(), 1);

        c.sweep(Timestamp::from_secs(100));
        assert!(c.pending.is_empty());
        assert!(c.deadlines.is_empty());
    }

    #[test]
    fn test_earlier_duplicate_keeps_deadline() {
        let mut c = correlator();
        c.process(DecodedMessage::Query(body(7, 10)));
        c.process(DecodedMessage::Query(body(7, 8)));

        assert_eq!(c.deadlines.len(), 1);
        let (&(deadline, _), _) = c.deadlines.first_key_value().unwrap();
        assert_eq!(deadline, Timestamp::from_secs(15));
        let key = body(7, 8).match_key();
        assert_eq!(c.pending[&key].query.timestamp, Timestamp::from_secs(8));
    }

    #[test]
    fn test_late_query_deadline_anchored_at_high_water() {
        let mut c = correlator();
        c.process(DecodedMessage::Query(body(1, 100)));
        c.process(DecodedMessage::Query(body(2, 10)));

        let key = body(2, 10).match_key();
        assert_eq!(c.pending[&key].deadline, Timestamp::from_secs(105));
    }

    #[test]
    fn test_capture_clock_requires_traffic() {
        let c = correlator();
        assert!(c.capture_clock_at(Instant::now()).is_none());
    }
}
