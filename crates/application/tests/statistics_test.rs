use qrmatch_application::ports::CaptureCounters;
use qrmatch_application::services::{Counter, StatisticsAggregator};
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_increments_are_not_lost() {
    let stats = Arc::new(StatisticsAggregator::new());
    let threads = 8;
    let per_thread = 10_000;

    let handles: Vec<_> = (0..threads)
        .map(|_| {
            let stats = stats.clone();
            thread::spawn(move || {
                for _ in 0..per_thread {
                    stats.increment(Counter::RawPacket);
                    stats.increment(Counter::QrPair);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(stats.get(Counter::RawPacket), threads * per_thread);
    assert_eq!(stats.get(Counter::QrPair), threads * per_thread);
}

#[test]
fn test_snapshot_maps_every_counter() {
    let stats = StatisticsAggregator::new();
    stats.add(Counter::RawPacket, 1);
    stats.add(Counter::MalformedPacket, 2);
    stats.add(Counter::OutOfOrderPacket, 3);
    stats.add(Counter::UnhandledPacket, 4);
    stats.add(Counter::QrPair, 5);
    stats.add(Counter::QueryWithoutResponse, 6);
    stats.add(Counter::ResponseWithoutQuery, 7);
    stats.add(Counter::OutputRawPcapDrop, 8);
    stats.add(Counter::OutputIgnoredPcapDrop, 9);
    stats.add(Counter::OutputCborDrop, 10);

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.raw_packet_count, 1);
    assert_eq!(snapshot.malformed_packet_count, 2);
    assert_eq!(snapshot.out_of_order_packet_count, 3);
    assert_eq!(snapshot.unhandled_packet_count, 4);
    assert_eq!(snapshot.qr_pair_count, 5);
    assert_eq!(snapshot.query_without_response_count, 6);
    assert_eq!(snapshot.response_without_query_count, 7);
    assert_eq!(snapshot.output_raw_pcap_drop_count, 8);
    assert_eq!(snapshot.output_ignored_pcap_drop_count, 9);
    assert_eq!(snapshot.output_cbor_drop_count, 10);
}

#[test]
fn test_capture_counters_never_move_backwards() {
    let stats = StatisticsAggregator::new();

    stats.record_capture_counters(CaptureCounters {
        received: 100,
        dropped: 5,
        if_dropped: 1,
    });
    stats.record_capture_counters(CaptureCounters {
        received: 40,
        dropped: 7,
        if_dropped: 0,
    });

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.pcap_recv_count, 100);
    assert_eq!(snapshot.pcap_drop_count, 7);
    assert_eq!(snapshot.pcap_ifdrop_count, 1);
}

#[test]
fn test_snapshot_is_monotonic_under_load() {
    let stats = Arc::new(StatisticsAggregator::new());
    let writer = {
        let stats = stats.clone();
        thread::spawn(move || {
            for _ in 0..50_000 {
                stats.increment(Counter::UnhandledPacket);
            }
        })
    };

    let mut last = 0;
    for _ in 0..1_000 {
        let now = stats.snapshot().unhandled_packet_count;
        assert!(now >= last);
        last = now;
    }
    writer.join().unwrap();
    assert_eq!(stats.get(Counter::UnhandledPacket), 50_000);
}

#[test]
fn test_report_reflects_counters() {
    let stats = StatisticsAggregator::new();
    stats.add(Counter::RawPacket, 42);
    stats.add(Counter::QrPair, 20);

    let report = stats.format_report();
    assert!(report.contains("  Total Packets processed                  : 42\n"));
    assert!(report.contains("  Matched DNS query/response pairs (C-DNS) : 20\n"));
    assert!(report.starts_with("\nSTATISTICS:\n"));
}
