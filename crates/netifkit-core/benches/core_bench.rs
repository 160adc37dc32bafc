//! Benchmarks for the event service hot path.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use netifkit_core::event_bus::{EventCallback, EventFilter, EventService, NetEvent, NetEventKind};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn bench_dispatch(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch");
    for subscribers in [1usize, 8, 64] {
        group.bench_with_input(
            BenchmarkId::from_parameter(subscribers),
            &subscribers,
            |b, &n| {
                let service = EventService::new();
                let counter = Arc::new(AtomicUsize::new(0));
                for _ in 0..n {
                    let c = counter.clone();
                    service.subscribe(
                        EventFilter::Any,
                        EventCallback::simple(move || {
                            c.fetch_add(1, Ordering::Relaxed);
                        }),
                    );
                }
                let event = NetEvent::StationConnected {
                    ssid: b"benchnet".to_vec(),
                    bssid: [0; 6],
                    channel: 6,
                    auth_mode: 3,
                };
                b.iter(|| service.dispatch(black_box(&event)));
            },
        );
    }
    group.finish();
}

fn bench_dispatch_filtered(c: &mut Criterion) {
    // Worst case: many subscribers, none matching.
    c.bench_function("dispatch_no_match", |b| {
        let service = EventService::new();
        for _ in 0..64 {
            service.subscribe(
                EventFilter::Kind(NetEventKind::PppConnected),
                EventCallback::simple(|| {}),
            );
        }
        let event = NetEvent::StationStarted;
        b.iter(|| service.dispatch(black_box(&event)));
    });
}

fn bench_event_serialize(c: &mut Criterion) {
    c.bench_function("event_to_json", |b| {
        let event = NetEvent::GotIpv4 {
            changed: true,
            ip: "10.0.0.2".parse().unwrap(),
            netmask: "255.255.255.0".parse().unwrap(),
            gateway: "10.0.0.1".parse().unwrap(),
        };
        b.iter(|| serde_json::to_string(black_box(&event)).unwrap());
    });
}

criterion_group!(
    benches,
    bench_dispatch,
    bench_dispatch_filtered,
    bench_event_serialize
);
criterion_main!(benches);
