//! Queue and drain benchmark suite.
//!
//! Benchmarks the two paths an operation can take:
//! - Queued before the transport exists, then replayed by `set_transport`
//! - Forwarded directly once the holder is ready
//!
//! Run with: cargo bench --bench drain
//! Results saved to: target/criterion/

use std::hint::black_box;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bridge_holder::{BridgeEvent, BridgeHolder, BridgeRequest, Completion, Transport};
use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

// ============================================================================
// Benchmark Parameters
// ============================================================================

const QUEUE_DEPTHS: &[usize] = &[100, 1_000, 10_000];

// ============================================================================
// Counting Transport
// ============================================================================

/// Transport that counts traffic and answers requests on the spot.
#[derive(Default)]
struct CountingTransport {
    delivered: AtomicUsize,
}

impl Transport for CountingTransport {
    fn emit_event(&self, event: BridgeEvent) {
        black_box(event);
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    fn send_request(&self, request: BridgeRequest, completion: Completion) {
        self.delivered.fetch_add(1, Ordering::Relaxed);
        completion.succeed(request.data);
    }
}

// ============================================================================
// Benchmark: Queue Then Drain
// ============================================================================

fn bench_queue_then_drain(c: &mut Criterion) {
    let mut group = c.benchmark_group("queue_then_drain");

    for &depth in QUEUE_DEPTHS {
        group.bench_with_input(BenchmarkId::new("events", depth), &depth, |b, &depth| {
            b.iter(|| {
                let holder = BridgeHolder::new();
                for i in 0..depth {
                    holder
                        .send_event(BridgeEvent::new(format!("event.{i}")))
                        .expect("send");
                }

                let transport = Arc::new(CountingTransport::default());
                holder.set_transport(transport.clone()).expect("attach");
                assert_eq!(transport.delivered.load(Ordering::Relaxed), depth);
            });
        });

        group.bench_with_input(BenchmarkId::new("requests", depth), &depth, |b, &depth| {
            b.iter(|| {
                let holder = BridgeHolder::new();
                for _ in 0..depth {
                    holder
                        .send_request(BridgeRequest::new("echo"), |result| {
                            black_box(result);
                        })
                        .expect("send");
                }

                holder
                    .set_transport(Arc::new(CountingTransport::default()))
                    .expect("attach");
            });
        });
    }

    group.finish();
}

// ============================================================================
// Benchmark: Ready Path
// ============================================================================

fn bench_ready_path(c: &mut Criterion) {
    let holder = BridgeHolder::new();
    holder
        .set_transport(Arc::new(CountingTransport::default()))
        .expect("attach");

    c.bench_function("ready_path/event", |b| {
        b.iter(|| {
            holder
                .send_event(BridgeEvent::new("tick"))
                .expect("send");
        });
    });
}

criterion_group!(benches, bench_queue_then_drain, bench_ready_path);
criterion_main!(benches);
