//! Throughput benchmarks for the store, the decoder and full command execution.

use bytes::Bytes;
use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use flintkv::commands::CommandHandler;
use flintkv::protocol::decode;
use flintkv::storage::Store;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

fn bench_store(c: &mut Criterion) {
    let store = Arc::new(Store::new());
    for i in 0..100_000 {
        store.set(
            Bytes::from(format!("key:{}", i)),
            Bytes::from(format!("value:{}", i)),
            None,
        );
    }

    let mut group = c.benchmark_group("store");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store.set(Bytes::from(format!("new:{}", i)), Bytes::from("value"), None);
            i += 1;
        });
    });

    group.bench_function("set_with_ttl", |b| {
        let mut i = 0u64;
        b.iter(|| {
            store.set(
                Bytes::from(format!("ttl:{}", i)),
                Bytes::from("value"),
                Some(Duration::from_secs(3600)),
            );
            i += 1;
        });
    });

    group.bench_function("get_hit", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.get(&Bytes::from(format!("key:{}", i % 100_000))));
            i += 1;
        });
    });

    group.bench_function("get_miss", |b| {
        let mut i = 0u64;
        b.iter(|| {
            black_box(store.get(&Bytes::from(format!("missing:{}", i))));
            i += 1;
        });
    });

    group.finish();
}

fn bench_decode(c: &mut Criterion) {
    let mut group = c.benchmark_group("decode");
    group.throughput(Throughput::Elements(1));

    let set: &[u8] = b"*4\r\n$3\r\nSET\r\n$8\r\nuser:101\r\n$5\r\nflint\r\n$4\r\n1000\r\n";
    group.bench_function("resp_set", |b| b.iter(|| black_box(decode(black_box(set)))));

    let inline: &[u8] = b"GET\r\nuser:101\r\n";
    group.bench_function("inline_get", |b| {
        b.iter(|| black_box(decode(black_box(inline))))
    });

    group.finish();
}

fn bench_execute(c: &mut Criterion) {
    let handler = CommandHandler::new(Arc::new(Store::new()));
    let set = decode(b"*3\r\n$3\r\nSET\r\n$3\r\nkey\r\n$5\r\nvalue\r\n").unwrap();
    let get = decode(b"*2\r\n$3\r\nGET\r\n$3\r\nkey\r\n").unwrap();

    let mut group = c.benchmark_group("execute");
    group.throughput(Throughput::Elements(1));

    group.bench_function("set", |b| b.iter(|| black_box(handler.execute(&set))));
    group.bench_function("get", |b| b.iter(|| black_box(handler.execute(&get))));

    group.finish();
}

fn bench_concurrent(c: &mut Criterion) {
    let mut group = c.benchmark_group("concurrent");
    group.measurement_time(Duration::from_secs(10));

    group.bench_function("4_threads_mixed", |b| {
        b.iter(|| {
            let store = Arc::new(Store::new());
            let handles: Vec<_> = (0..4)
                .map(|t| {
                    let store = Arc::clone(&store);
                    thread::spawn(move || {
                        for i in 0..10_000 {
                            let key = Bytes::from(format!("key:{}:{}", t, i));
                            store.set(key.clone(), Bytes::from("value"), None);
                            store.get(&key);
                        }
                    })
                })
                .collect();

            for handle in handles {
                handle.join().unwrap();
            }

            black_box(store.len());
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_store,
    bench_decode,
    bench_execute,
    bench_concurrent
);

criterion_main!(benches);
