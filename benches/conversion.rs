//! Benchmarks for MBO → MBP conversion throughput.

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use mbo_mbp_reconstructor::{
    Action, ConverterConfig, Dispatcher, MboEvent, MboReader, MbpWriter, Price, Side,
};

/// Adds around $100.00, every third order later cancelled after a trade+fill.
fn create_test_events(count: usize) -> Vec<MboEvent> {
    let mut events = Vec::with_capacity(count * 2);
    let base_price: i64 = 100_000_000_000; // $100.00

    for i in 0..count {
        let order_id = (i + 1) as u64;
        let is_bid = i % 2 == 0;
        let price_offset = ((i % 10) as i64) * 10_000_000; // 0.01 increments

        let price = Price::from_raw(if is_bid {
            base_price - price_offset
        } else {
            base_price + 10_000_000 + price_offset
        });
        let side = if is_bid { Side::Bid } else { Side::Ask };
        let size = ((i % 100) + 1) as u64;

        events.push(MboEvent::new(order_id, Action::Add, side, price, size));
        if i % 3 == 0 {
            events.push(MboEvent::new(order_id, Action::Trade, side, price, size));
            events.push(MboEvent::new(order_id, Action::Fill, side, price, size));
            events.push(MboEvent::new(order_id, Action::Cancel, side, price, 0));
        }
    }

    events
}

fn bench_dispatch(c: &mut Criterion) {
    let events = create_test_events(10_000);

    let mut group = c.benchmark_group("dispatch");
    group.throughput(Throughput::Elements(events.len() as u64));

    group.bench_function("process_events", |b| {
        b.iter(|| {
            let mut dispatcher = Dispatcher::new(ConverterConfig::default().with_logging(false));
            for event in &events {
                let _ = black_box(dispatcher.process(event));
            }
        })
    });

    group.finish();
}

fn bench_csv_roundtrip(c: &mut Criterion) {
    let mut input = String::from("action,side,price,size,order_id\n");
    for event in create_test_events(5_000) {
        input.push_str(&format!(
            "{},{},{},{},{}\n",
            event.action.to_byte() as char,
            event.side.as_char(),
            event.price,
            event.size,
            event.order_id
        ));
    }
    let rows = input.lines().count() as u64 - 1;

    let mut group = c.benchmark_group("csv");
    group.throughput(Throughput::Elements(rows));

    group.bench_function("read_dispatch_write", |b| {
        b.iter(|| {
            let mut reader = MboReader::new(input.as_bytes());
            let mut writer = MbpWriter::new(Vec::with_capacity(1 << 20), 10);
            let mut dispatcher = Dispatcher::new(ConverterConfig::default().with_logging(false));
            black_box(dispatcher.run(&mut reader, &mut writer).ok())
        })
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch, bench_csv_roundtrip);
criterion_main!(benches);
