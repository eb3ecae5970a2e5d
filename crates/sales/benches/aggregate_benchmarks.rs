use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use doorsales_core::Decimal;
use doorsales_sales::{aggregate, DoorSpec, OrderDraft, OrderHeader};

fn door(i: usize) -> DoorSpec {
    DoorSpec {
        door_type: "interior".to_string(),
        model: format!("M-{i}"),
        price: Decimal::new(12_345 + i as i64, 2),
        color: "white".to_string(),
        width: 80,
        height: 200,
        leaf_type: "solid".to_string(),
        count: (i % 7 + 1) as i32,
    }
}

fn header() -> OrderHeader {
    OrderHeader {
        customer: "Bench".to_string(),
        phone: "000".to_string(),
        date: "2024-01-01".to_string(),
        prepayment: Decimal::ZERO,
        comment: None,
        status: "new".to_string(),
    }
}

fn bench_aggregate(c: &mut Criterion) {
    let mut group = c.benchmark_group("aggregate");

    for size in [1usize, 10, 100, 1000].iter() {
        let doors: Vec<DoorSpec> = (0..*size).map(door).collect();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("door_totals", size), &doors, |b, doors| {
            b.iter(|| black_box(aggregate(black_box(doors.as_slice())).unwrap()));
        });
    }

    group.finish();
}

fn bench_draft_validation(c: &mut Criterion) {
    let mut group = c.benchmark_group("order_draft");

    for size in [1usize, 10, 100].iter() {
        let doors: Vec<DoorSpec> = (0..*size).map(door).collect();
        group.throughput(Throughput::Elements(*size as u64));
        group.bench_with_input(BenchmarkId::new("validate", size), &doors, |b, doors| {
            b.iter(|| black_box(OrderDraft::new(header(), doors.clone()).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(benches, bench_aggregate, bench_draft_validation);
criterion_main!(benches);
