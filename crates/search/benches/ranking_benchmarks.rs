use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use stockfinder_catalog::{InventoryRecord, Item, Seller, StockThresholds};
use stockfinder_core::{InventoryRecordId, ItemId, Money, SellerId};
use stockfinder_search::{rank, SearchResultRow, SortCriterion};

fn rows(n: usize) -> Vec<SearchResultRow> {
    let thresholds = StockThresholds::default();
    (0..n)
        .map(|i| {
            let item = Item::named(ItemId::new(), format!("Item {i}"));
            let seller = Seller::new(
                SellerId::new(),
                format!("Seller {}", i % 97),
                "",
                "",
                ((i * 7) % 51) as f64 / 10.0,
                i as u32,
            )
            .unwrap();
            let record = InventoryRecord {
                id: InventoryRecordId::new(),
                item_id: item.id,
                seller_id: seller.id,
                unit_price: Money::from_cents(((i * 7919) % 10_000) as u64),
                quantity: (i % 20) as u32,
            };
            SearchResultRow {
                stock_state: record.stock_state(&thresholds),
                distance_km: (i % 3 != 0).then(|| ((i * 31) % 500) as f64 / 10.0),
                record,
                item,
                seller,
            }
        })
        .collect()
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");
    for size in [100usize, 1_000, 10_000] {
        let input = rows(size);
        group.throughput(Throughput::Elements(size as u64));
        for (label, criterion) in [
            ("price", SortCriterion::ByPrice),
            ("rating", SortCriterion::ByRating),
            ("distance", SortCriterion::ByDistance),
        ] {
            group.bench_with_input(BenchmarkId::new(label, size), &input, |b, input| {
                b.iter(|| rank(black_box(input.clone()), criterion));
            });
        }
    }
    group.finish();
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
