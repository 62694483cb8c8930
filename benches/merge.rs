// benches/merge.rs
use criterion::{Criterion, black_box, criterion_group, criterion_main};

use board_scrape::config::MatchMode;
use board_scrape::core::{ImageRef, ReferenceCollection};
use board_scrape::updater::new_references;

fn board(range: std::ops::Range<usize>) -> Vec<ImageRef> {
    range
        .map(|i| ImageRef::from(format!("https://i.example.com/736x/{:02x}/{i:08}.jpg", i % 256)))
        .collect()
}

fn bench_merge(c: &mut Criterion) {
    // a large known board and a scrape that overlaps it by 90%
    let known: ReferenceCollection = board(0..20_000).into_iter().collect();
    let scraped = board(18_000..20_200);

    c.bench_function("new_references_exact", |b| {
        b.iter(|| {
            let fresh = new_references(black_box(&known), black_box(&scraped), MatchMode::Exact);
            black_box(fresh.len())
        })
    });

    c.bench_function("new_references_normalized", |b| {
        b.iter(|| {
            let fresh = new_references(black_box(&known), black_box(&scraped), MatchMode::Normalized);
            black_box(fresh.len())
        })
    });

    c.bench_function("collection_from_scrape", |b| {
        b.iter(|| {
            let c: ReferenceCollection = black_box(&scraped).iter().cloned().collect();
            black_box(c.len())
        })
    });
}

criterion_group!(benches, bench_merge);
criterion_main!(benches);
