//! Classification performance benchmarks.
//!
//! Measures classification across record counts, selection sizes and match
//! modes.

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use excipient::DrugRecord;
use excipient::classify::{Classifier, ExcipientSelection, MatchMode};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const EXCIPIENTS: [&str; 24] = [
    "Lactose Monohydrate",
    "Microcrystalline Cellulose",
    "Corn Starch",
    "Magnesium Stearate",
    "Talc",
    "Titanium Dioxide",
    "Fd&C Red No. 40",
    "Fd&C Yellow No. 6",
    "Povidone",
    "Croscarmellose Sodium",
    "Sodium Starch Glycolate",
    "Colloidal Silicon Dioxide",
    "Hypromellose",
    "Polyethylene Glycol",
    "Stearic Acid",
    "Aspartame",
    "Sucralose",
    "Sucrose",
    "Glycerin",
    "Propylene Glycol",
    "Sodium Benzoate",
    "Carnauba Wax",
    "Gelatin",
    "Shellac",
];

/// Generate records with 3-12 random inactive ingredients each.
fn generate_records(count: usize, rng: &mut StdRng) -> Vec<DrugRecord> {
    (0..count)
        .map(|i| {
            let n = rng.gen_range(3..=12);
            let inactive: Vec<&str> = EXCIPIENTS.choose_multiple(rng, n).copied().collect();
            DrugRecord::new(format!("Drug {}", i))
                .with_set_id(format!("set-{:06}", i))
                .with_inactive(inactive)
        })
        .collect()
}

fn generate_selection(size: usize, rng: &mut StdRng) -> ExcipientSelection {
    EXCIPIENTS
        .choose_multiple(rng, size)
        .map(|name| name.to_lowercase())
        .collect()
}

/// Benchmark classification over growing record counts.
fn bench_classify_records(c: &mut Criterion) {
    let mut group = c.benchmark_group("classify_records");
    let mut rng = StdRng::seed_from_u64(42);
    let selection = generate_selection(3, &mut rng);

    for count in [25, 100, 1_000, 10_000].iter() {
        let records = generate_records(*count, &mut rng);
        let classifier = Classifier::new(selection.clone());

        group.throughput(Throughput::Elements(*count as u64));
        group.bench_with_input(BenchmarkId::new("records", count), &records, |b, records| {
            b.iter_with_setup(
                || records.clone(),
                |records| black_box(classifier.classify(records)),
            )
        });
    }

    group.finish();
}

/// Benchmark classification with growing selections.
fn bench_selection_size(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection_size");
    let mut rng = StdRng::seed_from_u64(7);
    let records = generate_records(1_000, &mut rng);

    for size in [1, 5, 10, 24].iter() {
        let classifier = Classifier::new(generate_selection(*size, &mut rng));

        group.bench_with_input(BenchmarkId::new("excipients", size), &records, |b, records| {
            b.iter_with_setup(
                || records.clone(),
                |records| black_box(classifier.classify(records)),
            )
        });
    }

    group.finish();
}

/// Compare exact and substring matching.
fn bench_match_mode(c: &mut Criterion) {
    let mut group = c.benchmark_group("match_mode");
    let mut rng = StdRng::seed_from_u64(11);
    let records = generate_records(1_000, &mut rng);
    let selection = generate_selection(5, &mut rng);

    for mode in [MatchMode::Exact, MatchMode::Contains] {
        let classifier = Classifier::new(selection.clone()).with_mode(mode);

        group.bench_with_input(
            BenchmarkId::new("mode", mode.to_string()),
            &records,
            |b, records| {
                b.iter_with_setup(
                    || records.clone(),
                    |records| black_box(classifier.classify(records)),
                )
            },
        );
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_classify_records,
    bench_selection_size,
    bench_match_mode,
);
criterion_main!(benches);
