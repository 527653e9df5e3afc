use criterion::{black_box, criterion_group, criterion_main, Criterion};
use inkmetric::config::RankingConfig;
use inkmetric::density::compute_density;
use inkmetric::difference::StandardDifference;
use inkmetric::ranking::{
    ColorServices, MatchCandidate, MatchRanker, Measurement, MeasurementContext, RankingRequest,
};
use inkmetric::tone::{build_tone_reproduction_curve, TintSample, ToneContext, ToneValueMethod};
use inkmetric::transform::TristimulusTable;
use inkmetric::weighting::{DensityWeightingTable, WeightingFunction};
use inkmetric::{DeltaEFormula, DensityChannel, Float, Lab, SpectralCurve};

fn ramp(level: Float) -> SpectralCurve {
    SpectralCurve::from_samples(
        (380..=730)
            .step_by(10)
            .map(|w| (w, level * (0.5 + (w as Float - 380.0) / 700.0))),
    )
}

fn table() -> DensityWeightingTable {
    let band = |start: usize, end: usize| {
        WeightingFunction::new((start..=end).step_by(10).map(|w| (w, 1.0 + (w % 30) as Float)))
    };
    DensityWeightingTable::new("bench")
        .with_channel(DensityChannel::Red, band(580, 720))
        .with_channel(DensityChannel::Green, band(480, 620))
        .with_channel(DensityChannel::Blue, band(380, 520))
        .with_channel(DensityChannel::Visual, band(400, 700))
}

pub fn run_benchmarks(c: &mut Criterion) {
    let table = table();
    let curve = ramp(0.4);

    let mut group = c.benchmark_group("density");
    group.bench_function("weighted", |b| {
        b.iter(|| compute_density(black_box(&curve), DensityChannel::Red, Some(&table)))
    });
    group.bench_function("unweighted", |b| {
        b.iter(|| compute_density(black_box(&curve), DensityChannel::Red, None))
    });
    group.finish();

    let ladder = (0..=10)
        .map(|step| {
            let tint = 10.0 * step as Float;
            TintSample::new(tint).with_spectral_curve(ramp(1.0 - 0.9 * tint / 100.0))
        })
        .collect::<Vec<_>>();
    let context = ToneContext {
        table: Some(&table),
        ..ToneContext::default()
    };
    c.bench_function("tone-curve", |b| {
        b.iter(|| build_tone_reproduction_curve(black_box(&ladder), ToneValueMethod::Density, &context))
    });

    let tristimulus = TristimulusTable::new(
        "bench",
        "D50",
        "2",
        (380..=730).step_by(10).map(|w| {
            let x = w as Float;
            (w, [x / 700.0, 1.0 - (x - 555.0).abs() / 400.0, 1.0 - x / 760.0])
        }),
    );
    let reference = MatchCandidate::new(
        "reference",
        "reference",
        vec![Measurement::with_lab("M1", Lab::new(50.0, 20.0, -10.0))],
    );
    let candidates = (0..500)
        .map(|n| {
            let id = format!("c{n}");
            let measurement = if n % 2 == 0 {
                let lab = Lab::new(30.0 + (n % 40) as Float, (n % 60) as Float - 30.0, 10.0);
                Measurement::with_lab("M1", lab)
            } else {
                Measurement::with_spectral_curve("M1", ramp(0.2 + (n % 7) as Float / 10.0))
            };
            MatchCandidate::new(id.clone(), id, vec![measurement])
        })
        .collect::<Vec<_>>();
    let measurement_context = MeasurementContext::new("M1", "D50", "2", "bench");
    let services = ColorServices {
        transform: &tristimulus,
        difference: &StandardDifference,
    };
    let request = RankingRequest {
        reference: &reference,
        candidates: &candidates,
        formula: DeltaEFormula::Ciede2000,
        threshold: 5.0,
        context: &measurement_context,
    };
    let config = RankingConfig {
        display_limit: 250,
        ..RankingConfig::default()
    };

    let mut group = c.benchmark_group("ranking");
    group.bench_function("uncached-500", |b| {
        b.iter(|| MatchRanker::new(config).rank(black_box(&request), &services))
    });
    let mut ranker = MatchRanker::new(config);
    group.bench_function("cached-500", |b| {
        b.iter(|| ranker.rank(black_box(&request), &services))
    });
    group.finish();
}

criterion_group!(benches, run_benchmarks);
criterion_main!(benches);
