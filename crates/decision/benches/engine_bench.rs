//! Benchmark suite for the decision components.

use adsignal_types::{
    AdPlatform, BudgetConstraint, CampaignSnapshot, MetricHistory, MetricKind, MetricSnapshot,
    VariantResult,
};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use decision::{AnomalyDetector, BudgetAllocator, SignificanceTester, TrendForecaster};

fn create_series(size: usize) -> Vec<f64> {
    (0..size)
        .map(|i| 500.0 + i as f64 * 2.5 + (i as f64 * 0.7).sin() * 40.0)
        .collect()
}

fn create_history(size: usize) -> MetricHistory {
    let mut history = MetricHistory::default();
    for i in 0..size {
        let noise = (i as f64 * 0.3).sin();
        history.push(&MetricSnapshot {
            spend: 500.0 + noise * 20.0,
            roas: 3.0 + noise * 0.2,
            ctr: 1.5 + noise * 0.1,
            conversion_rate: 4.0 + noise * 0.2,
            cpa: 25.0 + noise,
        });
    }
    history
}

fn create_campaigns(count: usize) -> Vec<CampaignSnapshot> {
    let start = NaiveDate::from_ymd_opt(2025, 10, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(2025, 10, 31).unwrap();
    let platforms = [AdPlatform::Meta, AdPlatform::Google, AdPlatform::Tiktok, AdPlatform::Other];

    (0..count)
        .map(|i| {
            let spend = 100.0 + (i % 17) as f64 * 50.0;
            let revenue = spend * (0.5 + (i % 9) as f64 * 0.6);
            CampaignSnapshot::new(
                format!("c{}", i),
                format!("Campaign {}", i),
                platforms[i % platforms.len()],
                spend,
                revenue,
                start,
                end,
            )
        })
        .collect()
}

fn bench_anomaly_detection(c: &mut Criterion) {
    let detector = AnomalyDetector::default();
    let mut group = c.benchmark_group("AnomalyDetection");

    for size in [7, 30, 365].iter() {
        let history = create_history(*size);
        let current = MetricSnapshot {
            spend: 900.0,
            roas: 1.2,
            ctr: 1.5,
            conversion_rate: 2.0,
            cpa: 60.0,
        };

        group.bench_with_input(BenchmarkId::new("detect_all", size), &history, |b, history| {
            b.iter(|| detector.detect_all(black_box(&current), black_box(history)))
        });
    }

    group.finish();
}

fn bench_forecast(c: &mut Criterion) {
    let forecaster = TrendForecaster::default();
    let mut group = c.benchmark_group("Forecast");

    for size in [14, 90, 365].iter() {
        let values = create_series(*size);
        group.bench_with_input(BenchmarkId::new("forecast_values", size), &values, |b, values| {
            b.iter(|| forecaster.forecast_values(MetricKind::Revenue, black_box(values), 30))
        });
    }

    group.finish();
}

fn bench_compare_variants(c: &mut Criterion) {
    let tester = SignificanceTester::default();
    let variants: Vec<VariantResult> = (0..5)
        .map(|i| {
            VariantResult::new(
                format!("variant_{}", i),
                20_000,
                400 + i * 20,
                200 + i * 15,
                1000.0,
                3000.0 + i as f64 * 250.0,
            )
        })
        .collect();

    c.bench_function("compare_variants_5", |b| {
        b.iter(|| tester.compare_variants(black_box(&variants)))
    });
}

fn bench_budget_allocation(c: &mut Criterion) {
    let allocator = BudgetAllocator::default();
    let mut group = c.benchmark_group("BudgetAllocation");

    for count in [10, 100, 1000].iter() {
        let campaigns = create_campaigns(*count);
        let constraint = BudgetConstraint::new(50_000.0)
            .with_min_per_campaign(20.0)
            .with_platform_bounds(Some(1000.0), Some(30_000.0));

        group.bench_with_input(BenchmarkId::new("optimize", count), &campaigns, |b, campaigns| {
            b.iter(|| allocator.optimize(black_box(campaigns), black_box(&constraint)))
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_anomaly_detection,
    bench_forecast,
    bench_compare_variants,
    bench_budget_allocation
);
criterion_main!(benches);
