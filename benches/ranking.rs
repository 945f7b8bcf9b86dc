use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use farmers_hub::{rank, CropSuitability, MarketDemand, ProfitabilityFilter, RankingQuery, SortKey};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn batch(len: usize) -> Vec<CropSuitability> {
    let mut rng = StdRng::seed_from_u64(1);
    let demands = [MarketDemand::Low, MarketDemand::Medium, MarketDemand::High, MarketDemand::VeryHigh];

    (0..len)
        .map(|i| CropSuitability {
            crop: format!("crop-{}", i),
            suitability_score: rng.gen_range(0.0..100.0),
            suitability_level: None,
            profit_potential: None,
            estimated_yield: 1000.0,
            growth_period_days: 120,
            market_demand: demands[i % demands.len()],
            profit_margin: 0.3,
            ph_optimal: 6.0,
            rainfall_optimal: 1500.0,
            temp_optimal: 26.0,
            recommended_season: "Kharif".to_string(),
            market_price: Some(rng.gen_range(10.0..2000.0)),
        })
        .collect()
}

fn bench_rank(c: &mut Criterion) {
    let mut group = c.benchmark_group("rank");

    for len in [10, 100, 1000] {
        let records = batch(len);
        let query = RankingQuery {
            sort: SortKey::MarketDemand,
            profitability: ProfitabilityFilter::All,
        };

        group.bench_with_input(BenchmarkId::from_parameter(len), &records, |b, records| {
            b.iter(|| rank(black_box(records), black_box(&query)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_rank);
criterion_main!(benches);
