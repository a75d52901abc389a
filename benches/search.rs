use criterion::{criterion_group, criterion_main, Criterion};
use efl_finder::{
    beam::InputBeam,
    distance_grid::{DistanceGrid, GapRange},
    millimeter, milliradian, nanometer,
    search::{Search, SearchConfig},
    topology::ThreeLens,
};
use std::hint::black_box;

fn criterion_three_lens_search(c: &mut Criterion) {
    let topology = ThreeLens::new(
        &millimeter!(-100.0, -75.0, -50.0, -40.0),
        &millimeter!(50.0, 75.0, 100.0, 150.0),
        &millimeter!(100.0, 200.0, 300.0),
        GapRange::new(
            DistanceGrid::new(millimeter!(5.0), millimeter!(150.0), millimeter!(1.0)).unwrap(),
            2.5,
        )
        .unwrap(),
        GapRange::new(
            DistanceGrid::new(millimeter!(5.0), millimeter!(100.0), millimeter!(1.0)).unwrap(),
            1.0,
        )
        .unwrap(),
    )
    .unwrap();
    let config = SearchConfig::new(
        millimeter!(200.0),
        millimeter!(400.0),
        nanometer!(253.0),
        InputBeam::new(millimeter!(4.0), milliradian!(0.4)).unwrap(),
        1.3,
    )
    .unwrap();
    let search = Search::new(config).unwrap();
    c.bench_function("three_lens_search", |b| {
        b.iter(|| search.run(black_box(&topology)).unwrap())
    });
}

criterion_group!(benches, criterion_three_lens_search);
criterion_main!(benches);
