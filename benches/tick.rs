//! Tick loop throughput on random levels of increasing size.

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tilerun::game::{
    grid::TileGrid,
    input::Intents,
    state::{LevelSetup, LevelState},
    tick::tick,
    tile::TileKind,
};
use tilerun::level::codec::{decode_level, encode_level};

/// Random level with a ground floor and an open column over the spawn.
fn random_level(rows: usize, cols: usize, seed: u64) -> TileGrid {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut grid = TileGrid::new(rows, cols);
    for row in 0..rows - 2 {
        for col in 4..cols {
            let kind = match rng.gen_range(0..100) {
                0..=5 => TileKind::Brick,
                6..=7 => TileKind::Spike,
                8..=11 => TileKind::Coin,
                _ => TileKind::Empty,
            };
            grid.set(row as i32, col as i32, kind);
        }
    }
    grid.fill_row(rows - 2, TileKind::Ground);
    grid.fill_row(rows - 1, TileKind::Ground);
    grid
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_600_frames");
    for &cols in &[50usize, 200, 1000] {
        group.bench_with_input(BenchmarkId::from_parameter(cols), &cols, |b, &cols| {
            let level = LevelState::new(random_level(20, cols, 7), Some(0), &LevelSetup::default());
            b.iter(|| {
                let mut state = level.clone();
                for t in 0..600u32 {
                    let intents = if t % 30 < 20 { Intents::right() } else { Intents::right().with_jump() };
                    black_box(tick(&mut state, intents, 1.0));
                }
                state.tick
            });
        });
    }
    group.finish();
}

fn bench_codec(c: &mut Criterion) {
    let grid = random_level(256, 1024, 11);
    c.bench_function("encode_level_256x1024", |b| b.iter(|| encode_level(black_box(&grid))));

    let code = encode_level(&grid).unwrap();
    c.bench_function("decode_level_256x1024", |b| b.iter(|| decode_level(black_box(&code))));
}

criterion_group!(benches, bench_tick, bench_codec);
criterion_main!(benches);
