use chess_session::{search, ChessRules, Difficulty, Engine};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

const MIDDLEGAME: &str = "r1bq1rk1/pppp1ppp/2n2n2/2b1p3/2B1P3/3P1N2/PPP2PPP/RNBQ1RK1 w - - 1 6";

fn bench_search(c: &mut Criterion) {
    let rules = ChessRules::from_fen(MIDDLEGAME).unwrap();

    c.bench_function("minimax depth 2", |b| b.iter(|| search(black_box(&rules), 2)));

    c.bench_function("greedy choice", |b| {
        let mut engine = Engine::with_seed(Difficulty::Medium, 0);
        b.iter(|| engine.choose_move(black_box(&rules)))
    });
}

criterion_group!(benches, bench_search);
criterion_main!(benches);
