//! Benchmark for the anonymization rewrite over deep expression trees.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use telemetry::{Anonymizer, BinaryOp, Expr, Namespace, Type};

/// Left-leaning chain of binary nodes with a distinct variable per level.
fn chain_expr(levels: usize) -> Expr {
    let mut expr = Expr::var(Type::Int32, "x0");
    for i in 1..levels {
        let var = Expr::var(Type::Int32, format!("x{}", i));
        let op = if i % 2 == 0 {
            BinaryOp::Add
        } else {
            BinaryOp::Min
        };
        expr = Expr::binary(op, expr, var);
    }
    expr
}

fn anonymize_benchmark(c: &mut Criterion) {
    let expr = chain_expr(512);
    c.bench_function("rewrite_512_level_chain", |b| {
        b.iter(|| {
            let mut anonymizer = Anonymizer::new();
            black_box(anonymizer.rewrite(black_box(&expr)))
        })
    });

    c.bench_function("alias_warm_lookup", |b| {
        let mut anonymizer = Anonymizer::new();
        anonymizer.alias("x", Namespace::Generic);
        b.iter(|| black_box(anonymizer.alias(black_box("x"), Namespace::Generic)))
    });
}

criterion_group!(benches, anonymize_benchmark);
criterion_main!(benches);
