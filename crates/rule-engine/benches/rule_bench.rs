//! 规则解析与求值性能基准测试

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rule_engine::{Connective, EvaluationContext, combine_rules, evaluate, parse_rule, tokenize};
use std::hint::black_box;

const SIMPLE_RULE: &str = "age > 30";
const NESTED_RULE: &str = "((age > 30 AND department = 'Sales') OR (age < 25 AND department = 'Marketing')) AND (salary > 50000 OR experience > 5)";

fn create_context() -> EvaluationContext {
    EvaluationContext::new()
        .with("age", 35)
        .with("department", "Sales")
        .with("salary", 60000)
        .with("experience", 3)
}

/// 生成由 n 个比较组成的 AND 链
fn chained_rule(n: usize) -> String {
    (0..n)
        .map(|i| format!("attr{} > {}", i, i))
        .collect::<Vec<_>>()
        .join(" AND ")
}

fn bench_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");

    group.bench_function("tokenize_nested", |b| {
        b.iter(|| tokenize(black_box(NESTED_RULE)))
    });
    group.bench_function("simple", |b| b.iter(|| parse_rule(black_box(SIMPLE_RULE))));
    group.bench_function("nested", |b| b.iter(|| parse_rule(black_box(NESTED_RULE))));

    for size in [5, 20, 50] {
        let rule = chained_rule(size);
        group.bench_with_input(BenchmarkId::new("chain", size), &rule, |b, rule| {
            b.iter(|| parse_rule(black_box(rule)))
        });
    }

    group.finish();
}

fn bench_evaluate(c: &mut Criterion) {
    let mut group = c.benchmark_group("evaluate");
    let ctx = create_context();

    let simple = parse_rule(SIMPLE_RULE).unwrap();
    let nested = parse_rule(NESTED_RULE).unwrap();

    group.bench_function("simple", |b| {
        b.iter(|| evaluate(black_box(&simple), black_box(&ctx)))
    });
    group.bench_function("nested", |b| {
        b.iter(|| evaluate(black_box(&nested), black_box(&ctx)))
    });

    group.finish();
}

fn bench_combine(c: &mut Criterion) {
    let rules: Vec<String> = (0..50).map(|i| format!("attr{} < {}", i, i * 10)).collect();

    c.bench_function("combine_50_rules", |b| {
        b.iter(|| combine_rules(black_box(&rules), Connective::Or))
    });
}

criterion_group!(benches, bench_parse, bench_evaluate, bench_combine);
criterion_main!(benches);
