use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use sqlquery::{binds, HasLimit, HasOrderBy, HasWhere, Insert, QueryFactory, Select, Statement};

/// SELECT c0, c1, ... FROM t WHERE t.c0 = :p0 AND t.c1 = :p1 ...
fn build_select(factory: &QueryFactory, n: usize) -> Select {
    let mut select = factory.new_select();
    select.cols((0..n).map(|i| format!("t.c{i}")));
    select.from("t").expect("fresh select has no table refs");
    for i in 0..n {
        select
            .and_where_bind(&format!("t.c{i} = :p{i}"), binds! { format!("p{i}") => i as i64 })
            .expect("plain binds never fail");
    }
    select.order_by(["t.c0"]).limit(10);
    select
}

fn build_bulk_insert(factory: &QueryFactory, rows: usize) -> Insert {
    let mut insert = factory.new_insert();
    insert.into_table("t");
    insert
        .add_rows((0..rows).map(|i| [("a", i as i64), ("b", (i * 2) as i64), ("c", (i * 3) as i64)]))
        .expect("all rows share the same columns");
    insert
}

fn bench_select_statement(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select_statement");
    let factory = QueryFactory::new("mysql");

    for n in [1, 5, 10, 50] {
        let select = build_select(&factory, n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &select, |b, select| {
            b.iter(|| black_box(select.statement()));
        });
    }

    group.finish();
}

fn bench_select_build_and_prepare(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/select_build_and_prepare");
    let factory = QueryFactory::new("postgres");

    for n in [1, 5, 10, 50] {
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, &n| {
            b.iter(|| {
                let select = build_select(&factory, n);
                black_box(select.prepare())
            });
        });
    }

    group.finish();
}

fn bench_bulk_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("render/bulk_insert");
    let factory = QueryFactory::new("sqlite");

    for rows in [2, 10, 100, 500] {
        let insert = build_bulk_insert(&factory, rows);
        group.bench_with_input(BenchmarkId::from_parameter(rows), &insert, |b, insert| {
            b.iter(|| black_box(insert.statement()));
        });
    }

    group.finish();
}

fn bench_quote_names_in(c: &mut Criterion) {
    let quoter = QueryFactory::new("mysql").quoter();
    let text = "CONCAT('foo.bar', t1.a, \"baz.dib\", t2.b) AS zim";

    c.bench_function("render/quote_names_in", |b| {
        b.iter(|| black_box(quoter.quote_names_in(black_box(text))));
    });
}

criterion_group!(
    benches,
    bench_select_statement,
    bench_select_build_and_prepare,
    bench_bulk_insert,
    bench_quote_names_in
);
criterion_main!(benches);
