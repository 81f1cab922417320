use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use dbforge::{
    Condition, Driver, JoinKind, MemoryConnector, MySqlDialect, Query, SelectQuery, col,
};
use std::sync::Arc;

fn driver() -> Driver {
    Driver::new(
        Arc::new(MySqlDialect),
        Box::new(MemoryConnector::new().transport()),
    )
}

/// `t0` joined to `t1` joined to ... `t{depth}`, each level carrying two
/// columns and one condition.
fn build_chain(db: &Driver, depth: usize) -> SelectQuery<'_> {
    let mut query = level(db, depth);
    for i in (0..depth).rev() {
        let on = Condition::and()
            .with_predicate(format!("t{}.parent_id", i + 1), col(format!("t{i}.id")), "=")
            .unwrap();
        query = level(db, i).join(query, on, JoinKind::Left);
    }
    query
}

fn level(db: &Driver, i: usize) -> SelectQuery<'_> {
    let alias = format!("t{i}");
    db.select_as(&format!("table_{i}"), &alias)
        .columns(["id", "name"])
        .condition(
            Condition::and()
                .with_predicate(format!("{alias}.active"), 1, "=")
                .unwrap(),
        )
}

fn bench_compile_chain(c: &mut Criterion) {
    let db = driver();
    let mut group = c.benchmark_group("select/compile_join_chain");

    for depth in [0, 1, 4, 16, 64] {
        let query = build_chain(&db, depth);
        group.bench_with_input(BenchmarkId::from_parameter(depth), &query, |b, q| {
            b.iter(|| black_box(q.compile().unwrap()));
        });
    }

    group.finish();
}

fn bench_build_and_compile(c: &mut Criterion) {
    let db = driver();
    let mut group = c.benchmark_group("select/build_and_compile");

    for depth in [0, 4, 16] {
        group.bench_with_input(BenchmarkId::from_parameter(depth), &depth, |b, &depth| {
            b.iter(|| black_box(build_chain(&db, depth).compile().unwrap()));
        });
    }

    group.finish();
}

fn bench_condition_tree(c: &mut Criterion) {
    let dialect = MySqlDialect;
    let mut group = c.benchmark_group("condition/compile_wide");

    for n in [1, 10, 100] {
        let tree = (0..n).fold(Condition::or(), |tree, i| {
            tree.add_child(
                Condition::and()
                    .with_predicate(format!("col{i}"), ["a", "b", "c"], "IN")
                    .unwrap(),
            )
        });
        group.bench_with_input(BenchmarkId::from_parameter(n), &tree, |b, tree| {
            b.iter(|| black_box(tree.compile(&dialect).unwrap()));
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_compile_chain,
    bench_build_and_compile,
    bench_condition_tree
);
criterion_main!(benches);
