use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use pgtable::statement::{self, RowAssignment};
use pgtable::{ColumnDescription, Combinator, Predicate, SchemaCatalog};

/// A catalog with one table `t(col0 .. col{n-1})`, alternating integer and varchar columns.
fn catalog(n: usize) -> SchemaCatalog {
    let columns: Vec<ColumnDescription> = (0..n)
        .map(|i| {
            let ty = if i % 2 == 0 { "integer" } else { "character varying(64)" };
            ColumnDescription::new(format!("col{i}"), ty)
        })
        .collect();
    SchemaCatalog::from_tables([("t", columns)])
}

fn bench_mixed_where(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/select_mixed_where");

    for n in [1, 5, 10, 50, 100] {
        let catalog = catalog(n);
        let predicate = Predicate::mixed((0..n).map(|i| {
            let comb = if i % 3 == 0 { Combinator::Or } else { Combinator::And };
            (format!("col{i}"), i.to_string(), comb)
        }));
        group.bench_with_input(BenchmarkId::from_parameter(n), &predicate, |b, predicate| {
            b.iter(|| {
                let table = catalog.table("t").unwrap();
                let plan = statement::select(table, predicate, &["*"]).unwrap();
                black_box(plan.sql.to_sql());
            });
        });
    }

    group.finish();
}

fn bench_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/insert");

    for n in [5, 20, 100] {
        let catalog = catalog(n);
        let row = RowAssignment::from_pairs((0..n).map(|i| (format!("col{i}"), i.to_string())));
        group.bench_with_input(BenchmarkId::from_parameter(n), &row, |b, row| {
            b.iter(|| {
                let table = catalog.table("t").unwrap();
                black_box(statement::insert(table, row).unwrap().into_parts());
            });
        });
    }

    group.finish();
}

fn bench_update(c: &mut Criterion) {
    let mut group = c.benchmark_group("statement_builder/update");

    for n in [5, 20, 100] {
        let catalog = catalog(n);
        let row = RowAssignment::from_pairs((1..n).map(|i| (format!("col{i}"), String::new())));
        let filter = Predicate::all_and([("col0", "1")]);
        group.bench_with_input(BenchmarkId::from_parameter(n), &row, |b, row| {
            b.iter(|| {
                let table = catalog.table("t").unwrap();
                black_box(statement::update(table, row, &filter).unwrap().to_sql());
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_mixed_where, bench_insert, bench_update);
criterion_main!(benches);
