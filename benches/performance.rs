//! Benchmark: comparison engine on synthetic databases

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use dbdiff::diff::compute_diff;
use dbdiff::model::{Column, Constraint, Database, Dialect, Index, Table};
use dbdiff::script::SafetyLevel;

fn synthetic_database(tables: usize, drift: bool) -> Database {
    let mut db = Database::new(Dialect::Postgres);
    for t in 0..tables {
        let name = format!("table_{t}");
        let mut table = Table::new(Some("public"), &name);
        table.columns.push(Column::new("id", "integer", false));
        for c in 0..10 {
            let nullable = !(drift && c % 3 == 0);
            table
                .columns
                .push(Column::new(format!("col_{c}"), "character varying (255)", nullable));
        }
        table.indexes.push(Index {
            name: format!("{name}_col_0"),
            schema: Some("public".to_string()),
            index_type: "btree".to_string(),
            columns: vec![if drift { "col_1" } else { "col_0" }.to_string()],
            primary: false,
            unique: false,
        });
        table
            .constraints
            .push(Constraint::primary(format!("{name}_pkey"), &["id"]));
        if t > 0 {
            table.constraints.push(Constraint::foreign(
                format!("{name}_parent_fk"),
                &["col_0"],
                format!("table_{}", t - 1),
                &["id"],
            ));
        }
        db.tables.push(table);
    }
    db
}

fn benchmark_identical(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_identical");
    for size in [10, 100, 500] {
        let db = synthetic_database(size, false);
        group.bench_with_input(BenchmarkId::from_parameter(size), &db, |b, db| {
            b.iter(|| compute_diff(black_box(db), black_box(db)).unwrap())
        });
    }
    group.finish();
}

fn benchmark_drifted(c: &mut Criterion) {
    let mut group = c.benchmark_group("compare_drifted");
    for size in [10, 100, 500] {
        let from = synthetic_database(size, false);
        let to = synthetic_database(size, true);
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            &(from, to),
            |b, (from, to)| {
                b.iter(|| {
                    compute_diff(black_box(from), black_box(to))
                        .unwrap()
                        .render(SafetyLevel::Warn)
                })
            },
        );
    }
    group.finish();
}

criterion_group!(benches, benchmark_identical, benchmark_drifted);
criterion_main!(benches);
