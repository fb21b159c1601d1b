//! Schema comparison.
//!
//! [`compute_diff`] walks two [`Database`] snapshots in a fixed order and
//! records one risk-tagged statement per difference:
//!
//! 1. sequences
//! 2. tables that disappeared
//! 3. new tables (with their indexes) and column/index changes on kept tables
//! 4. constraints of every destination table
//!
//! SQL is rendered in the dialect of the source database, which is the one
//! the script is meant to run against.

mod objects;
mod table_elements;

pub use objects::sequence_description;

use crate::dialect::SqlDialect;
use crate::model::{Database, Table};
use crate::script::Script;
use crate::util::Result;
use crate::validate::validate_database;
use objects::diff_sequences;
use std::collections::{HashMap, HashSet};
use table_elements::{diff_columns, diff_constraints, diff_indexes};
use tracing::debug;

type TableKey<'a> = (Option<&'a str>, &'a str);

pub fn compute_diff(from: &Database, to: &Database) -> Result<Script> {
    validate_database(from)?;
    validate_database(to)?;

    let sql = from.dialect.renderer();
    debug!(
        dialect = %from.dialect,
        from_tables = from.tables.len(),
        to_tables = to.tables.len(),
        "comparing databases"
    );

    let from_tables = tables_by_key(from);
    let to_tables = tables_by_key(to);

    let mut script = Script::new();
    script.append(diff_sequences(sql, from, to));
    script.append(drop_tables(sql, &from_tables, &to_tables));

    let (created, inline_primary) = create_or_alter_tables(sql, &from_tables, &to_tables);
    script.append(created);

    for (key, to_table) in sorted(&to_tables) {
        let from_table = from_tables.get(&key).copied();
        let skip_primary = inline_primary.contains(&key);
        script.append(diff_constraints(sql, from_table, to_table, skip_primary)?);
    }

    debug!(statements = script.len(), "comparison finished");
    Ok(script)
}

fn tables_by_key(db: &Database) -> HashMap<TableKey<'_>, &Table> {
    db.tables.iter().map(|t| (t.key(), t)).collect()
}

fn sorted<'a>(tables: &HashMap<TableKey<'a>, &'a Table>) -> Vec<(TableKey<'a>, &'a Table)> {
    let mut entries: Vec<_> = tables.iter().map(|(k, t)| (*k, *t)).collect();
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    entries
}

fn drop_tables(
    sql: &dyn SqlDialect,
    from_tables: &HashMap<TableKey<'_>, &Table>,
    to_tables: &HashMap<TableKey<'_>, &Table>,
) -> Script {
    let mut script = Script::new();

    for (key, table) in sorted(from_tables) {
        if !to_tables.contains_key(&key) {
            debug!(table = %table.name, "table removed");
            script.drop(format!("DROP TABLE {};", sql.table_name(table)));
        }
    }

    script
}

/// Returns the statements plus the tables whose primary key was declared
/// inline by an auto-increment column.
fn create_or_alter_tables<'a>(
    sql: &dyn SqlDialect,
    from_tables: &HashMap<TableKey<'a>, &'a Table>,
    to_tables: &HashMap<TableKey<'a>, &'a Table>,
) -> (Script, HashSet<TableKey<'a>>) {
    let mut script = Script::new();
    let mut inline_primary = HashSet::new();

    for (key, to_table) in sorted(to_tables) {
        match from_tables.get(&key) {
            None => {
                debug!(table = %to_table.name, "table added");
                let (create, has_inline_primary) = create_table(sql, to_table);
                if has_inline_primary {
                    inline_primary.insert(key);
                }
                script.safe(create);

                let mut indexes: Vec<_> = to_table.indexes.iter().collect();
                indexes.sort_by(|a, b| a.name.cmp(&b.name));
                for index in indexes {
                    script.safe(sql.create_index(to_table, index));
                }
            }
            Some(from_table) => {
                script.append(diff_columns(sql, from_table, to_table));
                script.append(diff_indexes(sql, from_table, to_table));
            }
        }
    }

    (script, inline_primary)
}

fn create_table(sql: &dyn SqlDialect, table: &Table) -> (String, bool) {
    let mut inline_primary = false;

    let columns: Vec<String> = table
        .columns
        .iter()
        .map(|column| {
            let extra = if column.is_auto_increment() {
                inline_primary = true;
                " PRIMARY KEY AUTO_INCREMENT"
            } else {
                ""
            };
            format!(
                "\n  {} {}{extra}",
                sql.quote(&column.name),
                sql.column_description(column)
            )
        })
        .collect();

    (
        format!("CREATE TABLE {} ({}\n);", sql.table_name(table), columns.join(",")),
        inline_primary,
    )
}
