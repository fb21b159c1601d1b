use crate::dialect::{is_primary, AlterStyle, SqlDialect};
use crate::model::{Column, Constraint, ConstraintKind, Index, Table};
use crate::script::{Risk, Script};
use crate::util::{Result, SchemaError};
use std::collections::{BTreeSet, HashSet};

pub(super) fn diff_columns(sql: &dyn SqlDialect, from_table: &Table, to_table: &Table) -> Script {
    let mut script = Script::new();
    let table_name = sql.table_name(to_table);

    let from_names: BTreeSet<&str> = from_table.columns.iter().map(|c| c.name.as_str()).collect();
    let to_names: BTreeSet<&str> = to_table.columns.iter().map(|c| c.name.as_str()).collect();

    for name in from_names.difference(&to_names) {
        script.drop(format!(
            "ALTER TABLE {table_name} DROP COLUMN {};",
            sql.quote(name)
        ));
    }

    for name in to_names.difference(&from_names) {
        if let Some(column) = to_table.column(name) {
            script.safe(format!(
                "ALTER TABLE {table_name} ADD COLUMN {} {};",
                sql.quote(name),
                sql.column_description(column)
            ));
        }
    }

    for name in from_names.intersection(&to_names) {
        let (Some(from_column), Some(to_column)) = (from_table.column(name), to_table.column(name))
        else {
            continue;
        };
        match sql.alter_style() {
            AlterStyle::Separate => {
                alter_column_clauses(sql, &table_name, from_column, to_column, &mut script)
            }
            AlterStyle::Modify => {
                modify_column(sql, &table_name, from_column, to_column, &mut script)
            }
        }
    }

    script
}

fn alter_column_clauses(
    sql: &dyn SqlDialect,
    table_name: &str,
    from: &Column,
    to: &Column,
    script: &mut Script,
) {
    let alter = format!("ALTER TABLE {table_name} ALTER COLUMN {}", sql.quote(&to.name));

    if from.data_type != to.data_type {
        script.comment(previous_type_comment(from));
        script.warn(format!("{alter} SET DATA TYPE {};", to.data_type));
    }

    if from.nullable != to.nullable {
        if to.nullable {
            script.safe(format!("{alter} DROP NOT NULL;"));
        } else {
            script.warn(format!("{alter} SET NOT NULL;"));
        }
    }

    if from.default_value != to.default_value {
        match to.default_value {
            Some(ref default) => script.safe(format!("{alter} SET DEFAULT {default};")),
            None => script.safe(format!("{alter} DROP DEFAULT;")),
        }
    }
}

fn modify_column(
    sql: &dyn SqlDialect,
    table_name: &str,
    from: &Column,
    to: &Column,
    script: &mut Script,
) {
    if from == to {
        return;
    }

    let type_changed = from.data_type != to.data_type;
    let comment = if type_changed {
        format!("{}\n", previous_type_comment(from))
    } else {
        String::new()
    };
    let extra = match to.extra.as_deref().map(str::trim) {
        Some(extra) if !extra.is_empty() => format!(" {extra}"),
        _ => String::new(),
    };
    let risk = if type_changed || (from.nullable && !to.nullable) {
        Risk::Warn
    } else {
        Risk::Safe
    };

    script.record(
        format!(
            "{comment}ALTER TABLE {table_name} MODIFY {} {}{extra};",
            sql.quote(&to.name),
            sql.column_description(to)
        ),
        risk,
    );
}

fn previous_type_comment(from: &Column) -> String {
    format!("-- Previous data type was {}", from.data_type)
}

pub(super) fn diff_indexes(sql: &dyn SqlDialect, from_table: &Table, to_table: &Table) -> Script {
    let mut script = Script::new();

    let from_names: BTreeSet<&str> = from_table.indexes.iter().map(|i| i.name.as_str()).collect();
    let to_names: BTreeSet<&str> = to_table.indexes.iter().map(|i| i.name.as_str()).collect();

    for name in from_names.difference(&to_names) {
        if let Some(index) = from_table.index(name) {
            script.safe(sql.drop_index(from_table, index));
        }
    }

    for name in to_names.difference(&from_names) {
        if let Some(index) = to_table.index(name) {
            script.safe(sql.create_index(to_table, index));
        }
    }

    for name in from_names.intersection(&to_names) {
        let (Some(from_index), Some(to_index)) = (from_table.index(name), to_table.index(name))
        else {
            continue;
        };
        if index_changed(from_index, to_index) {
            script.comment(format!(
                "-- Index {} needs to be changed",
                sql.index_name(to_index)
            ));
            script.safe(sql.drop_index(from_table, from_index));
            script.safe(sql.create_index(from_table, to_index));
        }
    }

    script
}

fn index_changed(from: &Index, to: &Index) -> bool {
    let from_columns: HashSet<&String> = from.columns.iter().collect();
    let to_columns: HashSet<&String> = to.columns.iter().collect();

    from_columns != to_columns
        || from.primary != to.primary
        || from.unique != to.unique
        || from.index_type != to.index_type
}

/// Diffs constraints of `to_table` against its counterpart, if any.
///
/// Constraints are matched by name. A same-named constraint with a different
/// definition is dropped and re-added, never altered in place. Constraints
/// only present in `from_table` are left alone: dropping a column already
/// takes its constraints with it. Adding to an existing table is a warning
/// since existing rows may violate it.
pub(super) fn diff_constraints(
    sql: &dyn SqlDialect,
    from_table: Option<&Table>,
    to_table: &Table,
    skip_primary: bool,
) -> Result<Script> {
    let mut script = Script::new();

    let add_risk = if from_table.is_some() {
        Risk::Warn
    } else {
        Risk::Safe
    };

    for constraint in &to_table.constraints {
        if skip_primary && is_primary(constraint) {
            continue;
        }

        if let Some(existing) = from_table.and_then(|t| t.constraint(&constraint.name)) {
            if existing == constraint {
                continue;
            }
            script.safe(sql.drop_constraint(to_table, existing));
        }

        let body = constraint_body(sql, to_table, constraint)?;
        script.record(sql.add_constraint(to_table, constraint, &body), add_risk);
    }

    Ok(script)
}

fn constraint_body(sql: &dyn SqlDialect, table: &Table, constraint: &Constraint) -> Result<String> {
    let columns = sql.column_list(&constraint.columns, ", ");
    match constraint.kind {
        ConstraintKind::Primary => Ok(format!("PRIMARY KEY ({columns})")),
        ConstraintKind::Unique => Ok(format!("UNIQUE ({columns})")),
        ConstraintKind::Foreign => {
            let missing = || {
                SchemaError::malformed(
                    format!("{} constraint {}", table.name, constraint.name),
                    "foreign key is missing its reference",
                )
            };
            let referenced_table = constraint.referenced_table.as_deref().ok_or_else(missing)?;
            let referenced_columns = constraint.referenced_columns.as_ref().ok_or_else(missing)?;
            Ok(format!(
                "FOREIGN KEY ({columns}) REFERENCES {} ({})",
                sql.quote(referenced_table),
                sql.column_list(referenced_columns, ", ")
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySql, Postgres};

    fn pg_table(columns: Vec<Column>) -> Table {
        let mut table = Table::new(Some("public"), "users");
        table.columns = columns;
        table
    }

    fn my_table(columns: Vec<Column>) -> Table {
        let mut table = Table::new(None, "users");
        table.columns = columns;
        table
    }

    fn varchar(name: &str, length: u32, nullable: bool) -> Column {
        Column::new(name, format!("character varying ({length})"), nullable)
    }

    fn btree(name: &str, columns: &[&str]) -> Index {
        Index {
            name: name.to_string(),
            schema: Some("public".to_string()),
            index_type: "btree".to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            primary: false,
            unique: false,
        }
    }

    fn texts(script: &Script) -> Vec<(&str, Risk)> {
        script
            .statements()
            .iter()
            .map(|s| (s.text.as_str(), s.risk))
            .collect()
    }

    #[test]
    fn drops_and_adds_columns() {
        let from = pg_table(vec![varchar("email", 255, true), varchar("first_name", 255, true)]);
        let to = pg_table(vec![varchar("email", 255, true), varchar("last_name", 100, false)]);

        let script = diff_columns(&Postgres, &from, &to);
        assert_eq!(
            texts(&script),
            vec![
                (
                    "ALTER TABLE \"public\".\"users\" DROP COLUMN \"first_name\";",
                    Risk::Drop
                ),
                (
                    "ALTER TABLE \"public\".\"users\" ADD COLUMN \"last_name\" character varying (100) NOT NULL;",
                    Risk::Safe
                ),
            ]
        );
    }

    #[test]
    fn type_change_is_preceded_by_comment() {
        let from = pg_table(vec![varchar("first_name", 200, true)]);
        let to = pg_table(vec![varchar("first_name", 255, true)]);

        let script = diff_columns(&Postgres, &from, &to);
        assert_eq!(
            texts(&script),
            vec![
                ("-- Previous data type was character varying (200)", Risk::Comment),
                (
                    "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"first_name\" SET DATA TYPE character varying (255);",
                    Risk::Warn
                ),
            ]
        );
    }

    #[test]
    fn nullability_changes_are_classified() {
        let relaxed = diff_columns(
            &Postgres,
            &pg_table(vec![varchar("first_name", 255, false)]),
            &pg_table(vec![varchar("first_name", 255, true)]),
        );
        assert_eq!(
            texts(&relaxed),
            vec![(
                "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"first_name\" DROP NOT NULL;",
                Risk::Safe
            )]
        );

        let tightened = diff_columns(
            &Postgres,
            &pg_table(vec![varchar("first_name", 255, true)]),
            &pg_table(vec![varchar("first_name", 255, false)]),
        );
        assert_eq!(
            texts(&tightened),
            vec![(
                "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"first_name\" SET NOT NULL;",
                Risk::Warn
            )]
        );
    }

    #[test]
    fn default_changes_are_safe() {
        let from = pg_table(vec![Column::new("status", "text", true)]);
        let to = pg_table(vec![Column::new("status", "text", true).with_default("'active'::text")]);

        assert_eq!(
            texts(&diff_columns(&Postgres, &from, &to)),
            vec![(
                "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"status\" SET DEFAULT 'active'::text;",
                Risk::Safe
            )]
        );
        assert_eq!(
            texts(&diff_columns(&Postgres, &to, &from)),
            vec![(
                "ALTER TABLE \"public\".\"users\" ALTER COLUMN \"status\" DROP DEFAULT;",
                Risk::Safe
            )]
        );
    }

    #[test]
    fn mysql_modify_with_type_change_warns() {
        let from = my_table(vec![Column::new("name", "varchar(200)", true)]);
        let to = my_table(vec![Column::new("name", "varchar(255)", true)]);

        assert_eq!(
            texts(&diff_columns(&MySql, &from, &to)),
            vec![(
                "-- Previous data type was varchar(200)\nALTER TABLE `users` MODIFY `name` varchar(255) NULL;",
                Risk::Warn
            )]
        );
    }

    #[test]
    fn mysql_modify_classification() {
        let nullable = my_table(vec![Column::new("name", "varchar(255)", true)]);
        let not_null = my_table(vec![Column::new("name", "varchar(255)", false)]);

        assert_eq!(
            texts(&diff_columns(&MySql, &nullable, &not_null)),
            vec![("ALTER TABLE `users` MODIFY `name` varchar(255) NOT NULL;", Risk::Warn)]
        );
        assert_eq!(
            texts(&diff_columns(&MySql, &not_null, &nullable)),
            vec![("ALTER TABLE `users` MODIFY `name` varchar(255) NULL;", Risk::Safe)]
        );
    }

    #[test]
    fn mysql_modify_restates_extra() {
        let from = my_table(vec![Column::new("id", "int", false)]);
        let to = my_table(vec![Column::new("id", "int", false).with_extra("auto_increment")]);

        assert_eq!(
            texts(&diff_columns(&MySql, &from, &to)),
            vec![("ALTER TABLE `users` MODIFY `id` int NOT NULL auto_increment;", Risk::Safe)]
        );
    }

    #[test]
    fn creates_and_drops_indexes() {
        let mut from = pg_table(vec![]);
        from.indexes.push(btree("users_first_name", &["first_name"]));
        let mut to = pg_table(vec![]);
        to.indexes.push(btree("users_email", &["email"]));

        assert_eq!(
            texts(&diff_indexes(&Postgres, &from, &to)),
            vec![
                ("DROP INDEX \"public\".\"users_first_name\";", Risk::Safe),
                (
                    "CREATE INDEX \"users_email\" ON \"public\".\"users\" USING btree (\"email\");",
                    Risk::Safe
                ),
            ]
        );
    }

    #[test]
    fn recreates_changed_index() {
        let mut from = pg_table(vec![]);
        from.indexes.push(btree("some_index", &["first_name"]));
        let mut to = pg_table(vec![]);
        to.indexes.push(btree("some_index", &["last_name"]));

        assert_eq!(
            texts(&diff_indexes(&Postgres, &from, &to)),
            vec![
                ("-- Index \"public\".\"some_index\" needs to be changed", Risk::Comment),
                ("DROP INDEX \"public\".\"some_index\";", Risk::Safe),
                (
                    "CREATE INDEX \"some_index\" ON \"public\".\"users\" USING btree (\"last_name\");",
                    Risk::Safe
                ),
            ]
        );
    }

    #[test]
    fn index_column_order_is_not_a_change() {
        let mut from = pg_table(vec![]);
        from.indexes.push(btree("names", &["first_name", "last_name"]));
        let mut to = pg_table(vec![]);
        to.indexes.push(btree("names", &["last_name", "first_name"]));

        assert!(diff_indexes(&Postgres, &from, &to).is_empty());
    }

    #[test]
    fn added_index_column_is_a_change() {
        let mut from = pg_table(vec![]);
        from.indexes.push(btree("names", &["first_name"]));
        let mut to = pg_table(vec![]);
        to.indexes.push(btree("names", &["first_name", "last_name"]));

        assert_eq!(diff_indexes(&Postgres, &from, &to).len(), 3);
    }

    #[test]
    fn unique_flag_change_recreates_index() {
        let mut from = pg_table(vec![]);
        from.indexes.push(btree("users_email", &["email"]));
        let mut to = pg_table(vec![]);
        let mut unique = btree("users_email", &["email"]);
        unique.unique = true;
        to.indexes.push(unique);

        let script = diff_indexes(&Postgres, &from, &to);
        assert_eq!(
            script.statements()[2].text,
            "CREATE UNIQUE INDEX \"users_email\" ON \"public\".\"users\" USING btree (\"email\");"
        );
    }

    #[test]
    fn access_method_change_recreates_index() {
        let mut from = pg_table(vec![]);
        from.indexes.push(btree("users_email", &["email"]));
        let mut to = pg_table(vec![]);
        let mut hash = btree("users_email", &["email"]);
        hash.index_type = "hash".to_string();
        to.indexes.push(hash);

        let script = diff_indexes(&Postgres, &from, &to);
        assert_eq!(script.len(), 3);
        assert_eq!(
            script.statements()[2].text,
            "CREATE INDEX \"users_email\" ON \"public\".\"users\" USING hash (\"email\");"
        );
    }

    #[test]
    fn constraints_on_new_table_are_safe() {
        let mut to = pg_table(vec![]);
        to.constraints.push(Constraint::primary("users_pk", &["id"]));
        to.constraints.push(Constraint::unique("email_unique", &["email"]));

        let script = diff_constraints(&Postgres, None, &to, false).unwrap();
        assert_eq!(
            texts(&script),
            vec![
                (
                    "ALTER TABLE \"public\".\"users\" ADD CONSTRAINT \"users_pk\" PRIMARY KEY (\"id\");",
                    Risk::Safe
                ),
                (
                    "ALTER TABLE \"public\".\"users\" ADD CONSTRAINT \"email_unique\" UNIQUE (\"email\");",
                    Risk::Safe
                ),
            ]
        );
    }

    #[test]
    fn constraints_on_existing_table_warn() {
        let from = pg_table(vec![]);
        let mut to = pg_table(vec![]);
        to.constraints.push(Constraint::foreign(
            "users_org_fk",
            &["org_id"],
            "orgs",
            &["id"],
        ));

        let script = diff_constraints(&Postgres, Some(&from), &to, false).unwrap();
        assert_eq!(
            texts(&script),
            vec![(
                "ALTER TABLE \"public\".\"users\" ADD CONSTRAINT \"users_org_fk\" FOREIGN KEY (\"org_id\") REFERENCES \"orgs\" (\"id\");",
                Risk::Warn
            )]
        );
    }

    #[test]
    fn redefined_constraint_is_dropped_then_added() {
        let mut from = pg_table(vec![]);
        from.constraints
            .push(Constraint::unique("a_unique_constraint", &["email"]));
        let mut to = pg_table(vec![]);
        to.constraints
            .push(Constraint::unique("a_unique_constraint", &["api_key"]));

        let script = diff_constraints(&Postgres, Some(&from), &to, false).unwrap();
        assert_eq!(
            texts(&script),
            vec![
                (
                    "ALTER TABLE \"public\".\"users\" DROP CONSTRAINT \"a_unique_constraint\";",
                    Risk::Safe
                ),
                (
                    "ALTER TABLE \"public\".\"users\" ADD CONSTRAINT \"a_unique_constraint\" UNIQUE (\"api_key\");",
                    Risk::Warn
                ),
            ]
        );
    }

    #[test]
    fn constraints_missing_from_target_are_not_dropped() {
        let mut from = pg_table(vec![]);
        from.constraints.push(Constraint::unique("email_unique", &["email"]));
        let to = pg_table(vec![]);

        assert!(diff_constraints(&Postgres, Some(&from), &to, false)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn identical_constraints_are_skipped() {
        let mut table = pg_table(vec![]);
        table.constraints.push(Constraint::primary("users_pk", &["id"]));

        assert!(diff_constraints(&Postgres, Some(&table), &table, false)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn skip_primary_suppresses_primary_keys_only() {
        let mut to = my_table(vec![]);
        to.constraints.push(Constraint::primary("PRIMARY", &["id"]));
        to.constraints.push(Constraint::unique("email", &["email"]));

        let script = diff_constraints(&MySql, None, &to, true).unwrap();
        assert_eq!(
            texts(&script),
            vec![(
                "ALTER TABLE `users` ADD CONSTRAINT `email` UNIQUE (`email`);",
                Risk::Safe
            )]
        );
    }

    #[test]
    fn foreign_key_without_reference_is_malformed() {
        let mut to = pg_table(vec![]);
        let mut fk = Constraint::foreign("users_org_fk", &["org_id"], "orgs", &["id"]);
        fk.referenced_table = None;
        to.constraints.push(fk);

        assert!(matches!(
            diff_constraints(&Postgres, None, &to, false),
            Err(SchemaError::MalformedSchema { .. })
        ));
    }
}
