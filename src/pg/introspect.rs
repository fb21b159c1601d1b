use crate::model::*;
use crate::pg::connection::PgConnection;
use crate::util::{Result, SchemaError};
use regex::Regex;
use sqlx::postgres::PgRow;
use sqlx::{Postgres, Row};
use std::collections::BTreeMap;
use tracing::debug;

const EXCLUDED_SCHEMAS: [&str; 4] = ["temp", "pg_catalog", "information_schema", "pg_toast"];

type TableMap = BTreeMap<(String, String), Table>;

pub async fn introspect_database(connection: &PgConnection) -> Result<Database> {
    let mut tables = introspect_tables(connection).await?;
    introspect_columns(connection, &mut tables).await?;
    introspect_indexes(connection, &mut tables).await?;
    introspect_constraints(connection, &mut tables).await?;
    let sequences = introspect_sequences(connection).await?;

    debug!(
        tables = tables.len(),
        sequences = sequences.len(),
        "introspected postgres database"
    );

    Ok(Database {
        dialect: Dialect::Postgres,
        tables: tables.into_values().collect(),
        sequences,
    })
}

fn get<'r, T>(row: &'r PgRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, Postgres> + sqlx::Type<Postgres>,
{
    row.try_get(column)
        .map_err(|e| SchemaError::DatabaseError(format!("Failed to read {column}: {e}")))
}

fn excluded_schemas() -> Vec<String> {
    EXCLUDED_SCHEMAS.iter().map(|s| s.to_string()).collect()
}

async fn introspect_tables(connection: &PgConnection) -> Result<TableMap> {
    let rows = sqlx::query(
        r#"
        SELECT schemaname::text AS schema, tablename::text AS name
        FROM pg_tables
        WHERE schemaname <> ALL($1::text[])
        ORDER BY schemaname, tablename
        "#,
    )
    .bind(excluded_schemas())
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch tables: {e}")))?;

    let mut tables = BTreeMap::new();
    for row in rows {
        let schema: String = get(&row, "schema")?;
        let name: String = get(&row, "name")?;
        tables.insert(
            (schema.clone(), name.clone()),
            Table::new(Some(&schema), name),
        );
    }

    Ok(tables)
}

async fn introspect_columns(connection: &PgConnection, tables: &mut TableMap) -> Result<()> {
    let rows = sqlx::query(
        r#"
        SELECT
            table_schema::text AS table_schema,
            table_name::text AS table_name,
            column_name::text AS column_name,
            data_type::text AS data_type,
            udt_name::text AS udt_name,
            character_maximum_length::int AS character_maximum_length,
            is_nullable::text AS is_nullable,
            column_default::text AS column_default
        FROM information_schema.columns
        WHERE table_schema <> ALL($1::text[])
        ORDER BY table_schema, table_name, ordinal_position
        "#,
    )
    .bind(excluded_schemas())
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch columns: {e}")))?;

    for row in rows {
        let key = (get(&row, "table_schema")?, get(&row, "table_name")?);
        // Views report columns too; only tables are kept.
        let Some(table) = tables.get_mut(&key) else {
            continue;
        };
        let data_type: String = get(&row, "data_type")?;
        let udt_name: String = get(&row, "udt_name")?;
        let max_length: Option<i32> = get(&row, "character_maximum_length")?;
        let is_nullable: String = get(&row, "is_nullable")?;

        table.columns.push(Column {
            name: get(&row, "column_name")?,
            data_type: render_data_type(&data_type, &udt_name, max_length),
            nullable: is_nullable == "YES",
            default_value: get(&row, "column_default")?,
            extra: None,
        });
    }

    Ok(())
}

/// Renders a column type the way it is compared and emitted, e.g.
/// `character varying (255)` or `varchar[]`.
pub fn render_data_type(data_type: &str, udt_name: &str, max_length: Option<i32>) -> String {
    let mut rendered = match data_type {
        "ARRAY" => format!("{}[]", udt_name.strip_prefix('_').unwrap_or(udt_name)),
        "USER-DEFINED" => udt_name.to_string(),
        other => other.to_string(),
    };
    if let Some(length) = max_length {
        rendered.push_str(&format!(" ({length})"));
    }
    rendered
}

async fn introspect_indexes(connection: &PgConnection, tables: &mut TableMap) -> Result<()> {
    let rows = sqlx::query(
        r#"
        SELECT
            i.relname::text AS name,
            ns.nspname::text AS schema,
            t.relname::text AS table_name,
            am.amname::text AS method,
            idx.indisprimary AS is_primary,
            idx.indisunique AS is_unique,
            ARRAY(
                SELECT pg_get_indexdef(idx.indexrelid, k + 1, true)
                FROM generate_subscripts(idx.indkey, 1) AS k
                ORDER BY k
            ) AS columns
        FROM pg_index idx
        JOIN pg_class i ON i.oid = idx.indexrelid
        JOIN pg_class t ON t.oid = idx.indrelid
        JOIN pg_am am ON am.oid = i.relam
        JOIN pg_namespace ns ON ns.oid = t.relnamespace
        WHERE ns.nspname <> ALL($1::text[])
          AND NOT idx.indisprimary
          AND NOT EXISTS (
              SELECT 1 FROM pg_constraint c
              WHERE c.conindid = idx.indexrelid
                AND c.conrelid = idx.indrelid
                AND c.contype IN ('p', 'u', 'x')
          )
        ORDER BY ns.nspname, t.relname, i.relname
        "#,
    )
    .bind(excluded_schemas())
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch indexes: {e}")))?;

    for row in rows {
        let schema: String = get(&row, "schema")?;
        let key = (schema.clone(), get(&row, "table_name")?);
        let Some(table) = tables.get_mut(&key) else {
            continue;
        };
        table.indexes.push(Index {
            name: get(&row, "name")?,
            schema: Some(schema),
            index_type: get(&row, "method")?,
            columns: get(&row, "columns")?,
            primary: get(&row, "is_primary")?,
            unique: get(&row, "is_unique")?,
        });
    }

    Ok(())
}

async fn introspect_constraints(connection: &PgConnection, tables: &mut TableMap) -> Result<()> {
    let rows = sqlx::query(
        r#"
        SELECT
            n.nspname::text AS schema,
            cl.relname::text AS table_name,
            c.conname::text AS name,
            c.contype::text AS contype,
            pg_get_constraintdef(c.oid) AS definition
        FROM pg_constraint c
        JOIN pg_class cl ON cl.oid = c.conrelid
        JOIN pg_namespace n ON n.oid = cl.relnamespace
        WHERE c.contype IN ('f', 'p', 'u')
          AND n.nspname <> ALL($1::text[])
        ORDER BY n.nspname, cl.relname, c.contype DESC, c.conname
        "#,
    )
    .bind(excluded_schemas())
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch constraints: {e}")))?;

    for row in rows {
        let key = (get(&row, "schema")?, get(&row, "table_name")?);
        let Some(table) = tables.get_mut(&key) else {
            continue;
        };
        let name: String = get(&row, "name")?;
        let contype: String = get(&row, "contype")?;
        let definition: String = get(&row, "definition")?;

        let kind = match contype.as_str() {
            "p" => ConstraintKind::Primary,
            "u" => ConstraintKind::Unique,
            "f" => ConstraintKind::Foreign,
            other => {
                return Err(SchemaError::ParseError(format!(
                    "Unexpected constraint type {other} for {name}"
                )))
            }
        };
        let parsed = parse_constraint_definition(&definition)?;
        let (referenced_table, referenced_columns) = match parsed.reference {
            Some((table, columns)) if kind == ConstraintKind::Foreign => {
                (Some(table), Some(columns))
            }
            _ => (None, None),
        };

        table.constraints.push(Constraint {
            name,
            kind,
            columns: parsed.columns,
            referenced_table,
            referenced_columns,
        });
    }

    Ok(())
}

#[derive(Debug, PartialEq, Eq)]
pub struct ConstraintDefinition {
    pub columns: Vec<String>,
    pub reference: Option<(String, Vec<String>)>,
}

/// Parses the text returned by `pg_get_constraintdef`, for example
/// `FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE`.
pub fn parse_constraint_definition(definition: &str) -> Result<ConstraintDefinition> {
    let columns_re = Regex::new(r"\(([^)]*)\)").unwrap();
    let reference_re = Regex::new(r"REFERENCES\s+([^(]+?)\s*\(([^)]*)\)").unwrap();

    let columns = columns_re
        .captures(definition)
        .map(|caps| split_identifiers(&caps[1]))
        .ok_or_else(|| {
            SchemaError::ParseError(format!("No column list in constraint: {definition}"))
        })?;

    let reference = reference_re.captures(definition).map(|caps| {
        (
            unquote(caps[1].trim()).to_string(),
            split_identifiers(&caps[2]),
        )
    });

    Ok(ConstraintDefinition { columns, reference })
}

fn split_identifiers(list: &str) -> Vec<String> {
    list.split(',')
        .map(|s| unquote(s.trim()).to_string())
        .collect()
}

fn unquote(identifier: &str) -> &str {
    identifier
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(identifier)
}

async fn introspect_sequences(connection: &PgConnection) -> Result<Vec<Sequence>> {
    let rows = sqlx::query(
        r#"
        SELECT
            sequence_schema::text AS schema,
            sequence_name::text AS name,
            increment::text AS increment,
            minimum_value::text AS minimum_value,
            maximum_value::text AS maximum_value,
            start_value::text AS start_value,
            cycle_option::text AS cycle_option
        FROM information_schema.sequences
        ORDER BY sequence_schema, sequence_name
        "#,
    )
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch sequences: {e}")))?;

    let mut sequences = Vec::new();
    for row in rows {
        let cycle_option: String = get(&row, "cycle_option")?;
        sequences.push(Sequence {
            name: get(&row, "name")?,
            schema: get(&row, "schema")?,
            increment: get(&row, "increment")?,
            minimum_value: get(&row, "minimum_value")?,
            maximum_value: get(&row, "maximum_value")?,
            start_value: get(&row, "start_value")?,
            cycle: cycle_option == "YES",
        });
    }

    Ok(sequences)
}
