use crate::model::*;
use crate::mysql::connection::MySqlConnection;
use crate::util::{Result, SchemaError};
use sqlx::mysql::MySqlRow;
use sqlx::{MySql, Row};
use std::collections::BTreeMap;
use tracing::debug;

/// One row of `information_schema.KEY_COLUMN_USAGE`.
#[derive(Debug, Clone)]
pub struct KeyUsage {
    pub table_name: String,
    pub constraint_name: String,
    pub column_name: String,
    pub referenced_table: Option<String>,
    pub referenced_column: Option<String>,
}

/// One row of `information_schema.STATISTICS`.
#[derive(Debug, Clone)]
pub struct IndexColumn {
    pub table_name: String,
    pub index_name: String,
    pub index_type: String,
    pub column_name: Option<String>,
    pub non_unique: bool,
}

pub async fn introspect_database(connection: &MySqlConnection) -> Result<Database> {
    let mut tables = introspect_tables(connection).await?;
    introspect_columns(connection, &mut tables).await?;
    let usages = fetch_key_usage(connection).await?;
    apply_key_usage(&mut tables, usages);
    let index_columns = fetch_index_columns(connection).await?;
    apply_index_columns(&mut tables, index_columns);

    debug!(tables = tables.len(), "introspected mysql database");

    Ok(Database {
        dialect: Dialect::Mysql,
        tables: tables.into_values().collect(),
        sequences: Vec::new(),
    })
}

fn get<'r, T>(row: &'r MySqlRow, column: &str) -> Result<T>
where
    T: sqlx::Decode<'r, MySql> + sqlx::Type<MySql>,
{
    row.try_get(column)
        .map_err(|e| SchemaError::DatabaseError(format!("Failed to read {column}: {e}")))
}

async fn introspect_tables(connection: &MySqlConnection) -> Result<BTreeMap<String, Table>> {
    let rows = sqlx::query(
        r#"
        SELECT CAST(TABLE_NAME AS CHAR) AS table_name
        FROM information_schema.TABLES
        WHERE TABLE_SCHEMA = DATABASE() AND TABLE_TYPE = 'BASE TABLE'
        ORDER BY TABLE_NAME
        "#,
    )
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch tables: {e}")))?;

    let mut tables = BTreeMap::new();
    for row in rows {
        let name: String = get(&row, "table_name")?;
        tables.insert(name.clone(), Table::new(None, name));
    }

    Ok(tables)
}

async fn introspect_columns(
    connection: &MySqlConnection,
    tables: &mut BTreeMap<String, Table>,
) -> Result<()> {
    let rows = sqlx::query(
        r#"
        SELECT
            CAST(TABLE_NAME AS CHAR) AS table_name,
            CAST(COLUMN_NAME AS CHAR) AS column_name,
            CAST(COLUMN_TYPE AS CHAR) AS column_type,
            CAST(IS_NULLABLE AS CHAR) AS is_nullable,
            CAST(COLUMN_DEFAULT AS CHAR) AS column_default,
            CAST(EXTRA AS CHAR) AS extra
        FROM information_schema.COLUMNS
        WHERE TABLE_SCHEMA = DATABASE()
        ORDER BY TABLE_NAME, ORDINAL_POSITION
        "#,
    )
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch columns: {e}")))?;

    for row in rows {
        let table_name: String = get(&row, "table_name")?;
        let Some(table) = tables.get_mut(&table_name) else {
            continue;
        };
        let is_nullable: String = get(&row, "is_nullable")?;
        let extra: Option<String> = get(&row, "extra")?;

        table.columns.push(Column {
            name: get(&row, "column_name")?,
            data_type: get(&row, "column_type")?,
            nullable: is_nullable == "YES",
            default_value: get(&row, "column_default")?,
            extra: extra.filter(|e| !e.is_empty()),
        });
    }

    Ok(())
}

async fn fetch_key_usage(connection: &MySqlConnection) -> Result<Vec<KeyUsage>> {
    let rows = sqlx::query(
        r#"
        SELECT
            CAST(TABLE_NAME AS CHAR) AS table_name,
            CAST(CONSTRAINT_NAME AS CHAR) AS constraint_name,
            CAST(COLUMN_NAME AS CHAR) AS column_name,
            CAST(REFERENCED_TABLE_NAME AS CHAR) AS referenced_table,
            CAST(REFERENCED_COLUMN_NAME AS CHAR) AS referenced_column
        FROM information_schema.KEY_COLUMN_USAGE
        WHERE TABLE_SCHEMA = DATABASE()
        ORDER BY TABLE_NAME, CONSTRAINT_NAME, ORDINAL_POSITION
        "#,
    )
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch key usage: {e}")))?;

    rows.iter()
        .map(|row| {
            Ok(KeyUsage {
                table_name: get(row, "table_name")?,
                constraint_name: get(row, "constraint_name")?,
                column_name: get(row, "column_name")?,
                referenced_table: get(row, "referenced_table")?,
                referenced_column: get(row, "referenced_column")?,
            })
        })
        .collect()
}

async fn fetch_index_columns(connection: &MySqlConnection) -> Result<Vec<IndexColumn>> {
    let rows = sqlx::query(
        r#"
        SELECT
            CAST(TABLE_NAME AS CHAR) AS table_name,
            CAST(INDEX_NAME AS CHAR) AS index_name,
            CAST(INDEX_TYPE AS CHAR) AS index_type,
            CAST(COLUMN_NAME AS CHAR) AS column_name,
            CAST(NON_UNIQUE AS SIGNED) AS non_unique
        FROM information_schema.STATISTICS
        WHERE TABLE_SCHEMA = DATABASE()
        ORDER BY TABLE_NAME, INDEX_NAME, SEQ_IN_INDEX
        "#,
    )
    .fetch_all(connection.pool())
    .await
    .map_err(|e| SchemaError::DatabaseError(format!("Failed to fetch indexes: {e}")))?;

    rows.iter()
        .map(|row| {
            let non_unique: i64 = get(row, "non_unique")?;
            Ok(IndexColumn {
                table_name: get(row, "table_name")?,
                index_name: get(row, "index_name")?,
                index_type: get(row, "index_type")?,
                column_name: get(row, "column_name")?,
                non_unique: non_unique != 0,
            })
        })
        .collect()
}

/// Groups key usage rows into constraints. A constraint is a foreign key when
/// it references a table, the primary key when named `PRIMARY`, and a unique
/// key otherwise.
pub fn apply_key_usage(tables: &mut BTreeMap<String, Table>, usages: Vec<KeyUsage>) {
    for usage in usages {
        let Some(table) = tables.get_mut(&usage.table_name) else {
            continue;
        };

        let position = table
            .constraints
            .iter()
            .position(|c| c.name == usage.constraint_name);
        let position = match position {
            Some(position) => position,
            None => {
                let kind = if usage.referenced_table.is_some() {
                    ConstraintKind::Foreign
                } else if usage.constraint_name == "PRIMARY" {
                    ConstraintKind::Primary
                } else {
                    ConstraintKind::Unique
                };
                table.constraints.push(Constraint {
                    name: usage.constraint_name.clone(),
                    kind,
                    columns: Vec::new(),
                    referenced_table: None,
                    referenced_columns: (kind == ConstraintKind::Foreign).then(Vec::new),
                });
                table.constraints.len() - 1
            }
        };

        let constraint = &mut table.constraints[position];
        if constraint.kind == ConstraintKind::Foreign {
            constraint.referenced_table = usage.referenced_table;
            if let (Some(columns), Some(column)) =
                (constraint.referenced_columns.as_mut(), usage.referenced_column)
            {
                columns.push(column);
            }
        }
        constraint.columns.push(usage.column_name);
    }
}

/// Groups statistics rows into indexes, skipping those that back a constraint.
/// Functional indexes have no named key parts and are left out.
pub fn apply_index_columns(tables: &mut BTreeMap<String, Table>, index_columns: Vec<IndexColumn>) {
    for entry in index_columns {
        let Some(table) = tables.get_mut(&entry.table_name) else {
            continue;
        };
        if table.constraint(&entry.index_name).is_some() {
            continue;
        }

        let position = match table.indexes.iter().position(|i| i.name == entry.index_name) {
            Some(position) => position,
            None => {
                table.indexes.push(Index {
                    primary: entry.index_name == "PRIMARY",
                    name: entry.index_name.clone(),
                    schema: None,
                    index_type: entry.index_type.clone(),
                    columns: Vec::new(),
                    unique: !entry.non_unique,
                });
                table.indexes.len() - 1
            }
        };

        // Functional key parts have no column name.
        if let Some(column) = entry.column_name {
            table.indexes[position].columns.push(column);
        }
    }

    for table in tables.values_mut() {
        table.indexes.retain(|index| {
            if index.columns.is_empty() {
                debug!(table = %table.name, index = %index.name, "skipping functional index");
            }
            !index.columns.is_empty()
        });
    }
}
