//! Structural checks run before any SQL is generated.
//!
//! The diff engine relies on names being unique within their scope and on
//! indexes, constraints and foreign keys carrying the fields it renders. A
//! database violating any of these is rejected as a whole.

use crate::model::{ConstraintKind, Database, Table};
use crate::util::{Result, SchemaError};
use std::collections::HashSet;

pub fn validate_database(db: &Database) -> Result<()> {
    let mut table_keys = HashSet::new();
    for table in &db.tables {
        if !table_keys.insert(table.key()) {
            return Err(SchemaError::malformed(
                entity_name(table.schema_name(), &table.name),
                "duplicate table",
            ));
        }
        validate_table(table)?;
    }

    let mut sequence_keys = HashSet::new();
    for sequence in &db.sequences {
        if !sequence_keys.insert((sequence.schema_name(), sequence.name.as_str())) {
            return Err(SchemaError::malformed(
                entity_name(sequence.schema_name(), &sequence.name),
                "duplicate sequence",
            ));
        }
    }

    Ok(())
}

fn validate_table(table: &Table) -> Result<()> {
    let table_name = entity_name(table.schema_name(), &table.name);

    let mut columns = HashSet::new();
    for column in &table.columns {
        if !columns.insert(column.name.as_str()) {
            return Err(SchemaError::malformed(
                format!("{table_name}.{}", column.name),
                "duplicate column",
            ));
        }
    }

    let mut indexes = HashSet::new();
    for index in &table.indexes {
        let entity = format!("{table_name} index {}", index.name);
        if !indexes.insert(index.name.as_str()) {
            return Err(SchemaError::malformed(entity, "duplicate index"));
        }
        if index.columns.is_empty() {
            return Err(SchemaError::malformed(entity, "index has no columns"));
        }
    }

    let mut constraints = HashSet::new();
    for constraint in &table.constraints {
        let entity = format!("{table_name} constraint {}", constraint.name);
        if !constraints.insert(constraint.name.as_str()) {
            return Err(SchemaError::malformed(entity, "duplicate constraint"));
        }
        if constraint.columns.is_empty() {
            return Err(SchemaError::malformed(entity, "constraint has no columns"));
        }
        if constraint.kind == ConstraintKind::Foreign {
            if constraint
                .referenced_table
                .as_deref()
                .map_or(true, str::is_empty)
            {
                return Err(SchemaError::malformed(
                    entity,
                    "foreign key is missing referenced_table",
                ));
            }
            if constraint
                .referenced_columns
                .as_ref()
                .map_or(true, Vec::is_empty)
            {
                return Err(SchemaError::malformed(
                    entity,
                    "foreign key is missing referenced_columns",
                ));
            }
        }
    }

    Ok(())
}

fn entity_name(schema: Option<&str>, name: &str) -> String {
    match schema {
        Some(schema) => format!("{schema}.{name}"),
        None => name.to_string(),
    }
}
