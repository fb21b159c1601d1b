use crate::util::SchemaError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    Mysql,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dialect::Postgres => f.write_str("postgres"),
            Dialect::Mysql => f.write_str("mysql"),
        }
    }
}

impl FromStr for Dialect {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "postgres" | "postgresql" => Ok(Dialect::Postgres),
            "mysql" => Ok(Dialect::Mysql),
            other => Err(SchemaError::UnsupportedDialect(other.to_string())),
        }
    }
}

/// A structural snapshot of one database.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Database {
    pub dialect: Dialect,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default)]
    pub sequences: Vec<Sequence>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Table {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub indexes: Vec<Index>,
    #[serde(default)]
    pub constraints: Vec<Constraint>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: String,
    pub nullable: bool,
    #[serde(default)]
    pub default_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Index {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    #[serde(rename = "type")]
    pub index_type: String,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default)]
    pub primary: bool,
    #[serde(default)]
    pub unique: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ConstraintKind {
    Primary,
    Unique,
    Foreign,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Constraint {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ConstraintKind,
    #[serde(default)]
    pub columns: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_table: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referenced_columns: Option<Vec<String>>,
}

/// Sequence parameters are kept as the catalog reports them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Sequence {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    pub increment: String,
    #[serde(default)]
    pub minimum_value: Option<String>,
    #[serde(default)]
    pub maximum_value: Option<String>,
    #[serde(default)]
    pub start_value: Option<String>,
    #[serde(default)]
    pub cycle: bool,
}

/// Treats an empty schema the same as no schema.
fn non_empty(schema: &Option<String>) -> Option<&str> {
    schema.as_deref().filter(|s| !s.is_empty())
}

impl Database {
    pub fn new(dialect: Dialect) -> Self {
        Database {
            dialect,
            tables: Vec::new(),
            sequences: Vec::new(),
        }
    }

    pub fn find_table(&self, schema: Option<&str>, name: &str) -> Option<&Table> {
        self.tables
            .iter()
            .find(|t| t.name == name && t.schema_name() == schema)
    }

    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let json = serde_json::to_string(self).expect("Database must serialize");
        let hash = Sha256::digest(json.as_bytes());
        hex::encode(hash)
    }
}

impl Table {
    pub fn new(schema: Option<&str>, name: impl Into<String>) -> Self {
        Table {
            name: name.into(),
            schema: schema.map(str::to_string),
            columns: Vec::new(),
            indexes: Vec::new(),
            constraints: Vec::new(),
        }
    }

    pub fn schema_name(&self) -> Option<&str> {
        non_empty(&self.schema)
    }

    /// Identity used to match tables across two databases.
    pub fn key(&self) -> (Option<&str>, &str) {
        (self.schema_name(), self.name.as_str())
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn index(&self, name: &str) -> Option<&Index> {
        self.indexes.iter().find(|i| i.name == name)
    }

    pub fn constraint(&self, name: &str) -> Option<&Constraint> {
        self.constraints.iter().find(|c| c.name == name)
    }
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>, nullable: bool) -> Self {
        Column {
            name: name.into(),
            data_type: data_type.into(),
            nullable,
            default_value: None,
            extra: None,
        }
    }

    pub fn with_default(mut self, default_value: impl Into<String>) -> Self {
        self.default_value = Some(default_value.into());
        self
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    pub fn is_auto_increment(&self) -> bool {
        self.extra
            .as_deref()
            .is_some_and(|e| e.trim().eq_ignore_ascii_case("auto_increment"))
    }
}

impl Index {
    pub fn schema_name(&self) -> Option<&str> {
        non_empty(&self.schema)
    }
}

impl Constraint {
    pub fn primary(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::plain(name, ConstraintKind::Primary, columns)
    }

    pub fn unique(name: impl Into<String>, columns: &[&str]) -> Self {
        Self::plain(name, ConstraintKind::Unique, columns)
    }

    pub fn foreign(
        name: impl Into<String>,
        columns: &[&str],
        referenced_table: impl Into<String>,
        referenced_columns: &[&str],
    ) -> Self {
        Constraint {
            name: name.into(),
            kind: ConstraintKind::Foreign,
            columns: to_strings(columns),
            referenced_table: Some(referenced_table.into()),
            referenced_columns: Some(to_strings(referenced_columns)),
        }
    }

    fn plain(name: impl Into<String>, kind: ConstraintKind, columns: &[&str]) -> Self {
        Constraint {
            name: name.into(),
            kind,
            columns: to_strings(columns),
            referenced_table: None,
            referenced_columns: None,
        }
    }
}

impl Sequence {
    pub fn schema_name(&self) -> Option<&str> {
        non_empty(&self.schema)
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
