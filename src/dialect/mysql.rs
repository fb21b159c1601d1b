use super::{is_primary, unique_keyword, AlterStyle, SqlDialect};
use crate::model::{Constraint, ConstraintKind, Dialect, Index, Table};

#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl SqlDialect for MySql {
    fn dialect(&self) -> Dialect {
        Dialect::Mysql
    }

    fn quote_char(&self) -> char {
        '`'
    }

    fn alter_style(&self) -> AlterStyle {
        AlterStyle::Modify
    }

    fn create_index(&self, table: &Table, index: &Index) -> String {
        format!(
            "CREATE {}INDEX {} USING {} ON {} ({});",
            unique_keyword(index),
            self.quote(&index.name),
            index.index_type,
            self.table_name(table),
            self.column_list(&index.columns, ",")
        )
    }

    fn drop_index(&self, table: &Table, index: &Index) -> String {
        format!(
            "DROP INDEX {} ON {};",
            self.index_name(index),
            self.table_name(table)
        )
    }

    fn drop_constraint(&self, table: &Table, constraint: &Constraint) -> String {
        let clause = match constraint.kind {
            ConstraintKind::Foreign => "DROP FOREIGN KEY",
            ConstraintKind::Primary | ConstraintKind::Unique => "DROP INDEX",
        };
        format!(
            "ALTER TABLE {} {clause} {};",
            self.table_name(table),
            self.quote(&constraint.name)
        )
    }

    // MySQL ignores any name given to a primary key; it is always `PRIMARY`.
    fn add_constraint(&self, table: &Table, constraint: &Constraint, body: &str) -> String {
        if is_primary(constraint) {
            format!("ALTER TABLE {} ADD {body};", self.table_name(table))
        } else {
            format!(
                "ALTER TABLE {} ADD CONSTRAINT {} {body};",
                self.table_name(table),
                self.quote(&constraint.name)
            )
        }
    }
}
