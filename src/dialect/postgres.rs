use super::{unique_keyword, AlterStyle, SqlDialect};
use crate::model::{Constraint, Dialect, Index, Table};

#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    fn quote_char(&self) -> char {
        '"'
    }

    fn alter_style(&self) -> AlterStyle {
        AlterStyle::Separate
    }

    fn create_index(&self, table: &Table, index: &Index) -> String {
        format!(
            "CREATE {}INDEX {} ON {} USING {} ({});",
            unique_keyword(index),
            self.quote(&index.name),
            self.table_name(table),
            index.index_type,
            self.column_list(&index.columns, ",")
        )
    }

    fn drop_index(&self, _table: &Table, index: &Index) -> String {
        format!("DROP INDEX {};", self.index_name(index))
    }

    fn drop_constraint(&self, table: &Table, constraint: &Constraint) -> String {
        format!(
            "ALTER TABLE {} DROP CONSTRAINT {};",
            self.table_name(table),
            self.quote(&constraint.name)
        )
    }
}
