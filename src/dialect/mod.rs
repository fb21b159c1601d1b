//! Dialect-specific quoting and DDL fragments.

mod mysql;
mod postgres;

pub use mysql::MySql;
pub use postgres::Postgres;

use crate::model::{Column, Constraint, ConstraintKind, Dialect, Index, Table};

/// How a dialect expresses a change to an existing column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlterStyle {
    /// One `ALTER COLUMN` clause per changed attribute.
    Separate,
    /// A single `MODIFY` restating the whole column.
    Modify,
}

pub trait SqlDialect: Sync {
    fn dialect(&self) -> Dialect;

    fn quote_char(&self) -> char;

    fn alter_style(&self) -> AlterStyle;

    fn quote(&self, identifier: &str) -> String {
        let q = self.quote_char();
        let escaped = identifier.replace(q, &format!("{q}{q}"));
        format!("{q}{escaped}{q}")
    }

    fn full_name(&self, schema: Option<&str>, name: &str) -> String {
        match schema.filter(|s| !s.is_empty()) {
            Some(schema) => format!("{}.{}", self.quote(schema), self.quote(name)),
            None => self.quote(name),
        }
    }

    fn table_name(&self, table: &Table) -> String {
        self.full_name(table.schema_name(), &table.name)
    }

    fn index_name(&self, index: &Index) -> String {
        self.full_name(index.schema_name(), &index.name)
    }

    fn column_list(&self, columns: &[String], separator: &str) -> String {
        columns
            .iter()
            .map(|c| self.quote(c))
            .collect::<Vec<_>>()
            .join(separator)
    }

    fn column_description(&self, column: &Column) -> String {
        let mut desc = column.data_type.clone();
        if let Some(ref default) = column.default_value {
            desc.push_str(&format!(" DEFAULT {default}"));
        }
        desc.push_str(if column.nullable { " NULL" } else { " NOT NULL" });
        desc
    }

    fn create_index(&self, table: &Table, index: &Index) -> String;

    fn drop_index(&self, table: &Table, index: &Index) -> String;

    fn drop_constraint(&self, table: &Table, constraint: &Constraint) -> String;

    /// `body` is the rendered `PRIMARY KEY (...)`, `UNIQUE (...)` or
    /// `FOREIGN KEY ... REFERENCES ...` clause.
    fn add_constraint(&self, table: &Table, constraint: &Constraint, body: &str) -> String {
        format!(
            "ALTER TABLE {} ADD CONSTRAINT {} {body};",
            self.table_name(table),
            self.quote(&constraint.name)
        )
    }
}

impl Dialect {
    pub fn renderer(self) -> &'static dyn SqlDialect {
        match self {
            Dialect::Postgres => &Postgres,
            Dialect::Mysql => &MySql,
        }
    }
}

fn unique_keyword(index: &Index) -> &'static str {
    if index.unique && !index.primary {
        "UNIQUE "
    } else {
        ""
    }
}

pub(crate) fn is_primary(constraint: &Constraint) -> bool {
    constraint.kind == ConstraintKind::Primary
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(name: &str, schema: Option<&str>, unique: bool) -> Index {
        Index {
            name: name.to_string(),
            schema: schema.map(str::to_string),
            index_type: "btree".to_string(),
            columns: vec!["first_name".to_string(), "last_name".to_string()],
            primary: false,
            unique,
        }
    }

    #[test]
    fn quote_uses_dialect_character() {
        assert_eq!(Dialect::Postgres.renderer().quote("users"), "\"users\"");
        assert_eq!(Dialect::Mysql.renderer().quote("users"), "`users`");
    }

    #[test]
    fn quote_escapes_embedded_quote_character() {
        assert_eq!(Postgres.quote("has\"quote"), "\"has\"\"quote\"");
        assert_eq!(MySql.quote("odd`name"), "`odd``name`");
    }

    #[test]
    fn full_name_skips_empty_schema() {
        assert_eq!(
            Postgres.full_name(Some("public"), "users"),
            "\"public\".\"users\""
        );
        assert_eq!(Postgres.full_name(Some(""), "users"), "\"users\"");
        assert_eq!(MySql.full_name(None, "users"), "`users`");
    }

    #[test]
    fn column_description_renders_default_and_nullability() {
        let column = Column::new("id", "integer", false).with_default("nextval('users_id_seq'::regclass)");
        assert_eq!(
            Postgres.column_description(&column),
            "integer DEFAULT nextval('users_id_seq'::regclass) NOT NULL"
        );
        assert_eq!(
            MySql.column_description(&Column::new("name", "varchar(255)", true)),
            "varchar(255) NULL"
        );
    }

    #[test]
    fn postgres_index_statements() {
        let table = Table::new(Some("public"), "users");
        let idx = index("users_name", Some("public"), false);
        assert_eq!(
            Postgres.create_index(&table, &idx),
            "CREATE INDEX \"users_name\" ON \"public\".\"users\" USING btree (\"first_name\",\"last_name\");"
        );
        assert_eq!(
            Postgres.drop_index(&table, &idx),
            "DROP INDEX \"public\".\"users_name\";"
        );
        assert!(Postgres
            .create_index(&table, &index("users_name", None, true))
            .starts_with("CREATE UNIQUE INDEX \"users_name\""));
    }

    #[test]
    fn mysql_index_statements() {
        let table = Table::new(None, "users");
        let mut idx = index("users_name", None, false);
        idx.index_type = "BTREE".to_string();
        assert_eq!(
            MySql.create_index(&table, &idx),
            "CREATE INDEX `users_name` USING BTREE ON `users` (`first_name`,`last_name`);"
        );
        assert_eq!(
            MySql.drop_index(&table, &idx),
            "DROP INDEX `users_name` ON `users`;"
        );
    }

    #[test]
    fn constraint_drops_follow_dialect() {
        let pg_table = Table::new(Some("public"), "items");
        let my_table = Table::new(None, "items");
        let fk = Constraint::foreign("items_fk", &["user_id"], "users", &["id"]);
        let uq = Constraint::unique("items_name", &["name"]);

        assert_eq!(
            Postgres.drop_constraint(&pg_table, &fk),
            "ALTER TABLE \"public\".\"items\" DROP CONSTRAINT \"items_fk\";"
        );
        assert_eq!(
            MySql.drop_constraint(&my_table, &fk),
            "ALTER TABLE `items` DROP FOREIGN KEY `items_fk`;"
        );
        assert_eq!(
            MySql.drop_constraint(&my_table, &uq),
            "ALTER TABLE `items` DROP INDEX `items_name`;"
        );
    }

    #[test]
    fn mysql_primary_key_is_added_unnamed() {
        let table = Table::new(None, "users");
        let pk = Constraint::primary("PRIMARY", &["id"]);
        assert_eq!(
            MySql.add_constraint(&table, &pk, "PRIMARY KEY (`id`)"),
            "ALTER TABLE `users` ADD PRIMARY KEY (`id`);"
        );
        let uq = Constraint::unique("email_unique", &["email"]);
        assert_eq!(
            MySql.add_constraint(&table, &uq, "UNIQUE (`email`)"),
            "ALTER TABLE `users` ADD CONSTRAINT `email_unique` UNIQUE (`email`);"
        );
    }
}
