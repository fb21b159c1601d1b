use crate::dialect::SqlDialect;
use crate::model::{Database, Sequence};
use crate::script::Script;
use crate::util::is_numeric;
use std::collections::BTreeMap;

pub(super) fn diff_sequences(sql: &dyn SqlDialect, from: &Database, to: &Database) -> Script {
    let mut script = Script::new();
    let from_sequences = sequences_by_name(sql, from);
    let to_sequences = sequences_by_name(sql, to);

    for name in from_sequences.keys() {
        if !to_sequences.contains_key(name) {
            script.safe(format!("DROP SEQUENCE {name};"));
        }
    }

    for (name, sequence) in &to_sequences {
        if !from_sequences.contains_key(name) {
            script.safe(sequence_description(sql, sequence));
        }
    }

    for (name, to_sequence) in &to_sequences {
        if let Some(from_sequence) = from_sequences.get(name) {
            let from_desc = sequence_description(sql, from_sequence);
            let to_desc = sequence_description(sql, to_sequence);
            if from_desc != to_desc {
                script.safe(format!("DROP SEQUENCE {name};"));
                script.safe(to_desc);
            }
        }
    }

    script
}

fn sequences_by_name<'a>(sql: &dyn SqlDialect, db: &'a Database) -> BTreeMap<String, &'a Sequence> {
    db.sequences
        .iter()
        .map(|s| (sql.full_name(s.schema_name(), &s.name), s))
        .collect()
}

pub fn sequence_description(sql: &dyn SqlDialect, sequence: &Sequence) -> String {
    format!(
        "CREATE SEQUENCE {} INCREMENT {} {} {} {} {} CYCLE;",
        sql.full_name(sequence.schema_name(), &sequence.name),
        sequence.increment,
        numeric_clause("MINVALUE", &sequence.minimum_value).unwrap_or_else(|| "NO MINVALUE".into()),
        numeric_clause("MAXVALUE", &sequence.maximum_value).unwrap_or_else(|| "NO MAXVALUE".into()),
        numeric_clause("START", &sequence.start_value).unwrap_or_default(),
        if sequence.cycle { "" } else { "NO" }
    )
}

fn numeric_clause(keyword: &str, value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .filter(|v| is_numeric(v))
        .map(|v| format!("{keyword} {}", v.trim()))
}
