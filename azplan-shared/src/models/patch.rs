//! Partial-update helpers
//!
//! Update structs use `Option<T>` for "keep or set" fields and
//! `Option<Option<T>>` for nullable columns, where the outer `None` keeps the
//! stored value and `Some(None)` clears it. serde collapses an explicit JSON
//! `null` into the outer `None` unless the field goes through
//! [`double_option`].

use serde::{Deserialize, Deserializer};

/// Deserializes a present field (even `null`) as `Some(..)`
///
/// Use together with `#[serde(default)]` so an absent field stays `None`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Appends `column = $n` assignments for the fields a patch carries
///
/// Keeps placeholder numbering in step with the binds that follow. `$1` is
/// reserved for the row id.
#[derive(Debug)]
pub(crate) struct SetClause {
    sql: String,
    next_bind: usize,
}

impl SetClause {
    pub(crate) fn new(table: &str) -> Self {
        Self {
            sql: format!("UPDATE {} SET updated_at = NOW()", table),
            next_bind: 2,
        }
    }

    pub(crate) fn set(&mut self, column: &str, present: bool) {
        if present {
            self.sql
                .push_str(&format!(", {} = ${}", column, self.next_bind));
            self.next_bind += 1;
        }
    }

    /// Reserves the next placeholder for a bind that follows the assignments
    pub(crate) fn placeholder(&mut self) -> String {
        let placeholder = format!("${}", self.next_bind);
        self.next_bind += 1;
        placeholder
    }

    pub(crate) fn finish(mut self, tail: &str) -> String {
        self.sql.push(' ');
        self.sql.push_str(tail);
        self.sql
    }
}
