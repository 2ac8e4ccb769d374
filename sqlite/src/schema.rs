//! Live table introspection, pragma based.

use compact_str::CompactString;
use rusqlite::Connection;

use strata_core::model::default_literal;
use strata_core::{FieldSpec, Result};

/// One column of a live table, as reported by `pragma_table_info`.
#[derive(Debug, Clone)]
pub struct ColumnInfo {
    pub name: CompactString,
    pub sql_type: CompactString,
    pub not_null: bool,
    /// The default literal exactly as declared, when one exists.
    pub default: Option<String>,
}

impl ColumnInfo {
    /// Whether this live column still matches a declared field.
    ///
    /// Type names compare case-insensitively; defaults compare by declared
    /// literal text.
    pub fn matches(&self, spec: &FieldSpec) -> bool {
        self.sql_type.eq_ignore_ascii_case(&spec.sql_type)
            && self.not_null == spec.not_null
            && self.default == spec.default.as_ref().map(default_literal)
    }
}

pub fn table_exists(connection: &Connection, table: &str) -> Result<bool> {
    let mut statement = connection
        .prepare("SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = ?1")?;
    Ok(statement.exists([table])?)
}

/// The column layout of a live table. Empty when the table does not exist.
pub fn table_structure(connection: &Connection, table: &str) -> Result<Vec<ColumnInfo>> {
    let mut statement = connection.prepare(
        "SELECT \"name\", \"type\", \"notnull\", \"dflt_value\" FROM pragma_table_info(?1)",
    )?;
    let rows = statement.query_map([table], |row| {
        Ok(ColumnInfo {
            name: CompactString::from(row.get::<_, String>(0)?),
            sql_type: CompactString::from(row.get::<_, String>(1)?),
            not_null: row.get::<_, i64>(2)? != 0,
            default: row.get::<_, Option<String>>(3)?,
        })
    })?;
    let mut columns = Vec::new();
    for column in rows {
        columns.push(column?);
    }
    Ok(columns)
}

/// Case-insensitive column lookup.
pub fn find_column<'a>(columns: &'a [ColumnInfo], name: &str) -> Option<&'a ColumnInfo> {
    columns
        .iter()
        .find(|column| column.name.eq_ignore_ascii_case(name))
}
