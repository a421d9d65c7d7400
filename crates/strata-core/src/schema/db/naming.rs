//! Generated names of indices and foreign keys.
//!
//! | Object | Name |
//! |---|---|
//! | single-column index | `IX_<Table>__<col>` |
//! | single-column unique index | `UX_<Table>__<col>` |
//! | composite index | `CX_<Table>__<c1>__<c2>` |
//! | composite unique index | `UC_<Table>__<c1>__<c2>` |
//! | foreign key | `FK_<Table>__<col>` |

pub fn index_name(table: &str, columns: &[String], unique: bool) -> String {
    let prefix = match (columns.len() > 1, unique) {
        (false, false) => "IX",
        (false, true) => "UX",
        (true, false) => "CX",
        (true, true) => "UC",
    };

    let mut name = format!("{prefix}_{table}");
    for column in columns {
        name.push_str("__");
        name.push_str(column);
    }
    name
}

pub fn foreign_key_name(table: &str, column: &str) -> String {
    format!("FK_{table}__{column}")
}

/// Name of the scratch table used while rebuilding `table`.
pub fn rebuild_table_name(table: &str) -> String {
    format!("_strata_new_{table}")
}
