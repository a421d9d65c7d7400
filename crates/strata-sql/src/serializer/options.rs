use super::{Formatter, Ident, Param, Params, ToSql};

use crate::stmt::OptionsStatement;

use strata_core::{schema::db::OPTIONS_TABLE, stmt::Value};

/// Key of the transaction-scoped advisory lock serializing options table
/// bootstrap on PostgreSQL.
const BOOTSTRAP_LOCK_ID: i64 = 0x5354_5241_5441;

impl ToSql for &OptionsStatement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let table = Ident(OPTIONS_TABLE);
        let now = f.serializer.now_millis();

        match self {
            OptionsStatement::CreateTable => fmt!(
                f,
                "CREATE TABLE IF NOT EXISTS " table
                " (\"key\" TEXT PRIMARY KEY, \"value\" TEXT, \"expires_at\" BIGINT)"
            ),
            OptionsStatement::TableExists if f.serializer.is_postgresql() => fmt!(
                f,
                "SELECT COUNT(*) FROM information_schema.tables WHERE table_schema = current_schema() AND table_name = '"
                OPTIONS_TABLE "'"
            ),
            OptionsStatement::TableExists => fmt!(
                f,
                "SELECT COUNT(*) FROM sqlite_master WHERE \"type\" = 'table' AND \"name\" = '"
                OPTIONS_TABLE "'"
            ),
            OptionsStatement::BootstrapLock if f.serializer.is_postgresql() => {
                f.dst
                    .push_str(&format!("SELECT pg_advisory_xact_lock({BOOTSTRAP_LOCK_ID})"));
            }
            // Write transactions already exclude each other
            OptionsStatement::BootstrapLock => fmt!(f, "SELECT 1"),
            OptionsStatement::Get { key } => fmt!(
                f,
                "SELECT \"value\" FROM " table " WHERE \"key\" = " Param(&Value::from(key))
            ),
            OptionsStatement::Set { key, value } => fmt!(
                f,
                "INSERT INTO " table " (\"key\", \"value\") VALUES (" Param(&Value::from(key))
                ", " Param(&Value::from(value)) ") ON CONFLICT (\"key\") DO UPDATE SET \"value\" = excluded.\"value\""
            ),
            OptionsStatement::Delete { key } => fmt!(
                f,
                "DELETE FROM " table " WHERE \"key\" = " Param(&Value::from(key))
            ),
            OptionsStatement::AcquireLock {
                key,
                holder,
                ttl_ms,
            } => fmt!(
                f,
                "INSERT INTO " table " (\"key\", \"value\", \"expires_at\") VALUES ("
                Param(&Value::from(key)) ", " Param(&Value::from(holder)) ", " now " + "
                Param(&Value::I64(*ttl_ms))
                ") ON CONFLICT (\"key\") DO UPDATE SET \"value\" = excluded.\"value\", \"expires_at\" = excluded.\"expires_at\" WHERE "
                Ident(OPTIONS_TABLE) ".\"expires_at\" <= " now " OR "
                Ident(OPTIONS_TABLE) ".\"value\" = excluded.\"value\""
            ),
            OptionsStatement::ReleaseLiveLock { key } => fmt!(
                f,
                "DELETE FROM " table " WHERE \"key\" = " Param(&Value::from(key))
                " AND \"expires_at\" > " now
            ),
            OptionsStatement::IsLocked { key } => fmt!(
                f,
                "SELECT COUNT(*) FROM " table " WHERE \"key\" = " Param(&Value::from(key))
                " AND \"expires_at\" > " now
            ),
            OptionsStatement::ListLocks { prefix, excluded } => fmt!(
                f,
                "SELECT \"key\" FROM " table " WHERE " Prefix(prefix)
                " AND \"key\" <> " Param(&Value::from(excluded))
                " AND \"expires_at\" > " now " ORDER BY \"key\""
            ),
            OptionsStatement::DeleteLocks { prefix, excluded } => fmt!(
                f,
                "DELETE FROM " table " WHERE " Prefix(prefix)
                " AND \"key\" <> " Param(&Value::from(excluded))
            ),
        }
    }
}

/// `substr("key", 1, <len>) = <prefix>`
struct Prefix<'a>(&'a str);

impl ToSql for Prefix<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let len = self.0.chars().count() as u64;
        fmt!(
            f,
            "substr(\"key\", 1, " len ") = " Param(&Value::from(self.0))
        );
    }
}
