use super::{Formatter, Param, Params, ToSql};

use crate::stmt::Catalog;

use strata_core::{schema::db::OPTIONS_TABLE, stmt::Value};

impl ToSql for &Catalog {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if f.serializer.is_postgresql() {
            postgresql(self, f);
        } else {
            sqlite(self, f);
        }
    }
}

fn sqlite<P: Params>(catalog: &Catalog, f: &mut Formatter<'_, P>) {
    match catalog {
        Catalog::Tables => fmt!(
            f,
            "SELECT \"name\" FROM sqlite_master WHERE \"type\" = 'table'"
            " AND substr(\"name\", 1, 7) <> 'sqlite_' AND \"name\" <> '" OPTIONS_TABLE "'"
            " ORDER BY \"name\""
        ),
        Catalog::Columns(table) => fmt!(
            f,
            "SELECT \"name\", \"type\", \"notnull\", \"pk\" FROM pragma_table_info("
            Param(&Value::from(table)) ") ORDER BY \"cid\""
        ),
        // Only indices created with CREATE INDEX, not the ones backing
        // constraints
        Catalog::Indices(table) => fmt!(
            f,
            "SELECT il.\"name\", il.\"unique\", (SELECT json_group_array(ii.\"name\") FROM"
            " (SELECT \"name\" FROM pragma_index_info(il.\"name\") ORDER BY \"seqno\") ii)"
            " FROM pragma_index_list(" Param(&Value::from(table)) ") il"
            " WHERE il.\"origin\" = 'c' ORDER BY il.\"name\""
        ),
        // SQLite does not keep constraint names
        Catalog::ForeignKeys(table) => fmt!(
            f,
            "SELECT NULL, \"from\", \"table\", \"to\", \"on_update\", \"on_delete\""
            " FROM pragma_foreign_key_list(" Param(&Value::from(table)) ") ORDER BY \"id\", \"seq\""
        ),
    }
}

fn postgresql<P: Params>(catalog: &Catalog, f: &mut Formatter<'_, P>) {
    match catalog {
        Catalog::Tables => fmt!(
            f,
            "SELECT table_name::text FROM information_schema.tables"
            " WHERE table_schema = current_schema() AND table_type = 'BASE TABLE'"
            " AND table_name <> '" OPTIONS_TABLE "' ORDER BY table_name"
        ),
        Catalog::Columns(table) => fmt!(
            f,
            "SELECT a.attname::text, format_type(a.atttypid, a.atttypmod), a.attnotnull,"
            " EXISTS (SELECT 1 FROM pg_index i WHERE i.indrelid = a.attrelid AND i.indisprimary"
            " AND a.attnum = ANY(i.indkey))"
            " FROM pg_attribute a WHERE a.attrelid = to_regclass(quote_ident("
            Param(&Value::from(table)) "))"
            " AND a.attnum > 0 AND NOT a.attisdropped ORDER BY a.attnum"
        ),
        Catalog::Indices(table) => fmt!(
            f,
            "SELECT ic.relname::text, ix.indisunique,"
            " array_to_json(ARRAY(SELECT a.attname::text FROM unnest(ix.indkey) WITH ORDINALITY AS k(attnum, ord)"
            " JOIN pg_attribute a ON a.attrelid = ix.indrelid AND a.attnum = k.attnum ORDER BY k.ord))::text"
            " FROM pg_index ix JOIN pg_class ic ON ic.oid = ix.indexrelid"
            " WHERE ix.indrelid = to_regclass(quote_ident(" Param(&Value::from(table)) "))"
            " AND NOT ix.indisprimary ORDER BY ic.relname"
        ),
        Catalog::ForeignKeys(table) => fmt!(
            f,
            "SELECT c.conname::text, a.attname::text, ft.relname::text, fa.attname::text,"
            " c.confupdtype::text, c.confdeltype::text FROM pg_constraint c"
            " JOIN pg_attribute a ON a.attrelid = c.conrelid AND a.attnum = c.conkey[1]"
            " JOIN pg_class ft ON ft.oid = c.confrelid"
            " JOIN pg_attribute fa ON fa.attrelid = c.confrelid AND fa.attnum = c.confkey[1]"
            " WHERE c.contype = 'f' AND c.conrelid = to_regclass(quote_ident("
            Param(&Value::from(table)) ")) ORDER BY c.conname"
        ),
    }
}
