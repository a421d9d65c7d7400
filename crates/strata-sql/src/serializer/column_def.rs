use super::{Formatter, Ident, Literal, Params, ToSql};

use crate::stmt::ColumnDef;

impl ToSql for &ColumnDef {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let name = Ident(&self.name);

        if self.primary_key && self.auto_increment {
            // An INTEGER PRIMARY KEY column aliases the SQLite rowid
            if f.serializer.is_postgresql() {
                fmt!(f, name " BIGINT GENERATED BY DEFAULT AS IDENTITY PRIMARY KEY");
            } else {
                fmt!(f, name " INTEGER PRIMARY KEY");
            }
            return;
        }

        let ty = &self.ty;
        fmt!(f, name " " ty);

        if self.primary_key {
            fmt!(f, " PRIMARY KEY");
        } else if !self.nullable {
            fmt!(f, " NOT NULL");
        }

        if let Some(default) = &self.default {
            fmt!(f, " DEFAULT " Literal(default));
        }
    }
}
