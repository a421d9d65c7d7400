use super::{Comma, Delimited, Formatter, Ident, Param, Params, ToSql};

use crate::stmt::{self, ForeignKeyDef, Statement};

use strata_core::stmt::{Direction, Filter, OrderBy};

impl ToSql for &Statement {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        match self {
            Statement::AddColumn(stmt) => stmt.to_sql(f),
            Statement::AddForeignKey(stmt) => stmt.to_sql(f),
            Statement::Catalog(stmt) => stmt.to_sql(f),
            Statement::CopyTable(stmt) => stmt.to_sql(f),
            Statement::Count(stmt) => stmt.to_sql(f),
            Statement::CreateIndex(stmt) => stmt.to_sql(f),
            Statement::CreateTable(stmt) => stmt.to_sql(f),
            Statement::Delete(stmt) => stmt.to_sql(f),
            Statement::DropColumn(stmt) => stmt.to_sql(f),
            Statement::DropForeignKey(stmt) => stmt.to_sql(f),
            Statement::DropIndex(stmt) => stmt.to_sql(f),
            Statement::DropTable(stmt) => stmt.to_sql(f),
            Statement::Insert(stmt) => stmt.to_sql(f),
            Statement::Options(stmt) => stmt.to_sql(f),
            Statement::Pragma(stmt) => stmt.to_sql(f),
            Statement::RenameColumn(stmt) => stmt.to_sql(f),
            Statement::RenameTable(stmt) => stmt.to_sql(f),
            Statement::Select(stmt) => stmt.to_sql(f),
            Statement::Update(stmt) => stmt.to_sql(f),
        }
    }
}

struct ColumnsWithConstraints<'a>(&'a stmt::CreateTable);

impl ToSql for ColumnsWithConstraints<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let mut s = "";
        for column in &self.0.columns {
            fmt!(f, s "\n    " column);
            s = ",";
        }

        for foreign_key in &self.0.foreign_keys {
            fmt!(f, s "\n    CONSTRAINT " Ident(&foreign_key.name) " " foreign_key);
            s = ",";
        }

        fmt!(f, "\n");
    }
}

/// `FOREIGN KEY (..) REFERENCES .. (..) ON DELETE .. ON UPDATE ..`
impl ToSql for &ForeignKeyDef {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(
            f,
            "FOREIGN KEY (" Ident(&self.column) ") REFERENCES " Ident(&self.references_table)
            " (" Ident(&self.references_column) ") ON DELETE " self.on_delete.as_sql()
            " ON UPDATE " self.on_update.as_sql()
        );
    }
}

impl ToSql for &stmt::CreateTable {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "CREATE TABLE " Ident(&self.name) " (" ColumnsWithConstraints(self) ")");
    }
}

impl ToSql for &stmt::DropTable {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let if_exists = if self.if_exists { "IF EXISTS " } else { "" };
        fmt!(f, "DROP TABLE " if_exists Ident(&self.name));
    }
}

impl ToSql for &stmt::RenameTable {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "ALTER TABLE " Ident(&self.from) " RENAME TO " Ident(&self.to));
    }
}

impl ToSql for &stmt::AddColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let column = &self.column;
        fmt!(f, "ALTER TABLE " Ident(&self.table) " ADD COLUMN " column);
    }
}

impl ToSql for &stmt::DropColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "ALTER TABLE " Ident(&self.table) " DROP COLUMN " Ident(&self.name));
    }
}

impl ToSql for &stmt::RenameColumn {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(
            f,
            "ALTER TABLE " Ident(&self.table) " RENAME COLUMN " Ident(&self.from) " TO " Ident(&self.to)
        );
    }
}

impl ToSql for &stmt::CreateIndex {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let unique = if self.unique { "UNIQUE " } else { "" };
        let columns = Comma(self.columns.iter().map(Ident));
        fmt!(
            f,
            "CREATE " unique "INDEX " Ident(&self.name) " ON " Ident(&self.on) " (" columns ")"
        );
    }
}

impl ToSql for &stmt::DropIndex {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "DROP INDEX " Ident(&self.name));
    }
}

impl ToSql for &stmt::AddForeignKey {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let foreign_key = &self.foreign_key;
        fmt!(
            f,
            "ALTER TABLE " Ident(&self.table) " ADD CONSTRAINT " Ident(&foreign_key.name) " " foreign_key
        );
    }
}

impl ToSql for &stmt::DropForeignKey {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "ALTER TABLE " Ident(&self.table) " DROP CONSTRAINT " Ident(&self.name));
    }
}

impl ToSql for &stmt::CopyTable {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let target_columns = Comma(self.columns.iter().map(|(target, _)| Ident(target)));
        let source_columns = Comma(self.columns.iter().map(|(_, source)| Ident(source)));
        fmt!(
            f,
            "INSERT INTO " Ident(&self.target) " (" target_columns ") SELECT " source_columns
            " FROM " Ident(&self.source)
        );
    }
}

impl ToSql for &stmt::Pragma {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "PRAGMA " self.name.as_str());
        if let Some(value) = &self.value {
            fmt!(f, " = " value);
        }
    }
}

/// ` WHERE ..`, omitted for empty filters
struct Where<'a>(&'a Filter);

impl ToSql for Where<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        if self.0.is_empty() {
            return;
        }
        fmt!(f, " WHERE " Delimited(self.0.conditions(), " AND "));
    }
}

impl ToSql for &OrderBy {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let direction = match self.direction {
            Direction::Asc => " ASC",
            Direction::Desc => " DESC",
        };
        fmt!(f, Ident(&self.field) direction);
    }
}

impl ToSql for &stmt::Select {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "SELECT ");
        if self.columns.is_empty() {
            fmt!(f, "*");
        } else {
            fmt!(f, Comma(self.columns.iter().map(Ident)));
        }
        fmt!(f, " FROM " Ident(&self.table) Where(&self.filter));

        if !self.order_by.is_empty() {
            fmt!(f, " ORDER BY " Comma(&self.order_by));
        }

        match (self.limit, self.offset) {
            (Some(limit), _) => fmt!(f, " LIMIT " limit),
            // SQLite only accepts OFFSET after a LIMIT
            (None, Some(_)) if f.serializer.is_sqlite_family() => fmt!(f, " LIMIT -1"),
            (None, _) => {}
        }

        if let Some(offset) = self.offset {
            fmt!(f, " OFFSET " offset);
        }
    }
}

impl ToSql for &stmt::Count {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "SELECT COUNT(*) FROM " Ident(&self.table) Where(&self.filter));
    }
}

impl ToSql for &stmt::Insert {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "INSERT INTO " Ident(&self.table));

        if self.columns.is_empty() {
            fmt!(f, " DEFAULT VALUES");
        } else {
            let columns = Comma(self.columns.iter().map(Ident));
            let values = Comma(self.values.iter().map(Param));
            fmt!(f, " (" columns ") VALUES (" values ")");
        }

        if let Some(returning) = &self.returning {
            fmt!(f, " RETURNING " Ident(returning));
        }
    }
}

struct Assignment<'a>(&'a (String, strata_core::stmt::Value));

impl ToSql for Assignment<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let (column, value) = self.0;
        fmt!(f, Ident(column) " = " Param(value));
    }
}

impl ToSql for &stmt::Update {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let assignments = Comma(self.assignments.iter().map(Assignment));
        fmt!(
            f,
            "UPDATE " Ident(&self.table) " SET " assignments Where(&self.filter)
        );
    }
}

impl ToSql for &stmt::Delete {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        fmt!(f, "DELETE FROM " Ident(&self.table) Where(&self.filter));
    }
}
