use crate::{db::Session, Result};

use strata_core::{
    schema::{
        app::PRIMARY_KEY,
        db::{naming, Column, ForeignKey, ForeignKeyAction, Index, Schema, Table, Type},
    },
    stmt::Value,
    Error,
};
use strata_sql::Statement;

/// Reads the physical schema. The options table and the database's own
/// tables are never part of it, nor are indices backing the primary key.
pub(crate) async fn introspect(session: &mut Session<'_>) -> Result<Schema> {
    let tables = session
        .query(&Statement::list_tables())
        .await
        .map_err(|err| err.context("failed to list tables"))?;

    let mut schema = Schema::default();

    for row in &tables.rows {
        let name = text(row, 0)?;
        let table = table(session, name)
            .await
            .map_err(|err| err.context(format!("failed to introspect table `{name}`")))?;
        schema.tables.push(table);
    }

    Ok(schema)
}

async fn table(session: &mut Session<'_>, name: &str) -> Result<Table> {
    let mut table = Table::new(name);

    for row in session.query(&Statement::list_columns(name)).await?.rows {
        let primary_key = flag(&row, 3)?;
        let storage_ty = Type::from_sql_name(text(&row, 1)?);

        table.columns.push(Column {
            name: text(&row, 0)?.to_string(),
            auto_increment: primary_key && storage_ty == Type::Integer,
            storage_ty,
            // SQLite reports primary keys as nullable
            nullable: !flag(&row, 2)? && !primary_key,
            primary_key,
            default: None,
        });
    }

    for row in session.query(&Statement::list_indices(name)).await?.rows {
        let columns: Vec<String> = serde_json::from_str(text(&row, 2)?)
            .map_err(|err| Error::from(err).context("malformed index column list"))?;

        table.indices.push(Index {
            name: text(&row, 0)?.to_string(),
            columns,
            unique: flag(&row, 1)?,
        });
    }

    for row in session.query(&Statement::list_foreign_keys(name)).await?.rows {
        let column = text(&row, 1)?.to_string();

        table.foreign_keys.push(ForeignKey {
            name: match optional_text(&row, 0)? {
                Some(name) => name.to_string(),
                None => naming::foreign_key_name(name, &column),
            },
            references_table: text(&row, 2)?.to_string(),
            references_column: optional_text(&row, 3)?
                .unwrap_or(PRIMARY_KEY)
                .to_string(),
            on_update: action(&row, 4)?,
            on_delete: action(&row, 5)?,
            column,
        });
    }

    Ok(table)
}

fn cell(row: &[Value], index: usize) -> Result<&Value> {
    row.get(index)
        .ok_or_else(|| strata_core::err!("catalog row has no column {index}: {row:?}"))
}

fn text(row: &[Value], index: usize) -> Result<&str> {
    optional_text(row, index)?
        .ok_or_else(|| strata_core::err!("catalog column {index} is null: {row:?}"))
}

fn optional_text(row: &[Value], index: usize) -> Result<Option<&str>> {
    match cell(row, index)? {
        Value::Null => Ok(None),
        Value::String(value) => Ok(Some(value)),
        value => Err(strata_core::err!(
            "expected text in catalog column {index}, got {}",
            value.type_name()
        )),
    }
}

fn flag(row: &[Value], index: usize) -> Result<bool> {
    let value = cell(row, index)?;
    value.to_bool().ok_or_else(|| {
        strata_core::err!(
            "expected a flag in catalog column {index}, got {}",
            value.type_name()
        )
    })
}

fn action(row: &[Value], index: usize) -> Result<ForeignKeyAction> {
    let name = text(row, index)?;
    ForeignKeyAction::from_sql(name)
        .ok_or_else(|| strata_core::err!("unknown foreign key action `{name}`"))
}
