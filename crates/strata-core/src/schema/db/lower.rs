use super::{naming, Column, ForeignKey, Index, Schema, Table, Type};
use crate::{
    driver::Capability,
    schema::app::{self, PRIMARY_KEY},
    Result,
};

impl Schema {
    /// Lowers the declared model to the tables a backend with `db`
    /// capabilities stores it in.
    pub fn from_app(app: &app::Schema, db: &Capability) -> Result<Schema> {
        let mut tables = vec![];

        for collection in app.collections() {
            tables.push(lower_collection(app, collection, db)?);
        }

        Ok(Schema { tables })
    }
}

fn lower_collection(
    app: &app::Schema,
    collection: &app::Collection,
    db: &Capability,
) -> Result<Table> {
    let mut table = Table::new(&collection.name);

    table.columns.push(Column {
        name: PRIMARY_KEY.to_string(),
        storage_ty: Type::Integer,
        nullable: false,
        primary_key: true,
        auto_increment: true,
        default: None,
    });

    for field in collection.fields.values() {
        let storage_ty = Type::from_app(field, &db.storage_types);
        storage_ty.verify(db)?;

        table.columns.push(Column {
            name: field.name.clone(),
            storage_ty,
            nullable: field.nullable,
            primary_key: false,
            auto_increment: false,
            default: field.column_default(),
        });
    }

    for index in collection.all_indices() {
        table.indices.push(Index {
            name: naming::index_name(&collection.name, &index.fields, index.unique),
            columns: index.fields,
            unique: index.unique,
        });
    }

    for fk in &collection.foreign_keys {
        // Verified when the schema was built
        let Some(target) = app.collection(&fk.references) else {
            continue;
        };

        table.foreign_keys.push(ForeignKey {
            name: naming::foreign_key_name(&collection.name, &fk.field),
            column: fk.field.clone(),
            references_table: target.name.clone(),
            references_column: fk.references_field.clone(),
            on_delete: fk.on_delete,
            on_update: fk.on_update,
        });
    }

    Ok(table)
}
