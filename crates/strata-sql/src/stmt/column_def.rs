use strata_core::{
    schema::db::{Column, Type},
    stmt::Value,
};

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    /// Name of the column
    pub name: String,

    /// Storage type
    pub ty: Type,

    pub nullable: bool,

    pub primary_key: bool,

    /// Database-assigned integer key
    pub auto_increment: bool,

    pub default: Option<Value>,
}

impl ColumnDef {
    pub fn from_schema(column: &Column) -> ColumnDef {
        ColumnDef {
            name: column.name.clone(),
            ty: column.storage_ty.clone(),
            nullable: column.nullable,
            primary_key: column.primary_key,
            auto_increment: column.auto_increment,
            default: column.default.clone(),
        }
    }
}
