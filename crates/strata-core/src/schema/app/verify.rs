use super::{Collection, FieldKind, Registry, Stage, PRIMARY_KEY};
use crate::{
    schema::db::{ForeignKeyAction, OPTIONS_TABLE},
    Error, Result,
};

use indexmap::IndexMap;
use std::collections::HashSet;

/// Checks the declared collections, normalizing default values in place.
pub(super) fn verify(
    collections: &mut IndexMap<String, Collection>,
    field_types: &Registry,
) -> Result<()> {
    let mut names = HashSet::new();

    for collection in collections.values() {
        verify_name("collection key", &collection.key)?;
        verify_name("table name", &collection.name)?;

        if collection.name.eq_ignore_ascii_case(OPTIONS_TABLE)
            || collection.name.starts_with("sqlite_")
        {
            return Err(Error::invalid_schema(format!(
                "table name `{}` is reserved",
                collection.name
            )));
        }

        if !names.insert(collection.name.clone()) {
            return Err(Error::invalid_schema(format!(
                "table name `{}` is used by more than one collection",
                collection.name
            )));
        }

        if let Some(name) = collection.duplicate_fields.first() {
            return Err(Error::invalid_schema(format!(
                "field `{}.{name}` is declared more than once",
                collection.key
            )));
        }
    }

    for collection in collections.values() {
        verify_fields(collection)?;
        verify_indices(collection)?;
        verify_foreign_keys(collection, collections)?;
    }

    for collection in collections.values_mut() {
        let key = collection.key.clone();
        for field in collection.fields.values_mut() {
            let Some(default) = field.default.take() else {
                continue;
            };

            let ty = field_types.get(field.kind);
            let default = ty.sanitize(field, default);
            if !default.is_null() {
                ty.validate(field, &default).map_err(|reason| {
                    Error::invalid_schema(format!(
                        "default of `{key}.{}` is invalid: {reason}",
                        field.name
                    ))
                })?;
            } else if !field.nullable {
                return Err(Error::invalid_schema(format!(
                    "default of non-null field `{key}.{}` is null",
                    field.name
                )));
            }
            field.default = Some(default);
        }
    }

    // Populating a new record must be possible without caller input for
    // every auto field.
    for collection in collections.values() {
        for field in collection.fields.values() {
            if field.auto.is_some() {
                let populated = field_types
                    .get(field.kind)
                    .populate(field, None, Stage::Insert);
                if populated.is_none() {
                    return Err(Error::invalid_schema(format!(
                        "auto field `{}.{}` produced no value",
                        collection.key, field.name
                    )));
                }
            }
        }
    }

    Ok(())
}

fn verify_name(what: &str, name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_schema(format!("{what} must not be empty")));
    }
    if name.starts_with('_') {
        return Err(Error::invalid_schema(format!(
            "{what} `{name}` is reserved; names starting with `_` are internal"
        )));
    }
    Ok(())
}

fn verify_fields(collection: &Collection) -> Result<()> {
    for field in collection.fields.values() {
        verify_name("field name", &field.name)?;

        if field.name == PRIMARY_KEY {
            return Err(Error::invalid_schema(format!(
                "`{}` declares a field named `{PRIMARY_KEY}`; the primary key is implicit",
                collection.key
            )));
        }

        if field.auto.is_some() && field.kind != FieldKind::DateTime {
            return Err(Error::invalid_schema(format!(
                "auto field `{}.{}` must be a datetime",
                collection.key, field.name
            )));
        }

        if let Some(from) = &field.renamed_from {
            if collection.fields.contains_key(from) {
                return Err(Error::invalid_schema(format!(
                    "`{}.{}` is renamed from `{from}`, which is still declared",
                    collection.key, field.name
                )));
            }
        }
    }
    Ok(())
}

fn verify_indices(collection: &Collection) -> Result<()> {
    for index in &collection.indices {
        if index.fields.is_empty() {
            return Err(Error::invalid_schema(format!(
                "index on `{}` has no fields",
                collection.key
            )));
        }

        for name in &index.fields {
            if collection.kind_of(name).is_none() {
                return Err(Error::invalid_schema(format!(
                    "index on `{}` references unknown field `{name}`",
                    collection.key
                )));
            }
        }
    }
    Ok(())
}

fn verify_foreign_keys(
    collection: &Collection,
    collections: &IndexMap<String, Collection>,
) -> Result<()> {
    let mut seen = HashSet::new();

    for fk in &collection.foreign_keys {
        let Some(field) = collection.find_field(&fk.field) else {
            return Err(Error::invalid_schema(format!(
                "foreign key on `{}` references unknown field `{}`",
                collection.key, fk.field
            )));
        };

        if !seen.insert(&fk.field) {
            return Err(Error::invalid_schema(format!(
                "field `{}.{}` has more than one foreign key",
                collection.key, fk.field
            )));
        }

        let Some(target) = collections.get(&fk.references) else {
            return Err(Error::invalid_schema(format!(
                "foreign key `{}.{}` references unknown collection `{}`",
                collection.key, fk.field, fk.references
            )));
        };

        let Some(target_kind) = target.kind_of(&fk.references_field) else {
            return Err(Error::invalid_schema(format!(
                "foreign key `{}.{}` references unknown field `{}.{}`",
                collection.key, fk.field, fk.references, fk.references_field
            )));
        };

        if field.kind != target_kind {
            return Err(Error::invalid_schema(format!(
                "foreign key `{}.{}` is {} but `{}.{}` is {}",
                collection.key,
                fk.field,
                field.kind.name(),
                fk.references,
                fk.references_field,
                target_kind.name()
            )));
        }

        let sets_null = fk.on_delete == ForeignKeyAction::SetNull
            || fk.on_update == ForeignKeyAction::SetNull;
        if sets_null && !field.nullable {
            return Err(Error::invalid_schema(format!(
                "foreign key `{}.{}` sets null but the field is not nullable",
                collection.key, fk.field
            )));
        }
    }
    Ok(())
}
