use super::{AutoStrategy, Collection, Field, FieldKind, Registry};
use crate::{schema::db, Result};

use indexmap::IndexMap;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// The validated set of declared collections.
#[derive(Debug, Clone)]
pub struct Schema {
    /// Collections by key, in declaration order.
    collections: IndexMap<String, Collection>,

    field_types: Registry,
}

#[derive(Debug, Default)]
pub struct Builder {
    collections: Vec<Collection>,
    field_types: Registry,
}

impl Schema {
    pub fn builder() -> Builder {
        Builder::default()
    }

    pub fn collection(&self, key: &str) -> Option<&Collection> {
        self.collections.get(key)
    }

    pub fn collections(&self) -> impl ExactSizeIterator<Item = &Collection> + '_ {
        self.collections.values()
    }

    /// Finds a collection by its table name.
    pub fn collection_by_name(&self, name: &str) -> Option<&Collection> {
        self.collections().find(|collection| collection.name == name)
    }

    pub fn field_types(&self) -> &Registry {
        &self.field_types
    }

    /// SHA-256 over the canonical JSON rendering of the declared model, hex
    /// encoded.
    ///
    /// Collections, fields, indices and foreign keys are ordered by name, so
    /// declaration order does not matter. Equal fingerprints mean the physical
    /// schema needs no synchronization.
    pub fn fingerprint(&self) -> Result<String> {
        let mut collections: Vec<_> = self.collections.values().map(CollectionView::new).collect();
        collections.sort_by(|a, b| a.key.cmp(b.key));

        let rendered = serde_json::to_vec(&ModelView {
            version: 1,
            collections,
        })?;

        Ok(Sha256::digest(&rendered)
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect())
    }
}

#[derive(Serialize)]
struct ModelView<'a> {
    version: u32,
    collections: Vec<CollectionView<'a>>,
}

#[derive(Serialize)]
struct CollectionView<'a> {
    key: &'a str,
    name: &'a str,
    fields: Vec<FieldView<'a>>,
    indices: Vec<IndexView<'a>>,
    foreign_keys: Vec<ForeignKeyView<'a>>,
}

#[derive(Serialize)]
struct FieldView<'a> {
    name: &'a str,
    kind: String,
    nullable: bool,
    required: bool,
    default: Option<serde_json::Value>,
    auto: Option<AutoStrategy>,
    storage: Option<&'a db::Type>,
    renamed_from: Option<&'a str>,
    unique: bool,
    indexed: bool,
}

#[derive(Serialize, PartialEq, Eq, PartialOrd, Ord)]
struct IndexView<'a> {
    fields: Vec<&'a str>,
    unique: bool,
}

#[derive(Serialize, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKeyView<'a> {
    field: &'a str,
    references: &'a str,
    references_field: &'a str,
    on_delete: &'static str,
    on_update: &'static str,
}

impl<'a> CollectionView<'a> {
    fn new(collection: &'a Collection) -> CollectionView<'a> {
        let mut fields: Vec<_> = collection.fields.values().map(FieldView::new).collect();
        fields.sort_by(|a, b| a.name.cmp(b.name));

        let mut indices: Vec<_> = collection
            .indices
            .iter()
            .map(|index| IndexView {
                fields: index.fields.iter().map(String::as_str).collect(),
                unique: index.unique,
            })
            .collect();
        indices.sort();

        let mut foreign_keys: Vec<_> = collection
            .foreign_keys
            .iter()
            .map(|fk| ForeignKeyView {
                field: &fk.field,
                references: &fk.references,
                references_field: &fk.references_field,
                on_delete: fk.on_delete.as_sql(),
                on_update: fk.on_update.as_sql(),
            })
            .collect();
        foreign_keys.sort();

        CollectionView {
            key: &collection.key,
            name: &collection.name,
            fields,
            indices,
            foreign_keys,
        }
    }
}

impl<'a> FieldView<'a> {
    fn new(field: &'a Field) -> FieldView<'a> {
        let kind = match field.kind {
            FieldKind::Array(element) => format!("array<{}>", element.name()),
            kind => kind.name().to_string(),
        };

        FieldView {
            name: &field.name,
            kind,
            nullable: field.nullable,
            required: field.required,
            default: field.default.as_ref().map(|value| value.to_tagged_json()),
            auto: field.auto,
            storage: field.storage_ty.as_ref(),
            renamed_from: field.renamed_from.as_deref(),
            unique: field.unique,
            indexed: field.indexed,
        }
    }
}

impl Builder {
    pub fn collection(&mut self, collection: Collection) -> &mut Self {
        self.collections.push(collection);
        self
    }

    /// Replaces the field type registry used to validate defaults and
    /// records.
    pub fn field_types(&mut self, registry: Registry) -> &mut Self {
        self.field_types = registry;
        self
    }

    pub fn build(&self) -> Result<Schema> {
        let mut schema = Schema {
            collections: IndexMap::new(),
            field_types: self.field_types.clone(),
        };

        for collection in &self.collections {
            if schema.collections.contains_key(&collection.key) {
                return Err(crate::Error::invalid_schema(format!(
                    "duplicate collection key `{}`",
                    collection.key
                )));
            }
            schema
                .collections
                .insert(collection.key.clone(), collection.clone());
        }

        super::verify::verify(&mut schema.collections, &schema.field_types)?;
        Ok(schema)
    }
}
