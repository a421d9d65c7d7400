use super::{Field, FieldKind, ForeignKey, Index, PRIMARY_KEY};

use indexmap::IndexMap;

/// A named schema unit, stored as one table.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    /// Stable identity. Survives renames of `name`.
    pub key: String,

    /// Name of the table backing the collection.
    pub name: String,

    /// Fields by name, in declaration order. The implicit `id` primary key is
    /// not listed.
    pub fields: IndexMap<String, Field>,

    pub indices: Vec<Index>,

    pub foreign_keys: Vec<ForeignKey>,

    /// Field names declared more than once, reported when the schema is
    /// built.
    pub(crate) duplicate_fields: Vec<String>,
}

impl Collection {
    pub fn new(key: impl Into<String>, name: impl Into<String>) -> Collection {
        Collection {
            key: key.into(),
            name: name.into(),
            fields: IndexMap::new(),
            indices: vec![],
            foreign_keys: vec![],
            duplicate_fields: vec![],
        }
    }

    pub fn field(mut self, field: Field) -> Self {
        let name = field.name.clone();
        if self.fields.insert(name.clone(), field).is_some() {
            self.duplicate_fields.push(name);
        }
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.indices.push(index);
        self
    }

    pub fn foreign_key(mut self, foreign_key: ForeignKey) -> Self {
        self.foreign_keys.push(foreign_key);
        self
    }

    pub fn find_field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    /// The kind of a field, counting the implicit primary key.
    pub fn kind_of(&self, name: &str) -> Option<FieldKind> {
        if name == PRIMARY_KEY {
            return Some(FieldKind::Integer);
        }
        self.fields.get(name).map(|field| field.kind)
    }

    /// The declared foreign key of `field`, if any.
    pub fn foreign_key_of(&self, field: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.field == field)
    }

    /// Every index of the collection: declared indices followed by the
    /// single-field `unique` / `indexed` shorthands.
    pub fn all_indices(&self) -> Vec<Index> {
        let mut indices = self.indices.clone();

        for field in self.fields.values() {
            if field.unique {
                indices.push(Index::new([field.name.clone()]).unique());
            } else if field.indexed {
                indices.push(Index::new([field.name.clone()]));
            }
        }

        let mut seen = vec![];
        indices.retain(|index| {
            if seen.contains(index) {
                false
            } else {
                seen.push(index.clone());
                true
            }
        });
        indices
    }
}
