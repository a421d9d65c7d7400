//! Resolution of declared collections to the physical tables backing them.
//!
//! Collections are identified by key, tables by name. A collection whose
//! name changed still owns the table created under its previous name; the
//! key registry persisted alongside the schema remembers which name that
//! was. The map is rebuilt on every connect from what the database actually
//! contains, so a registered table that was renamed or dropped externally is
//! ignored rather than assumed.

use super::{app, db};

use indexmap::IndexMap;

/// Collection key to table name, as persisted after a successful
/// synchronization.
pub type KeyRegistry = IndexMap<String, String>;

#[derive(Debug, Clone)]
pub struct SchemaMap {
    collections: IndexMap<String, TableMapping>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMapping {
    /// Table name the collection declares.
    pub declared: String,

    /// Table currently backing the collection, if any.
    pub physical: Option<String>,

    /// Declared field name to the column currently storing it. Fields
    /// without a column yet are absent.
    pub columns: IndexMap<String, String>,
}

impl SchemaMap {
    pub fn build(app: &app::Schema, introspected: &db::Schema, registry: &KeyRegistry) -> SchemaMap {
        let mut collections = IndexMap::new();

        for collection in app.collections() {
            let physical = if introspected.table(&collection.name).is_some() {
                Some(collection.name.clone())
            } else {
                registry
                    .get(&collection.key)
                    .filter(|previous| {
                        introspected.table(previous).is_some()
                            // Another collection now declares that name
                            && app.collection_by_name(previous).is_none()
                    })
                    .cloned()
            };

            let mut columns = IndexMap::new();
            if let Some(table) = physical.as_deref().and_then(|name| introspected.table(name)) {
                for field in collection.fields.values() {
                    if table.column(&field.name).is_some() {
                        columns.insert(field.name.clone(), field.name.clone());
                    } else if let Some(previous) = field
                        .renamed_from
                        .as_deref()
                        .filter(|previous| table.column(previous).is_some())
                    {
                        columns.insert(field.name.clone(), previous.to_string());
                    }
                }
            }

            collections.insert(
                collection.key.clone(),
                TableMapping {
                    declared: collection.name.clone(),
                    physical,
                    columns,
                },
            );
        }

        SchemaMap { collections }
    }

    pub fn get(&self, key: &str) -> Option<&TableMapping> {
        self.collections.get(key)
    }

    /// Physical table of the collection `key`.
    pub fn table(&self, key: &str) -> Option<&str> {
        self.get(key)?.physical.as_deref()
    }

    /// Physical column storing `field` of collection `key`.
    pub fn column(&self, key: &str, field: &str) -> Option<&str> {
        if field == app::PRIMARY_KEY {
            return self.table(key).map(|_| app::PRIMARY_KEY);
        }
        self.get(key)?.columns.get(field).map(String::as_str)
    }

    /// True if `table` backs one of the declared collections.
    pub fn is_related(&self, table: &str) -> bool {
        self.collections
            .values()
            .any(|mapping| mapping.physical.as_deref() == Some(table))
    }

    /// Tables of `introspected` no declared collection owns.
    pub fn unrelated_tables<'a>(
        &'a self,
        introspected: &'a db::Schema,
    ) -> impl Iterator<Item = &'a str> + 'a {
        introspected
            .table_names()
            .filter(move |name| !self.is_related(name))
    }

    /// Drops the tables no declared collection owns from `introspected`.
    pub fn retain_related(&self, introspected: &mut db::Schema) {
        introspected.tables.retain(|table| self.is_related(&table.name));
    }

    /// Renames turning the physical schema into the declared one.
    pub fn rename_hints(&self) -> db::RenameHints {
        let mut hints = db::RenameHints::new();

        for mapping in self.collections.values() {
            let Some(physical) = &mapping.physical else {
                continue;
            };

            if *physical != mapping.declared {
                hints.add_table_hint(physical, &mapping.declared);
            }

            for (field, column) in &mapping.columns {
                if field != column {
                    hints.add_column_hint(&mapping.declared, column, field);
                }
            }
        }

        hints
    }

    /// The registry to persist once the declared schema is in place.
    pub fn declared_registry(&self) -> KeyRegistry {
        self.collections
            .iter()
            .map(|(key, mapping)| (key.clone(), mapping.declared.clone()))
            .collect()
    }
}
