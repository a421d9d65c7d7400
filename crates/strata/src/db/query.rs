//! Validated reads and writes of collection records.
//!
//! Every request is checked against the declared collection before any SQL
//! is rendered: unknown fields, operators the field kind does not support
//! and values rejected by the field pipeline never reach the database.

use super::{Db, Session};
use crate::Result;

use std::collections::{BTreeMap, HashMap};
use strata_core::{
    driver::{operation::Transaction, ResultSet},
    schema::app::{Collection, Registry, Stage, PRIMARY_KEY},
    stmt::{Condition, Delete, Filter, Insert, Record, Select, Update, ValidationErrors, Value},
    Error,
};
use strata_sql::Statement;

/// Result of [`Db::insert`].
#[derive(Debug, Default, Clone, PartialEq)]
pub struct InsertOutcome {
    /// Rows written, in input order, with their assigned `id` first.
    pub inserted: Vec<Record>,

    /// Rows rejected by validation, by index in the input.
    pub errors: BTreeMap<usize, ValidationErrors>,
}

impl InsertOutcome {
    /// True when every row was inserted.
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn ids(&self) -> Vec<i64> {
        self.inserted
            .iter()
            .filter_map(|record| record.get(PRIMARY_KEY).and_then(Value::as_i64))
            .collect()
    }
}

impl Db {
    /// Reads the records matching `select`.
    ///
    /// With `populate`, each foreign key field holds the referenced record
    /// as a JSON object instead of its key.
    pub async fn select(&self, select: Select) -> Result<Vec<Record>> {
        let collection = self.collection(&select.collection)?;

        let mut errors = ValidationErrors::new();
        for field in select
            .fields
            .iter()
            .chain(select.order_by.iter().map(|order_by| &order_by.field))
        {
            if collection.kind_of(field).is_none() {
                errors.add(field, "unknown field");
            }
        }
        errors.into_result().map_err(Error::validation)?;

        let filter = select
            .filter
            .validate(collection)
            .map_err(Error::invalid_condition)?;

        let mut stmt = Statement::select(&collection.name, filter);
        stmt.columns = select.fields;
        stmt.order_by = select.order_by;
        stmt.limit = select.limit;
        stmt.offset = select.offset;

        let mut session = self.session().await?;
        let rows = session.query(&stmt.into()).await?;
        let mut records = self.cast_rows(collection, rows)?;

        if select.populate {
            self.populate(&mut session, collection, &mut records).await?;
        }

        Ok(records)
    }

    /// Counts the records of `collection` matching `filter`.
    pub async fn count(&self, collection: &str, filter: impl Into<Filter>) -> Result<u64> {
        let collection = self.collection(collection)?;
        let filter = filter
            .into()
            .validate(collection)
            .map_err(Error::invalid_condition)?;

        let mut session = self.session().await?;
        let rows = session
            .query(&Statement::count(&collection.name, filter))
            .await?;

        row_count(&collection.name, rows.first_value().and_then(Value::as_i64))
    }

    /// Validates and writes each record of `insert`.
    ///
    /// Invalid rows are reported in the outcome and skipped; the valid ones
    /// are written, atomically where the backend supports transactions.
    pub async fn insert(&self, insert: Insert) -> Result<InsertOutcome> {
        let collection = self.collection(&insert.collection)?;
        let registry = self.shared.schema.field_types();

        let mut outcome = InsertOutcome::default();
        let mut rows = vec![];

        for (index, record) in insert.values.into_iter().enumerate() {
            match prepare_insert(collection, registry, record) {
                Ok(record) => rows.push(record),
                Err(errors) => {
                    outcome.errors.insert(index, errors);
                }
            }
        }

        if rows.is_empty() {
            return Ok(outcome);
        }

        let mut session = self.session().await?;
        let atomic = rows.len() > 1 && self.transactions_supported();

        if atomic {
            session.transaction(Transaction::Start).await?;
        }

        match insert_rows(&mut session, &collection.name, rows).await {
            Ok(inserted) => {
                if atomic {
                    session.transaction(Transaction::Commit).await?;
                }
                outcome.inserted = inserted;
                Ok(outcome)
            }
            Err(err) => {
                if atomic {
                    session.rollback().await;
                }
                Err(err)
            }
        }
    }

    /// Applies the assignments of `update` to the matching records and
    /// returns how many changed.
    pub async fn update(&self, update: Update) -> Result<u64> {
        let collection = self.collection(&update.collection)?;
        let filter = update
            .filter
            .validate(collection)
            .map_err(Error::invalid_condition)?;
        let set = prepare_update(collection, self.shared.schema.field_types(), update.set)
            .map_err(Error::validation)?;

        if set.is_empty() {
            return Ok(0);
        }

        let mut session = self.session().await?;
        session
            .execute(&Statement::update(&collection.name, &set, filter))
            .await
    }

    /// Removes the matching records and returns how many were removed.
    pub async fn delete(&self, delete: Delete) -> Result<u64> {
        let collection = self.collection(&delete.collection)?;
        let filter = delete
            .filter
            .validate(collection)
            .map_err(Error::invalid_condition)?;

        let mut session = self.session().await?;
        session
            .execute(&Statement::delete(&collection.name, filter))
            .await
    }

    fn collection(&self, key: &str) -> Result<&Collection> {
        self.shared
            .schema
            .collection(key)
            .ok_or_else(|| Error::invalid_schema(format!("unknown collection `{key}`")))
    }

    /// Converts stored values into their field representation.
    fn cast_rows(&self, collection: &Collection, rows: ResultSet) -> Result<Vec<Record>> {
        let registry = self.shared.schema.field_types();

        rows.into_records()
            .into_iter()
            .map(|record| {
                record
                    .into_iter()
                    .map(|(name, value)| {
                        let value = match collection.find_field(&name) {
                            Some(field) => registry.cast(field, value)?,
                            None => value,
                        };
                        Ok((name, value))
                    })
                    .collect()
            })
            .collect()
    }

    /// Replaces foreign key values with the referenced records, one query
    /// per referenced collection and key field.
    async fn populate(
        &self,
        session: &mut Session<'_>,
        collection: &Collection,
        records: &mut [Record],
    ) -> Result<()> {
        let mut targets: Vec<(&str, &str, Vec<&str>)> = vec![];
        for fk in &collection.foreign_keys {
            let target = (fk.references.as_str(), fk.references_field.as_str());
            match targets.iter_mut().find(|(key, field, _)| (*key, *field) == target) {
                Some((_, _, fields)) => fields.push(&fk.field),
                None => targets.push((target.0, target.1, vec![&fk.field])),
            }
        }

        for (key, references_field, fields) in targets {
            let mut values: Vec<Value> = vec![];
            for record in records.iter() {
                for field in &fields {
                    match record.get(field) {
                        Some(value) if !value.is_null() && !values.contains(value) => {
                            values.push(value.clone());
                        }
                        _ => {}
                    }
                }
            }

            if values.is_empty() {
                continue;
            }

            let target = self.collection(key)?;
            let filter = Filter::from(Condition::field(references_field).in_list(values));
            let rows = session
                .query(&Statement::select(&target.name, filter).into())
                .await?;

            let referenced: HashMap<String, serde_json::Value> = self
                .cast_rows(target, rows)?
                .into_iter()
                .filter_map(|record| {
                    let key = record.get(references_field)?.to_string();
                    Some((key, record.to_json()))
                })
                .collect();

            for record in records.iter_mut() {
                for field in &fields {
                    if let Some(value) = record.get_mut(field) {
                        if let Some(json) = referenced.get(&value.to_string()) {
                            *value = Value::Json(json.clone());
                        }
                    }
                }
            }
        }

        Ok(())
    }
}

fn prepare_insert(
    collection: &Collection,
    registry: &Registry,
    mut input: Record,
) -> Result<Record, ValidationErrors> {
    let mut errors = unknown_fields(collection, &input);
    let mut record = Record::new();

    for field in collection.fields.values() {
        match registry.prepare(field, input.remove(&field.name), Stage::Insert) {
            Ok(Some(value)) => {
                record.insert(&field.name, value);
            }
            Ok(None) => {}
            Err(message) => errors.add(&field.name, message),
        }
    }

    errors.into_result().map(|()| record)
}

fn prepare_update(
    collection: &Collection,
    registry: &Registry,
    mut input: Record,
) -> Result<Record, ValidationErrors> {
    let mut errors = unknown_fields(collection, &input);
    let mut set = Record::new();

    for field in collection.fields.values() {
        match registry.prepare(field, input.remove(&field.name), Stage::Update) {
            Ok(Some(value)) => {
                set.insert(&field.name, value);
            }
            Ok(None) => {}
            Err(message) => errors.add(&field.name, message),
        }
    }

    errors.into_result().map(|()| set)
}

fn unknown_fields(collection: &Collection, input: &Record) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    for name in input.names() {
        if name == PRIMARY_KEY {
            errors.add(name, "is assigned by the database");
        } else if collection.find_field(name).is_none() {
            errors.add(name, "unknown field");
        }
    }
    errors
}

async fn insert_rows(
    session: &mut Session<'_>,
    table: &str,
    rows: Vec<Record>,
) -> Result<Vec<Record>> {
    let mut inserted = Vec::with_capacity(rows.len());

    for record in rows {
        let rows = session
            .query(&Statement::insert_returning(table, &record, PRIMARY_KEY))
            .await?;
        let id = rows
            .first_value()
            .and_then(Value::as_i64)
            .ok_or_else(|| strata_core::err!("insert into `{table}` returned no id"))?;

        inserted.push(
            std::iter::once((PRIMARY_KEY.to_string(), Value::I64(id)))
                .chain(record)
                .collect(),
        );
    }

    Ok(inserted)
}

fn row_count(table: &str, count: Option<i64>) -> Result<u64> {
    let count = count.ok_or_else(|| strata_core::err!("count of `{table}` returned no value"))?;
    u64::try_from(count).map_err(|_| strata_core::err!("count of `{table}` is negative: {count}"))
}
