use super::{Db, Session};
use crate::Result;

use serde::{de::DeserializeOwned, Serialize};
use strata_core::{stmt::Value, Error};
use strata_sql::{stmt::OptionsStatement, Statement};

/// SHA-256 fingerprint of the declared schema last synchronized.
pub(crate) const FINGERPRINT: &str = "_schema_fingerprint";

/// Collection key to table name registry, see `SchemaMap`.
pub(crate) const COLLECTIONS: &str = "_collections";

impl Db {
    /// Reads the option `key`, stored as JSON.
    pub async fn get_option<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        check_key(key)?;
        let mut session = self.session().await?;
        let Some(json) = get(&mut session, key).await? else {
            return Ok(None);
        };

        let value = serde_json::from_str(&json)
            .map_err(|err| Error::from(err).context(format!("malformed option `{key}`")))?;
        Ok(Some(value))
    }

    /// Stores `value` as JSON under `key`, replacing the current value.
    pub async fn set_option<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        check_key(key)?;
        let json = serde_json::to_string(value)?;
        let mut session = self.session().await?;
        session.execute(&set(key, json)).await?;
        Ok(())
    }

    /// Removes the option `key`. Returns `true` if it existed.
    pub async fn delete_option(&self, key: &str) -> Result<bool> {
        check_key(key)?;
        let mut session = self.session().await?;
        let removed = session
            .execute(&OptionsStatement::Delete { key: key.to_string() }.into())
            .await?;
        Ok(removed > 0)
    }
}

/// Keys starting with `_` belong to the engine.
fn check_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(strata_core::err!("option key must not be empty"));
    }
    if key.starts_with('_') {
        return Err(Error::invalid_option_key(key));
    }
    Ok(())
}

/// The raw JSON stored under `key`.
pub(crate) async fn get(session: &mut Session<'_>, key: &str) -> Result<Option<String>> {
    let rows = session
        .query(&OptionsStatement::Get { key: key.to_string() }.into())
        .await?;
    Ok(rows.first_value().and_then(Value::as_str).map(str::to_string))
}

pub(crate) fn set(key: &str, json: String) -> Statement {
    OptionsStatement::Set {
        key: key.to_string(),
        value: json,
    }
    .into()
}
