use super::{connect, Db};
use crate::{Config, Result};

use strata_core::{driver::Driver, schema::app};

/// Assembles a [`Db`] from a configuration, a declared schema and, unless
/// the configured URL selects one, a driver.
#[derive(Default)]
pub struct Builder {
    config: Config,
    schema: Option<app::Schema>,
    driver: Option<Box<dyn Driver>>,
}

impl Builder {
    pub fn config(&mut self, config: Config) -> &mut Self {
        self.config = config;
        self
    }

    /// Sets the database URL, keeping the rest of the configuration.
    pub fn url(&mut self, url: impl Into<String>) -> &mut Self {
        self.config.url = Some(url.into());
        self
    }

    pub fn schema(&mut self, schema: app::Schema) -> &mut Self {
        self.schema = Some(schema);
        self
    }

    /// Uses `driver` instead of the one the configured URL selects.
    pub fn driver(&mut self, driver: impl Driver) -> &mut Self {
        self.driver = Some(Box::new(driver));
        self
    }

    /// Connects through a pre-bound serverless client handle.
    #[cfg(feature = "serverless")]
    pub fn serverless(
        &mut self,
        name: impl Into<String>,
        client: impl strata_driver_serverless::ServerlessClient,
    ) -> &mut Self {
        self.driver(strata_driver_serverless::Serverless::new(name, client))
    }

    /// Validates the configuration and resolves the driver. No I/O happens
    /// until [`Db::connect`].
    pub fn build(&mut self) -> Result<Db> {
        self.config.validate()?;

        let driver = match self.driver.take() {
            Some(driver) => driver,
            None => connect::driver_for(&self.config)?,
        };

        let schema = match self.schema.take() {
            Some(schema) => schema,
            None => app::Schema::builder().build()?,
        };

        Ok(Db::new(driver, schema, self.config.clone()))
    }
}

impl std::fmt::Debug for Builder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Builder")
            .field("config", &self.config)
            .field("schema", &self.schema)
            .field("driver", &self.driver)
            .finish()
    }
}
