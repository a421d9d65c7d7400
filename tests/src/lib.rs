#[macro_use]
mod macros;

pub mod db;
mod db_test;
mod isolation;
pub mod prelude;
mod test_driver;

pub use db_test::DbTest;
pub use test_driver::{DriverOp, TestDriver};

use strata::driver::{Capability, Driver};

#[async_trait::async_trait]
pub trait Setup: Send + Sync + 'static {
    /// A driver for this setup's database. Every driver returned by one
    /// setup reaches the same database, so several handles can contend.
    fn driver(&self) -> Box<dyn Driver>;

    fn capability(&self) -> &'static Capability;

    /// How many handles a test may connect at once.
    fn max_connections(&self) -> usize {
        100
    }

    /// Runs once before the test.
    async fn prepare(&self) -> strata::Result<()> {
        Ok(())
    }

    /// Removes what the test left in the database.
    async fn cleanup(&self) -> strata::Result<()> {
        Ok(())
    }
}
