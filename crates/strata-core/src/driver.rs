mod capability;
pub use capability::{Capability, Flavor, StorageTypes};

mod response;
pub use response::{Response, ResultSet, Rows};

pub mod operation;
pub use operation::Operation;

use crate::{async_trait, Result};

use std::{borrow::Cow, fmt::Debug};

#[async_trait]
pub trait Driver: Debug + Send + Sync + 'static {
    /// Returns the URL this driver connects to, for logging.
    fn url(&self) -> Cow<'_, str>;

    /// Describes the driver's capability, which informs the synchronizer and
    /// the SQL serializer.
    fn capability(&self) -> &'static Capability;

    /// Opens a new connection to the database.
    async fn connect(&self) -> Result<Box<dyn Connection>>;
}

#[async_trait]
pub trait Connection: Debug + Send + 'static {
    /// Executes a database operation.
    async fn exec(&mut self, op: Operation) -> Result<Response>;
}
