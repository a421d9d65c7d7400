use super::Serializer;

pub use strata_core::driver::Flavor;

use strata_core::driver::Capability;

impl Serializer {
    pub fn new(flavor: Flavor) -> Serializer {
        Serializer { flavor }
    }

    pub fn sqlite() -> Serializer {
        Serializer::new(Flavor::Sqlite)
    }

    pub fn postgresql() -> Serializer {
        Serializer::new(Flavor::Postgresql)
    }

    pub fn serverless() -> Serializer {
        Serializer::new(Flavor::Serverless)
    }

    /// A serializer speaking the flavor of the driver described by
    /// `capability`.
    pub fn for_capability(capability: &Capability) -> Serializer {
        Serializer::new(capability.flavor)
    }

    pub fn flavor(&self) -> Flavor {
        self.flavor
    }

    pub(super) fn is_sqlite_family(&self) -> bool {
        matches!(self.flavor, Flavor::Sqlite | Flavor::Serverless)
    }

    pub(super) fn is_postgresql(&self) -> bool {
        matches!(self.flavor, Flavor::Postgresql)
    }
}
