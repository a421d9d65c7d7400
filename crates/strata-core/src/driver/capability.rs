use crate::schema::db;

#[derive(Debug)]
pub struct Capability {
    /// SQL dialect and placeholder convention spoken by the driver.
    pub flavor: Flavor,

    /// When false, statements cannot be grouped into a transaction and
    /// migrations are applied one statement at a time.
    pub transactions: bool,

    /// When false, constraints cannot be added to or dropped from an existing
    /// table. Changing a table's foreign keys requires rebuilding the table.
    pub alter_constraints: bool,

    /// Column storage types used by the database
    pub storage_types: StorageTypes,
}

/// The SQL flavors strata can serialize to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flavor {
    /// SQLite with named `:pN` placeholders.
    Sqlite,

    /// PostgreSQL with positional `$N` placeholders.
    Postgresql,

    /// SQLite-compatible serverless binding with positional `?N`
    /// placeholders.
    Serverless,
}

#[derive(Debug)]
pub struct StorageTypes {
    /// The default storage type for a string.
    pub default_string_type: db::Type,

    /// When `Some` the database supports varchar types with the specified upper
    /// limit.
    pub varchar: Option<u64>,

    /// Storage type for booleans.
    pub boolean: db::Type,

    /// Storage type for instants in time.
    pub date_time: db::Type,

    /// Storage type for JSON documents and arrays.
    pub json: db::Type,
}

impl Capability {
    /// SQLite capabilities.
    pub const SQLITE: Self = Self {
        flavor: Flavor::Sqlite,
        transactions: true,
        alter_constraints: false,
        storage_types: StorageTypes::SQLITE,
    };

    /// PostgreSQL capabilities
    pub const POSTGRESQL: Self = Self {
        flavor: Flavor::Postgresql,
        alter_constraints: true,
        storage_types: StorageTypes::POSTGRESQL,
        ..Self::SQLITE
    };

    /// Serverless SQLite capabilities. The binding cannot hold a transaction
    /// open across requests.
    pub const SERVERLESS: Self = Self {
        flavor: Flavor::Serverless,
        transactions: false,
        ..Self::SQLITE
    };

    /// Returns `true` for SQLite and SQLite-compatible backends.
    pub fn is_sqlite_family(&self) -> bool {
        matches!(self.flavor, Flavor::Sqlite | Flavor::Serverless)
    }
}

impl StorageTypes {
    /// SQLite storage types
    pub const SQLITE: StorageTypes = StorageTypes {
        default_string_type: db::Type::Text,

        // SQLite ignores the length in VARCHAR(N); only SQLITE_MAX_LENGTH
        // bounds a string.
        varchar: Some(1_000_000_000),

        // No native boolean, datetime or JSON types. Booleans are 0/1,
        // datetimes RFC 3339 text and JSON is stored as text.
        boolean: db::Type::Integer,
        date_time: db::Type::Text,
        json: db::Type::Text,
    };

    pub const POSTGRESQL: StorageTypes = StorageTypes {
        default_string_type: db::Type::Text,

        // The maximum n you can specify is 10 485 760 characters.
        varchar: Some(10_485_760),

        boolean: db::Type::Boolean,
        date_time: db::Type::Timestamp,
        json: db::Type::Json,
    };
}
