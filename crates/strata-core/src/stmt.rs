mod condition;
pub use condition::{Condition, ConditionError, FieldCondition, Operator};

mod delete;
pub use delete::Delete;

mod filter;
pub use filter::Filter;

mod insert;
pub use insert::Insert;

mod order_by;
pub use order_by::{Direction, OrderBy};

pub mod query_string;

mod raw;
pub use raw::placeholder_positions;

mod record;
pub use record::Record;

mod select;
pub use select::Select;

mod update;
pub use update::Update;

mod validation;
pub use validation::ValidationErrors;

mod value;
pub use value::Value;

mod value_json;
