use super::{Flavor, Formatter, ToSql};

use strata_core::stmt::Value;

/// Collects the values bound to a statement's placeholders.
pub trait Params {
    fn push(&mut self, param: &Value) -> Placeholder;
}

/// One-based position of a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placeholder(pub usize);

impl Params for Vec<Value> {
    fn push(&mut self, value: &Value) -> Placeholder {
        Vec::push(self, value.clone());
        Placeholder(self.len())
    }
}

impl ToSql for Placeholder {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let prefix = match f.serializer.flavor {
            Flavor::Sqlite => ":p",
            Flavor::Postgresql => "$",
            Flavor::Serverless => "?",
        };
        f.dst.push_str(prefix);
        f.dst.push_str(&self.0.to_string());
    }
}

/// A value bound as a parameter.
pub(super) struct Param<'a>(pub(super) &'a Value);

impl ToSql for Param<'_> {
    fn to_sql<P: Params>(self, f: &mut Formatter<'_, P>) {
        let placeholder = f.params.push(self.0);
        fmt!(f, placeholder);
    }
}
