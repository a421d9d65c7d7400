use super::Value;

use std::fmt;

/// Comparison operators available to conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    In,
    NotIn,
    Between,
    NotBetween,
    Like,
    NotLike,

    /// The array contains the element.
    Includes,

    /// The array does not contain the element.
    Excludes,

    /// The array contains at least one of the elements.
    IncludesAny,

    /// The array contains none of the elements.
    ExcludesAny,
}

/// A filter predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field <op> value`
    Compare {
        field: String,
        op: Operator,
        value: Value,
    },

    /// Groups joined with OR. The conditions inside a group are joined with
    /// AND.
    Or(Vec<Vec<Condition>>),

    /// A SQL fragment with `?` markers bound to `params` in order.
    Raw { sql: String, params: Vec<Value> },
}

/// Builds comparisons against one field.
#[derive(Debug, Clone)]
pub struct FieldCondition {
    field: String,
}

/// Why a condition leaf was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConditionError {
    field: String,
    op: Option<Operator>,
    reason: String,
}

impl Operator {
    pub const ALL: [Operator; 16] = [
        Operator::Eq,
        Operator::Ne,
        Operator::Lt,
        Operator::Le,
        Operator::Gt,
        Operator::Ge,
        Operator::In,
        Operator::NotIn,
        Operator::Between,
        Operator::NotBetween,
        Operator::Like,
        Operator::NotLike,
        Operator::Includes,
        Operator::Excludes,
        Operator::IncludesAny,
        Operator::ExcludesAny,
    ];

    /// Name used in encoded conditions.
    pub fn name(self) -> &'static str {
        match self {
            Operator::Eq => "eq",
            Operator::Ne => "ne",
            Operator::Lt => "lt",
            Operator::Le => "lte",
            Operator::Gt => "gt",
            Operator::Ge => "gte",
            Operator::In => "in",
            Operator::NotIn => "notIn",
            Operator::Between => "between",
            Operator::NotBetween => "notBetween",
            Operator::Like => "like",
            Operator::NotLike => "notLike",
            Operator::Includes => "includes",
            Operator::Excludes => "excludes",
            Operator::IncludesAny => "includesAny",
            Operator::ExcludesAny => "excludesAny",
        }
    }

    pub fn from_name(name: &str) -> Option<Operator> {
        Operator::ALL.into_iter().find(|op| op.name() == name)
    }

    /// Operators taking a list of operands.
    pub fn takes_list(self) -> bool {
        matches!(
            self,
            Operator::In
                | Operator::NotIn
                | Operator::Between
                | Operator::NotBetween
                | Operator::IncludesAny
                | Operator::ExcludesAny
        )
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Condition {
    pub fn field(name: impl Into<String>) -> FieldCondition {
        FieldCondition { field: name.into() }
    }

    /// OR over groups of AND-ed conditions.
    pub fn or<G, C>(groups: G) -> Condition
    where
        G: IntoIterator<Item = C>,
        C: IntoIterator<Item = Condition>,
    {
        Condition::Or(
            groups
                .into_iter()
                .map(|group| group.into_iter().collect())
                .collect(),
        )
    }

    pub fn raw<P>(sql: impl Into<String>, params: P) -> Condition
    where
        P: IntoIterator,
        P::Item: Into<Value>,
    {
        Condition::Raw {
            sql: sql.into(),
            params: params.into_iter().map(Into::into).collect(),
        }
    }
}

impl FieldCondition {
    fn compare(self, op: Operator, value: impl Into<Value>) -> Condition {
        Condition::Compare {
            field: self.field,
            op,
            value: value.into(),
        }
    }

    fn compare_list<I>(self, op: Operator, values: I) -> Condition
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        let values = values.into_iter().map(Into::into).collect();
        self.compare(op, Value::List(values))
    }

    pub fn eq(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Eq, value)
    }

    pub fn ne(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Ne, value)
    }

    pub fn lt(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Lt, value)
    }

    pub fn le(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Le, value)
    }

    pub fn gt(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Gt, value)
    }

    pub fn ge(self, value: impl Into<Value>) -> Condition {
        self.compare(Operator::Ge, value)
    }

    pub fn is_null(self) -> Condition {
        self.compare(Operator::Eq, Value::Null)
    }

    pub fn is_not_null(self) -> Condition {
        self.compare(Operator::Ne, Value::Null)
    }

    pub fn in_list<I>(self, values: I) -> Condition
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.compare_list(Operator::In, values)
    }

    pub fn not_in_list<I>(self, values: I) -> Condition
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.compare_list(Operator::NotIn, values)
    }

    pub fn between(self, low: impl Into<Value>, high: impl Into<Value>) -> Condition {
        self.compare(Operator::Between, Value::List(vec![low.into(), high.into()]))
    }

    pub fn not_between(self, low: impl Into<Value>, high: impl Into<Value>) -> Condition {
        self.compare(
            Operator::NotBetween,
            Value::List(vec![low.into(), high.into()]),
        )
    }

    pub fn like(self, pattern: impl Into<String>) -> Condition {
        self.compare(Operator::Like, Value::String(pattern.into()))
    }

    pub fn not_like(self, pattern: impl Into<String>) -> Condition {
        self.compare(Operator::NotLike, Value::String(pattern.into()))
    }

    pub fn includes(self, element: impl Into<Value>) -> Condition {
        self.compare(Operator::Includes, element)
    }

    pub fn excludes(self, element: impl Into<Value>) -> Condition {
        self.compare(Operator::Excludes, element)
    }

    pub fn includes_any<I>(self, elements: I) -> Condition
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.compare_list(Operator::IncludesAny, elements)
    }

    pub fn excludes_any<I>(self, elements: I) -> Condition
    where
        I: IntoIterator,
        I::Item: Into<Value>,
    {
        self.compare_list(Operator::ExcludesAny, elements)
    }
}

impl ConditionError {
    pub fn new(field: impl Into<String>, op: Option<Operator>, reason: impl Into<String>) -> Self {
        ConditionError {
            field: field.into(),
            op,
            reason: reason.into(),
        }
    }

    /// The field of the rejected leaf. Empty for raw fragments and malformed
    /// groups.
    pub fn field(&self) -> &str {
        &self.field
    }

    pub fn op(&self) -> Option<Operator> {
        self.op
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}

impl fmt::Display for ConditionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.field.is_empty(), self.op) {
            (true, _) => f.write_str(&self.reason),
            (false, Some(op)) => write!(f, "`{}` {op}: {}", self.field, self.reason),
            (false, None) => write!(f, "`{}`: {}", self.field, self.reason),
        }
    }
}

impl std::error::Error for ConditionError {}
