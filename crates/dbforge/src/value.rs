//! Literal values embedded into compiled statements.
//!
//! [`Value`] is a scalar that a dialect renders as SQL text; [`Operand`] is the
//! right-hand side of a predicate, which may also be a list (`IN`, `BETWEEN`).

use crate::vars::Variables;

/// A scalar value rendered into compiled SQL text.
///
/// Numbers render unquoted, text renders single-quoted with the active
/// dialect's escaping, and [`Value::Raw`] is emitted verbatim.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Text(String),
    /// Raw SQL (column references, function calls).
    ///
    /// **Warning**: This bypasses quoting. Only use with trusted text or text
    /// passed through [`Variables`] filtering.
    Raw(String),
}

impl Value {
    /// Create a raw (unquoted) value.
    pub fn raw(sql: impl Into<String>) -> Self {
        Value::Raw(sql.into())
    }

    /// Returns `true` for values rendered without quotes as numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::UInt(_) | Value::Float(_))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Apply variable substitution to text-bearing values.
    pub(crate) fn substitute(self, vars: &Variables) -> Self {
        match self {
            Value::Text(s) => Value::Text(vars.substitute(&s)),
            Value::Raw(s) => Value::Raw(vars.substitute(&s)),
            other => other,
        }
    }
}

/// Reference a column (or any raw SQL) as a predicate operand.
///
/// ```
/// use dbforge::{col, Value};
/// assert_eq!(col("p.user_id"), Value::Raw("p.user_id".into()));
/// ```
pub fn col(name: impl Into<String>) -> Value {
    Value::Raw(name.into())
}

/// Right-hand side of a predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Single(Value),
    List(Vec<Value>),
}

impl Operand {
    pub fn is_list(&self) -> bool {
        matches!(self, Operand::List(_))
    }

    pub(crate) fn substitute(self, vars: &Variables) -> Self {
        match self {
            Operand::Single(v) => Operand::Single(v.substitute(vars)),
            Operand::List(vals) => {
                Operand::List(vals.into_iter().map(|v| v.substitute(vars)).collect())
            }
        }
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Single(v)
    }
}

impl From<Vec<Value>> for Operand {
    fn from(vals: Vec<Value>) -> Self {
        Operand::List(vals)
    }
}

impl<const N: usize> From<[Value; N]> for Operand {
    fn from(vals: [Value; N]) -> Self {
        Operand::List(vals.into())
    }
}

macro_rules! impl_scalar {
    ($($ty:ty => $variant:ident as $conv:ty),* $(,)?) => {
        $(
            impl From<$ty> for Value {
                fn from(v: $ty) -> Self {
                    Value::$variant(v as $conv)
                }
            }

            impl From<$ty> for Operand {
                fn from(v: $ty) -> Self {
                    Operand::Single(Value::from(v))
                }
            }

            impl From<Vec<$ty>> for Operand {
                fn from(vals: Vec<$ty>) -> Self {
                    Operand::List(vals.into_iter().map(Value::from).collect())
                }
            }

            impl<const N: usize> From<[$ty; N]> for Operand {
                fn from(vals: [$ty; N]) -> Self {
                    Operand::List(vals.into_iter().map(Value::from).collect())
                }
            }
        )*
    };
}

impl_scalar!(
    i8 => Int as i64,
    i16 => Int as i64,
    i32 => Int as i64,
    i64 => Int as i64,
    u8 => UInt as u64,
    u16 => UInt as u64,
    u32 => UInt as u64,
    u64 => UInt as u64,
    usize => UInt as u64,
    f32 => Float as f64,
    f64 => Float as f64,
);

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<bool> for Operand {
    fn from(v: bool) -> Self {
        Operand::Single(Value::Bool(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Operand {
    fn from(v: String) -> Self {
        Operand::Single(Value::Text(v))
    }
}

impl From<&str> for Operand {
    fn from(v: &str) -> Self {
        Operand::Single(Value::Text(v.to_string()))
    }
}

impl From<Vec<String>> for Operand {
    fn from(vals: Vec<String>) -> Self {
        Operand::List(vals.into_iter().map(Value::Text).collect())
    }
}

impl From<Vec<&str>> for Operand {
    fn from(vals: Vec<&str>) -> Self {
        Operand::List(vals.into_iter().map(Value::from).collect())
    }
}

impl<const N: usize> From<[&str; N]> for Operand {
    fn from(vals: [&str; N]) -> Self {
        Operand::List(vals.into_iter().map(Value::from).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}
