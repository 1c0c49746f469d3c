mod convert;
mod tag;


use derive_more::Display;
use serde::{Deserialize, Serialize};
use std::fmt;

// re-exports
pub use convert::{FromRow, FromValue, ScanError};
pub use tag::ValueTag;

///
/// Value
///
/// Tagged scalar carried by stubbed rows, bound arguments, and predicates.
///
/// Null  → SQL NULL
/// Int   → signed 64-bit integer
/// Float → 64-bit float
/// Text  → UTF-8 text
///

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub enum Value {
    Null,
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Stable variant tag for diagnostics.
    #[must_use]
    pub const fn tag(&self) -> ValueTag {
        match self {
            Self::Null => ValueTag::Null,
            Self::Int(_) => ValueTag::Int,
            Self::Float(_) => ValueTag::Float,
            Self::Text(_) => ValueTag::Text,
        }
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Equality used when comparing stub filters against query values.
    ///
    /// Int and Float compare numerically. Text never equals a number, even
    /// when it spells one.
    #[must_use]
    #[expect(clippy::cast_precision_loss)]
    pub fn matches(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Int(a), Self::Float(b)) | (Self::Float(b), Self::Int(a)) => *a as f64 == *b,
            (Self::Text(a), Self::Text(b)) => a == b,
            _ => false,
        }
    }
}

// Display is the literal form: the decoder reads back what this writes.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("NULL"),
            Self::Int(v) => write!(f, "{v}"),
            // Debug keeps the fractional marker (5.0, not 5)
            Self::Float(v) => write!(f, "{v:?}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

macro_rules! impl_from_for {
    ( $( $type:ty => $variant:ident ),* $(,)? ) => {
        $(
            impl From<$type> for Value {
                fn from(v: $type) -> Self {
                    Self::$variant(v.into())
                }
            }
        )*
    };
}

impl_from_for! {
    i8     => Int,
    i16    => Int,
    i32    => Int,
    i64    => Int,
    u8     => Int,
    u16    => Int,
    u32    => Int,
    f32    => Float,
    f64    => Float,
    &str   => Text,
    String => Text,
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Int(i64::from(v))
    }
}

impl<T: Into<Self>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Self::Null, Into::into)
    }
}

///
/// ColumnType
///
/// Declared column type used by the literal decoder instead of inference.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ColumnType {
    Int,
    Float,
    Text,
}

impl ColumnType {
    /// Convert one trimmed literal field into this column type.
    #[must_use]
    pub fn parse(self, field: &str) -> Option<Value> {
        match self {
            Self::Int => field.parse::<i64>().ok().map(Value::Int),
            Self::Float => field
                .parse::<f64>()
                .ok()
                .filter(|f| f.is_finite())
                .map(Value::Float),
            Self::Text => Some(Value::Text(field.to_string())),
        }
    }
}
