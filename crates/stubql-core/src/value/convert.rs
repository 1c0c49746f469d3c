use crate::value::{Value, ValueTag};
use thiserror::Error as ThisError;

///
/// ScanError
///
/// Failure to move stubbed values into caller-side host types.
///

#[derive(Clone, Debug, PartialEq, ThisError)]
pub enum ScanError {
    #[error("column index {index} out of range for row of width {width}")]
    ColumnOutOfRange { index: usize, width: usize },

    #[error("no column named '{name}'")]
    UnknownColumn { name: String },

    #[error("scan expects {expected} destination(s), row has {found} column(s)")]
    WidthMismatch { expected: usize, found: usize },

    #[error("cannot scan {found} value '{value}' into {target}")]
    TypeMismatch {
        target: &'static str,
        found: ValueTag,
        value: Value,
    },
}

impl ScanError {
    fn mismatch(target: &'static str, value: &Value) -> Self {
        Self::TypeMismatch {
            target,
            found: value.tag(),
            value: value.clone(),
        }
    }
}

///
/// FromValue
///
/// Conversion from one stubbed value into a host type.
/// Text that spells a number converts to numeric targets; the reverse
/// conversion renders the literal form.
///

pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, ScanError>;
}

impl FromValue for Value {
    fn from_value(value: &Value) -> Result<Self, ScanError> {
        Ok(value.clone())
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Result<Self, ScanError> {
        match value {
            Value::Int(v) => Ok(*v),
            Value::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ScanError::mismatch("i64", value)),
            _ => Err(ScanError::mismatch("i64", value)),
        }
    }
}

macro_rules! impl_from_value_int {
    ( $( $type:ty ),* $(,)? ) => {
        $(
            impl FromValue for $type {
                fn from_value(value: &Value) -> Result<Self, ScanError> {
                    let wide = i64::from_value(value)
                        .map_err(|_| ScanError::mismatch(stringify!($type), value))?;

                    Self::try_from(wide).map_err(|_| ScanError::mismatch(stringify!($type), value))
                }
            }
        )*
    };
}

impl_from_value_int!(i32, u32, u64, usize);

impl FromValue for f64 {
    #[expect(clippy::cast_precision_loss)]
    fn from_value(value: &Value) -> Result<Self, ScanError> {
        match value {
            Value::Float(v) => Ok(*v),
            Value::Int(v) => Ok(*v as Self),
            Value::Text(s) => s
                .trim()
                .parse()
                .map_err(|_| ScanError::mismatch("f64", value)),
            Value::Null => Err(ScanError::mismatch("f64", value)),
        }
    }
}

impl FromValue for f32 {
    #[expect(clippy::cast_possible_truncation)]
    fn from_value(value: &Value) -> Result<Self, ScanError> {
        f64::from_value(value)
            .map(|v| v as Self)
            .map_err(|_| ScanError::mismatch("f32", value))
    }
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Result<Self, ScanError> {
        match value {
            Value::Int(0) => Ok(false),
            Value::Int(1) => Ok(true),
            Value::Text(s) if s.eq_ignore_ascii_case("true") => Ok(true),
            Value::Text(s) if s.eq_ignore_ascii_case("false") => Ok(false),
            _ => Err(ScanError::mismatch("bool", value)),
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, ScanError> {
        match value {
            Value::Null => Err(ScanError::mismatch("String", value)),
            other => Ok(other.to_string()),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, ScanError> {
        if value.is_null() {
            return Ok(None);
        }

        T::from_value(value).map(Some)
    }
}

///
/// FromRow
///
/// Whole-row scan into a tuple. The tuple arity must equal the row width.
///

pub trait FromRow: Sized {
    fn from_row(values: &[Value]) -> Result<Self, ScanError>;
}

macro_rules! impl_from_row_tuple {
    ( $len:expr; $( $idx:tt => $name:ident ),+ ) => {
        impl<$( $name: FromValue ),+> FromRow for ( $( $name, )+ ) {
            fn from_row(values: &[Value]) -> Result<Self, ScanError> {
                if values.len() != $len {
                    return Err(ScanError::WidthMismatch {
                        expected: $len,
                        found: values.len(),
                    });
                }

                Ok(( $( $name::from_value(&values[$idx])?, )+ ))
            }
        }
    };
}

impl_from_row_tuple!(1; 0 => A);
impl_from_row_tuple!(2; 0 => A, 1 => B);
impl_from_row_tuple!(3; 0 => A, 1 => B, 2 => C);
impl_from_row_tuple!(4; 0 => A, 1 => B, 2 => C, 3 => D);
impl_from_row_tuple!(5; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E);
impl_from_row_tuple!(6; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F);
impl_from_row_tuple!(7; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G);
impl_from_row_tuple!(8; 0 => A, 1 => B, 2 => C, 3 => D, 4 => E, 5 => F, 6 => G, 7 => H);
