use std::collections::BTreeMap;
use std::fmt;

/// A structured value carried in request arguments and return values.
///
/// This is the serialization contract of the protocol: every host method
/// parameter and return type must be expressible as an `RpcValue`. Richer
/// payloads can be packed into `Bytes` with the codec of the caller's choice.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum RpcValue {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    List(Vec<RpcValue>),
    Map(BTreeMap<String, RpcValue>),
}

impl RpcValue {
    /// Short name of the variant, used in conversion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            RpcValue::Null => "null",
            RpcValue::Bool(_) => "bool",
            RpcValue::Int(_) => "int",
            RpcValue::Float(_) => "float",
            RpcValue::String(_) => "string",
            RpcValue::Bytes(_) => "bytes",
            RpcValue::List(_) => "list",
            RpcValue::Map(_) => "map",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, RpcValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            RpcValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            RpcValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to floats; nothing else converts.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            RpcValue::Float(f) => Some(*f),
            RpcValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            RpcValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            RpcValue::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[RpcValue]> {
        match self {
            RpcValue::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&BTreeMap<String, RpcValue>> {
        match self {
            RpcValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Decodes this value into `T`.
    pub fn decode<T: FromRpcValue>(self) -> Result<T, RpcValueError> {
        T::from_rpc_value(self)
    }
}

impl fmt::Display for RpcValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcValue::Null => write!(f, "null"),
            RpcValue::Bool(b) => write!(f, "{b}"),
            RpcValue::Int(i) => write!(f, "{i}"),
            RpcValue::Float(x) => write!(f, "{x}"),
            RpcValue::String(s) => write!(f, "{s:?}"),
            RpcValue::Bytes(b) => write!(f, "<{} bytes>", b.len()),
            RpcValue::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, "]")
            }
            RpcValue::Map(map) => {
                write!(f, "{{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{key:?}: {value}")?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Errors raised while converting between `RpcValue` and Rust types.
#[derive(Debug, Clone, PartialEq)]
pub enum RpcValueError {
    /// The value had a different variant than the target type accepts.
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// A positional argument was absent.
    MissingArgument { position: usize },
    /// More arguments were supplied than the method accepts.
    UnexpectedArguments { expected: usize, found: usize },
    /// Codec-specific failure (e.g. an opaque `Bytes` payload failed to decode).
    Custom(String),
}

impl fmt::Display for RpcValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RpcValueError::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            RpcValueError::MissingArgument { position } => {
                write!(f, "missing argument at position {position}")
            }
            RpcValueError::UnexpectedArguments { expected, found } => {
                write!(f, "expected {expected} argument(s), found {found}")
            }
            RpcValueError::Custom(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for RpcValueError {}

/// Conversion out of an `RpcValue`.
pub trait FromRpcValue: Sized {
    fn from_rpc_value(value: RpcValue) -> Result<Self, RpcValueError>;
}

fn mismatch(expected: &'static str, value: &RpcValue) -> RpcValueError {
    RpcValueError::TypeMismatch {
        expected,
        found: value.type_name(),
    }
}

impl FromRpcValue for RpcValue {
    fn from_rpc_value(value: RpcValue) -> Result<Self, RpcValueError> {
        Ok(value)
    }
}

impl FromRpcValue for () {
    fn from_rpc_value(value: RpcValue) -> Result<Self, RpcValueError> {
        match value {
            RpcValue::Null => Ok(()),
            other => Err(mismatch("null", &other)),
        }
    }
}

impl FromRpcValue for bool {
    fn from_rpc_value(value: RpcValue) -> Result<Self, RpcValueError> {
        value.as_bool().ok_or_else(|| mismatch("bool", &value))
    }
}

impl FromRpcValue for i64 {
    fn from_rpc_value(value: RpcValue) -> Result<Self, RpcValueError> {
        value.as_i64().ok_or_else(|| mismatch("int", &value))
    }
}

macro_rules! impl_from_rpc_value_int {
    ($($ty:ty),*) => {
        $(
            impl FromRpcValue for $ty {
                fn from_rpc_value(value: RpcValue) -> Result<Self, RpcValueError> {
                    let wide = value.as_i64().ok_or_else(|| mismatch("int", &value))?;
                    <$ty>::try_from(wide).map_err(|_| {
                        RpcValueError::Custom(format!(
                            "integer {wide} out of range for {}",
                            stringify!($ty)
                        ))
                    })
                }
            }
        )*
    };
}

impl_from_rpc_value_int!(i32, u32, u64, usize);

impl FromRpcValue for f64 {
    fn from_rpc_value(value: RpcValue) -> Result<Self, RpcValueError> {
        value.as_f64().ok_or_else(|| mismatch("float", &value))
    }
}

impl FromRpcValue for String {
    fn from_rpc_value(value: RpcValue) -> Result<Self, RpcValueError> {
        match value {
            RpcValue::String(s) => Ok(s),
            other => Err(mismatch("string", &other)),
        }
    }
}

impl<T: FromRpcValue> FromRpcValue for Vec<T> {
    fn from_rpc_value(value: RpcValue) -> Result<Self, RpcValueError> {
        match value {
            RpcValue::List(items) => items.into_iter().map(T::from_rpc_value).collect(),
            other => Err(mismatch("list", &other)),
        }
    }
}

impl<T: FromRpcValue> FromRpcValue for Option<T> {
    fn from_rpc_value(value: RpcValue) -> Result<Self, RpcValueError> {
        match value {
            RpcValue::Null => Ok(None),
            other => T::from_rpc_value(other).map(Some),
        }
    }
}

impl<T: FromRpcValue> FromRpcValue for BTreeMap<String, T> {
    fn from_rpc_value(value: RpcValue) -> Result<Self, RpcValueError> {
        match value {
            RpcValue::Map(map) => map
                .into_iter()
                .map(|(key, value)| T::from_rpc_value(value).map(|v| (key, v)))
                .collect(),
            other => Err(mismatch("map", &other)),
        }
    }
}

impl From<()> for RpcValue {
    fn from(_: ()) -> Self {
        RpcValue::Null
    }
}

impl From<bool> for RpcValue {
    fn from(b: bool) -> Self {
        RpcValue::Bool(b)
    }
}

macro_rules! impl_rpc_value_from_int {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for RpcValue {
                fn from(i: $ty) -> Self {
                    RpcValue::Int(i as i64)
                }
            }
        )*
    };
}

impl_rpc_value_from_int!(i8, i16, i32, i64, u16, u32);

// Wider unsigned integers only fit while they stay within `i64`.
macro_rules! impl_rpc_value_try_from_int {
    ($($ty:ty),*) => {
        $(
            impl TryFrom<$ty> for RpcValue {
                type Error = RpcValueError;

                fn try_from(i: $ty) -> Result<Self, Self::Error> {
                    i64::try_from(i).map(RpcValue::Int).map_err(|_| {
                        RpcValueError::Custom(format!("integer {i} out of range for an int value"))
                    })
                }
            }
        )*
    };
}

impl_rpc_value_try_from_int!(u64, usize);

impl From<f32> for RpcValue {
    fn from(x: f32) -> Self {
        RpcValue::Float(x as f64)
    }
}

impl From<f64> for RpcValue {
    fn from(x: f64) -> Self {
        RpcValue::Float(x)
    }
}

impl From<String> for RpcValue {
    fn from(s: String) -> Self {
        RpcValue::String(s)
    }
}

impl From<&str> for RpcValue {
    fn from(s: &str) -> Self {
        RpcValue::String(s.to_string())
    }
}

impl<T: Into<RpcValue>> From<Vec<T>> for RpcValue {
    fn from(items: Vec<T>) -> Self {
        RpcValue::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<RpcValue>> From<Option<T>> for RpcValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RpcValue::Null)
    }
}

impl<T: Into<RpcValue>> From<BTreeMap<String, T>> for RpcValue {
    fn from(map: BTreeMap<String, T>) -> Self {
        RpcValue::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect())
    }
}

/// Decodes the next positional argument from `args`.
///
/// `position` is only used for the error message; callers pass the index of
/// the argument they are reading.
///
/// ```rust
/// use hostrpc::rpc::{RpcValue, take_arg};
///
/// let mut args = vec![RpcValue::Int(2), RpcValue::Int(3)].into_iter();
/// let a: i64 = take_arg(&mut args, 0).unwrap();
/// let b: i64 = take_arg(&mut args, 1).unwrap();
/// assert_eq!(a + b, 5);
/// ```
pub fn take_arg<T: FromRpcValue>(
    args: &mut impl Iterator<Item = RpcValue>,
    position: usize,
) -> Result<T, RpcValueError> {
    let value = args
        .next()
        .ok_or(RpcValueError::MissingArgument { position })?;
    T::from_rpc_value(value)
}
