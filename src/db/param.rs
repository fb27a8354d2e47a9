//! Query parameters and wire-type inference.
//!
//! Callers pass a slice of [`Param`] values that are bound positionally to the
//! statement's placeholders. Before binding, each parameter is classified into
//! one of three coarse wire types understood by every driver: integer, float or
//! string. Booleans are classified before the numeric check and travel as
//! integers (`0`/`1`).

use std::fmt;

/// A caller-supplied parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Param {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// The wire-level type tag sent alongside a bound value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireType {
    Integer,
    Float,
    String,
}

impl WireType {
    /// Single-character marker, as used in driver bind signatures.
    pub fn marker(self) -> char {
        match self {
            WireType::Integer => 'i',
            WireType::Float => 'd',
            WireType::String => 's',
        }
    }
}

impl fmt::Display for WireType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WireType::Integer => "integer",
            WireType::Float => "float",
            WireType::String => "string",
        };
        write!(f, "{}", name)
    }
}

/// A parameter after wire-type inference, ready to hand to a driver.
#[derive(Debug, Clone, PartialEq)]
pub enum BoundParam {
    Integer(i64),
    Float(f64),
    Text(String),
    /// SQL NULL; carries the string tag
    Null,
}

impl BoundParam {
    pub fn wire_type(&self) -> WireType {
        match self {
            BoundParam::Integer(_) => WireType::Integer,
            BoundParam::Float(_) => WireType::Float,
            BoundParam::Text(_) | BoundParam::Null => WireType::String,
        }
    }
}

impl Param {
    /// Classify and coerce this parameter for binding.
    pub fn bind(&self) -> BoundParam {
        match self {
            // bool must be matched before the numeric arms
            Param::Bool(b) => BoundParam::Integer(i64::from(*b)),
            Param::Int(i) => BoundParam::Integer(*i),
            Param::Float(f) => BoundParam::Float(*f),
            Param::Text(s) => BoundParam::Text(s.clone()),
            Param::Null => BoundParam::Null,
        }
    }

    pub fn wire_type(&self) -> WireType {
        self.bind().wire_type()
    }

    /// Infer a parameter from a dynamically typed JSON value.
    ///
    /// Integral numbers become `Int`, other numbers `Float`. Arrays and objects
    /// are bound as their JSON text.
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Param::Null,
            serde_json::Value::Bool(b) => Param::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Param::Int(i),
                None => Param::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Param::Text(s.clone()),
            other => Param::Text(other.to_string()),
        }
    }
}

/// Bind a full parameter list, preserving order.
pub fn bind_params(params: &[Param]) -> Vec<BoundParam> {
    params.iter().map(Param::bind).collect()
}

/// Render the wire markers of a bound list, e.g. `"iids"`.
pub fn wire_signature(bound: &[BoundParam]) -> String {
    bound.iter().map(|p| p.wire_type().marker()).collect()
}

impl From<bool> for Param {
    fn from(v: bool) -> Self {
        Param::Bool(v)
    }
}

macro_rules! param_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Param {
                fn from(v: $t) -> Self {
                    Param::Int(i64::from(v))
                }
            }
        )*
    };
}

param_from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<f32> for Param {
    fn from(v: f32) -> Self {
        Param::Float(f64::from(v))
    }
}

impl From<f64> for Param {
    fn from(v: f64) -> Self {
        Param::Float(v)
    }
}

impl From<&str> for Param {
    fn from(v: &str) -> Self {
        Param::Text(v.to_string())
    }
}

impl From<String> for Param {
    fn from(v: String) -> Self {
        Param::Text(v)
    }
}

impl From<&String> for Param {
    fn from(v: &String) -> Self {
        Param::Text(v.clone())
    }
}

impl<T: Into<Param>> From<Option<T>> for Param {
    fn from(v: Option<T>) -> Self {
        v.map_or(Param::Null, Into::into)
    }
}

/// Build a parameter list from heterogeneous values.
///
/// Usage: `params![1, true, 2.5, "x"]`
#[macro_export]
macro_rules! params {
    ($($val:expr),* $(,)?) => {
        &[$($crate::db::Param::from($val)),*] as &[$crate::db::Param]
    };
}
