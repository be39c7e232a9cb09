//! Typed slot values and the token coercion rules behind them.

use std::fmt;
use std::path::PathBuf;

use crate::error::{ArgError, Result};

/// The value kinds a slot can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Int,
    Long,
    Bool,
    String,
    Double,
    Float,
    File,
}

impl ValueType {
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Int => "int",
            ValueType::Long => "long",
            ValueType::Bool => "bool",
            ValueType::String => "string",
            ValueType::Double => "double",
            ValueType::Float => "float",
            ValueType::File => "file",
        }
    }

    /// Bool options are switches: their presence is the value.
    pub fn takes_value(self) -> bool {
        !matches!(self, ValueType::Bool)
    }

    /// Zero value used for parameters nobody supplied.
    pub fn default_value(self) -> Value {
        match self {
            ValueType::Int => Value::Int(0),
            ValueType::Long => Value::Long(0),
            ValueType::Bool => Value::Bool(false),
            ValueType::String => Value::Str(String::new()),
            ValueType::Double => Value::Double(0.0),
            ValueType::Float => Value::Float(0.0),
            ValueType::File => Value::File(None),
        }
    }

    /// Coerce one token into a value of this type.
    ///
    /// `key` only feeds the error message. A bool token is `true` iff it
    /// reads `true` ignoring ASCII case; anything else is `false`.
    pub fn parse(self, key: &str, token: &str) -> Result<Value> {
        let invalid = || ArgError::parse(key, token, self);
        let value = match self {
            ValueType::Int => Value::Int(token.parse().map_err(|_| invalid())?),
            ValueType::Long => Value::Long(token.parse().map_err(|_| invalid())?),
            ValueType::Double => Value::Double(token.parse().map_err(|_| invalid())?),
            ValueType::Float => Value::Float(token.parse().map_err(|_| invalid())?),
            ValueType::Bool => Value::Bool(token.eq_ignore_ascii_case("true")),
            ValueType::String => Value::Str(token.to_string()),
            ValueType::File => Value::File(Some(PathBuf::from(token))),
        };
        Ok(value)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A value travelling from a token to a slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i32),
    Long(i64),
    Bool(bool),
    Str(String),
    Double(f64),
    Float(f32),
    File(Option<PathBuf>),
}

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Int(_) => ValueType::Int,
            Value::Long(_) => ValueType::Long,
            Value::Bool(_) => ValueType::Bool,
            Value::Str(_) => ValueType::String,
            Value::Double(_) => ValueType::Double,
            Value::Float(_) => ValueType::Float,
            Value::File(_) => ValueType::File,
        }
    }
}

/// Rust types that can back an option slot or an action parameter.
///
/// The set is closed on purpose: a slot of any other type does not
/// satisfy the bound and is rejected when the schema is compiled.
pub trait SlotValue: Sized + 'static {
    const VALUE_TYPE: ValueType;

    fn from_value(value: Value) -> Option<Self>;
}

macro_rules! slot_value {
    ($ty:ty, $kind:ident, $variant:ident) => {
        impl SlotValue for $ty {
            const VALUE_TYPE: ValueType = ValueType::$kind;

            fn from_value(value: Value) -> Option<Self> {
                match value {
                    Value::$variant(inner) => Some(inner),
                    _ => None,
                }
            }
        }
    };
}

slot_value!(i32, Int, Int);
slot_value!(i64, Long, Long);
slot_value!(bool, Bool, Bool);
slot_value!(String, String, Str);
slot_value!(f64, Double, Double);
slot_value!(f32, Float, Float);
slot_value!(Option<PathBuf>, File, File);

impl SlotValue for PathBuf {
    const VALUE_TYPE: ValueType = ValueType::File;

    fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::File(path) => path,
            _ => None,
        }
    }
}

/// Types an action parameter may have.
///
/// Parameters nobody supplied keep their zero value, so a file parameter
/// must be able to hold "no file": it is `Option<PathBuf>`, never `PathBuf`.
pub trait ParamValue: SlotValue {}

impl ParamValue for i32 {}
impl ParamValue for i64 {}
impl ParamValue for bool {}
impl ParamValue for String {}
impl ParamValue for f64 {}
impl ParamValue for f32 {}
impl ParamValue for Option<PathBuf> {}
