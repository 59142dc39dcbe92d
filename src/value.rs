//! Boxed field values handed back by accessors.
use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::record::CamelSnakeStruct;

static NULL: Value = Value::Null;

/// What an accessor returns: a raw value, a wrapped mapping, or a list of either.
pub enum Field<'a> {
    /// Scalars, null, and arrays handed back verbatim.
    Raw(Cow<'a, Value>),
    Struct(CamelSnakeStruct<'a>),
    List(Vec<Field<'a>>),
}

/// Box a raw value the untyped way: mappings become root structs, arrays are
/// boxed element by element, everything else is returned as-is.
pub fn box_value<'a>(value: &'a Value, settings: &'a Settings) -> Field<'a> {
    match value {
        Value::Object(map) => Field::Struct(CamelSnakeStruct::root_ref(map, settings)),
        Value::Array(items) => Field::List(items.iter().map(|item| box_value(item, settings)).collect()),
        other => Field::Raw(Cow::Borrowed(other)),
    }
}

impl<'a> Field<'a> {
    pub fn null() -> Self {
        Field::Raw(Cow::Borrowed(&NULL))
    }

    pub(crate) fn borrowed(value: &'a Value) -> Self {
        Field::Raw(Cow::Borrowed(value))
    }

    pub(crate) fn owned(value: Value) -> Self {
        Field::Raw(Cow::Owned(value))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Field::Raw(v) if v.is_null())
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Field::Raw(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_struct(&self) -> Option<&CamelSnakeStruct<'a>> {
        match self {
            Field::Struct(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Field<'a>]> {
        match self {
            Field::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_value().and_then(Value::as_str)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_value().and_then(Value::as_i64)
    }

    pub fn as_f64(&self) -> Option<f64> {
        self.as_value().and_then(Value::as_f64)
    }

    pub fn as_bool(&self) -> Option<bool> {
        self.as_value().and_then(Value::as_bool)
    }

    /// Element `index` of a list field.
    pub fn at(&self, index: usize) -> Option<&Field<'a>> {
        self.as_list().and_then(|items| items.get(index))
    }

    /// Read `name` off a struct field. Any other field has no members.
    pub fn get(&self, name: &str) -> Result<Field<'_>> {
        match self {
            Field::Struct(s) => s.get(name),
            other => Err(Error::UnknownMember {
                member: name.to_string(),
                type_name: other.kind().to_string(),
            }),
        }
    }

    /// Short description of the field's shape, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Field::Raw(v) => match v.as_ref() {
                Value::Null => "null",
                Value::Bool(_) => "boolean",
                Value::Number(n) if n.is_f64() => "real",
                Value::Number(_) => "integer",
                Value::String(_) => "text",
                Value::Array(_) => "array",
                Value::Object(_) => "object",
            },
            Field::Struct(_) => "struct",
            Field::List(_) => "list",
        }
    }

    /// Unbox back into plain JSON.
    pub fn to_value(&self) -> Value {
        match self {
            Field::Raw(v) => v.as_ref().clone(),
            Field::Struct(s) => Value::Object(s.to_h().clone()),
            Field::List(items) => Value::Array(items.iter().map(Field::to_value).collect()),
        }
    }
}

impl fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Raw(v) => f.debug_tuple("Raw").field(v).finish(),
            Field::Struct(s) => f.debug_tuple("Struct").field(s).finish(),
            Field::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

impl PartialEq<Value> for Field<'_> {
    fn eq(&self, other: &Value) -> bool {
        match (self, other) {
            (Field::Raw(v), other) => v.as_ref() == other,
            (Field::Struct(s), Value::Object(map)) => s.to_h() == map,
            (Field::List(items), Value::Array(others)) => {
                items.len() == others.len() && items.iter().zip(others).all(|(a, b)| a == b)
            }
            _ => false,
        }
    }
}
