//! Per-field type profiles accumulated by learning from examples.
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::trace;

use super::{Schema, TypeId};
use crate::error::{Error, Result};
use crate::record::CamelSnakeStruct;
use crate::value::Field;

/// Runtime category of an observed field value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueCategory {
    Integer,
    Real,
    Text,
    Boolean,
    Null,
    /// A mapping seen unwrapped, e.g. inside an array of scalars.
    Object,
    /// An array seen unwrapped, e.g. nested inside another array.
    Array,
    Struct(TypeId),
}

impl ValueCategory {
    pub fn of_value(value: &Value) -> Self {
        match value {
            Value::Null => ValueCategory::Null,
            Value::Bool(_) => ValueCategory::Boolean,
            Value::Number(n) if n.is_f64() => ValueCategory::Real,
            Value::Number(_) => ValueCategory::Integer,
            Value::String(_) => ValueCategory::Text,
            Value::Array(_) => ValueCategory::Array,
            Value::Object(_) => ValueCategory::Object,
        }
    }

    fn of_field(field: &Field<'_>) -> Option<Self> {
        match field {
            Field::Raw(value) => Some(Self::of_value(value)),
            Field::Struct(s) => s.type_ref().id().map(ValueCategory::Struct),
            Field::List(_) => Some(ValueCategory::Array),
        }
    }

    /// Human label; nested types are named by the schema.
    pub fn label(&self, schema: &Schema) -> String {
        match self {
            ValueCategory::Integer => "integer".to_string(),
            ValueCategory::Real => "real".to_string(),
            ValueCategory::Text => "text".to_string(),
            ValueCategory::Boolean => "boolean".to_string(),
            ValueCategory::Null => "null".to_string(),
            ValueCategory::Object => "object".to_string(),
            ValueCategory::Array => "array".to_string(),
            ValueCategory::Struct(id) => match schema.named_type(*id) {
                Some(named) => named.name,
                None => format!("<unknown type {}>", id.index()),
            },
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FieldProfile {
    categories: IndexSet<ValueCategory>,
    array: bool,
}

impl FieldProfile {
    /// Observed categories in first-seen order.
    pub fn classes(&self) -> Vec<ValueCategory> {
        self.categories.iter().copied().collect()
    }

    pub fn categories(&self) -> &IndexSet<ValueCategory> {
        &self.categories
    }

    pub fn is_array(&self) -> bool {
        self.array
    }

    fn observe(&mut self, field: &Field<'_>) {
        match field {
            Field::List(items) if !items.is_empty() => {
                self.array = true;
                self.categories.extend(items.iter().filter_map(ValueCategory::of_field));
            }
            Field::Raw(value) => match value.as_ref() {
                Value::Array(items) if items.is_empty() => {
                    self.categories.insert(ValueCategory::Array);
                }
                Value::Array(items) => {
                    self.array = true;
                    self.categories.extend(items.iter().map(ValueCategory::of_value));
                }
                other => {
                    self.categories.insert(ValueCategory::of_value(other));
                }
            },
            Field::List(_) => {
                self.categories.insert(ValueCategory::Array);
            }
            Field::Struct(_) => self.categories.extend(ValueCategory::of_field(field)),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TypeProfile {
    fields: IndexMap<String, FieldProfile>,
}

impl TypeProfile {
    pub fn get(&self, name: &str) -> Option<&FieldProfile> {
        self.fields.get(name)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldProfile)> {
        self.fields.iter().map(|(name, field)| (name.as_str(), field))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Union an observation into `name`'s entry, creating it if needed.
    pub fn record(&mut self, name: &str, field: &Field<'_>) {
        self.fields.entry(name.to_string()).or_default().observe(field);
    }
}

/// Force every accessor of `instance` into existence, depth first, and record
/// what each base field held into its type's profile.
pub(crate) fn walk_example(schema: &Schema, instance: &CamelSnakeStruct<'_>) -> Result<()> {
    let Some(id) = instance.type_ref().id() else {
        return Err(Error::InvalidRootUsage);
    };

    for name in instance.lookup().names() {
        instance.get(name)?;
    }

    for name in instance.lookup().base_names() {
        let field = instance.get(name)?;
        match &field {
            Field::Struct(nested) => walk_example(schema, nested)?,
            Field::List(items) => {
                for nested in items.iter().filter_map(Field::as_struct) {
                    walk_example(schema, nested)?;
                }
            }
            Field::Raw(_) => {}
        }
        trace!(type_name = %instance.type_name(), field = name, kind = field.kind(), "recording field");
        schema.with_profile_mut(id, |profile| profile.record(name, &field));
    }
    Ok(())
}

/// Profile report for `ty` and, recursively, every subtype it owns.
///
/// `None` when `ty` was not issued by `schema`.
pub fn emit_profile(schema: &Schema, ty: TypeId) -> Option<Value> {
    let named = schema.named_type(ty)?;
    let mut fields = serde_json::Map::new();
    for (name, field) in named.profile.iter() {
        let types: Vec<Value> = field.categories().iter().map(|c| Value::from(c.label(schema))).collect();
        fields.insert(name.to_string(), json!({ "types": types, "array": field.is_array() }));
    }
    let subtypes: Vec<Value> = named.subtypes.values().filter_map(|sub| emit_profile(schema, *sub)).collect();

    let mut out = json!({
        "type": named.name,
        "fields": fields,
    });
    if !subtypes.is_empty() {
        out["subtypes"] = Value::Array(subtypes);
    }
    Some(out)
}
