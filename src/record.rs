//! `CamelSnakeStruct`: a mapping read through camelCase or snake_case names.
//!
//! The first read of a name inspects the shape of the raw value behind it,
//! installs an [`Accessor`] for that name and then answers through it. Named
//! types share installed accessors across all their instances; root instances
//! keep their own.
use std::borrow::Cow;
use std::cell::RefCell;
use std::fmt;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::inflect;
use crate::naming::NameLookup;
use crate::schema::{Accessor, Schema, TypeRef};
use crate::value::{box_value, Field};

pub const ROOT_TYPE_NAME: &str = "CamelSnakeStruct";

pub struct CamelSnakeStruct<'a> {
    raw: Cow<'a, Map<String, Value>>,
    lookup: NameLookup,
    owner: Owner<'a>,
    settings: &'a Settings,
}

enum Owner<'a> {
    /// Untyped: accessors are cached on this instance only.
    Root { accessors: RefCell<IndexMap<String, Accessor>> },
    Named { schema: &'a Schema, ty: TypeRef },
}

impl Owner<'_> {
    fn root() -> Self {
        Owner::Root { accessors: RefCell::new(IndexMap::new()) }
    }
}

impl CamelSnakeStruct<'static> {
    /// Wrap a mapping as an untyped root struct.
    pub fn new(raw: Map<String, Value>) -> Self {
        Self::build(Cow::Owned(raw), Owner::root(), Settings::shared_default())
    }

    /// Wrap any decoded value; anything but an object wraps an empty mapping.
    pub fn from_value(value: Value) -> Self {
        Self::new(into_mapping(value))
    }

    /// The untyped root cannot learn.
    pub fn example(_raw: Map<String, Value>) -> Result<Self> {
        Err(Error::InvalidRootUsage)
    }
}

impl<'a> CamelSnakeStruct<'a> {
    pub(crate) fn root_ref(raw: &'a Map<String, Value>, settings: &'a Settings) -> Self {
        Self::build(Cow::Borrowed(raw), Owner::root(), settings)
    }

    pub(crate) fn with_type(raw: Cow<'a, Map<String, Value>>, schema: &'a Schema, ty: TypeRef) -> Self {
        let owner = match ty {
            TypeRef::Root => Owner::root(),
            TypeRef::Named(_) => Owner::Named { schema, ty },
        };
        Self::build(raw, owner, schema.settings())
    }

    fn build(raw: Cow<'a, Map<String, Value>>, owner: Owner<'a>, settings: &'a Settings) -> Self {
        let lookup = NameLookup::build(&raw, settings);
        Self { raw, lookup, owner, settings }
    }

    pub fn type_ref(&self) -> TypeRef {
        match &self.owner {
            Owner::Root { .. } => TypeRef::Root,
            Owner::Named { ty, .. } => *ty,
        }
    }

    pub fn type_name(&self) -> String {
        match &self.owner {
            Owner::Root { .. } => ROOT_TYPE_NAME.to_string(),
            Owner::Named { schema, ty } => schema.type_name(*ty),
        }
    }

    /// The wrapped mapping, unchanged.
    pub fn to_h(&self) -> &Map<String, Value> {
        &self.raw
    }

    pub fn into_raw(self) -> Map<String, Value> {
        self.raw.into_owned()
    }

    pub fn lookup(&self) -> &NameLookup {
        &self.lookup
    }

    /// Bracket access by exact raw key, boxed the untyped way.
    pub fn index(&self, key: &str) -> Field<'_> {
        match self.raw.get(key) {
            Some(value) => box_value(value, self.settings),
            None => Field::null(),
        }
    }

    /// Whether `name` resolves to a key present in this mapping, null or not.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup.resolve(name).is_some_and(|key| self.raw.contains_key(key))
    }

    /// Whether `get(name)` would answer rather than fail.
    pub fn responds_to(&self, name: &str) -> bool {
        self.installed(name).is_some()
            || self.lookup.resolve(name).is_some()
            || name.ends_with(self.settings.query_suffix.as_str())
    }

    /// Read a field by any name it answers to.
    ///
    /// A name ending in the query suffix that is not itself a field answers
    /// whether the stripped name is present.
    pub fn get(&self, name: &str) -> Result<Field<'_>> {
        if let Some(accessor) = self.installed(name) {
            return Ok(self.read(&accessor));
        }

        let Some(key) = self.lookup.resolve(name) else {
            if let Some(stripped) = name.strip_suffix(self.settings.query_suffix.as_str()) {
                return Ok(Field::owned(Value::Bool(self.contains(stripped))));
            }
            return Err(Error::UnknownMember {
                member: name.to_string(),
                type_name: self.type_name(),
            });
        };

        match self.synthesize(name, key) {
            Some(accessor) => {
                self.install(name, accessor.clone());
                Ok(self.read(&accessor))
            }
            None => Ok(self.read_raw(key)),
        }
    }

    /// Pick an accessor from the current shape of `raw[key]`.
    ///
    /// Returns `None` for an empty array: it carries no evidence of its
    /// element type, so nothing is installed and the next read classifies again.
    fn synthesize(&self, name: &str, key: &str) -> Option<Accessor> {
        let key = key.to_string();
        let accessor = match self.raw.get(&key) {
            Some(Value::Object(_)) => Accessor::Nested {
                ty: self.subtype_for(&inflect::type_name(name)),
                key,
            },
            Some(Value::Array(items)) => match items.first() {
                None => {
                    trace!(field = name, "empty array, accessor left undetermined");
                    return None;
                }
                Some(Value::Object(_)) => Accessor::NestedList {
                    ty: self.subtype_for(&inflect::type_name(&inflect::singularize(name))),
                    key,
                },
                Some(_) => Accessor::ScalarList { key },
            },
            _ => Accessor::Scalar { key },
        };
        Some(accessor)
    }

    fn subtype_for(&self, derived: &str) -> TypeRef {
        match &self.owner {
            Owner::Named { schema, ty: TypeRef::Named(id) } => TypeRef::Named(schema.subtype(*id, derived)),
            _ => TypeRef::Root,
        }
    }

    fn installed(&self, name: &str) -> Option<Accessor> {
        match &self.owner {
            Owner::Root { accessors } => accessors.borrow().get(name).cloned(),
            Owner::Named { schema, ty } => ty.id().and_then(|id| schema.accessor(id, name)),
        }
    }

    fn install(&self, name: &str, accessor: Accessor) {
        debug!(type_name = %self.type_name(), field = name, ?accessor, "installing accessor");
        match &self.owner {
            Owner::Root { accessors } => {
                accessors.borrow_mut().insert(name.to_string(), accessor);
            }
            Owner::Named { schema, ty } => {
                if let Some(id) = ty.id() {
                    schema.install(id, name, accessor);
                }
            }
        }
    }

    fn read(&self, accessor: &Accessor) -> Field<'_> {
        match accessor {
            Accessor::Scalar { key } => self.read_raw(key),
            Accessor::ScalarList { key } => match self.raw.get(key) {
                None | Some(Value::Null) => Field::owned(Value::Array(Vec::new())),
                Some(value) => Field::borrowed(value),
            },
            Accessor::Nested { key, ty } => match self.raw.get(key) {
                Some(Value::Object(map)) => Field::Struct(self.nested(map, *ty)),
                Some(value) => Field::borrowed(value),
                None => Field::null(),
            },
            Accessor::NestedList { key, ty } => match self.raw.get(key) {
                Some(Value::Array(items)) => Field::List(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::Object(map) => Field::Struct(self.nested(map, *ty)),
                            other => Field::borrowed(other),
                        })
                        .collect(),
                ),
                None | Some(Value::Null) => Field::List(Vec::new()),
                Some(value) => Field::borrowed(value),
            },
        }
    }

    fn read_raw(&self, key: &str) -> Field<'_> {
        match self.raw.get(key) {
            Some(value) => Field::borrowed(value),
            None => Field::null(),
        }
    }

    fn nested<'s>(&'s self, raw: &'s Map<String, Value>, ty: TypeRef) -> CamelSnakeStruct<'s> {
        match (&self.owner, ty) {
            (Owner::Named { schema, .. }, TypeRef::Named(_)) => {
                CamelSnakeStruct::with_type(Cow::Borrowed(raw), schema, ty)
            }
            _ => CamelSnakeStruct::root_ref(raw, self.settings),
        }
    }
}

pub(crate) fn into_mapping(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        Value::Null => Map::new(),
        other => {
            debug!(kind = ?other, "non-object value wrapped as an empty mapping");
            Map::new()
        }
    }
}

impl fmt::Debug for CamelSnakeStruct<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CamelSnakeStruct")
            .field("type", &self.type_name())
            .field("raw", &self.raw)
            .finish()
    }
}

impl PartialEq for CamelSnakeStruct<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.type_ref() == other.type_ref() && self.raw == other.raw
    }
}
