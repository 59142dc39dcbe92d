//! Named types learned at runtime, stored in an arena owned by a [`Schema`].
//!
//! A `Schema` is one "schema session": every named type, its installed
//! accessors, its nested subtypes and its type profile live here and are never
//! evicted. Interior mutability is `RefCell`, so a schema is `!Sync`; callers
//! that need several threads keep one schema per thread.
pub mod profile;

use std::borrow::Cow;
use std::cell::RefCell;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::record::{into_mapping, CamelSnakeStruct, ROOT_TYPE_NAME};

pub use profile::{emit_profile, FieldProfile, TypeProfile, ValueCategory};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct TypeId(u32);

impl TypeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Either the untyped root or a named type in some schema.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TypeRef {
    Root,
    Named(TypeId),
}

impl TypeRef {
    pub fn id(&self) -> Option<TypeId> {
        match self {
            TypeRef::Root => None,
            TypeRef::Named(id) => Some(*id),
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, TypeRef::Root)
    }
}

/// How an installed accessor reads its field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Accessor {
    /// Raw value verbatim; absent → null.
    Scalar { key: String },
    /// Array of scalars verbatim; absent or null → `[]`.
    ScalarList { key: String },
    /// Mapping wrapped as `ty`; absent or null → null.
    Nested { key: String, ty: TypeRef },
    /// Each mapping element wrapped as `ty`; absent or null → empty list.
    NestedList { key: String, ty: TypeRef },
}

impl Accessor {
    pub fn key(&self) -> &str {
        match self {
            Accessor::Scalar { key }
            | Accessor::ScalarList { key }
            | Accessor::Nested { key, .. }
            | Accessor::NestedList { key, .. } => key,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NamedType {
    pub name: String,
    pub parent: Option<TypeId>,
    pub accessors: IndexMap<String, Accessor>,
    pub subtypes: IndexMap<String, TypeId>,
    pub profile: TypeProfile,
}

impl NamedType {
    fn new(name: String, parent: Option<TypeId>) -> Self {
        Self {
            name,
            parent,
            accessors: IndexMap::new(),
            subtypes: IndexMap::new(),
            profile: TypeProfile::default(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Schema {
    settings: Settings,
    types: RefCell<Vec<NamedType>>,
    by_name: RefCell<IndexMap<String, TypeId>>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self { settings, ..Self::default() }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Handle to the untyped root type.
    pub fn root(&self) -> StructType<'_> {
        StructType { schema: self, ty: TypeRef::Root }
    }

    /// Declare (or fetch) a top-level named type.
    pub fn declare(&self, name: &str) -> StructType<'_> {
        if let Some(id) = self.by_name.borrow().get(name).copied() {
            return StructType { schema: self, ty: TypeRef::Named(id) };
        }
        let id = self.push(name.to_string(), None);
        StructType { schema: self, ty: TypeRef::Named(id) }
    }

    /// Look a type up by its full name (`Owner::Child` for subtypes).
    pub fn find(&self, name: &str) -> Option<StructType<'_>> {
        let id = self.by_name.borrow().get(name).copied()?;
        Some(StructType { schema: self, ty: TypeRef::Named(id) })
    }

    pub(crate) fn handle(&self, ty: TypeRef) -> StructType<'_> {
        StructType { schema: self, ty }
    }

    /// The nested type `owner` uses for `derived`, created on first request.
    pub(crate) fn subtype(&self, owner: TypeId, derived: &str) -> TypeId {
        if let Some(id) = self.types.borrow()[owner.index()].subtypes.get(derived).copied() {
            return id;
        }
        let full_name = format!("{}::{derived}", self.types.borrow()[owner.index()].name);
        let existing = self.by_name.borrow().get(&full_name).copied();
        let id = match existing {
            Some(id) => id,
            None => self.push(full_name, Some(owner)),
        };
        self.types.borrow_mut()[owner.index()].subtypes.insert(derived.to_string(), id);
        id
    }

    fn push(&self, name: String, parent: Option<TypeId>) -> TypeId {
        let mut types = self.types.borrow_mut();
        let id = TypeId(types.len() as u32);
        debug!(type_name = %name, ?parent, "declaring named type");
        self.by_name.borrow_mut().insert(name.clone(), id);
        types.push(NamedType::new(name, parent));
        id
    }

    pub(crate) fn accessor(&self, id: TypeId, name: &str) -> Option<Accessor> {
        self.types.borrow()[id.index()].accessors.get(name).cloned()
    }

    pub(crate) fn install(&self, id: TypeId, name: &str, accessor: Accessor) {
        self.types.borrow_mut()[id.index()].accessors.insert(name.to_string(), accessor);
    }

    pub(crate) fn accessor_names(&self, id: TypeId) -> Vec<String> {
        self.types.borrow()[id.index()].accessors.keys().cloned().collect()
    }

    pub(crate) fn type_name(&self, ty: TypeRef) -> String {
        match ty {
            TypeRef::Root => ROOT_TYPE_NAME.to_string(),
            TypeRef::Named(id) => self.types.borrow()[id.index()].name.clone(),
        }
    }

    pub(crate) fn parent(&self, id: TypeId) -> Option<TypeId> {
        self.types.borrow()[id.index()].parent
    }

    pub(crate) fn subtypes(&self, id: TypeId) -> Vec<(String, TypeId)> {
        self.types.borrow()[id.index()]
            .subtypes
            .iter()
            .map(|(name, id)| (name.clone(), *id))
            .collect()
    }

    pub(crate) fn type_profile(&self, id: TypeId) -> TypeProfile {
        self.types.borrow()[id.index()].profile.clone()
    }

    /// Snapshot of a named type's descriptor; `None` for ids this schema never issued.
    pub fn named_type(&self, id: TypeId) -> Option<NamedType> {
        self.types.borrow().get(id.index()).cloned()
    }

    pub fn len(&self) -> usize {
        self.types.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.borrow().is_empty()
    }

    pub(crate) fn with_profile_mut<R>(&self, id: TypeId, f: impl FnOnce(&mut TypeProfile) -> R) -> R {
        f(&mut self.types.borrow_mut()[id.index()].profile)
    }
}

/// A type in a schema: wraps mappings, learns from examples, reports profiles.
#[derive(Clone, Copy)]
pub struct StructType<'s> {
    schema: &'s Schema,
    ty: TypeRef,
}

impl<'s> StructType<'s> {
    pub fn type_ref(&self) -> TypeRef {
        self.ty
    }

    pub fn id(&self) -> Option<TypeId> {
        self.ty.id()
    }

    pub fn name(&self) -> String {
        self.schema.type_name(self.ty)
    }

    pub fn schema(&self) -> &'s Schema {
        self.schema
    }

    pub fn wrap(&self, raw: Map<String, Value>) -> CamelSnakeStruct<'s> {
        CamelSnakeStruct::with_type(Cow::Owned(raw), self.schema, self.ty)
    }

    /// Wrap a mapping without taking ownership of it.
    pub fn wrap_ref<'m>(&self, raw: &'m Map<String, Value>) -> CamelSnakeStruct<'m>
    where
        's: 'm,
    {
        CamelSnakeStruct::with_type(Cow::Borrowed(raw), self.schema, self.ty)
    }

    /// Wrap any decoded value; anything but an object wraps an empty mapping.
    pub fn from_value(&self, value: Value) -> CamelSnakeStruct<'s> {
        self.wrap(into_mapping(value))
    }

    /// Learn accessors and a type profile from a representative payload.
    pub fn example(&self, raw: Map<String, Value>) -> Result<CamelSnakeStruct<'s>> {
        if self.ty.is_root() {
            return Err(Error::InvalidRootUsage);
        }
        let instance = self.wrap(raw);
        profile::walk_example(self.schema, &instance)?;
        Ok(instance)
    }

    pub fn type_profile(&self) -> TypeProfile {
        match self.ty {
            TypeRef::Root => TypeProfile::default(),
            TypeRef::Named(id) => self.schema.type_profile(id),
        }
    }

    /// Names with a permanently installed accessor.
    pub fn accessor_names(&self) -> Vec<String> {
        self.ty.id().map(|id| self.schema.accessor_names(id)).unwrap_or_default()
    }

    pub fn parent(&self) -> Option<StructType<'s>> {
        let parent = self.schema.parent(self.ty.id()?)?;
        Some(self.schema.handle(TypeRef::Named(parent)))
    }

    pub fn subtype(&self, derived: &str) -> Option<StructType<'s>> {
        let id = self.ty.id()?;
        self.schema
            .subtypes(id)
            .into_iter()
            .find(|(name, _)| name == derived)
            .map(|(_, sub)| self.schema.handle(TypeRef::Named(sub)))
    }
}

impl std::fmt::Debug for StructType<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StructType").field("name", &self.name()).field("ty", &self.ty).finish()
    }
}

impl PartialEq for StructType<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.schema, other.schema) && self.ty == other.ty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(value: Value) -> Map<String, Value> {
        into_mapping(value)
    }

    #[test]
    fn declare_is_idempotent() {
        let schema = Schema::new();
        let a = schema.declare("MyStruct");
        let b = schema.declare("MyStruct");
        assert_eq!(a, b);
        assert_eq!(schema.len(), 1);
        assert_eq!(schema.find("MyStruct"), Some(a));
        assert_eq!(schema.find("Other"), None);
    }

    #[test]
    fn subtype_registry_memoizes_per_owner() {
        let schema = Schema::new();
        let owner = schema.declare("Owner").id().unwrap();
        let other = schema.declare("Other").id().unwrap();

        let date = schema.subtype(owner, "Date");
        assert_eq!(schema.subtype(owner, "Date"), date);
        assert_ne!(schema.subtype(other, "Date"), date);
        assert_eq!(schema.type_name(TypeRef::Named(date)), "Owner::Date");
        assert_eq!(schema.parent(date), Some(owner));
        assert_eq!(schema.find("Owner::Date").and_then(|t| t.id()), Some(date));
    }

    #[test]
    fn learned_accessors_are_shared_by_instances() {
        let schema = Schema::new();
        let ty = schema.declare("MyLearningStruct1");

        let first = ty.wrap(map(json!({"data": ["Jeff"]})));
        assert_eq!(first.get("data").unwrap(), json!(["Jeff"]));

        let second = ty.wrap(map(json!({"errors": ["failed to get response"]})));
        assert_eq!(second.get("data").unwrap(), json!([]));
        assert_eq!(second.get("errors").unwrap(), json!(["failed to get response"]));

        assert_eq!(ty.accessor_names(), vec!["data".to_string(), "errors".to_string()]);
    }

    #[test]
    fn learned_struct_lists_default_to_empty() {
        let schema = Schema::new();
        let ty = schema.declare("MyLearningStruct2");

        let first = ty.wrap(map(json!({"data": [{"name": "Jeff"}]})));
        let names: Vec<_> = first
            .get("data")
            .unwrap()
            .as_list()
            .unwrap()
            .iter()
            .map(|d| d.get("name").unwrap().to_value())
            .collect();
        assert_eq!(names, vec![json!("Jeff")]);

        let second = ty.wrap(map(json!({"errors": ["failed to get response"]})));
        assert_eq!(second.get("data").unwrap().as_list().map(<[_]>::len), Some(0));
        assert!(ty.subtype("Datum").is_some());
    }

    #[test]
    fn learned_nested_keys_survive_empty_mappings() {
        let schema = Schema::new();
        let ty = schema.declare("MyLearningStruct3");

        let first = ty.wrap(map(json!({"data": {"stepUp": "Jeff", "stepDown": ["1"]}})));
        let data = first.get("data").unwrap();
        assert_eq!(data.get("step_up").unwrap(), json!("Jeff"));
        assert_eq!(data.get("step_down").unwrap().to_value()[0], json!("1"));

        let second = ty.wrap(map(json!({"data": {}})));
        let data = second.get("data").unwrap();
        assert!(data.get("step_up").unwrap().is_null());
        assert_eq!(data.get("step_down").unwrap(), json!([]));

        let third = ty.wrap(map(json!({"data": null})));
        assert!(third.get("data").unwrap().is_null());
    }

    #[test]
    fn empty_arrays_defer_until_evidence_arrives() {
        let schema = Schema::new();
        let ty = schema.declare("Deferred");

        let empty = ty.wrap(map(json!({"items": []})));
        assert_eq!(empty.get("items").unwrap(), json!([]));
        assert!(ty.accessor_names().is_empty());
        assert!(ty.subtype("Item").is_none());

        let full = ty.wrap(map(json!({"items": [{"id": 7}]})));
        let items = full.get("items").unwrap();
        assert_eq!(items.at(0).unwrap().get("id").unwrap(), json!(7));
        let item = ty.subtype("Item").expect("subtype created");
        assert_eq!(item.name(), "Deferred::Item");
        assert_eq!(items.at(0).unwrap().as_struct().unwrap().type_ref(), item.type_ref());
    }

    #[test]
    fn named_query_suffix_is_presence_only() {
        let schema = Schema::new();
        let ty = schema.declare("MyMissingStruct");

        let first = ty.wrap(map(json!({"version": 1, "rubyVersion": "2.5.0"})));
        for name in ["version?", "rubyVersion?", "ruby_version?"] {
            assert_eq!(first.get(name).unwrap(), json!(true));
        }
        assert_eq!(first.get("unknown?").unwrap(), json!(false));

        let second = ty.wrap(map(json!({"unknown": null})));
        for name in ["version?", "rubyVersion?", "ruby_version?"] {
            assert_eq!(second.get(name).unwrap(), json!(false));
        }
        assert_eq!(second.get("unknown?").unwrap(), json!(true));
    }

    #[test]
    fn root_handle_refuses_examples() {
        let schema = Schema::new();
        let err = schema.root().example(map(json!({"a": 1}))).unwrap_err();
        assert_eq!(err, Error::InvalidRootUsage);
        assert!(schema.root().type_profile().is_empty());
    }

    #[test]
    fn schema_settings_flow_into_instances() {
        let settings = Settings { strip_chars: vec!['$'], query_suffix: "_present".to_string() };
        let schema = Schema::with_settings(settings);
        let s = schema.root().wrap(map(json!({"$ref": "#/a", "inner": {"$id": 1}})));
        assert_eq!(s.get("ref").unwrap(), json!("#/a"));
        assert_eq!(s.get("ref_present").unwrap(), json!(true));
        assert_eq!(s.get("inner").unwrap().get("id").unwrap(), json!(1));
    }
}
