//! Read decoded JSON through camelCase or snake_case names, no schema required.
//!
//! ```
//! use camel_snake_struct::CamelSnakeStruct;
//! use serde_json::json;
//!
//! let s = CamelSnakeStruct::from_value(json!({"rubyVersion": "2.5.0"}));
//! assert_eq!(s.get("ruby_version").unwrap(), json!("2.5.0"));
//! assert_eq!(s.get("ruby_version?").unwrap(), json!(true));
//! ```
//!
//! Named types declared on a [`Schema`] remember the accessors they have seen
//! and can learn from example payloads:
//!
//! ```
//! use camel_snake_struct::Schema;
//! use serde_json::json;
//!
//! let schema = Schema::new();
//! let payload = schema.declare("Payload");
//! let example = json!({"date": {"timezone": "UTC"}});
//! payload.example(example.as_object().unwrap().clone()).unwrap();
//!
//! let empty = payload.from_value(json!({}));
//! assert!(empty.get("date").unwrap().is_null());
//! ```
pub mod config;
pub mod error;
pub mod inflect;
pub mod naming;
pub mod record;
pub mod schema;
pub mod value;

pub use config::{ConfigError, Settings};
pub use error::{Error, Result};
pub use naming::NameLookup;
pub use record::CamelSnakeStruct;
pub use schema::{
    emit_profile, Accessor, FieldProfile, NamedType, Schema, StructType, TypeId, TypeProfile, TypeRef,
    ValueCategory,
};
pub use value::{box_value, Field};
