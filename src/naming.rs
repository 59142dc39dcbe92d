//! Accessor-name lookup tables built from the raw keys of a mapping.
use indexmap::{IndexMap, IndexSet};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};

use crate::config::Settings;
use crate::inflect;

static SEPARATOR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.\s]+").expect("separator pattern"));

/// Every accessor name a mapping answers to, pointing at its raw key.
///
/// Later raw keys overwrite earlier ones when two keys produce the same name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NameLookup {
    names: IndexMap<String, String>,
    base_names: IndexSet<String>,
}

impl NameLookup {
    pub fn build(raw: &Map<String, Value>, settings: &Settings) -> Self {
        let mut lookup = Self::default();
        for key in raw.keys() {
            let cleaned: String = key.chars().filter(|c| !settings.strip_chars.contains(c)).collect();
            if !cleaned.starts_with(|c: char| c.is_ascii_alphabetic()) {
                continue;
            }
            let normalized = SEPARATOR_RUN.replace_all(&cleaned, "_").into_owned();
            let snake = inflect::underscore(&normalized);

            lookup.names.insert(cleaned, key.clone());
            lookup.names.insert(normalized.clone(), key.clone());
            lookup.names.insert(snake, key.clone());
            lookup.base_names.insert(normalized);
        }
        lookup
    }

    /// Exact, case-sensitive lookup of the raw key behind `name`.
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.names.get(name).map(String::as_str)
    }

    /// All registered names, aliases included, in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.keys().map(String::as_str)
    }

    /// One normalized name per accepted raw key.
    pub fn base_names(&self) -> impl Iterator<Item = &str> {
        self.base_names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup(value: Value) -> NameLookup {
        let Value::Object(map) = value else { panic!("fixture must be an object") };
        NameLookup::build(&map, &Settings::default())
    }

    #[test]
    fn registers_raw_key_and_snake_alias() {
        let l = lookup(json!({"version": 1, "rubyVersion": "2.5.0"}));
        assert_eq!(l.resolve("version"), Some("version"));
        assert_eq!(l.resolve("rubyVersion"), Some("rubyVersion"));
        assert_eq!(l.resolve("ruby_version"), Some("rubyVersion"));
        assert_eq!(l.resolve("RubyVersion"), None);
        assert_eq!(l.base_names().collect::<Vec<_>>(), vec!["version", "rubyVersion"]);
    }

    #[test]
    fn strips_at_and_normalizes_separators() {
        let l = lookup(json!({"@type": "x", "geo.lat lng": 1, "first  name": "a"}));
        assert_eq!(l.resolve("type"), Some("@type"));
        assert_eq!(l.resolve("@type"), None);
        assert_eq!(l.resolve("geo.lat lng"), Some("geo.lat lng"));
        assert_eq!(l.resolve("geo_lat_lng"), Some("geo.lat lng"));
        assert_eq!(l.resolve("first_name"), Some("first  name"));
    }

    #[test]
    fn snake_case_keys_keep_their_underscores() {
        let l = lookup(json!({"a__b": 1, "tail_": 2}));
        assert_eq!(l.resolve("a__b"), Some("a__b"));
        assert_eq!(l.resolve("a_b"), None);
        assert_eq!(l.resolve("tail_"), Some("tail_"));
        assert_eq!(l.resolve("tail"), None);
    }

    #[test]
    fn rejects_keys_not_starting_with_a_letter() {
        let l = lookup(json!({"1st": 1, "_private": 2, "@": 3, "ok": 4}));
        assert_eq!(l.resolve("1st"), None);
        assert_eq!(l.resolve("_private"), None);
        assert_eq!(l.base_names().collect::<Vec<_>>(), vec!["ok"]);
    }

    #[test]
    fn later_key_wins_alias_collision() {
        let l = lookup(json!({"fooBar": 1, "foo_bar": 2}));
        assert_eq!(l.resolve("foo_bar"), Some("foo_bar"));
        assert_eq!(l.resolve("fooBar"), Some("fooBar"));

        let l = lookup(json!({"foo_bar": 2, "fooBar": 1}));
        assert_eq!(l.resolve("foo_bar"), Some("fooBar"));
    }

    #[test]
    fn custom_strip_chars() {
        let Value::Object(map) = json!({"$ref": "a", "@id": 1}) else { unreachable!() };
        let settings = Settings { strip_chars: vec!['$'], ..Settings::default() };
        let l = NameLookup::build(&map, &settings);
        assert_eq!(l.resolve("ref"), Some("$ref"));
        assert_eq!(l.resolve("id"), None);
    }
}
