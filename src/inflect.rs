//! Casing and singularization helpers used to derive accessor and type names.
//!
//! Casing goes through `heck`. Singularization is a small table-and-suffix
//! rule set applied to the trailing word of an identifier, so `userAddresses`
//! becomes `userAddress` and `line_items` becomes `line_item`.
use heck::{ToSnakeCase, ToUpperCamelCase};

/// Irregular plural → singular, sorted by plural for binary search.
static IRREGULARS: &[(&str, &str)] = &[
    ("aliases", "alias"),
    ("analyses", "analysis"),
    ("axes", "axis"),
    ("bases", "basis"),
    ("bonuses", "bonus"),
    ("buses", "bus"),
    ("campuses", "campus"),
    ("children", "child"),
    ("crises", "crisis"),
    ("criteria", "criterion"),
    ("data", "datum"),
    ("diagnoses", "diagnosis"),
    ("feet", "foot"),
    ("gases", "gas"),
    ("geese", "goose"),
    ("indices", "index"),
    ("lenses", "lens"),
    ("matrices", "matrix"),
    ("media", "medium"),
    ("men", "man"),
    ("mice", "mouse"),
    ("oxen", "ox"),
    ("people", "person"),
    ("quizzes", "quiz"),
    ("statuses", "status"),
    ("teeth", "tooth"),
    ("theses", "thesis"),
    ("vertices", "vertex"),
    ("viruses", "virus"),
    ("women", "woman"),
];

/// Same in singular and plural; sorted.
static UNCOUNTABLE: &[&str] = &[
    "equipment",
    "fish",
    "information",
    "jeans",
    "metadata",
    "money",
    "news",
    "police",
    "rice",
    "series",
    "sheep",
    "species",
];

/// snake_case form of an accessor name (`rubyVersion` → `ruby_version`).
///
/// Names already in snake_case come back unchanged, separator runs included.
pub fn underscore(name: &str) -> String {
    if is_snake_case(name) {
        return name.to_string();
    }
    name.to_snake_case()
}

fn is_snake_case(name: &str) -> bool {
    name.bytes().all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'_')
}

/// Type-name form of a field name (`unix_time` → `UnixTime`).
pub fn type_name(name: &str) -> String {
    name.to_upper_camel_case()
}

/// Singularize the trailing word of an identifier, keeping the rest as-is.
pub fn singularize(name: &str) -> String {
    let start = last_word_start(name);
    let (head, word) = name.split_at(start);
    if word.is_empty() {
        return name.to_string();
    }

    let lower = word.to_ascii_lowercase();
    let singular = singularize_word(&lower);
    if singular == lower {
        return name.to_string();
    }

    // Restore a leading capital from camelCase / PascalCase input.
    let mut out = String::with_capacity(name.len());
    out.push_str(head);
    let mut chars = singular.chars();
    if let Some(first) = chars.next() {
        if word.starts_with(|c: char| c.is_ascii_uppercase()) {
            out.push(first.to_ascii_uppercase());
        } else {
            out.push(first);
        }
        out.extend(chars);
    }
    out
}

/// Byte offset where the last word of a snake_case or camelCase name begins.
fn last_word_start(name: &str) -> usize {
    let mut start = 0;
    let mut prev: Option<char> = None;
    for (i, c) in name.char_indices() {
        if c == '_' || c == '-' {
            start = i + c.len_utf8();
        } else if c.is_ascii_uppercase() && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit()) {
            start = i;
        }
        prev = Some(c);
    }
    start
}

fn singularize_word(word: &str) -> String {
    if let Ok(idx) = IRREGULARS.binary_search_by_key(&word, |&(plural, _)| plural) {
        return IRREGULARS[idx].1.to_string();
    }
    if UNCOUNTABLE.binary_search(&word).is_ok() {
        return word.to_string();
    }
    singularize_suffix(word).unwrap_or_else(|| word.to_string())
}

fn singularize_suffix(word: &str) -> Option<String> {
    let len = word.len();
    if len < 2 {
        return None;
    }

    if len > 3 && word.ends_with("ies") {
        let prefix = &word[..len - 3];
        if !prefix.ends_with(['a', 'e', 'o', 'u']) {
            return Some(format!("{prefix}y"));
        }
    }

    if len > 3 && word.ends_with("ves") {
        let prefix = &word[..len - 3];
        if matches!(prefix, "kni" | "wi" | "li") {
            return Some(format!("{prefix}fe"));
        }
        if prefix.ends_with("ea") || prefix.ends_with("oa") || prefix.ends_with('l') {
            return Some(format!("{prefix}f"));
        }
    }

    if len > 2 && word.ends_with("es") {
        let prefix = &word[..len - 2];
        if prefix.ends_with("ss")
            || prefix.ends_with('x')
            || prefix.ends_with('z')
            || prefix.ends_with("ch")
            || prefix.ends_with("sh")
        {
            return Some(prefix.to_string());
        }
    }

    if word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") && !word.ends_with("is") {
        return Some(word[..len - 1].to_string());
    }

    None
}
