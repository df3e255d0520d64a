//! Cache Key Module
//!
//! Derives deterministic cache keys from a namespace and a parameter map.

use std::collections::BTreeMap;
use std::fmt::Display;

use serde_json::Value;

/// Separator between the namespace and the flattened parameters.
pub const NAMESPACE_SEPARATOR: &str = "::";

// == Cache Params ==
/// Query parameters identifying one cached result within a namespace.
///
/// Backed by a `BTreeMap`, so iteration is always in ascending name order
/// regardless of insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheParams {
    inner: BTreeMap<String, String>,
}

impl CacheParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder form of [`insert`](Self::insert).
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces a parameter, storing the value's display form.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.inner.insert(name.into(), value.to_string());
    }

    /// Flattens a JSON object into parameters.
    ///
    /// Strings are taken verbatim, numbers and booleans use their display form,
    /// arrays and objects their compact JSON form. `null` members are omitted
    /// like missing properties. Non-object input yields an empty set.
    pub fn from_json(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            return Self::new();
        };

        let inner = object
            .iter()
            .filter_map(|(name, value)| {
                let text = match value {
                    Value::Null => return None,
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                Some((name.clone(), text))
            })
            .collect();

        Self { inner }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Iterates parameters in ascending name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inner.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K, V> FromIterator<(K, V)> for CacheParams
where
    K: Into<String>,
    V: Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Self::new();
        for (name, value) in iter {
            params.insert(name, value);
        }
        params
    }
}

// == Key Derivation ==
/// Derives the cache key for `namespace` and `params`.
///
/// Returns the namespace alone for empty params, otherwise
/// `namespace::k1:v1|k2:v2` with names in ascending order. Parameter names
/// and values are escaped so that distinct parameter sets never share a key.
pub fn generate_key(namespace: &str, params: &CacheParams) -> String {
    if params.is_empty() {
        return namespace.to_string();
    }

    let flattened = params
        .iter()
        .map(|(name, value)| format!("{}:{}", escape(name), escape(value)))
        .collect::<Vec<_>>()
        .join("|");

    format!("{namespace}{NAMESPACE_SEPARATOR}{flattened}")
}

/// Percent-escapes the characters that carry structure inside a key.
fn escape(raw: &str) -> String {
    if !raw.contains(['%', ':', '|']) {
        return raw.to_string();
    }

    let mut out = String::with_capacity(raw.len() + 4);
    for c in raw.chars() {
        match c {
            '%' => out.push_str("%25"),
            ':' => out.push_str("%3A"),
            '|' => out.push_str("%7C"),
            other => out.push(other),
        }
    }
    out
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_params_yield_namespace() {
        assert_eq!(generate_key("groups", &CacheParams::new()), "groups");
    }

    #[test]
    fn test_params_sorted_by_name() {
        let params = CacheParams::new().with("q", "ab").with("page", 2);
        assert_eq!(generate_key("offers", &params), "offers::page:2|q:ab");
    }

    #[test]
    fn test_insertion_order_irrelevant() {
        let a: CacheParams = [("b", "2"), ("a", "1")].into_iter().collect();
        let b: CacheParams = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(generate_key("ns", &a), generate_key("ns", &b));
    }

    #[test]
    fn test_delimiters_are_escaped() {
        let tricky = CacheParams::new().with("q", "a|b:c");
        let split: CacheParams = [("q", "a"), ("b", "c")].into_iter().collect();

        assert_eq!(generate_key("ns", &tricky), "ns::q:a%7Cb%3Ac");
        assert_ne!(generate_key("ns", &tricky), generate_key("ns", &split));
    }

    #[test]
    fn test_percent_is_escaped() {
        let literal = CacheParams::new().with("q", "%7C");
        let pipe = CacheParams::new().with("q", "|");
        assert_ne!(generate_key("ns", &literal), generate_key("ns", &pipe));
    }

    #[test]
    fn test_from_json_coercion() {
        let params = CacheParams::from_json(&json!({
            "q": "rust",
            "page": 3,
            "remote": true,
            "tags": ["a", "b"],
            "cursor": null
        }));

        assert_eq!(params.len(), 4);
        assert_eq!(
            generate_key("offers", &params),
            r#"offers::page:3|q:rust|remote:true|tags:["a","b"]"#
        );
    }

    #[test]
    fn test_from_json_non_object_is_empty() {
        assert!(CacheParams::from_json(&json!([1, 2])).is_empty());
        assert!(CacheParams::from_json(&json!("x")).is_empty());
    }
}
