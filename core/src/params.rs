//! Ordered multimap for query strings and form bodies.

use serde::Serialize;
use url::form_urlencoded;

use crate::error::RestError;

/// Key/value pairs in insertion order. Duplicate keys are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    entries: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build entries from a record's serialized fields, in declaration order.
    ///
    /// Fields excluded with `#[serde(skip)]` or `skip_serializing_if` do not
    /// appear. Nested values are rejected by the serializer.
    pub fn from_struct<T: Serialize + ?Sized>(value: &T) -> Result<Self, RestError> {
        let encoded = serde_urlencoded::to_string(value)
            .map_err(|e| RestError::Serialization(e.to_string()))?;
        let entries = form_urlencoded::parse(encoded.as_bytes())
            .into_owned()
            .collect();
        Ok(Self { entries })
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.push((key.into(), value.into()));
    }

    pub fn extend(&mut self, other: Params) {
        self.entries.extend(other.entries);
    }

    /// First value for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `application/x-www-form-urlencoded` encoding in insertion order.
    pub fn encode(&self) -> String {
        form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.iter())
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Params
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Search {
        q: String,
        page: u32,
        #[serde(skip)]
        #[allow(dead_code)]
        internal: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        lang: Option<String>,
    }

    #[test]
    fn duplicate_keys_keep_insertion_order() {
        let mut params = Params::new();
        params.add("k1", "v1");
        params.add("k1", "v2");
        params.add("k2", "v3");
        assert_eq!(params.encode(), "k1=v1&k1=v2&k2=v3");
        assert_eq!(params.get("k1"), Some("v1"));
        assert_eq!(params.get_all("k1").collect::<Vec<_>>(), vec!["v1", "v2"]);
    }

    #[test]
    fn encoding_escapes_reserved_characters() {
        let params: Params = [("q", "a b&c"), ("x/y", "é")].into_iter().collect();
        assert_eq!(params.encode(), "q=a+b%26c&x%2Fy=%C3%A9");
    }

    #[test]
    fn empty_params_encode_to_empty_string() {
        assert_eq!(Params::new().encode(), "");
        assert!(Params::new().is_empty());
    }

    #[test]
    fn from_struct_skips_excluded_fields() {
        let search = Search {
            q: "rust lang".to_string(),
            page: 2,
            internal: "secret".to_string(),
            lang: None,
        };
        let params = Params::from_struct(&search).unwrap();
        assert_eq!(params.len(), 2);
        assert_eq!(params.get("q"), Some("rust lang"));
        assert_eq!(params.get("page"), Some("2"));
        assert_eq!(params.get("internal"), None);
        assert_eq!(params.encode(), "q=rust+lang&page=2");
    }

    #[test]
    fn from_struct_rejects_nested_values() {
        #[derive(Serialize)]
        struct Nested {
            inner: Vec<u32>,
        }
        let err = Params::from_struct(&Nested { inner: vec![1] }).unwrap_err();
        assert!(matches!(err, RestError::Serialization(_)));
    }
}
