//! Route attributes and typed extraction.
//!
//! Captured path parameters land in a route's attributes next to any
//! attributes declared at registration. Actions receive them as [`Params`]
//! and pull typed values out by name:
//!
//! ```rust,ignore
//! router.get("/users/{id}", |params: &Params| {
//!     let id: u64 = params.parse("id")?;
//!     Ok::<_, ExtractError>(format!("user {id}"))
//! });
//! ```

use crate::error::ExtractError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::{collections::BTreeMap, fmt::Display, str::FromStr};

/// Named attribute values attached to a route.
pub type Attributes = BTreeMap<String, Value>;

/// The named inputs an action is invoked with.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Params {
    values: Attributes,
}

impl Params {
    /// Create an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a value.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }

    /// Raw value lookup.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// String value lookup. Captured path parameters are always strings.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.values.get(name).and_then(Value::as_str)
    }

    /// Parse a string attribute with [`FromStr`].
    pub fn parse<T>(&self, name: &str) -> Result<T, ExtractError>
    where
        T: FromStr,
        T::Err: Display,
    {
        let raw = self
            .str(name)
            .ok_or_else(|| ExtractError::Missing(name.to_string()))?;

        raw.parse().map_err(|e: T::Err| ExtractError::Invalid {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// Deserialize an attribute of any shape.
    pub fn extract<T: DeserializeOwned>(&self, name: &str) -> Result<T, ExtractError> {
        let value = self
            .get(name)
            .cloned()
            .ok_or_else(|| ExtractError::Missing(name.to_string()))?;

        serde_json::from_value(value).map_err(|e| ExtractError::Invalid {
            name: name.to_string(),
            reason: e.to_string(),
        })
    }

    /// True if `name` is present.
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Number of values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if there are no values.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over name/value pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Consume into the underlying map.
    pub fn into_inner(self) -> Attributes {
        self.values
    }
}

impl From<Attributes> for Params {
    fn from(values: Attributes) -> Self {
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_number() {
        let params = Params::new().with("id", "42");
        assert_eq!(params.parse::<u64>("id").unwrap(), 42);
    }

    #[test]
    fn test_parse_invalid() {
        let params = Params::new().with("id", "abc");
        let err = params.parse::<u64>("id").unwrap_err();
        assert!(matches!(err, ExtractError::Invalid { ref name, .. } if name == "id"));
    }

    #[test]
    fn test_missing() {
        let err = Params::new().parse::<u64>("id").unwrap_err();
        assert!(matches!(err, ExtractError::Missing(ref name) if name == "id"));
    }

    #[test]
    fn test_extract_structured_attribute() {
        let params = Params::new().with("tags", json!(["a", "b"]));
        let tags: Vec<String> = params.extract("tags").unwrap();
        assert_eq!(tags, vec!["a", "b"]);
        assert_eq!(params.str("tags"), None);
    }
}
