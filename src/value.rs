use serde_json::{Map, Value};
use std::fmt;

/// The payload of a cookie written or read through a [`CookieStore`].
///
/// Structured values are serialized to JSON before being stored; scalar values
/// are stored as is.
///
/// ```rust
/// use amaretti::CookieValue;
/// use serde_json::{json, Map, Value};
///
/// let scalar = CookieValue::from("abc");
/// assert_eq!(scalar.as_str(), Some("abc"));
///
/// let mut user = Map::new();
/// user.insert("name".into(), json!("Rafael"));
/// user.insert("role".into(), json!("Developer"));
/// let structured = CookieValue::from(user);
/// assert_eq!(structured.get("role"), Some(&Value::from("Developer")));
/// assert_eq!(structured.to_string(), r#"{"name":"Rafael","role":"Developer"}"#);
/// ```
///
/// [`CookieStore`]: crate::CookieStore
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieValue {
    Scalar(String),
    /// An ordered key-value map, stored as a JSON object.
    Structured(Map<String, Value>),
}

impl CookieValue {
    /// Returns the string if `self` is a `Scalar`.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CookieValue::Scalar(s) => Some(s),
            CookieValue::Structured(_) => None,
        }
    }

    /// Returns the map if `self` is `Structured`.
    pub fn as_map(&self) -> Option<&Map<String, Value>> {
        match self {
            CookieValue::Scalar(_) => None,
            CookieValue::Structured(map) => Some(map),
        }
    }

    /// Looks up `key` if `self` is `Structured`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.as_map().and_then(|map| map.get(key))
    }

    pub fn is_structured(&self) -> bool {
        matches!(self, CookieValue::Structured(_))
    }

    /// The text that ends up in the cookie before any encoding: the string
    /// itself for scalars, compact JSON for structured values.
    pub fn to_text(&self) -> String {
        match self {
            CookieValue::Scalar(s) => s.clone(),
            // Serializing a map with string keys cannot fail.
            CookieValue::Structured(map) => Value::Object(map.clone()).to_string(),
        }
    }

    /// Interprets decoded cookie text: JSON objects become `Structured`,
    /// everything else is kept verbatim as a `Scalar`.
    pub(crate) fn from_text(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Object(map)) => CookieValue::Structured(map),
            _ => CookieValue::Scalar(text),
        }
    }
}

impl fmt::Display for CookieValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CookieValue::Scalar(s) => f.write_str(s),
            CookieValue::Structured(map) => write!(f, "{}", Value::Object(map.clone())),
        }
    }
}

impl From<String> for CookieValue {
    fn from(value: String) -> Self {
        CookieValue::Scalar(value)
    }
}

impl From<&str> for CookieValue {
    fn from(value: &str) -> Self {
        CookieValue::Scalar(value.to_string())
    }
}

impl From<Map<String, Value>> for CookieValue {
    fn from(value: Map<String, Value>) -> Self {
        CookieValue::Structured(value)
    }
}

impl PartialEq<str> for CookieValue {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == Some(other)
    }
}

impl PartialEq<&str> for CookieValue {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == Some(*other)
    }
}

#[cfg(test)]
mod tests {
    use super::CookieValue;
    use serde_json::{json, Map};

    #[test]
    fn json_keeps_unicode_and_slashes_unescaped() {
        let mut map = Map::new();
        map.insert("path".into(), json!("/a/b"));
        map.insert("name".into(), json!("José"));
        let value = CookieValue::from(map);
        assert_eq!(value.to_text(), r#"{"path":"/a/b","name":"José"}"#);
    }

    #[test]
    fn objects_are_structured() {
        let value = CookieValue::from_text(r#"{"b":1,"a":[1,2]}"#.to_string());
        let map = value.as_map().unwrap();
        let keys: Vec<_> = map.keys().map(String::as_str).collect();
        assert_eq!(keys, ["b", "a"]);
        assert_eq!(value.get("a"), Some(&json!([1, 2])));
    }

    #[test]
    fn everything_else_is_scalar() {
        for text in ["plain", "123", "[1,2]", "\"quoted\"", "true", "{broken", ""] {
            assert_eq!(
                CookieValue::from_text(text.to_string()),
                CookieValue::Scalar(text.to_string())
            );
        }
    }
}
