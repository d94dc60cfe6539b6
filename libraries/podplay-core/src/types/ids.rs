//! ID types for Podplay entities
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Podcast identifier
///
/// Opaque string id of a podcast item, also used as the favorite id and the
/// history entry id. Older app versions persisted numeric ids, so
/// deserialization accepts JSON numbers and coerces them to their decimal
/// string form. Serialization always writes a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct PodcastId(String);

impl PodcastId {
    /// Create a new podcast ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get the inner string
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Interpret a raw persisted JSON value as an id
    ///
    /// Returns the id and whether it had to be coerced from a legacy numeric
    /// representation. Anything other than a string or a number is rejected.
    pub fn from_legacy_value(value: &serde_json::Value) -> Option<(Self, bool)> {
        match value {
            serde_json::Value::String(s) => Some((Self(s.clone()), false)),
            serde_json::Value::Number(n) => Some((Self(number_to_id(n)), true)),
            _ => None,
        }
    }
}

fn number_to_id(n: &serde_json::Number) -> String {
    if let Some(i) = n.as_i64() {
        return i.to_string();
    }
    if let Some(u) = n.as_u64() {
        return u.to_string();
    }
    match n.as_f64() {
        // 42.0 was written by clients that stored ids as JS numbers
        Some(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => format!("{}", f as i64),
        _ => n.to_string(),
    }
}

impl<'de> Deserialize<'de> for PodcastId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = serde_json::Value::deserialize(deserializer)?;
        PodcastId::from_legacy_value(&value)
            .map(|(id, _)| id)
            .ok_or_else(|| {
                serde::de::Error::custom(format!("expected string or number id, got {value}"))
            })
    }
}

impl fmt::Display for PodcastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for PodcastId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for PodcastId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_string_id() {
        let id: PodcastId = serde_json::from_value(json!("p1")).unwrap();
        assert_eq!(id.as_str(), "p1");
    }

    #[test]
    fn coerces_numeric_ids() {
        let id: PodcastId = serde_json::from_value(json!(42)).unwrap();
        assert_eq!(id.as_str(), "42");

        let id: PodcastId = serde_json::from_value(json!(7.0)).unwrap();
        assert_eq!(id.as_str(), "7");
    }

    #[test]
    fn rejects_other_shapes() {
        assert!(serde_json::from_value::<PodcastId>(json!(null)).is_err());
        assert!(serde_json::from_value::<PodcastId>(json!({"id": 1})).is_err());
    }

    #[test]
    fn always_serializes_as_string() {
        let id: PodcastId = serde_json::from_value(json!(13)).unwrap();
        assert_eq!(serde_json::to_value(&id).unwrap(), json!("13"));
    }

    #[test]
    fn legacy_value_reports_coercion() {
        assert_eq!(
            PodcastId::from_legacy_value(&json!("a")),
            Some((PodcastId::new("a"), false))
        );
        assert_eq!(
            PodcastId::from_legacy_value(&json!(5)),
            Some((PodcastId::new("5"), true))
        );
        assert_eq!(PodcastId::from_legacy_value(&json!(true)), None);
    }
}
