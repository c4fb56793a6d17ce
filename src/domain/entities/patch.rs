use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Tri-state field for partial updates.
///
/// - `Unchanged` → field absent from the payload, never sent to the backend
/// - `Null` → explicitly cleared
/// - `Set` → replaced with the provided value
///
/// Fields of this type must carry `#[serde(default, skip_serializing_if = "Patch::is_unchanged")]`
/// so that absence round-trips as absence.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Patch<T> {
    #[default]
    Unchanged,
    Null,
    Set(T),
}

impl<T> Patch<T> {
    pub fn is_unchanged(&self) -> bool {
        matches!(self, Self::Unchanged)
    }

    pub fn value_ref(&self) -> Option<&T> {
        match self {
            Self::Set(v) => Some(v),
            _ => None,
        }
    }

    /// Nested option view: `None` unchanged, `Some(None)` cleared, `Some(Some(v))` set.
    pub fn into_option(self) -> Option<Option<T>> {
        match self {
            Self::Unchanged => None,
            Self::Null => Some(None),
            Self::Set(v) => Some(Some(v)),
        }
    }
}

impl<T> From<Option<Option<T>>> for Patch<T> {
    fn from(opt: Option<Option<T>>) -> Self {
        match opt {
            None => Patch::Unchanged,
            Some(None) => Patch::Null,
            Some(Some(v)) => Patch::Set(v),
        }
    }
}

impl<T> From<T> for Patch<T> {
    fn from(value: T) -> Self {
        Patch::Set(value)
    }
}

impl<T: Serialize> Serialize for Patch<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Patch::Set(v) => v.serialize(serializer),
            _ => serializer.serialize_none(),
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Patch<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match Option::<T>::deserialize(deserializer)? {
            Some(v) => Patch::Set(v),
            None => Patch::Null,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Payload {
        #[serde(default, skip_serializing_if = "Patch::is_unchanged")]
        demo_url: Patch<String>,
    }

    #[test]
    fn absent_field_is_unchanged_and_omitted() {
        let parsed: Payload = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.demo_url, Patch::Unchanged);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), "{}");
    }

    #[test]
    fn null_field_clears_value() {
        let parsed: Payload = serde_json::from_str(r#"{"demo_url":null}"#).unwrap();
        assert_eq!(parsed.demo_url, Patch::Null);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#"{"demo_url":null}"#);
    }

    #[test]
    fn present_field_sets_value() {
        let parsed: Payload = serde_json::from_str(r#"{"demo_url":"https://x.dev"}"#).unwrap();
        assert_eq!(parsed.demo_url, Patch::Set("https://x.dev".to_string()));
    }
}
