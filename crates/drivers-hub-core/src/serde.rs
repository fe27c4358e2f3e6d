//! Query-string friendly deserializers and nullable patch fields.
//!
//! Browsers send empty filters as `?status=&instructor_id=`; these helpers map
//! empty values to `None` instead of failing the whole request.
//!
//! Update DTOs distinguish an absent field from an explicit `null` with
//! `Option<Option<T>>` and [`deserialize_nullable`]:
//!
//! - field missing: `None`, keep the stored value
//! - `null`: `Some(None)`, clear it
//! - a value: `Some(Some(v))`, replace it

use serde::{Deserialize, Deserializer};
use uuid::Uuid;

pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

pub fn deserialize_optional_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected a boolean, got '{}'",
            other
        ))),
    }
}

/// Use with `#[serde(default, deserialize_with = "deserialize_nullable")]`.
pub fn deserialize_nullable<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply a nullable patch field to the stored value.
pub fn merge_nullable<T>(patch: Option<Option<T>>, existing: Option<T>) -> Option<T> {
    match patch {
        Some(value) => value,
        None => existing,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Filters {
        #[serde(default, deserialize_with = "deserialize_optional_uuid")]
        instructor_id: Option<Uuid>,
        #[serde(default, deserialize_with = "deserialize_optional_bool")]
        read: Option<bool>,
    }

    #[test]
    fn test_empty_values_become_none() {
        let filters: Filters =
            serde_json::from_str(r#"{"instructor_id": "", "read": ""}"#).unwrap();
        assert!(filters.instructor_id.is_none());
        assert!(filters.read.is_none());
    }

    #[test]
    fn test_values_are_parsed() {
        let id = Uuid::new_v4();
        let json = format!(r#"{{"instructor_id": "{}", "read": "false"}}"#, id);
        let filters: Filters = serde_json::from_str(&json).unwrap();
        assert_eq!(filters.instructor_id, Some(id));
        assert_eq!(filters.read, Some(false));
    }

    #[test]
    fn test_garbage_is_rejected() {
        assert!(serde_json::from_str::<Filters>(r#"{"read": "maybe"}"#).is_err());
        assert!(serde_json::from_str::<Filters>(r#"{"instructor_id": "x"}"#).is_err());
    }

    #[test]
    fn test_missing_fields_default_to_none() {
        let filters: Filters = serde_json::from_str("{}").unwrap();
        assert!(filters.instructor_id.is_none());
        assert!(filters.read.is_none());
    }

    #[derive(Deserialize)]
    struct Patch {
        #[serde(default, deserialize_with = "deserialize_nullable")]
        instructor_id: Option<Option<Uuid>>,
    }

    #[test]
    fn test_nullable_distinguishes_missing_from_null() {
        let missing: Patch = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.instructor_id, None);

        let cleared: Patch = serde_json::from_str(r#"{"instructor_id": null}"#).unwrap();
        assert_eq!(cleared.instructor_id, Some(None));

        let id = Uuid::new_v4();
        let set: Patch =
            serde_json::from_str(&format!(r#"{{"instructor_id": "{}"}}"#, id)).unwrap();
        assert_eq!(set.instructor_id, Some(Some(id)));
    }

    #[test]
    fn test_merge_nullable() {
        let stored = Some(7);
        assert_eq!(merge_nullable(None, stored), Some(7));
        assert_eq!(merge_nullable(Some(None), stored), None);
        assert_eq!(merge_nullable(Some(Some(9)), stored), Some(9));
    }
}
