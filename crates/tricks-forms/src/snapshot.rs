//! Field snapshots and raw submissions

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use tricks_core::AppError;

/// Independent copy of a data model's field values at one point in time.
///
/// Fields are kept sorted by name; comparison looks fields up by name, so
/// the order a model declares them in never affects equality.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSnapshot {
    fields: Vec<(String, Value)>,
}

impl FieldSnapshot {
    /// Capture every field of `model`.
    ///
    /// Returns `None` for models that do not serialize to a map of fields
    /// (they cannot be enumerated field by field).
    pub fn capture<T: Serialize>(model: &T) -> Result<Option<Self>, AppError> {
        let value = serde_json::to_value(model)
            .map_err(|e| AppError::Internal(format!("Failed to snapshot form data: {}", e)))?;

        match value {
            Value::Object(map) => Ok(Some(Self {
                fields: map.into_iter().collect(),
            })),
            _ => Ok(None),
        }
    }

    pub fn from_fields<I, K>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self {
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(name, _)| name.as_str()).collect()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// `true` when every field of `other` strictly equals the same field here.
    ///
    /// Both snapshots must come from the same schema; differing field sets are
    /// an `AppError::SchemaMismatch`, never a "changed" result.
    pub fn compare(&self, other: &FieldSnapshot) -> Result<bool, AppError> {
        let mut expected: Vec<String> = self.fields.iter().map(|(n, _)| n.clone()).collect();
        let mut found: Vec<String> = other.fields.iter().map(|(n, _)| n.clone()).collect();
        expected.sort();
        found.sort();
        if expected != found {
            return Err(AppError::SchemaMismatch { expected, found });
        }

        for (name, value) in &self.fields {
            if other.get(name) != Some(value) {
                tracing::debug!(field = %name, "Form field changed");
                return Ok(false);
            }
        }

        Ok(true)
    }
}

/// Raw submitted field values, before they are mapped onto a model.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission(Map<String, Value>);

impl Submission {
    pub fn new(values: Map<String, Value>) -> Self {
        Self(values)
    }

    pub fn from_pairs<I, K>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self(pairs.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Map the submitted values onto a fresh model instance.
    pub fn map_into<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        serde_json::from_value(Value::Object(self.0.clone())).map_err(|e| {
            AppError::InvalidInput(format!("Submitted data does not fit the form model: {}", e))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
    struct TrickDto {
        name: String,
        description: String,
    }

    #[test]
    fn test_capture_struct() {
        let dto = TrickDto {
            name: "A".to_string(),
            description: "X".to_string(),
        };
        let snapshot = FieldSnapshot::capture(&dto).unwrap().unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.get("name"), Some(&json!("A")));
    }

    #[test]
    fn test_capture_non_struct_is_not_enumerable() {
        assert!(FieldSnapshot::capture(&"plain string").unwrap().is_none());
        assert!(FieldSnapshot::capture(&vec![1, 2, 3]).unwrap().is_none());
    }

    #[test]
    fn test_snapshot_is_independent_copy() {
        let mut dto = TrickDto {
            name: "A".to_string(),
            description: "X".to_string(),
        };
        let snapshot = FieldSnapshot::capture(&dto).unwrap().unwrap();
        dto.description = "Y".to_string();
        assert_eq!(snapshot.get("description"), Some(&json!("X")));
    }

    #[test]
    fn test_compare_identical_and_changed() {
        let before = FieldSnapshot::from_fields([("name", json!("A")), ("desc", json!("X"))]);
        let same = FieldSnapshot::from_fields([("name", json!("A")), ("desc", json!("X"))]);
        let changed = FieldSnapshot::from_fields([("name", json!("A")), ("desc", json!("Y"))]);

        assert!(before.compare(&same).unwrap());
        assert!(!before.compare(&changed).unwrap());
    }

    #[test]
    fn test_compare_ignores_field_order() {
        let before = FieldSnapshot::from_fields([("name", json!("A")), ("desc", json!("X"))]);
        let reordered = FieldSnapshot::from_fields([("desc", json!("X")), ("name", json!("A"))]);
        assert!(before.compare(&reordered).unwrap());
    }

    #[test]
    fn test_compare_is_strict() {
        let before = FieldSnapshot::from_fields([("rank", json!(1))]);
        assert!(!before.compare(&FieldSnapshot::from_fields([("rank", json!("1"))])).unwrap());
        assert!(!before.compare(&FieldSnapshot::from_fields([("rank", json!(1.0))])).unwrap());
        assert!(!before.compare(&FieldSnapshot::from_fields([("rank", Value::Null)])).unwrap());
    }

    #[test]
    fn test_compare_schema_mismatch() {
        let before = FieldSnapshot::from_fields([("name", json!("A")), ("desc", json!("X"))]);
        let other = FieldSnapshot::from_fields([("name", json!("A")), ("title", json!("X"))]);

        let err = before.compare(&other).unwrap_err();
        assert!(matches!(err, AppError::SchemaMismatch { .. }));

        let fewer = FieldSnapshot::from_fields([("name", json!("A"))]);
        assert!(matches!(
            before.compare(&fewer),
            Err(AppError::SchemaMismatch { .. })
        ));
    }

    #[test]
    fn test_submission_map_into() {
        let submission =
            Submission::from_pairs([("name", json!("A")), ("description", json!("X"))]);
        let dto: TrickDto = submission.map_into().unwrap();
        assert_eq!(
            dto,
            TrickDto {
                name: "A".to_string(),
                description: "X".to_string()
            }
        );

        let incomplete = Submission::from_pairs([("name", json!("A"))]);
        assert!(matches!(
            incomplete.map_into::<TrickDto>(),
            Err(AppError::InvalidInput(_))
        ));
    }
}
