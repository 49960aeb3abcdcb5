use chrono::prelude::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{ApiError, FieldError};

pub const TITLE_MAX_CHARS: usize = 200;
pub const DESCRIPTION_MAX_CHARS: usize = 1000;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct TaskCreate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl TaskCreate {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        check_title(&self.title, &mut errors);
        if let Some(description) = &self.description {
            check_description(description, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

/// Partial update payload. Every field is optional, and for the nullable
/// `description` an omitted field and an explicit `null` mean different
/// things: omitted keeps the stored value, `null` clears it.
#[derive(Deserialize, Debug, Clone, Default)]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
}

impl TaskUpdate {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            check_title(title, &mut errors);
        }
        if let Some(Some(description)) = &self.description {
            check_description(description, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

// Only called for fields present in the JSON body, so `null` lands as
// `Some(None)` while an absent field stays `None` via the serde default.
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

fn check_title(title: &str, errors: &mut Vec<FieldError>) {
    let chars = title.chars().count();
    if chars == 0 {
        errors.push(FieldError {
            field: "title",
            message: "must not be empty".to_string(),
        });
    } else if chars > TITLE_MAX_CHARS {
        errors.push(FieldError {
            field: "title",
            message: format!("must be at most {} characters", TITLE_MAX_CHARS),
        });
    }
}

fn check_description(description: &str, errors: &mut Vec<FieldError>) {
    if description.chars().count() > DESCRIPTION_MAX_CHARS {
        errors.push(FieldError {
            field: "description",
            message: format!("must be at most {} characters", DESCRIPTION_MAX_CHARS),
        });
    }
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Serialize, Debug, Clone)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_payload_rejects_empty_title() {
        let payload = TaskCreate {
            title: String::new(),
            description: None,
        };
        let err = payload.validate().unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                assert_eq!(errors.len(), 1);
                assert_eq!(errors[0].field, "title");
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn create_payload_rejects_overlong_fields() {
        let payload = TaskCreate {
            title: "x".repeat(TITLE_MAX_CHARS + 1),
            description: Some("y".repeat(DESCRIPTION_MAX_CHARS + 1)),
        };
        let err = payload.validate().unwrap_err();
        match err {
            ApiError::Validation(errors) => {
                let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
                assert_eq!(fields, vec!["title", "description"]);
            }
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn create_payload_accepts_boundary_lengths() {
        let payload = TaskCreate {
            title: "x".repeat(TITLE_MAX_CHARS),
            description: Some("y".repeat(DESCRIPTION_MAX_CHARS)),
        };
        assert!(payload.validate().is_ok());
    }

    #[test]
    fn update_payload_distinguishes_null_from_omitted() {
        let omitted: TaskUpdate = serde_json::from_str(r#"{"title": "new"}"#).unwrap();
        assert_eq!(omitted.title.as_deref(), Some("new"));
        assert!(omitted.description.is_none());

        let cleared: TaskUpdate = serde_json::from_str(r#"{"description": null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));

        let set: TaskUpdate = serde_json::from_str(r#"{"description": "2%"}"#).unwrap();
        assert_eq!(set.description, Some(Some("2%".to_string())));
    }

    #[test]
    fn update_payload_validates_present_fields_only() {
        let empty_body: TaskUpdate = serde_json::from_str("{}").unwrap();
        assert!(empty_body.validate().is_ok());

        let bad_title: TaskUpdate = serde_json::from_str(r#"{"title": ""}"#).unwrap();
        assert!(bad_title.validate().is_err());
    }
}
