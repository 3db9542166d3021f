use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::WebhookError;

/// TVDB ids arrive as numbers from the JSON template variables or as strings
/// when the template quotes them. Anything else is kept and only rejected once
/// the request turns out to be for a TV show.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum TvdbIdValue {
    Number(i64),
    Text(String),
    Other(Value),
}

/// Templates are user-editable, so every field is kept as raw JSON until it
/// is actually needed.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OverseerrMedia {
    #[serde(rename = "mediaType", alias = "media_type", default)]
    pub media_type: Option<Value>,

    #[serde(rename = "tvdbId", default)]
    pub tvdb_id: Option<TvdbIdValue>,
}

impl OverseerrMedia {
    pub fn is_tv(&self) -> bool {
        self.media_type
            .as_ref()
            .and_then(Value::as_str)
            .is_some_and(|media_type| media_type == "tv")
    }

    pub fn tvdb_id(&self) -> Result<u32, WebhookError> {
        match &self.tvdb_id {
            None => Err(WebhookError::MissingIdentifier),
            Some(TvdbIdValue::Number(value)) => u32::try_from(*value)
                .ok()
                .filter(|id| *id > 0)
                .ok_or_else(|| WebhookError::InvalidIdentifier(value.to_string())),
            Some(TvdbIdValue::Text(value)) => {
                let value = value.trim();
                if value.is_empty() {
                    return Err(WebhookError::MissingIdentifier);
                }
                value
                    .parse::<u32>()
                    .ok()
                    .filter(|id| *id > 0)
                    .ok_or_else(|| WebhookError::InvalidIdentifier(value.to_string()))
            }
            Some(TvdbIdValue::Other(value)) => {
                Err(WebhookError::InvalidIdentifier(value.to_string()))
            }
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct OverseerrWebhook {
    #[serde(default)]
    pub notification_type: Option<Value>,

    #[serde(default)]
    pub subject: Option<Value>,

    #[serde(default, deserialize_with = "media_or_none")]
    pub media: Option<OverseerrMedia>,
}

/// A `media` value that is not an object carries nothing usable and is treated
/// like an absent one.
fn media_or_none<'de, D>(deserializer: D) -> Result<Option<OverseerrMedia>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;

    Ok(value
        .filter(Value::is_object)
        .and_then(|value| serde_json::from_value(value).ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn media(value: serde_json::Value) -> OverseerrMedia {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn accepts_both_media_type_spellings() {
        assert!(media(json!({ "mediaType": "tv" })).is_tv());
        assert!(media(json!({ "media_type": "tv" })).is_tv());
        assert!(!media(json!({ "media_type": "movie" })).is_tv());
        assert!(!media(json!({})).is_tv());
    }

    #[test]
    fn parses_numeric_and_quoted_tvdb_ids() {
        assert_eq!(media(json!({ "tvdbId": 12345 })).tvdb_id().unwrap(), 12345);
        assert_eq!(media(json!({ "tvdbId": " 12345 " })).tvdb_id().unwrap(), 12345);
    }

    #[test]
    fn missing_or_blank_tvdb_id_is_missing() {
        assert!(matches!(
            media(json!({})).tvdb_id(),
            Err(WebhookError::MissingIdentifier)
        ));
        assert!(matches!(
            media(json!({ "tvdbId": null })).tvdb_id(),
            Err(WebhookError::MissingIdentifier)
        ));
        assert!(matches!(
            media(json!({ "tvdbId": "" })).tvdb_id(),
            Err(WebhookError::MissingIdentifier)
        ));
    }

    #[test]
    fn rejects_non_numeric_or_out_of_range_ids() {
        assert!(matches!(
            media(json!({ "tvdbId": "abc" })).tvdb_id(),
            Err(WebhookError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            media(json!({ "tvdbId": -4 })).tvdb_id(),
            Err(WebhookError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            media(json!({ "tvdbId": 0 })).tvdb_id(),
            Err(WebhookError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn media_type_of_unexpected_shape_is_not_tv() {
        assert!(!media(json!({ "mediaType": 1 })).is_tv());
        assert!(!media(json!({ "mediaType": ["tv"] })).is_tv());
    }

    #[test]
    fn fractional_or_structured_ids_are_invalid() {
        assert!(matches!(
            media(json!({ "tvdbId": 12345.0 })).tvdb_id(),
            Err(WebhookError::InvalidIdentifier(_))
        ));
        assert!(matches!(
            media(json!({ "tvdbId": { "id": 1 } })).tvdb_id(),
            Err(WebhookError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn loosely_typed_envelope_fields_are_accepted() {
        let body: OverseerrWebhook = serde_json::from_value(json!({
            "notification_type": 3,
            "subject": { "title": "x" },
            "media": "none"
        }))
        .unwrap();

        assert!(body.media.is_none());
        assert_eq!(body.notification_type, Some(json!(3)));
    }

    #[test]
    fn test_notification_has_no_media() {
        let body: OverseerrWebhook = serde_json::from_value(json!({
            "notification_type": "TEST_NOTIFICATION",
            "subject": "Test Notification",
            "media": null
        }))
        .unwrap();

        assert!(body.media.is_none());
    }
}
