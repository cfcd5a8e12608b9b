//! Worker Notifications
//!
//! Turning a push payload into the notification the host shows, and the
//! actions offered on it.

use serde::{Deserialize, Serialize};

/// Title used when the payload does not carry one
pub const DEFAULT_TITLE: &str = "Diet Planner Reminder";
/// Body used when the push has no usable payload
pub const DEFAULT_BODY: &str = "Time for your meal!";
/// Icon and badge used when the payload does not name one
pub const DEFAULT_ICON: &str = "/favicon.ico";
/// Tag shared by every reminder so a new one replaces the last
pub const REMINDER_TAG: &str = "diet-reminder";

const VIBRATE_PATTERN: [u32; 3] = [200, 100, 200];

/// JSON payload the backend pushes
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushPayload {
    /// Notification title
    pub title: Option<String>,
    /// Notification body
    pub body: Option<String>,
    /// Icon URL
    pub icon: Option<String>,
    /// Badge URL
    pub badge: Option<String>,
    /// Extra data, e.g. `meal_type`
    pub data: Option<serde_json::Value>,
}

impl PushPayload {
    /// Parse raw push bytes
    ///
    /// A JSON object is read field by field; any other bytes become the body
    /// of a default reminder. No bytes, or empty text, give the default body.
    #[must_use]
    pub fn from_bytes(data: Option<&[u8]>) -> Self {
        let Some(bytes) = data else {
            return Self::text(DEFAULT_BODY);
        };

        match serde_json::from_slice::<serde_json::Value>(bytes) {
            Ok(value) if value.is_object() => {
                serde_json::from_value(value).unwrap_or_else(|e| {
                    tracing::debug!(error = %e, "Push payload fields malformed, using defaults");
                    Self::text(DEFAULT_BODY)
                })
            }
            _ => {
                let text = String::from_utf8_lossy(bytes);
                if text.trim().is_empty() {
                    Self::text(DEFAULT_BODY)
                } else {
                    Self::text(text.into_owned())
                }
            }
        }
    }

    fn text(body: impl Into<String>) -> Self {
        Self {
            title: Some(DEFAULT_TITLE.to_string()),
            body: Some(body.into()),
            icon: Some(DEFAULT_ICON.to_string()),
            badge: Some(DEFAULT_ICON.to_string()),
            data: None,
        }
    }
}

/// Buttons shown on a reminder
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationAction {
    /// Open the app to mark the meal consumed
    #[serde(rename = "mark-consumed")]
    MarkConsumed,
    /// Dismiss for now
    #[serde(rename = "snooze")]
    Snooze,
}

impl NotificationAction {
    /// Action identifier
    #[must_use]
    pub fn id(&self) -> &'static str {
        match self {
            Self::MarkConsumed => "mark-consumed",
            Self::Snooze => "snooze",
        }
    }

    /// Button label
    #[must_use]
    pub fn title(&self) -> &'static str {
        match self {
            Self::MarkConsumed => "Mark as Consumed",
            Self::Snooze => "Remind Later",
        }
    }

    /// Parse an action identifier
    #[must_use]
    pub fn parse(id: &str) -> Option<Self> {
        match id {
            "mark-consumed" => Some(Self::MarkConsumed),
            "snooze" => Some(Self::Snooze),
            _ => None,
        }
    }
}

/// Everything the host needs to show a notification
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Title
    pub title: String,
    /// Body text
    pub body: String,
    /// Icon URL
    pub icon: String,
    /// Badge URL
    pub badge: String,
    /// Vibration pattern in ms
    pub vibrate: Vec<u32>,
    /// Data handed back on click
    pub data: serde_json::Value,
    /// Buttons
    pub actions: Vec<NotificationAction>,
    /// Stay visible until the user interacts
    pub require_interaction: bool,
    /// Replacement tag
    pub tag: String,
}

impl Notification {
    /// Build the reminder notification for a payload
    #[must_use]
    pub fn from_payload(payload: PushPayload) -> Self {
        Self {
            title: payload.title.unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            body: payload.body.unwrap_or_else(|| DEFAULT_BODY.to_string()),
            icon: payload.icon.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            badge: payload.badge.unwrap_or_else(|| DEFAULT_ICON.to_string()),
            vibrate: VIBRATE_PATTERN.to_vec(),
            data: payload
                .data
                .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new())),
            actions: vec![NotificationAction::MarkConsumed, NotificationAction::Snooze],
            require_interaction: true,
            tag: REMINDER_TAG.to_string(),
        }
    }

    /// `meal_type` carried in the data, if any
    #[must_use]
    pub fn meal_type(&self) -> Option<&str> {
        self.data.get("meal_type").and_then(serde_json::Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_json_payload_fields_are_used() {
        let raw = br#"{"title":"Lunch time","body":"Rice and dal","data":{"meal_type":"lunch"}}"#;
        let notification = Notification::from_payload(PushPayload::from_bytes(Some(raw)));

        assert_eq!(notification.title, "Lunch time");
        assert_eq!(notification.body, "Rice and dal");
        assert_eq!(notification.icon, DEFAULT_ICON);
        assert_eq!(notification.meal_type(), Some("lunch"));
    }

    #[test]
    fn test_text_payload_becomes_body() {
        let payload = PushPayload::from_bytes(Some(b"Drink some water"));
        let notification = Notification::from_payload(payload);

        assert_eq!(notification.title, DEFAULT_TITLE);
        assert_eq!(notification.body, "Drink some water");
        assert_eq!(notification.badge, DEFAULT_ICON);
    }

    #[test]
    fn test_missing_or_empty_payload_uses_default_body() {
        for data in [None, Some(&b""[..]), Some(&b"   "[..])] {
            let notification = Notification::from_payload(PushPayload::from_bytes(data));
            assert_eq!(notification.body, DEFAULT_BODY);
        }
    }

    #[test]
    fn test_reminder_options() {
        let notification = Notification::from_payload(PushPayload::default());

        assert_eq!(notification.vibrate, vec![200, 100, 200]);
        assert_eq!(notification.tag, "diet-reminder");
        assert!(notification.require_interaction);
        assert_eq!(
            notification
                .actions
                .iter()
                .map(NotificationAction::title)
                .collect::<Vec<_>>(),
            vec!["Mark as Consumed", "Remind Later"]
        );
        assert_eq!(notification.data, serde_json::json!({}));
    }

    #[test]
    fn test_action_ids_parse() {
        assert_eq!(
            NotificationAction::parse("mark-consumed"),
            Some(NotificationAction::MarkConsumed)
        );
        assert_eq!(NotificationAction::parse("open"), None);
    }
}
