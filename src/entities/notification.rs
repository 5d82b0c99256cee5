use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::events::ProximityEvent;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NotificationAction {
    pub action: String,
    pub title: String,
}

/// Payload handed to a presenter. Serializable so it can cross a persistent
/// background delivery channel intact.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub actions: Vec<NotificationAction>,
    pub require_interaction: bool,
    pub tag: Option<String>,
    pub data: Option<serde_json::Value>,
}

impl Notification {
    pub fn informational(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            actions: vec![],
            require_interaction: false,
            tag: None,
            data: None,
        }
    }

    pub fn actionable(
        title: impl Into<String>,
        body: impl Into<String>,
        actions: Vec<NotificationAction>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            actions,
            require_interaction: true,
            tag: None,
            data: None,
        }
    }
}

impl From<&ProximityEvent> for Notification {
    fn from(event: &ProximityEvent) -> Self {
        match event {
            ProximityEvent::NearDestination { distance_meters } => {
                let mut notification = Notification::informational(
                    "Almost there",
                    format!("You are {:.0} m from your destination", distance_meters),
                );
                notification.tag = Some("near-destination".into());
                notification.data = Some(json!({ "distance_meters": distance_meters }));
                notification
            }
            ProximityEvent::ExitedWithoutConfirmation { task_id } => {
                let mut notification = Notification::actionable(
                    "Did you complete this task?",
                    "You left the task location without confirming it.",
                    vec![
                        NotificationAction {
                            action: "confirm".into(),
                            title: "Yes".into(),
                        },
                        NotificationAction {
                            action: "later".into(),
                            title: "Not Yet".into(),
                        },
                    ],
                );
                notification.tag = Some("task-proximity".into());
                notification.data = Some(json!({ "task_id": task_id }));
                notification
            }
        }
    }
}
