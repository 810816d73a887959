use serde::{Deserialize, Serialize};

use crate::response::Response;

/// Button actions that arrive as postbacks rather than text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostbackAction {
    AskDelete,
    ConfirmDelete,
    Cancel,
}

/// Message from the chat platform to the agent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inbound {
    Text {
        user_id: String,
        text: String,
    },
    Postback {
        user_id: String,
        action: PostbackAction,
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        desc: Option<String>,
    },
    /// The user added the bot as a friend
    Follow { user_id: String },
}

impl Inbound {
    pub fn user_id(&self) -> &str {
        match self {
            Inbound::Text { user_id, .. }
            | Inbound::Postback { user_id, .. }
            | Inbound::Follow { user_id } => user_id,
        }
    }
}

/// Message from the agent back to the platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outbound {
    pub user_id: String,
    pub report_type: String, // "reply", "error"
    pub payload: serde_json::Value,
    pub timestamp: i64,
}

impl Outbound {
    pub fn reply(user_id: &str, response: &Response) -> Result<Self, serde_json::Error> {
        Ok(Self {
            user_id: user_id.to_string(),
            report_type: "reply".to_string(),
            payload: serde_json::to_value(response)?,
            timestamp: chrono::Utc::now().timestamp(),
        })
    }

    pub fn error(user_id: &str, error: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            report_type: "error".to_string(),
            payload: serde_json::json!({ "error": error }),
            timestamp: chrono::Utc::now().timestamp(),
        }
    }
}

/// Parse one inbound line
pub fn parse_inbound(payload: &[u8]) -> Result<Inbound, serde_json::Error> {
    serde_json::from_slice(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_text() {
        let json = r#"{"type": "text", "user_id": "U1", "text": "100 宵夜"}"#;
        let msg = parse_inbound(json.as_bytes()).unwrap();
        assert_eq!(
            msg,
            Inbound::Text {
                user_id: "U1".into(),
                text: "100 宵夜".into()
            }
        );
        assert_eq!(msg.user_id(), "U1");
    }

    #[test]
    fn test_parse_postback_optional_fields() {
        let json = r#"{"type": "postback", "user_id": "U1", "action": "confirm_delete", "id": "abc"}"#;
        match parse_inbound(json.as_bytes()).unwrap() {
            Inbound::Postback { action, id, desc, .. } => {
                assert_eq!(action, PostbackAction::ConfirmDelete);
                assert_eq!(id.as_deref(), Some("abc"));
                assert!(desc.is_none());
            }
            other => panic!("unexpected message: {:?}", other),
        }
    }

    #[test]
    fn test_parse_follow() {
        let json = r#"{"type": "follow", "user_id": "U9"}"#;
        assert_eq!(
            parse_inbound(json.as_bytes()).unwrap(),
            Inbound::Follow { user_id: "U9".into() }
        );
    }

    #[test]
    fn test_parse_invalid() {
        assert!(parse_inbound(b"not json").is_err());
        assert!(parse_inbound(br#"{"type": "postback", "user_id": "U1", "action": "explode"}"#).is_err());
        assert!(parse_inbound(br#"{"user_id": "U1", "text": "hi"}"#).is_err());
    }

    #[test]
    fn test_outbound_reply_payload() {
        let out = Outbound::reply("U1", &Response::text("hi")).unwrap();
        assert_eq!(out.report_type, "reply");
        assert_eq!(out.payload["kind"], "plain_text");
        assert_eq!(out.payload["text"], "hi");
    }

    #[test]
    fn test_outbound_error() {
        let out = Outbound::error("U1", "disk full");
        assert_eq!(out.report_type, "error");
        assert_eq!(out.payload["error"], "disk full");
    }
}
