use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::dto::validation::validate_display_name;

/// Matchmaking entry request: a display name and nothing else.
#[derive(Debug, Clone, Deserialize, ToSchema)]
pub struct EntryRequest {
    pub name: String,
}

impl Validate for EntryRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_display_name(&self.name) {
            errors.add("name", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Hand submission for the active turn of an existing game.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TurnRequest {
    pub game_id: String,
    pub name: String,
    /// Submitted hand. Not validated here: an unknown value must reach the
    /// turn engine so the client receives the `invalid_hand` advisory
    /// instead of a parse failure.
    pub hand: String,
}

impl Validate for TurnRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = validate_display_name(&self.name) {
            errors.add("name", e);
        }
        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}

/// Messages accepted from game WebSocket clients.
///
/// The two forms are told apart by the presence of `gameId`: with it the
/// message is a turn submission, without it a matchmaking entry. That
/// presence check is the entire routing rule.
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum ClientMessage {
    Turn(TurnRequest),
    Entry(EntryRequest),
}

/// Error raised when an inbound frame cannot be turned into a [`ClientMessage`].
#[derive(Debug, Error)]
pub enum MessageParseError {
    #[error("malformed client message: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid client message: {0}")]
    Validation(#[from] ValidationErrors),
}

impl ClientMessage {
    /// Parse and validate a raw text frame.
    pub fn from_json_str(raw: &str) -> Result<Self, MessageParseError> {
        let message: Self = serde_json::from_str(raw)?;
        match &message {
            ClientMessage::Turn(request) => request.validate()?,
            ClientMessage::Entry(request) => request.validate()?,
        }
        Ok(message)
    }
}

/// Client-facing action tag carried by every outbound payload.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OutboundAction {
    EntryDone,
    Matched,
    SelectHand,
    RegisterHand,
    AlreadyRegistered,
    InvalidHand,
    Result,
    GameFinished,
    SessionNotFound,
}

/// State the client is advised to move into after handling a payload.
#[derive(Debug, Clone, Copy, Serialize, ToSchema, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ClientState {
    Waiting,
    GameStart,
    SelectHand,
    WaitingOpponent,
    ShowResult,
    GameFinished,
    Entry,
}

/// Outbound protocol payload pushed to one or both participants.
///
/// Every payload carries the game id (empty while unmatched), an action, the
/// advised next client state, an advisory countdown in milliseconds (never
/// enforced server-side; `-1` means no countdown), and a human-readable
/// message. The optional fields are attached where the action calls for them.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OutboundMessage {
    pub game_id: String,
    pub action: OutboundAction,
    pub next_state: ClientState,
    pub limit_time: i64,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_turns: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_turn: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub users: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub winner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_form_is_selected_when_game_id_is_absent() {
        let message = ClientMessage::from_json_str(r#"{"name": "alice"}"#).unwrap();
        assert!(matches!(message, ClientMessage::Entry(request) if request.name == "alice"));
    }

    #[test]
    fn turn_form_is_selected_when_game_id_is_present() {
        let message =
            ClientMessage::from_json_str(r#"{"gameId": "rps-1", "name": "alice", "hand": "rock"}"#)
                .unwrap();
        let ClientMessage::Turn(request) = message else {
            panic!("expected the turn form");
        };
        assert_eq!(request.game_id, "rps-1");
        assert_eq!(request.hand, "rock");
    }

    #[test]
    fn unknown_hand_strings_still_parse() {
        // Hand validation is the turn engine's job.
        let message = ClientMessage::from_json_str(
            r#"{"gameId": "rps-1", "name": "alice", "hand": "lizard"}"#,
        )
        .unwrap();
        assert!(matches!(message, ClientMessage::Turn(_)));
    }

    #[test]
    fn blank_names_are_rejected() {
        assert!(ClientMessage::from_json_str(r#"{"name": "  "}"#).is_err());
        assert!(
            ClientMessage::from_json_str(r#"{"gameId": "g", "name": "", "hand": "rock"}"#).is_err()
        );
    }

    #[test]
    fn malformed_json_is_rejected() {
        assert!(matches!(
            ClientMessage::from_json_str("not json"),
            Err(MessageParseError::Json(_))
        ));
    }

    #[test]
    fn outbound_payload_uses_camel_case_and_skips_empty_extras() {
        let payload = OutboundMessage {
            game_id: "rps-1".into(),
            action: OutboundAction::RegisterHand,
            next_state: ClientState::WaitingOpponent,
            limit_time: 5_000,
            message: "recorded".into(),
            max_turns: Some(5),
            current_turn: Some(2),
            users: None,
            winner: None,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["gameId"], "rps-1");
        assert_eq!(json["action"], "register_hand");
        assert_eq!(json["nextState"], "waiting_opponent");
        assert_eq!(json["limitTime"], 5_000);
        assert_eq!(json["maxTurns"], 5);
        assert!(json.get("users").is_none());
        assert!(json.get("winner").is_none());
    }
}
