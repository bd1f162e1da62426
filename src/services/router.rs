use tracing::{debug, warn};

use crate::{
    dto::ws::ClientMessage,
    services::{matchmaker, notifier, turn_engine},
    state::SharedState,
};

/// Dispatch one inbound text frame to the matchmaker or the turn engine.
///
/// Routing is the `gameId` presence check baked into [`ClientMessage`]
/// parsing; nothing else belongs here. Service failures are answered with
/// the structured error body, unparsable frames are dropped with a log line.
pub async fn dispatch(state: &SharedState, connection_id: &str, raw: &str) {
    let message = match ClientMessage::from_json_str(raw) {
        Ok(message) => message,
        Err(err) => {
            warn!(connection_id, error = %err, "dropping unparsable client message");
            return;
        }
    };

    match message {
        ClientMessage::Entry(request) => {
            match matchmaker::handle_arrival(state, connection_id, &request.name).await {
                Ok(outcome) => debug!(connection_id, ?outcome, "entry handled"),
                Err(err) => {
                    warn!(connection_id, error = %err, "entry handling failed");
                    notifier::send_error(state, connection_id, &err);
                }
            }
        }
        ClientMessage::Turn(request) => {
            match turn_engine::submit_hand(
                state,
                connection_id,
                &request.game_id,
                &request.name,
                &request.hand,
            )
            .await
            {
                Ok(outcome) => {
                    debug!(connection_id, game_id = %request.game_id, ?outcome, "turn submission handled");
                }
                Err(err) => {
                    warn!(connection_id, game_id = %request.game_id, error = %err, "turn submission failed");
                    notifier::send_error(state, connection_id, &err);
                }
            }
        }
    }
}
