use axum::extract::ws::Message;
use tracing::warn;

use crate::{
    dto::ws::{ClientState, OutboundAction, OutboundMessage},
    error::{ErrorBody, ServiceError},
    state::{
        SharedState,
        session::{GameSession, Hand, Winner},
    },
};

/// Advisory countdown value meaning "no countdown": the client should simply
/// retry, there is nothing to time out.
const NO_COUNTDOWN_MS: i64 = -1;

/// Serialize a payload and push it to the identified connection.
///
/// Sends are fire-and-forget: a connection that detached or closed its
/// writer logs a warning and is evicted from the registry, but never fails
/// the caller. Delivery to one participant must not depend on the other.
pub fn send_to<T>(state: &SharedState, connection_id: &str, payload: &T)
where
    T: ?Sized + serde::Serialize + std::fmt::Debug,
{
    let Some(tx) = state
        .connections()
        .get(connection_id)
        .map(|connection| connection.tx.clone())
    else {
        warn!(connection_id, "cannot push message: connection not registered");
        return;
    };

    let raw = match serde_json::to_string(payload) {
        Ok(raw) => raw,
        Err(err) => {
            warn!(error = %err, "failed to serialize outbound payload `{payload:?}`");
            return;
        }
    };

    if tx.send(Message::Text(raw.into())).is_err() {
        warn!(connection_id, "push failed (writer closed), removing connection");
        state.connections().remove(connection_id);
    }
}

/// Push the same payload to both participants of a session, independently.
pub fn send_to_both(state: &SharedState, session: &GameSession, payload: &OutboundMessage) {
    for connection_id in session.connection_ids() {
        send_to(state, connection_id, payload);
    }
}

/// Push the structured failure body for a service error.
pub fn send_error(state: &SharedState, connection_id: &str, err: &ServiceError) {
    send_to(state, connection_id, &ErrorBody::from(err));
}

fn base(
    game_id: impl Into<String>,
    action: OutboundAction,
    next_state: ClientState,
    limit_time: i64,
    message: String,
) -> OutboundMessage {
    OutboundMessage {
        game_id: game_id.into(),
        action,
        next_state,
        limit_time,
        message,
        max_turns: None,
        current_turn: None,
        users: None,
        winner: None,
    }
}

/// Acknowledgement for a freshly queued entrant.
pub fn entry_done(wait_ms: i64) -> OutboundMessage {
    base(
        "",
        OutboundAction::EntryDone,
        ClientState::Waiting,
        wait_ms,
        "Entry received. Waiting for an opponent to arrive.".to_owned(),
    )
}

/// Acknowledgement for a duplicate arrival while still queued.
pub fn keep_waiting(wait_ms: i64) -> OutboundMessage {
    base(
        "",
        OutboundAction::EntryDone,
        ClientState::Waiting,
        wait_ms,
        "Already queued. Hold on until an opponent is found.".to_owned(),
    )
}

/// Announcement that two entrants were paired into a match.
pub fn matched(session: &GameSession, prompt_ms: i64) -> OutboundMessage {
    let mut payload = base(
        session.game_id.clone(),
        OutboundAction::Matched,
        ClientState::GameStart,
        prompt_ms,
        format!(
            "Opponent found. Starting a best-of-{} match.",
            session.max_turns
        ),
    );
    payload.max_turns = Some(session.max_turns);
    payload.users = Some(session.user_names());
    payload
}

/// Prompt both players to pick a hand for `turn`.
pub fn select_hand(session: &GameSession, turn: u32, prompt_ms: i64) -> OutboundMessage {
    let message = if turn == 1 {
        "Choose your hand for turn 1 [rock/scissors/paper].".to_owned()
    } else {
        format!(
            "Moving on to turn {turn}/{}. Choose your hand [rock/scissors/paper].",
            session.max_turns
        )
    };
    let mut payload = base(
        session.game_id.clone(),
        OutboundAction::SelectHand,
        ClientState::SelectHand,
        prompt_ms,
        message,
    );
    payload.max_turns = Some(session.max_turns);
    payload.current_turn = Some(turn);
    payload.users = Some(session.user_names());
    payload
}

/// Acknowledgement that the submitter's hand was recorded first.
pub fn register_hand(session: &GameSession, turn: u32, prompt_ms: i64) -> OutboundMessage {
    let mut payload = base(
        session.game_id.clone(),
        OutboundAction::RegisterHand,
        ClientState::WaitingOpponent,
        prompt_ms,
        "Your hand has been recorded. Waiting for your opponent.".to_owned(),
    );
    payload.max_turns = Some(session.max_turns);
    payload.current_turn = Some(turn);
    payload
}

/// Advisory for a repeated submission while the opponent is still out.
pub fn already_registered(session: &GameSession, prompt_ms: i64) -> OutboundMessage {
    base(
        session.game_id.clone(),
        OutboundAction::AlreadyRegistered,
        ClientState::WaitingOpponent,
        prompt_ms,
        "Your hand is already recorded. Waiting for your opponent.".to_owned(),
    )
}

/// Advisory for a hand outside rock/scissors/paper.
pub fn invalid_hand(session: &GameSession, turn: u32) -> OutboundMessage {
    let mut payload = base(
        session.game_id.clone(),
        OutboundAction::InvalidHand,
        ClientState::SelectHand,
        NO_COUNTDOWN_MS,
        "That is not a playable hand. Choose one of [rock/scissors/paper].".to_owned(),
    );
    payload.max_turns = Some(session.max_turns);
    payload.current_turn = Some(turn);
    payload
}

/// Result announcement for a resolved turn, sent to both players.
pub fn turn_result(
    session: &GameSession,
    turn: u32,
    winner: &Winner,
    submitted: [(&str, Hand); 2],
    prompt_ms: i64,
) -> OutboundMessage {
    let [(first_name, first_hand), (second_name, second_hand)] = submitted;
    let message = match winner {
        Winner::Even => format!("Turn {turn} is a draw: both played {}.", first_hand.as_str()),
        Winner::Player(name) => format!(
            "Turn {turn} goes to {name}: {first_name} played {}, {second_name} played {}.",
            first_hand.as_str(),
            second_hand.as_str()
        ),
    };
    let mut payload = base(
        session.game_id.clone(),
        OutboundAction::Result,
        ClientState::ShowResult,
        prompt_ms,
        message,
    );
    payload.max_turns = Some(session.max_turns);
    payload.current_turn = Some(turn);
    payload.users = Some(session.user_names());
    payload.winner = Some(winner.as_field());
    payload
}

/// Final announcement once every turn has been played.
pub fn game_finished(session: &GameSession, finished_ms: i64) -> OutboundMessage {
    let mut payload = base(
        session.game_id.clone(),
        OutboundAction::GameFinished,
        ClientState::GameFinished,
        finished_ms,
        "All turns are complete. Thanks for playing.".to_owned(),
    );
    payload.users = Some(session.user_names());
    payload
}

/// Advisory for a game id with no stored session; the client should re-enter.
pub fn session_not_found(game_id: &str, prompt_ms: i64) -> OutboundMessage {
    base(
        game_id,
        OutboundAction::SessionNotFound,
        ClientState::Entry,
        prompt_ms,
        format!("No such game session. gameId: {game_id}"),
    )
}

/// Advisory for a submission against a session that already finished.
pub fn session_already_finished(game_id: &str, prompt_ms: i64) -> OutboundMessage {
    base(
        game_id,
        OutboundAction::SessionNotFound,
        ClientState::Entry,
        prompt_ms,
        format!("This game has already finished. gameId: {game_id}"),
    )
}
