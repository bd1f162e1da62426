use tracing::{error, info};

use crate::{
    dao::{
        models::{Entrant, GameStatusEntity},
        queue::PendingQueue,
        session_store::SessionStore,
    },
    error::ServiceError,
    services::notifier,
    state::{
        SharedState,
        session::{GameSession, PlayerSlot},
    },
};

/// What an arrival at the matchmaker led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// Nobody was queued; the caller is now the waiting entrant.
    Waiting,
    /// The only queued entry is the caller's own earlier arrival.
    StillWaiting,
    /// A different entrant was claimed and a session was created.
    Matched {
        game_id: String,
        max_turns: u32,
        users: [PlayerSlot; 2],
    },
}

/// Pair an arriving client with the oldest waiting entrant, or queue it.
///
/// Self-match avoidance compares connection identifiers, never display
/// names: two strangers may well pick the same name.
pub async fn handle_arrival(
    state: &SharedState,
    connection_id: &str,
    name: &str,
) -> Result<MatchOutcome, ServiceError> {
    // Resolve the store before touching the queue, so a degraded backend
    // cannot strand a freshly claimed entrant.
    let store = state.require_session_store().await?;
    let queue = state.pending_queue();
    let config = state.config();

    let arrival = Entrant {
        connection_id: connection_id.to_owned(),
        name: name.to_owned(),
    };

    let Some(claimed) = queue.receive_one().await? else {
        queue.enqueue(arrival).await?;
        notifier::send_to(
            state,
            connection_id,
            &notifier::entry_done(config.entry_wait_ms()),
        );
        info!(connection_id, name, "new entry queued");
        return Ok(MatchOutcome::Waiting);
    };

    if claimed.entrant.connection_id == connection_id {
        queue.release(claimed.handle).await?;
        notifier::send_to(
            state,
            connection_id,
            &notifier::keep_waiting(config.entry_wait_ms()),
        );
        info!(connection_id, "duplicate arrival while queued; keep waiting");
        return Ok(MatchOutcome::StillWaiting);
    }

    let session = GameSession::new(claimed.entrant.clone(), arrival, config.max_turns());

    if let Err(err) = store.create(session.clone().into()).await {
        // Hand the claimed entrant back so it can still be matched.
        if let Err(release_err) = queue.release(claimed.handle).await {
            error!(
                error = %release_err,
                "failed to re-queue claimed entrant after session create failure"
            );
        }
        return Err(err.into());
    }

    notifier::send_to_both(
        state,
        &session,
        &notifier::matched(&session, config.turn_prompt_ms()),
    );

    store
        .update_status(&session.game_id, GameStatusEntity::Ongoing)
        .await?;

    // The claim becomes durable only here; a failure must surface rather
    // than silently resurrect a half-consumed match.
    queue.delete(claimed.handle).await?;

    notifier::send_to_both(
        state,
        &session,
        &notifier::select_hand(&session, 1, config.turn_prompt_ms()),
    );

    info!(game_id = %session.game_id, "matched two entrants");

    Ok(MatchOutcome::Matched {
        game_id: session.game_id.clone(),
        max_turns: session.max_turns,
        users: session.users,
    })
}
