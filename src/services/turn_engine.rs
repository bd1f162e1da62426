use tracing::{info, warn};

use crate::{
    dao::{models::GameStatusEntity, session_store::SessionStore},
    error::ServiceError,
    services::notifier,
    state::{
        SharedState,
        session::{GameSession, GameStatus, Hand, TurnResult, TurnStatus, Winner},
    },
};

/// What a hand submission led to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// No session is stored under the submitted game id.
    SessionNotFound,
    /// The session has already been played to completion.
    SessionAlreadyFinished,
    /// The submitted hand is not rock, scissors, or paper.
    InvalidHand,
    /// The submitter's hand was recorded first; the opponent is still out.
    Registered,
    /// Repeated submission while waiting; nothing was written.
    AlreadyRegistered,
    /// The submission resolved the turn and the session moved to the next one.
    TurnAdvanced { winner: Winner, next_turn: u32 },
    /// The submission resolved the final turn; the match is over.
    MatchFinished { winner: Winner },
    /// Both hands were already present; nothing to do.
    AlreadyResolved,
}

/// Validate and apply one hand submission against the session's active turn.
///
/// The per-turn state machine goes `AwaitingBothHands → OneHandIn →
/// Resolved`; which edge fires depends solely on whose hands the freshly
/// read record already holds. Only the first submission for a turn writes a
/// lone hand; the opposing submission resolves the turn, and anything later
/// is absorbed without a write.
pub async fn submit_hand(
    state: &SharedState,
    connection_id: &str,
    game_id: &str,
    name: &str,
    submitted: &str,
) -> Result<TurnOutcome, ServiceError> {
    let store = state.require_session_store().await?;
    let config = state.config();
    let prompt_ms = config.turn_prompt_ms();

    let Some(entity) = store.find(game_id).await? else {
        notifier::send_to(
            state,
            connection_id,
            &notifier::session_not_found(game_id, prompt_ms),
        );
        return Ok(TurnOutcome::SessionNotFound);
    };
    let session: GameSession = entity.into();

    if session.status == GameStatus::Finished {
        notifier::send_to(
            state,
            connection_id,
            &notifier::session_already_finished(game_id, prompt_ms),
        );
        return Ok(TurnOutcome::SessionAlreadyFinished);
    }

    let Some(hand) = Hand::parse(submitted) else {
        notifier::send_to(
            state,
            connection_id,
            &notifier::invalid_hand(&session, session.current_turn),
        );
        return Ok(TurnOutcome::InvalidHand);
    };

    let opponent = session.opponent_of(name).clone();
    let turn = session.current_turn;
    let record = session.current_record().cloned().ok_or_else(|| {
        ServiceError::InvalidState(format!("session `{game_id}` has no record for turn {turn}"))
    })?;

    let mine = record.hands.get(name).copied();
    let theirs = record.hands.get(&opponent.name).copied();

    match (mine, theirs) {
        (None, None) => {
            let mut updated = record;
            updated.hands.insert(name.to_owned(), hand);
            store
                .update_turn_record(game_id, turn, updated.into())
                .await?;
            notifier::send_to(
                state,
                connection_id,
                &notifier::register_hand(&session, turn, prompt_ms),
            );
            Ok(TurnOutcome::Registered)
        }
        (Some(_), None) => {
            notifier::send_to(
                state,
                connection_id,
                &notifier::already_registered(&session, prompt_ms),
            );
            Ok(TurnOutcome::AlreadyRegistered)
        }
        (None, Some(opponent_hand)) => {
            let winner = resolve_winner(name, hand, &opponent.name, opponent_hand);

            let mut updated = record;
            updated.hands.insert(name.to_owned(), hand);
            updated.result = Some(TurnResult {
                winner: winner.clone(),
            });
            updated.status = TurnStatus::Finished;
            store
                .update_turn_record(game_id, turn, updated.into())
                .await?;

            notifier::send_to_both(
                state,
                &session,
                &notifier::turn_result(
                    &session,
                    turn,
                    &winner,
                    [(name, hand), (opponent.name.as_str(), opponent_hand)],
                    prompt_ms,
                ),
            );

            if turn < session.max_turns {
                store.advance_turn(game_id, turn).await?;
                let next_turn = turn + 1;
                notifier::send_to_both(
                    state,
                    &session,
                    &notifier::select_hand(&session, next_turn, prompt_ms),
                );
                info!(game_id, turn, next_turn, "turn resolved");
                Ok(TurnOutcome::TurnAdvanced { winner, next_turn })
            } else {
                store
                    .update_status(game_id, GameStatusEntity::Finished)
                    .await?;
                notifier::send_to_both(
                    state,
                    &session,
                    &notifier::game_finished(&session, config.finished_ms()),
                );
                info!(game_id, turn, "final turn resolved; match finished");
                Ok(TurnOutcome::MatchFinished { winner })
            }
        }
        (Some(_), Some(_)) => {
            // Persisted state can be observed in this shape by a submission
            // racing the resolver; absorbing it beats crashing.
            warn!(game_id, turn, "both hands already recorded; ignoring submission");
            Ok(TurnOutcome::AlreadyResolved)
        }
    }
}

/// Name the winner of one turn, or `Even` on identical hands.
fn resolve_winner(my_name: &str, my_hand: Hand, opponent_name: &str, opponent_hand: Hand) -> Winner {
    if my_hand == opponent_hand {
        Winner::Even
    } else if my_hand.beats(opponent_hand) {
        Winner::Player(my_name.to_owned())
    } else {
        Winner::Player(opponent_name.to_owned())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::{
        config::AppConfig,
        dao::{
            models::{Entrant, GameSessionEntity, HandEntity, TurnStatusEntity},
            session_store::memory::MemorySessionStore,
        },
        state::AppState,
    };

    async fn test_state() -> (SharedState, MemorySessionStore) {
        let state = AppState::new(AppConfig::default());
        let store = MemorySessionStore::new();
        state.install_session_store(Arc::new(store.clone())).await;
        (state, store)
    }

    fn entrant(connection_id: &str, name: &str) -> Entrant {
        Entrant {
            connection_id: connection_id.into(),
            name: name.into(),
        }
    }

    async fn seed_session(store: &MemorySessionStore, max_turns: u32) -> String {
        let mut session = GameSession::new(entrant("c1", "alice"), entrant("c2", "bob"), max_turns);
        session.status = GameStatus::Ongoing;
        let game_id = session.game_id.clone();
        let entity: GameSessionEntity = session.into();
        store.create(entity).await.unwrap();
        game_id
    }

    #[test]
    fn winner_rule_covers_all_nine_pairs() {
        use Hand::*;

        let cases = [
            (Rock, Rock, Winner::Even),
            (Scissors, Scissors, Winner::Even),
            (Paper, Paper, Winner::Even),
            (Rock, Scissors, Winner::Player("me".into())),
            (Scissors, Paper, Winner::Player("me".into())),
            (Paper, Rock, Winner::Player("me".into())),
            (Rock, Paper, Winner::Player("them".into())),
            (Scissors, Rock, Winner::Player("them".into())),
            (Paper, Scissors, Winner::Player("them".into())),
        ];

        for (mine, theirs, expected) in cases {
            assert_eq!(
                resolve_winner("me", mine, "them", theirs),
                expected,
                "{mine:?} vs {theirs:?}"
            );
        }
    }

    #[test]
    fn winner_rule_is_symmetric() {
        use Hand::*;

        for mine in [Rock, Scissors, Paper] {
            for theirs in [Rock, Scissors, Paper] {
                let forward = resolve_winner("a", mine, "b", theirs);
                let backward = resolve_winner("b", theirs, "a", mine);
                assert_eq!(forward, backward, "{mine:?} vs {theirs:?}");
            }
        }
    }

    #[tokio::test]
    async fn unknown_game_id_reports_session_not_found() {
        let (state, _store) = test_state().await;

        let outcome = submit_hand(&state, "c1", "rps-missing", "alice", "rock")
            .await
            .unwrap();
        assert_eq!(outcome, TurnOutcome::SessionNotFound);
    }

    #[tokio::test]
    async fn invalid_hand_leaves_the_record_untouched() {
        let (state, store) = test_state().await;
        let game_id = seed_session(&store, 5).await;

        let outcome = submit_hand(&state, "c1", &game_id, "alice", "lizard")
            .await
            .unwrap();
        assert_eq!(outcome, TurnOutcome::InvalidHand);

        let entity = store.find(&game_id).await.unwrap().unwrap();
        assert!(entity.turns[&1].hands.is_empty());
        assert_eq!(entity.turns[&1].status, TurnStatusEntity::Ongoing);
    }

    #[tokio::test]
    async fn first_submission_registers_and_repeats_are_idempotent() {
        let (state, store) = test_state().await;
        let game_id = seed_session(&store, 5).await;

        let outcome = submit_hand(&state, "c1", &game_id, "alice", "rock")
            .await
            .unwrap();
        assert_eq!(outcome, TurnOutcome::Registered);

        for _ in 0..3 {
            let outcome = submit_hand(&state, "c1", &game_id, "alice", "rock")
                .await
                .unwrap();
            assert_eq!(outcome, TurnOutcome::AlreadyRegistered);
        }

        let entity = store.find(&game_id).await.unwrap().unwrap();
        assert_eq!(entity.turns[&1].hands.len(), 1);
        assert_eq!(entity.current_turn, 1);
    }

    #[tokio::test]
    async fn opposing_submission_resolves_and_advances() {
        let (state, store) = test_state().await;
        let game_id = seed_session(&store, 5).await;

        submit_hand(&state, "c1", &game_id, "alice", "rock")
            .await
            .unwrap();
        let outcome = submit_hand(&state, "c2", &game_id, "bob", "scissors")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::TurnAdvanced {
                winner: Winner::Player("alice".into()),
                next_turn: 2,
            }
        );

        let entity = store.find(&game_id).await.unwrap().unwrap();
        assert_eq!(entity.current_turn, 2);
        assert_eq!(entity.turns[&1].status, TurnStatusEntity::Finished);
        assert_eq!(entity.turns[&1].result.as_ref().unwrap().winner, "alice");
        assert_eq!(entity.turns[&2].status, TurnStatusEntity::Ongoing);
    }

    #[tokio::test]
    async fn draws_resolve_with_even_and_still_advance() {
        let (state, store) = test_state().await;
        let game_id = seed_session(&store, 5).await;

        submit_hand(&state, "c1", &game_id, "alice", "paper")
            .await
            .unwrap();
        let outcome = submit_hand(&state, "c2", &game_id, "bob", "paper")
            .await
            .unwrap();

        assert_eq!(
            outcome,
            TurnOutcome::TurnAdvanced {
                winner: Winner::Even,
                next_turn: 2,
            }
        );

        let entity = store.find(&game_id).await.unwrap().unwrap();
        assert_eq!(entity.turns[&1].result.as_ref().unwrap().winner, "even");
    }

    #[tokio::test]
    async fn full_match_finishes_after_max_turns_and_stays_finished() {
        let (state, store) = test_state().await;
        let game_id = seed_session(&store, 5).await;

        for turn in 1..=5u32 {
            submit_hand(&state, "c1", &game_id, "alice", "rock")
                .await
                .unwrap();
            let outcome = submit_hand(&state, "c2", &game_id, "bob", "scissors")
                .await
                .unwrap();
            if turn < 5 {
                assert_eq!(
                    outcome,
                    TurnOutcome::TurnAdvanced {
                        winner: Winner::Player("alice".into()),
                        next_turn: turn + 1,
                    }
                );
            } else {
                assert_eq!(
                    outcome,
                    TurnOutcome::MatchFinished {
                        winner: Winner::Player("alice".into()),
                    }
                );
            }
        }

        let entity = store.find(&game_id).await.unwrap().unwrap();
        assert_eq!(entity.status, GameStatusEntity::Finished);
        // The counter never moves past the final turn.
        assert_eq!(entity.current_turn, 5);

        // Any further submission is answered with the finished advisory.
        let outcome = submit_hand(&state, "c1", &game_id, "alice", "rock")
            .await
            .unwrap();
        assert_eq!(outcome, TurnOutcome::SessionAlreadyFinished);
    }

    #[tokio::test]
    async fn an_early_turn_never_finishes_the_match() {
        let (state, store) = test_state().await;
        let game_id = seed_session(&store, 5).await;

        submit_hand(&state, "c1", &game_id, "alice", "rock")
            .await
            .unwrap();
        submit_hand(&state, "c2", &game_id, "bob", "paper")
            .await
            .unwrap();

        let entity = store.find(&game_id).await.unwrap().unwrap();
        assert_eq!(entity.status, GameStatusEntity::Ongoing);
    }

    #[tokio::test]
    async fn a_closed_turn_absorbs_late_submissions() {
        let (state, store) = test_state().await;
        let game_id = seed_session(&store, 5).await;

        submit_hand(&state, "c1", &game_id, "alice", "rock")
            .await
            .unwrap();
        submit_hand(&state, "c2", &game_id, "bob", "scissors")
            .await
            .unwrap();

        // Force the session back onto the resolved turn to simulate a racer
        // that read the record before the advance landed.
        let mut entity = store.find(&game_id).await.unwrap().unwrap();
        entity.current_turn = 1;
        store.create(entity).await.unwrap();

        let outcome = submit_hand(&state, "c2", &game_id, "bob", "paper")
            .await
            .unwrap();
        assert_eq!(outcome, TurnOutcome::AlreadyResolved);

        // The recorded hands were not overwritten.
        let entity = store.find(&game_id).await.unwrap().unwrap();
        assert_eq!(entity.turns[&1].hands["bob"], HandEntity::Scissors);
    }
}
