/// OpenAPI documentation generation.
pub mod documentation;
/// Health check service.
pub mod health_service;
/// Pairing of arriving clients through the pending queue.
pub mod matchmaker;
/// Outbound protocol payload construction and delivery.
pub mod notifier;
/// Inbound message parsing and dispatch.
pub mod router;
/// Storage persistence coordinator with reconnect handling.
pub mod storage_supervisor;
/// Per-turn hand validation and winner resolution.
pub mod turn_engine;
/// WebSocket connection lifecycle handling.
pub mod websocket_service;
