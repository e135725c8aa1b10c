//! These models represent the objects exchanged between the chat surface and the agent service
//!
//! The same structs are used on both sides of the wire:
//! - chat requests and upload payloads, sent from the client to the service
//! - buffered replies, sent back as a single JSON object
//! - the agent catalog, served by the listing endpoints
//!
//! Streaming replies carry no framing at all, so they have no model here; the client
//! folds them straight into a stored [`message::Message`].
pub mod agent;
pub mod message;
pub mod request;
pub mod role;
