pub mod chunks;
pub mod client;

pub use chunks::ChunkSource;
pub use client::{
    ChatClient, DeliveryMode, ResponseMode, TurnOutcome, CHAT_ERROR_MESSAGE, IMAGE_ERROR_MESSAGE,
};
