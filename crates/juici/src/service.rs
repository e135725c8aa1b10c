pub mod base;
pub mod mock;

pub use base::{ReplyStream, ResponseService};
pub use mock::{MockResponseService, MockSettings};
