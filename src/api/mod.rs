//! Request and response types for the transport layer
//!
//! The registry does not speak HTTP. A transport collaborator deserializes
//! these request types, derives the observer address from the connection,
//! and calls the glue methods in [`handler`], which validate input and build
//! serializable responses.

pub mod handler;
pub mod types;

pub use types::{NodeResponse, PlaybackQuery, RegisterRequest, UpdateRequest};
