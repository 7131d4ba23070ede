//! Data models for parley entities.

mod message;

pub use message::{Message, Sender};
