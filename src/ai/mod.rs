//! Responder side of the router: answering natural-language queries.
//!
//! This module defines the [`Responder`] trait the session calls into, the
//! timeout/placeholder wrapper around it, and an OpenAI-compatible backend.

mod client;
pub mod prompt;
pub mod responder;

pub use client::OpenAiResponder;
pub use responder::{BoundedResponder, Responder};
