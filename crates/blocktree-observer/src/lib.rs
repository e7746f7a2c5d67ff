//! Observer API server for blocktree.
//!
//! This crate holds the process-wide latest fork choice view and exposes it:
//!
//! - **Push channel** (`/ws`): every connection receives an `initial_data`
//!   envelope on connect and a `fork_choice_update` envelope per tick
//! - **Pull endpoint** (`GET /api/fork-choice`): the current merged view
//! - **Liveness probe** (`GET /health`)
//! - **Static dashboard** (`GET /`, `GET /{path}`) served from disk
//!
//! # Architecture
//!
//! The collector installs each tick's merged view through
//! [`AppState::update`], which swaps an atomic pointer and hands the view
//! to the [`broadcast`] fan-out. Readers load the pointer without locking,
//! so a slow tick never blocks a request. Push subscribers live in a
//! [`SubscriberRegistry`]; each connection deregisters itself when its task
//! ends, and a subscriber whose queue turns out closed during a broadcast
//! is pruned on the spot.
//!
//! [`broadcast`]: broadcast::broadcast
//! [`SubscriberRegistry`]: registry::SubscriberRegistry

pub mod assets;
pub mod broadcast;
pub mod error;
pub mod handlers;
pub mod registry;
pub mod router;
pub mod server;
pub mod startup;
pub mod state;
pub mod ws;

// Re-export primary types for convenience.
pub use router::build_router;
pub use server::{ServerConfig, ServerError};
pub use startup::spawn_observer;
pub use state::AppState;
