//! Client-side core of the CV builder: the in-memory document model,
//! path-addressed mutations, the debounced autosave scheduler, and thin
//! HTTP clients for the remote CV and AI services.
//!
//! The document in memory is owned exclusively by the one editor session
//! that loaded it. No cross-tab or cross-session synchronization is
//! attempted; two sessions editing the same CV race, last successful
//! save wins. Known limitation for a single-user personal-document tool.

pub mod autosave;
pub mod client;
pub mod config;
pub mod document;
pub mod errors;
pub mod models;
pub mod session;
