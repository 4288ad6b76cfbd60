//! Networking with the identity backend.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` defines the [`api::AuthApi`] seam and its reqwest implementation;
//! `types` defines the JSON bodies exchanged with the backend.

pub mod api;
pub mod types;
