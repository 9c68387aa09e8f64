//! # activity-portal
//!
//! Client library for the activity portal backend: session lifecycle with a
//! persisted auth cookie, guarded client-side routing, an authenticated REST
//! wrapper, reactive feature resources (activities, interests, notices,
//! profile), and transient UI state (toast, animated background).
//!
//! [`app::AppContext`] wires everything together and is the entry point for
//! embedding applications and the bundled CLI.

pub mod app;
pub mod config;
pub mod cookies;
pub mod features;
pub mod net;
pub mod routing;
pub mod state;
