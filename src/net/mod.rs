//! Networking: transport seam, authenticated REST wrapper, wire schema.
//!
//! SYSTEM CONTEXT
//! ==============
//! `transport` performs raw HTTP, `api` adds the base URL, bearer header and
//! error mapping, and `types` defines the backend's JSON shapes.

pub mod api;
pub mod transport;
pub mod types;
