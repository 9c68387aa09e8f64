//! Shared client-side state.
//!
//! DESIGN
//! ======
//! State is split by concern so consumers depend on small focused models.
//! Every store publishes through a `tokio::sync::watch` channel: consumers
//! subscribe to exactly the slots they read and see each change as it lands.

pub mod background;
pub mod resource;
pub mod session;
pub mod toast;
