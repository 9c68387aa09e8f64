//! Feature data resources, one per backend collection.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each module pairs a [`Fetcher`](crate::state::resource::Fetcher) with the
//! mutations for its collection. Reads go through
//! [`Resource`](crate::state::resource::Resource) so they follow the session
//! and their parameters; mutations refresh the affected resource.

pub mod activities;
pub mod interests;
pub mod notices;
pub mod profile;
