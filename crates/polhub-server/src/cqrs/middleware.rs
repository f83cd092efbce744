//! Marker traits distinguishing write operations from read operations.
//!
//! Every state-changing request implements [`Command`]; every read-only
//! request implements [`Query`]. The split keeps the mediator wiring honest
//! about which handlers may touch the record store.

/// Marker for write operations.
pub trait Command {}

/// Marker for read operations.
pub trait Query {}
