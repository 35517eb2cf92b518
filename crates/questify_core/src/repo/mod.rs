//! Persistence contracts and the SQLite state store.
//!
//! # Responsibility
//! - Define the load/save contract used by the service layer.
//! - Keep SQL details out of the core state machine.
//!
//! # Invariants
//! - Reads reject invalid stored rows instead of masking them.
//! - Saves replace the whole aggregate atomically.

pub mod state_repo;
