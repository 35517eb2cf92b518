//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate state mutations, persistence and level-up notification.
//! - Keep CLI/presentation layers decoupled from storage details.

pub mod quest_service;
