//! Database repositories module
//!
//! This module contains all repository implementations for data access

pub mod game;
pub mod participant;
pub mod settlement;

// Re-export repositories
pub use game::GameRepository;
pub use participant::ParticipantRepository;
pub use settlement::{NewSettlement, SettlementRepository};
