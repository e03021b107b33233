//! Database service layer
//!
//! This module provides a high-level interface to database operations

use crate::database::{DatabasePool, GameRepository, ParticipantRepository, SettlementRepository};

#[derive(Debug, Clone)]
pub struct DatabaseService {
    pub games: GameRepository,
    pub participants: ParticipantRepository,
    pub settlements: SettlementRepository,
    pool: DatabasePool,
}

impl DatabaseService {
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            games: GameRepository::new(pool.clone()),
            participants: ParticipantRepository::new(pool.clone()),
            settlements: SettlementRepository::new(pool.clone()),
            pool,
        }
    }

    /// The underlying pool, for services that open their own transactions.
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}
