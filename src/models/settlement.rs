//! Settlement model
//!
//! A settlement is one participant's debt to the organizer for one paid game.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Payment methods recorded on a settlement.
pub mod payment_method {
    pub const BANK_TRANSFER: &str = "bank_transfer";
    pub const CONFIRMED_BY_ORGANIZER: &str = "confirmed_by_organizer";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "settlement_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum SettlementStatus {
    Pending,
    Paid,
    Cancelled,
    Overdue,
}

impl std::fmt::Display for SettlementStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SettlementStatus::Pending => "pending",
            SettlementStatus::Paid => "paid",
            SettlementStatus::Cancelled => "cancelled",
            SettlementStatus::Overdue => "overdue",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Settlement {
    pub id: i64,
    pub game_id: i64,
    pub payer_id: Uuid,
    pub recipient_id: Uuid,
    pub amount: Decimal,
    pub due_date: DateTime<Utc>,
    pub is_paid: bool,
    pub status: SettlementStatus,
    pub payment_method: Option<String>,
    pub payment_reference: Option<String>,
    pub notes: Option<String>,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Settlement {
    /// Still awaiting payment (pending or already flagged overdue).
    pub fn is_outstanding(&self) -> bool {
        !self.is_paid
            && matches!(
                self.status,
                SettlementStatus::Pending | SettlementStatus::Overdue
            )
    }
}

/// Per-payer line in a game settlement summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SettlementDetail {
    pub settlement_id: i64,
    pub payer_id: Uuid,
    pub amount: Decimal,
    pub is_paid: bool,
    pub status: SettlementStatus,
    pub due_date: DateTime<Utc>,
    pub paid_at: Option<DateTime<Utc>>,
}

/// Collection status of one game's settlement set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameSettlementSummary {
    pub game_id: i64,
    pub total_amount: Decimal,
    pub total_payers: usize,
    pub paid_count: usize,
    pub unpaid_count: usize,
    pub total_collected: Decimal,
    pub total_outstanding: Decimal,
    pub settlements: Vec<SettlementDetail>,
}

/// A user's aggregate payment position across all games.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyPaymentSummary {
    pub total: Decimal,
    pub paid: Decimal,
    pub unpaid: Decimal,
    pub count: usize,
}
