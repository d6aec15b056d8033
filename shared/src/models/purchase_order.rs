//! Purchase order models and lifecycle state machine

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An order placed with a supplier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub supplier_id: Uuid,
    /// Sum of item line totals, frozen at creation
    pub total_amount: Decimal,
    pub status: PurchaseOrderStatus,
    pub user_id: Uuid,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A line on a purchase order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub product_id: Uuid,
    pub quantity_ordered: i32,
    /// Cumulative quantity received so far; monotonically non-decreasing.
    /// Not hard-bounded by `quantity_ordered`: suppliers occasionally
    /// over-deliver and the discrepancy is settled commercially.
    pub quantity_received: i32,
    /// Purchase price frozen when the line was added to the order
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl PurchaseOrderItem {
    /// Quantity still expected from the supplier (never negative)
    pub fn outstanding(&self) -> i32 {
        (self.quantity_ordered - self.quantity_received).max(0)
    }
}

/// Lifecycle state of a purchase order
///
/// ```text
/// Pending ──> Sent ──> Received
///    │          │
///    │          └────> Cancelled
///    └──> Received / Cancelled
/// ```
///
/// `Received` and `Cancelled` are terminal. Only the receiving engine moves
/// an order into `Received`; a bare status flip to that state is not exposed.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum PurchaseOrderStatus {
    Pending,
    Sent,
    Received,
    Cancelled,
}

impl PurchaseOrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PurchaseOrderStatus::Pending => "Pending",
            PurchaseOrderStatus::Sent => "Sent",
            PurchaseOrderStatus::Received => "Received",
            PurchaseOrderStatus::Cancelled => "Cancelled",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Pending" => Some(PurchaseOrderStatus::Pending),
            "Sent" => Some(PurchaseOrderStatus::Sent),
            "Received" => Some(PurchaseOrderStatus::Received),
            "Cancelled" => Some(PurchaseOrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PurchaseOrderStatus::Received | PurchaseOrderStatus::Cancelled
        )
    }

    /// Whether the state machine allows moving from `self` to `to`
    pub fn can_transition_to(&self, to: PurchaseOrderStatus) -> bool {
        use PurchaseOrderStatus::*;
        match (self, to) {
            (Pending, Sent) => true,
            (Pending, Received) | (Sent, Received) => true,
            (Pending, Cancelled) | (Sent, Cancelled) => true,
            _ => false,
        }
    }

    /// Whether goods may still be received against an order in this state
    pub fn is_receivable(&self) -> bool {
        matches!(self, PurchaseOrderStatus::Pending | PurchaseOrderStatus::Sent)
    }
}

impl std::fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
