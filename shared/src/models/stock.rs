//! Stock ledger models
//!
//! The ledger is the append-only history of signed stock deltas behind the
//! cached `current_stock` figure. Entries are never updated or deleted; a
//! correction is always a new entry with the opposite sign.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One entry in the stock ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockMovement {
    pub id: Uuid,
    pub product_id: Uuid,
    pub movement_type: MovementType,
    /// Signed delta: positive increases stock, negative decreases it
    pub quantity: i32,
    pub notes: Option<String>,
    /// Acting user, if the movement was triggered by a logged-in user
    pub user_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

/// Tagged category of a ledger entry
///
/// `CustomerReturn` and `SupplierReturn` are reserved: accepted as valid
/// values but not written by any engine yet.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MovementType {
    Sale,
    PurchaseReceipt,
    ManualAdjustmentIn,
    ManualAdjustmentOut,
    CustomerReturn,
    SupplierReturn,
}

impl MovementType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementType::Sale => "sale",
            MovementType::PurchaseReceipt => "purchase-receipt",
            MovementType::ManualAdjustmentIn => "manual-adjustment-in",
            MovementType::ManualAdjustmentOut => "manual-adjustment-out",
            MovementType::CustomerReturn => "customer-return",
            MovementType::SupplierReturn => "supplier-return",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sale" => Some(MovementType::Sale),
            "purchase-receipt" => Some(MovementType::PurchaseReceipt),
            "manual-adjustment-in" => Some(MovementType::ManualAdjustmentIn),
            "manual-adjustment-out" => Some(MovementType::ManualAdjustmentOut),
            "customer-return" => Some(MovementType::CustomerReturn),
            "supplier-return" => Some(MovementType::SupplierReturn),
            _ => None,
        }
    }

    /// Whether entries of this type increase stock
    pub fn is_inbound(&self) -> bool {
        matches!(
            self,
            MovementType::PurchaseReceipt
                | MovementType::ManualAdjustmentIn
                | MovementType::CustomerReturn
        )
    }

    /// Whether this type may be recorded through the manual adjustment path
    pub fn is_manual(&self) -> bool {
        matches!(
            self,
            MovementType::ManualAdjustmentIn | MovementType::ManualAdjustmentOut
        )
    }

    /// Apply this type's sign convention to a positive magnitude
    pub fn signed(&self, magnitude: i32) -> i32 {
        if self.is_inbound() {
            magnitude
        } else {
            -magnitude
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [MovementType; 6] = [
        MovementType::Sale,
        MovementType::PurchaseReceipt,
        MovementType::ManualAdjustmentIn,
        MovementType::ManualAdjustmentOut,
        MovementType::CustomerReturn,
        MovementType::SupplierReturn,
    ];

    #[test]
    fn test_wire_names_round_trip() {
        for mt in ALL {
            assert_eq!(MovementType::parse(mt.as_str()), Some(mt));
        }
        assert_eq!(MovementType::parse("transfer"), None);
    }

    #[test]
    fn test_sign_conventions() {
        assert_eq!(MovementType::Sale.signed(3), -3);
        assert_eq!(MovementType::PurchaseReceipt.signed(3), 3);
        assert_eq!(MovementType::ManualAdjustmentIn.signed(2), 2);
        assert_eq!(MovementType::ManualAdjustmentOut.signed(2), -2);
        assert_eq!(MovementType::CustomerReturn.signed(1), 1);
        assert_eq!(MovementType::SupplierReturn.signed(1), -1);
    }

    #[test]
    fn test_manual_types() {
        assert!(MovementType::ManualAdjustmentIn.is_manual());
        assert!(MovementType::ManualAdjustmentOut.is_manual());
        assert!(!MovementType::Sale.is_manual());
        assert!(!MovementType::PurchaseReceipt.is_manual());
    }

    #[test]
    fn test_serde_uses_kebab_case() {
        let json = serde_json::to_string(&MovementType::PurchaseReceipt).unwrap();
        assert_eq!(json, "\"purchase-receipt\"");
        let parsed: MovementType = serde_json::from_str("\"manual-adjustment-out\"").unwrap();
        assert_eq!(parsed, MovementType::ManualAdjustmentOut);
    }
}
