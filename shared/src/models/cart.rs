//! Sale cart value object
//!
//! The cart is a transient, per-session collection of lines pending
//! finalization into a sale. It is an explicit value passed into the sale
//! engine, not shared mutable state; unit prices are frozen when a line is
//! added and do not follow later catalog price changes.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors from cart manipulation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    #[error("quantity must be at least 1")]
    InvalidQuantity,

    #[error("adding {requested} of '{name}' exceeds available stock ({available})")]
    ExceedsAvailableStock {
        name: String,
        requested: i32,
        available: i32,
    },

    #[error("product not in cart")]
    NotInCart,
}

/// A cart line with a frozen unit price
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CartItem {
    pub product_id: Uuid,
    pub name: String,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl CartItem {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Per-session collection of pending sale lines
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    pub fn new() -> Self {
        Cart::default()
    }

    /// Add a line, merging quantities if the product is already present.
    /// `available_stock` is the stock known to the caller at add time; the
    /// merged quantity may not exceed it. The sale engine re-validates
    /// against live stock at finalization regardless.
    pub fn add(&mut self, item: CartItem, available_stock: i32) -> Result<(), CartError> {
        if item.quantity < 1 {
            return Err(CartError::InvalidQuantity);
        }

        match self.items.iter_mut().find(|i| i.product_id == item.product_id) {
            Some(existing) => {
                let merged = existing.quantity + item.quantity;
                if merged > available_stock {
                    return Err(CartError::ExceedsAvailableStock {
                        name: existing.name.clone(),
                        requested: merged,
                        available: available_stock,
                    });
                }
                existing.quantity = merged;
            }
            None => {
                if item.quantity > available_stock {
                    return Err(CartError::ExceedsAvailableStock {
                        name: item.name,
                        requested: item.quantity,
                        available: available_stock,
                    });
                }
                self.items.push(item);
            }
        }
        Ok(())
    }

    /// Remove the line for a product
    pub fn remove(&mut self, product_id: Uuid) -> Result<CartItem, CartError> {
        let pos = self
            .items
            .iter()
            .position(|i| i.product_id == product_id)
            .ok_or(CartError::NotInCart)?;
        Ok(self.items.remove(pos))
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Sum of line totals at frozen prices
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(|i| i.line_total()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    fn item(product_id: Uuid, quantity: i32, price: &str) -> CartItem {
        CartItem {
            product_id,
            name: "Marteau 500g".to_string(),
            quantity,
            unit_price: dec(price),
        }
    }

    #[test]
    fn test_add_and_subtotal() {
        let mut cart = Cart::new();
        let p1 = Uuid::new_v4();
        let p2 = Uuid::new_v4();
        cart.add(item(p1, 2, "1500.00"), 10).unwrap();
        cart.add(item(p2, 1, "250.50"), 5).unwrap();

        assert_eq!(cart.len(), 2);
        assert_eq!(cart.subtotal(), dec("3250.50"));
    }

    #[test]
    fn test_add_merges_same_product() {
        let mut cart = Cart::new();
        let p = Uuid::new_v4();
        cart.add(item(p, 2, "100.00"), 10).unwrap();
        cart.add(item(p, 3, "100.00"), 10).unwrap();

        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 5);
        assert_eq!(cart.subtotal(), dec("500.00"));
    }

    #[test]
    fn test_merge_respects_available_stock() {
        let mut cart = Cart::new();
        let p = Uuid::new_v4();
        cart.add(item(p, 3, "100.00"), 4).unwrap();
        let err = cart.add(item(p, 2, "100.00"), 4).unwrap_err();
        assert!(matches!(
            err,
            CartError::ExceedsAvailableStock {
                requested: 5,
                available: 4,
                ..
            }
        ));
        // cart unchanged after the failed merge
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_zero_quantity_rejected() {
        let mut cart = Cart::new();
        let err = cart.add(item(Uuid::new_v4(), 0, "100.00"), 10).unwrap_err();
        assert_eq!(err, CartError::InvalidQuantity);
    }

    #[test]
    fn test_frozen_price_does_not_follow_catalog() {
        let mut cart = Cart::new();
        let p = Uuid::new_v4();
        cart.add(item(p, 1, "100.00"), 10).unwrap();
        // a later add for the same product merges quantity but keeps the
        // original unit price
        cart.add(item(p, 1, "120.00"), 10).unwrap();
        assert_eq!(cart.items()[0].unit_price, dec("100.00"));
        assert_eq!(cart.subtotal(), dec("200.00"));
    }

    #[test]
    fn test_remove() {
        let mut cart = Cart::new();
        let p = Uuid::new_v4();
        cart.add(item(p, 1, "100.00"), 10).unwrap();
        cart.remove(p).unwrap();
        assert!(cart.is_empty());
        assert_eq!(cart.remove(p).unwrap_err(), CartError::NotInCart);
    }
}
