//! HTTP handlers for the Hardware Store Management Platform

mod health;
mod products;
mod purchase_orders;
mod sales;
mod stock;

pub use health::*;
pub use products::*;
pub use purchase_orders::*;
pub use sales::*;
pub use stock::*;
