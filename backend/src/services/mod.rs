//! Business logic services for the Hardware Store Management Platform

pub mod catalog;
pub mod imports;
pub mod ledger;
pub mod purchase_orders;
pub mod receiving;
pub mod sales;

pub use catalog::CatalogService;
pub use imports::ImportService;
pub use ledger::LedgerService;
pub use purchase_orders::PurchaseOrderService;
pub use receiving::ReceivingService;
pub use sales::SalesService;
