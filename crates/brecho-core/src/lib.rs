//! # brecho-core: Inventory & Sale Ledger for Brechó POS
//!
//! This crate is the **heart** of Brechó POS, a consignment-inventory
//! tracker for a small resale business. It keeps stock counts, reservations,
//! sale totals and delivery status mutually consistent as items move between
//! available, reserved, sold and delivered, and as a sale moves from open
//! through payment to shipment and delivery.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                     Brechó POS Architecture                         │
//! │                                                                     │
//! │  ┌─────────────────────────────────────────────────────────────┐    │
//! │  │          Frontend / persistence / notifications             │    │
//! │  │  (consume read snapshots, mirror operations to the remote   │    │
//! │  │   store, surface errors — all outside this crate)           │    │
//! │  └──────────────────────────────┬──────────────────────────────┘    │
//! │                                 │                                   │
//! │  ┌──────────────────────────────▼──────────────────────────────┐    │
//! │  │              ★ brecho-core (THIS CRATE) ★                   │    │
//! │  │                                                             │    │
//! │  │   ┌──────────┐    ┌─────────────┐    ┌─────────────────┐    │    │
//! │  │   │ Catalog  │◄───│ SaleLedger  │───►│ DeliveryTracker │    │    │
//! │  │   │ stock &  │    │ open sales, │    │  shipped pool,  │    │    │
//! │  │   │ reserves │◄───│ draft, pay  │    │  ship/deliver   │    │    │
//! │  │   └──────────┘    └─────────────┘    └─────────────────┘    │    │
//! │  │                                                             │    │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • SINGLE WRITER         │    │
//! │  └─────────────────────────────────────────────────────────────┘    │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Item, OpenSale, SaleLine, ClientInfo, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types
//! - [`validation`] - Business rule validation
//! - [`catalog`] - Item stock and reservation counters
//! - [`ledger`] - Open-sale composition, payment flags, promotion
//! - [`delivery`] - Shipped-pool progression and status derivation
//!
//! ## Design Principles
//!
//! 1. **Explicit services**: `Catalog`, `SaleLedger` and `DeliveryTracker`
//!    are constructed by the caller and passed by reference — no singletons
//! 2. **No I/O**: database, network and file system access are FORBIDDEN here
//! 3. **Integer money**: all monetary values are cents (i64), never floats
//! 4. **Atomic failures**: an operation that errors leaves state unchanged
//!
//! ## Example Usage
//!
//! ```rust
//! use brecho_core::{Catalog, ClientInfo, DeliveryTracker, LineRequest, NewItem, SaleLedger};
//!
//! let mut catalog = Catalog::new();
//! let mut ledger = SaleLedger::new();
//! let mut tracker = DeliveryTracker::new();
//!
//! let item = catalog
//!     .register(NewItem {
//!         name: "Jaqueta jeans".into(),
//!         item_type: "jaqueta".into(),
//!         external_code: None,
//!         cost_cents: 2000,
//!         margin_bps: 5000,
//!         price_cents: None,
//!         quantity: 1,
//!     })
//!     .unwrap();
//!
//! let sale_id = ledger
//!     .add_sale(&mut catalog, ClientInfo::named("Ana"), &[LineRequest::new(&item.id, 1)])
//!     .unwrap();
//!
//! // Reserved while the sale is open: gone from the selection list
//! assert!(catalog.list_available(None).is_empty());
//!
//! // Paying product + freight promotes the sale into the shipped pool
//! ledger.confirm_payment(&mut tracker, &sale_id).unwrap();
//! ledger.update_freight(&mut tracker, &sale_id, 1500, true).unwrap();
//! assert_eq!(tracker.len(), 1);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod catalog;
pub mod delivery;
pub mod error;
pub mod ledger;
pub mod money;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use catalog::Catalog;
pub use delivery::{derive_status, DeliveryTracker, DeliveryView};
pub use error::{CoreError, CoreResult, ValidationError};
pub use ledger::{SaleDraft, SaleLedger};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single sale.
///
/// ## Business Reason
/// Prevents runaway sales and keeps snapshots a reasonable size.
pub const MAX_SALE_LINES: usize = 100;

/// Maximum quantity of a single item in a sale line.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g. typing 1000 instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;

/// Maximum monetary amount for prices, costs and freight, in cents
/// (R$ 1.000.000,00).
///
/// ## Business Reason
/// Catches fat-fingered amounts and keeps every line total and sale sum
/// far away from i64 overflow.
pub const MAX_AMOUNT_CENTS: i64 = 100_000_000;
