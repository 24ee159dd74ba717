//! # Domain Types
//!
//! Core domain types for the inventory & sale ledger.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐   ┌───────────────┐         │
//! │  │     Item      │   │   OpenSale    │   │   SaleLine    │         │
//! │  │ ───────────── │   │ ───────────── │   │ ───────────── │         │
//! │  │ id (UUID)     │   │ id (UUID)     │   │ item_id (FK)  │         │
//! │  │ quantity      │   │ client        │   │ cost_cents    │         │
//! │  │ reserved_qty  │   │ lines         │   │ price (frozen)│         │
//! │  │ status        │   │ total_cents   │   │ quantity      │         │
//! │  └───────────────┘   └───────────────┘   └───────────────┘         │
//! │                                                                     │
//! │  ┌───────────────┐   ┌───────────────┐                             │
//! │  │  ItemStatus   │   │DeliveryStatus │                             │
//! │  │ ───────────── │   │ ───────────── │                             │
//! │  │ Available     │   │ Pending       │                             │
//! │  │ Reserved      │   │ Scheduled     │                             │
//! │  │ Unavailable   │   │ Shipped       │                             │
//! │  │ Sold          │   │ Delivered     │                             │
//! │  └───────────────┘   └───────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! `SaleLine` and `ClientInfo` are frozen copies taken when a line enters a
//! sale. Later catalog price edits or client record edits never retroactively
//! change an open sale.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Item Status
// =============================================================================

/// The lifecycle status of a catalog item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// In stock and free to be added to a sale.
    Available,
    /// Held by at least one open sale line.
    Reserved,
    /// No stock on hand (and not sold through this ledger).
    Unavailable,
    /// Permanently deducted on confirmed delivery.
    Sold,
}

impl Default for ItemStatus {
    fn default() -> Self {
        ItemStatus::Available
    }
}

// =============================================================================
// Item
// =============================================================================

/// A catalog entry: one sellable item with its stock and reservation counters.
///
/// ## Invariants
/// - `quantity >= 0` and `0 <= reserved_qty <= quantity` at all times
/// - `reserved == (reserved_qty > 0)`
/// - `status` is recomputed from the counters after every mutation
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Item {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown to the operator and on receipts.
    pub name: String,

    /// Category/type used for filtered listing ("vestido", "calçado", ...).
    pub item_type: String,

    /// Optional external code (consignor tag, barcode).
    pub external_code: Option<String>,

    /// Acquisition cost in cents.
    pub cost_cents: i64,

    /// Profit margin in basis points (5000 = 50%).
    pub margin_bps: u32,

    /// Sale price in cents.
    pub price_cents: i64,

    /// Units on hand. Never negative.
    pub quantity: i64,

    /// Units currently held by open sale lines.
    pub reserved_qty: i64,

    /// Whether any reservation is outstanding.
    pub reserved: bool,

    /// Whether this item has been sold through a confirmed delivery.
    pub sold: bool,

    /// Derived lifecycle status.
    pub status: ItemStatus,

    /// When the item was registered.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the item was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Returns the sale price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }

    /// Returns the cost price as Money.
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_cents(self.cost_cents)
    }

    /// Units that can still be reserved by a new sale line.
    #[inline]
    pub fn available_to_reserve(&self) -> i64 {
        self.quantity - self.reserved_qty
    }

    /// Whether the item shows up in the "available for selection" listing.
    #[inline]
    pub fn is_selectable(&self) -> bool {
        self.quantity > 0 && !self.reserved
    }

    /// Recomputes `reserved` and `status` from the counters.
    pub(crate) fn refresh_status(&mut self) {
        self.reserved = self.reserved_qty > 0;
        self.status = if self.sold && self.quantity == 0 {
            ItemStatus::Sold
        } else if self.reserved {
            ItemStatus::Reserved
        } else if self.quantity > 0 {
            ItemStatus::Available
        } else {
            ItemStatus::Unavailable
        };
    }
}

// =============================================================================
// New Item (registration input)
// =============================================================================

/// Input for registering a new catalog item.
///
/// When `price_cents` is absent the sale price is derived from the cost
/// price and the margin: `price = cost.with_margin(margin_bps)`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewItem {
    pub name: String,
    pub item_type: String,
    pub external_code: Option<String>,
    pub cost_cents: i64,
    pub margin_bps: u32,
    pub price_cents: Option<i64>,
    pub quantity: i64,
}

// =============================================================================
// Client Info
// =============================================================================

/// Client snapshot carried inside a sale.
///
/// Copied, not referenced: edits to the client register after a sale is
/// created do not change the sale's record of who bought it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClientInfo {
    pub name: String,
    pub phone: Option<String>,
    pub tax_id: Option<String>,
    pub address: Option<String>,
}

impl ClientInfo {
    /// Creates a client snapshot with only a name.
    pub fn named(name: impl Into<String>) -> Self {
        ClientInfo {
            name: name.into(),
            phone: None,
            tax_id: None,
            address: None,
        }
    }
}

// =============================================================================
// Sale Line
// =============================================================================

/// A line item in a sale.
/// Uses the snapshot pattern to freeze item data at time of adding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleLine {
    /// Catalog item this line reserves.
    pub item_id: String,
    /// Item name at time of adding (frozen).
    pub name_snapshot: String,
    /// Cost price in cents at time of adding (frozen).
    pub cost_cents: i64,
    /// Sale price in cents at time of adding (frozen).
    pub unit_price_cents: i64,
    /// Quantity reserved by this line.
    pub quantity: i64,
}

impl SaleLine {
    /// Creates a sale line from a catalog item and quantity.
    ///
    /// ## Price Freezing
    /// The prices are captured at this moment. If the catalog prices change
    /// afterwards, this line retains the originals.
    pub fn from_item(item: &Item, quantity: i64) -> Self {
        SaleLine {
            item_id: item.id.clone(),
            name_snapshot: item.name.clone(),
            cost_cents: item.cost_cents,
            unit_price_cents: item.price_cents,
            quantity,
        }
    }

    /// Line total (unit price × quantity).
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }

    /// Returns the unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }
}

/// Input for adding an item to a sale: which item, how many units.
///
/// Callers never supply prices; the core snapshots them from the catalog.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineRequest {
    pub item_id: String,
    pub quantity: i64,
}

impl LineRequest {
    pub fn new(item_id: impl Into<String>, quantity: i64) -> Self {
        LineRequest {
            item_id: item_id.into(),
            quantity,
        }
    }
}

// =============================================================================
// Open Sale
// =============================================================================

/// An in-progress sale: client snapshot, lines, totals and payment flags.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OpenSale {
    pub id: String,
    pub client: ClientInfo,
    /// Ordered line list. The total below is always recomputable from it.
    pub lines: Vec<SaleLine>,
    /// Sum of line totals in cents. Recomputed after every line mutation.
    pub total_cents: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    pub is_paid: bool,
    /// Freight value in cents, >= 0, default 0.
    pub freight_cents: i64,
    pub is_freight_paid: bool,
    /// Agreed delivery date, if already scheduled.
    #[ts(as = "Option<String>")]
    pub delivery_date: Option<NaiveDate>,
}

impl OpenSale {
    /// Creates a new unpaid sale from a client snapshot and line list.
    pub fn new(client: ClientInfo, lines: Vec<SaleLine>) -> Self {
        let mut sale = OpenSale {
            id: uuid::Uuid::new_v4().to_string(),
            client,
            lines,
            total_cents: 0,
            created_at: Utc::now(),
            is_paid: false,
            freight_cents: 0,
            is_freight_paid: false,
            delivery_date: None,
        };
        sale.recompute_total();
        sale
    }

    /// Recomputes the total from the current line list.
    ///
    /// Called after every line add/remove. The total is never patched
    /// incrementally; recompute-from-source is what keeps it from drifting.
    pub fn recompute_total(&mut self) {
        self.total_cents = self.lines.iter().map(|l| l.line_total_cents()).sum();
    }

    /// Both payment flags set: the sale is due for promotion.
    #[inline]
    pub fn is_fully_paid(&self) -> bool {
        self.is_paid && self.is_freight_paid
    }

    /// Returns the total as Money.
    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Delivery Status
// =============================================================================

/// Delivery progression for a promoted sale.
///
/// Never stored: always derived from which dates are present
/// (see `delivery::derive_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    /// No delivery date agreed yet.
    Pending,
    /// Delivery date set, not yet shipped.
    Scheduled,
    /// Shipment confirmed.
    Shipped,
    /// Delivery confirmed. Terminal.
    Delivered,
}

impl Default for DeliveryStatus {
    fn default() -> Self {
        DeliveryStatus::Pending
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
