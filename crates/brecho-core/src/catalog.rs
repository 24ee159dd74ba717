//! # Catalog
//!
//! Owns the set of sellable items and their stock/reservation counters.
//!
//! ## Reservation Accounting
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                 Per-item counters                                   │
//! │                                                                     │
//! │  quantity      ──  units on hand (only remove() decrements)         │
//! │  reserved_qty  ──  units held by open sale lines                    │
//! │                                                                     │
//! │  reserve(qty)  →  reserved_qty += qty   (fails if over-reserving)   │
//! │  release(qty)  →  reserved_qty -= qty   (flag clears at zero)       │
//! │  remove(qty)   →  quantity     -= qty   (delivery confirmed only)   │
//! │                                                                     │
//! │  selectable    =  quantity > 0 && reserved_qty == 0                 │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog is the only state touched by more than one component: the
//! sale ledger reserves/releases while composing sales, the delivery tracker
//! releases on cancellation and removes on confirmed delivery.

use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Item, NewItem};
use crate::validation::{validate_new_item, validate_quantity, validate_sale_price_cents};

/// In-memory item store, insertion-ordered.
///
/// ## Usage
/// ```rust
/// use brecho_core::{Catalog, NewItem};
///
/// let mut catalog = Catalog::new();
/// let item = catalog
///     .register(NewItem {
///         name: "Jaqueta jeans".into(),
///         item_type: "jaqueta".into(),
///         external_code: None,
///         cost_cents: 2000,
///         margin_bps: 5000,
///         price_cents: None, // derived: 2000 + 50% = 3000
///         quantity: 1,
///     })
///     .unwrap();
/// assert_eq!(item.price_cents, 3000);
/// ```
#[derive(Debug, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// Creates an empty catalog.
    pub fn new() -> Self {
        Catalog { items: Vec::new() }
    }

    /// Registers a new item and returns a snapshot of it.
    ///
    /// The sale price is derived from cost + margin when not given
    /// explicitly. Zero-quantity items are accepted but start Unavailable.
    pub fn register(&mut self, input: NewItem) -> CoreResult<Item> {
        validate_new_item(&input)?;

        let now = Utc::now();
        let price_cents = input
            .price_cents
            .unwrap_or_else(|| Money::from_cents(input.cost_cents).with_margin(input.margin_bps).cents());

        let mut item = Item {
            id: Uuid::new_v4().to_string(),
            name: input.name.trim().to_string(),
            item_type: input.item_type.trim().to_string(),
            external_code: input.external_code,
            cost_cents: input.cost_cents,
            margin_bps: input.margin_bps,
            price_cents,
            quantity: input.quantity,
            reserved_qty: 0,
            reserved: false,
            sold: false,
            status: Default::default(),
            created_at: now,
            updated_at: now,
        };
        item.refresh_status();

        debug!(item_id = %item.id, name = %item.name, "Registered item");

        let snapshot = item.clone();
        self.items.push(item);
        Ok(snapshot)
    }

    /// Looks up an item by id.
    pub fn get(&self, item_id: &str) -> CoreResult<&Item> {
        self.items
            .iter()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))
    }

    fn get_mut(&mut self, item_id: &str) -> CoreResult<&mut Item> {
        self.items
            .iter_mut()
            .find(|i| i.id == item_id)
            .ok_or_else(|| CoreError::ItemNotFound(item_id.to_string()))
    }

    /// Reserves `quantity` units of an item for an open sale line.
    ///
    /// ## Errors
    /// - `ItemNotFound` for an unknown id
    /// - `InsufficientStock` when the request exceeds unreserved stock,
    ///   so a second sale can never over-reserve the same units
    /// - `Validation` for a non-positive quantity
    ///
    /// A failed reserve leaves the counters untouched.
    pub fn reserve(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let item = self.get_mut(item_id)?;

        let available = item.available_to_reserve();
        if quantity > available {
            return Err(CoreError::InsufficientStock {
                item_id: item_id.to_string(),
                available,
                requested: quantity,
            });
        }

        item.reserved_qty += quantity;
        item.updated_at = Utc::now();
        item.refresh_status();

        debug!(item_id = %item_id, quantity, reserved_qty = item.reserved_qty, "Reserved");
        Ok(())
    }

    /// Releases `quantity` previously reserved units.
    ///
    /// The inverse of [`reserve`](Self::reserve). Partial releases are
    /// allowed; the `reserved` flag clears only when the outstanding count
    /// returns to zero. Releases are NOT deduplicated: callers must release
    /// exactly once per matching reserve. The counter is clamped at zero as
    /// a guard, not as a code path callers may rely on.
    pub fn release(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let item = self.get_mut(item_id)?;

        item.reserved_qty = (item.reserved_qty - quantity).max(0);
        item.updated_at = Utc::now();
        item.refresh_status();

        debug!(item_id = %item_id, quantity, reserved_qty = item.reserved_qty, "Released");
        Ok(())
    }

    /// Permanently deducts `quantity` units on confirmed delivery.
    ///
    /// Marks the item sold and consumes the matching reservation. This is
    /// the only operation that decrements on-hand stock; everything else
    /// only moves the reservation counter.
    pub fn remove(&mut self, item_id: &str, quantity: i64) -> CoreResult<()> {
        validate_quantity(quantity)?;

        let item = self.get_mut(item_id)?;

        if quantity > item.quantity {
            return Err(CoreError::InsufficientStock {
                item_id: item_id.to_string(),
                available: item.quantity,
                requested: quantity,
            });
        }

        item.quantity -= quantity;
        item.reserved_qty = (item.reserved_qty - quantity).max(0);
        item.sold = true;
        item.updated_at = Utc::now();
        item.refresh_status();

        debug!(item_id = %item_id, quantity, remaining = item.quantity, "Removed stock");
        Ok(())
    }

    /// Edits an item's pricing. Open sales are unaffected: their lines carry
    /// frozen copies of the prices at the time they were added.
    pub fn update_pricing(
        &mut self,
        item_id: &str,
        cost_cents: i64,
        margin_bps: u32,
        price_cents: Option<i64>,
    ) -> CoreResult<()> {
        crate::validation::validate_amount_cents("cost", cost_cents)?;
        if let Some(cents) = price_cents {
            validate_sale_price_cents(cents)?;
        }

        let item = self.get_mut(item_id)?;

        item.cost_cents = cost_cents;
        item.margin_bps = margin_bps;
        item.price_cents = price_cents
            .unwrap_or_else(|| Money::from_cents(cost_cents).with_margin(margin_bps).cents());
        item.updated_at = Utc::now();

        Ok(())
    }

    /// Lists items available for selection, optionally filtered by type.
    ///
    /// ## Semantics
    /// - `quantity > 0` and not reserved
    /// - Type filter is a case-insensitive exact match
    /// - Catalog insertion order preserved
    /// - Returns a fresh snapshot, not a live view
    pub fn list_available(&self, type_filter: Option<&str>) -> Vec<Item> {
        debug!(filter = ?type_filter, "Listing available items");

        self.items
            .iter()
            .filter(|i| i.is_selectable())
            .filter(|i| match type_filter {
                Some(t) => i.item_type.eq_ignore_ascii_case(t),
                None => true,
            })
            .cloned()
            .collect()
    }

    /// Full catalog snapshot, insertion-ordered.
    pub fn list(&self) -> Vec<Item> {
        self.items.to_vec()
    }

    /// Number of registered items.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the catalog holds no items.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemStatus;

    fn new_item(name: &str, item_type: &str, quantity: i64) -> NewItem {
        NewItem {
            name: name.to_string(),
            item_type: item_type.to_string(),
            external_code: None,
            cost_cents: 2000,
            margin_bps: 5000,
            price_cents: None,
            quantity,
        }
    }

    #[test]
    fn test_register_derives_price_from_margin() {
        let mut catalog = Catalog::new();
        let item = catalog.register(new_item("Jaqueta", "jaqueta", 1)).unwrap();

        assert_eq!(item.price_cents, 3000); // 2000 + 50%
        assert_eq!(item.status, ItemStatus::Available);
    }

    #[test]
    fn test_register_rejects_bad_input() {
        let mut catalog = Catalog::new();

        let mut input = new_item("", "jaqueta", 1);
        assert!(catalog.register(input).is_err());

        input = new_item("Jaqueta", "jaqueta", -1);
        assert!(catalog.register(input).is_err());

        assert!(catalog.is_empty());
    }

    #[test]
    fn test_zero_quantity_item_starts_unavailable() {
        let mut catalog = Catalog::new();
        let item = catalog.register(new_item("Bolsa", "bolsa", 0)).unwrap();
        assert_eq!(item.status, ItemStatus::Unavailable);
        assert!(catalog.list_available(None).is_empty());
    }

    #[test]
    fn test_reserve_and_release_roundtrip() {
        let mut catalog = Catalog::new();
        let item = catalog.register(new_item("Jaqueta", "jaqueta", 1)).unwrap();

        catalog.reserve(&item.id, 1).unwrap();
        let reserved = catalog.get(&item.id).unwrap();
        assert!(reserved.reserved);
        assert_eq!(reserved.status, ItemStatus::Reserved);
        assert_eq!(reserved.quantity, 1); // quantity untouched
        assert!(catalog.list_available(None).is_empty());

        catalog.release(&item.id, 1).unwrap();
        let released = catalog.get(&item.id).unwrap();
        assert!(!released.reserved);
        assert_eq!(released.status, ItemStatus::Available);
        assert_eq!(catalog.list_available(None).len(), 1);
    }

    #[test]
    fn test_reserve_more_than_stock_fails_cleanly() {
        let mut catalog = Catalog::new();
        let item = catalog.register(new_item("Jaqueta", "jaqueta", 2)).unwrap();

        let err = catalog.reserve(&item.id, 3).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { available: 2, requested: 3, .. }));

        // No partial mutation
        let unchanged = catalog.get(&item.id).unwrap();
        assert_eq!(unchanged.reserved_qty, 0);
        assert!(!unchanged.reserved);
    }

    #[test]
    fn test_second_reservation_cannot_overbook() {
        let mut catalog = Catalog::new();
        let item = catalog.register(new_item("Camisa", "camisa", 3)).unwrap();

        catalog.reserve(&item.id, 2).unwrap();
        let err = catalog.reserve(&item.id, 2).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientStock { available: 1, .. }));
    }

    #[test]
    fn test_partial_release_keeps_flag_until_zero() {
        let mut catalog = Catalog::new();
        let item = catalog.register(new_item("Camisa", "camisa", 3)).unwrap();

        catalog.reserve(&item.id, 3).unwrap();
        catalog.release(&item.id, 1).unwrap();
        assert!(catalog.get(&item.id).unwrap().reserved);

        catalog.release(&item.id, 2).unwrap();
        assert!(!catalog.get(&item.id).unwrap().reserved);
    }

    #[test]
    fn test_remove_deducts_stock_and_marks_sold() {
        let mut catalog = Catalog::new();
        let item = catalog.register(new_item("Jaqueta", "jaqueta", 1)).unwrap();

        catalog.reserve(&item.id, 1).unwrap();
        catalog.remove(&item.id, 1).unwrap();

        let sold = catalog.get(&item.id).unwrap();
        assert_eq!(sold.quantity, 0);
        assert!(sold.sold);
        assert_eq!(sold.status, ItemStatus::Sold);
    }

    #[test]
    fn test_unknown_id_fails_with_not_found() {
        let mut catalog = Catalog::new();
        assert!(matches!(catalog.reserve("nope", 1), Err(CoreError::ItemNotFound(_))));
        assert!(matches!(catalog.release("nope", 1), Err(CoreError::ItemNotFound(_))));
        assert!(matches!(catalog.remove("nope", 1), Err(CoreError::ItemNotFound(_))));
        assert!(matches!(catalog.get("nope"), Err(CoreError::ItemNotFound(_))));
    }

    #[test]
    fn test_list_available_type_filter_case_insensitive() {
        let mut catalog = Catalog::new();
        catalog.register(new_item("Vestido floral", "Vestido", 1)).unwrap();
        catalog.register(new_item("Bolsa couro", "bolsa", 1)).unwrap();

        let vestidos = catalog.list_available(Some("vestido"));
        assert_eq!(vestidos.len(), 1);
        assert_eq!(vestidos[0].name, "Vestido floral");

        // Exact match, not substring
        assert!(catalog.list_available(Some("vest")).is_empty());
    }

    #[test]
    fn test_list_available_preserves_insertion_order() {
        let mut catalog = Catalog::new();
        catalog.register(new_item("Primeiro", "x", 1)).unwrap();
        catalog.register(new_item("Segundo", "x", 1)).unwrap();
        catalog.register(new_item("Terceiro", "x", 1)).unwrap();

        let names: Vec<String> = catalog
            .list_available(None)
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Primeiro", "Segundo", "Terceiro"]);
    }

    #[test]
    fn test_update_pricing_rederives_price() {
        let mut catalog = Catalog::new();
        let item = catalog.register(new_item("Jaqueta", "jaqueta", 1)).unwrap();

        catalog.update_pricing(&item.id, 1000, 10000, None).unwrap();
        assert_eq!(catalog.get(&item.id).unwrap().price_cents, 2000);

        catalog.update_pricing(&item.id, 1000, 10000, Some(2500)).unwrap();
        assert_eq!(catalog.get(&item.id).unwrap().price_cents, 2500);
    }
}
