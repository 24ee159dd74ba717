//! # Sale Ledger
//!
//! Owns the set of in-progress sales and the draft being composed, and
//! coordinates reservations with the [`Catalog`].
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    Sale Lifecycle                                   │
//! │                                                                     │
//! │  ┌─────────┐    ┌──────────────┐    ┌──────────────┐    ┌────────┐  │
//! │  │  Draft  │───►│ OPEN(unpaid) │───►│  OPEN(paid)  │───►│PROMOTED│  │
//! │  │(staged) │    │              │    │              │    │(shipped│  │
//! │  └─────────┘    └──────────────┘    └──────────────┘    │  pool) │  │
//! │       │                │                   │            └────────┘  │
//! │  cancel_draft     delete_sale         delete_sale                   │
//! │  (release all)    (release all)       (release all)                 │
//! │                                                                     │
//! │  Promotion: exactly when is_paid AND is_freight_paid become true,   │
//! │  checked after either flag changes — never anywhere else.           │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//! Multi-line operations reserve one line at a time; on a mid-loop failure
//! every reservation already taken is rolled back before the error returns,
//! so a failed call never leaves partial state behind.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::delivery::DeliveryTracker;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{ClientInfo, LineRequest, OpenSale, SaleLine};
use crate::validation::{
    validate_amount_cents, validate_line_requests, validate_name, validate_quantity,
    validate_sale_price_cents,
};

// =============================================================================
// Sale Draft
// =============================================================================

/// The sale being composed on screen, before it becomes an [`OpenSale`].
///
/// Staged lines hold real reservations: an item staged here already counts
/// against catalog stock, so another sale cannot grab it while the operator
/// is still filling in client details.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct SaleDraft {
    pub client: Option<ClientInfo>,
    pub lines: Vec<SaleLine>,
}

impl SaleDraft {
    /// Sum of staged line totals in cents.
    pub fn total_cents(&self) -> i64 {
        self.lines.iter().map(|l| l.line_total_cents()).sum()
    }

    /// Whether nothing is staged.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

// =============================================================================
// Sale Ledger
// =============================================================================

/// In-memory store of open sales plus the current draft.
///
/// Catalog-touching operations take `&mut Catalog` explicitly; operations
/// that can promote a sale also take `&mut DeliveryTracker`. No singletons:
/// whoever owns the services passes them in.
#[derive(Debug, Default)]
pub struct SaleLedger {
    open: Vec<OpenSale>,
    draft: SaleDraft,
}

impl SaleLedger {
    /// Creates an empty ledger.
    pub fn new() -> Self {
        SaleLedger {
            open: Vec::new(),
            draft: SaleDraft::default(),
        }
    }

    // -------------------------------------------------------------------------
    // Reservation helpers
    // -------------------------------------------------------------------------

    /// Snapshots and reserves every request, skipping item ids in `skip`.
    ///
    /// Duplicate ids within `requests` collapse to their first occurrence.
    /// On any failure all reservations taken by this call are rolled back.
    fn reserve_requests(
        catalog: &mut Catalog,
        requests: &[LineRequest],
        skip: &[String],
    ) -> CoreResult<Vec<SaleLine>> {
        let mut reserved: Vec<SaleLine> = Vec::new();

        let result = (|| -> CoreResult<()> {
            for request in requests {
                if skip.iter().any(|id| *id == request.item_id)
                    || reserved.iter().any(|l| l.item_id == request.item_id)
                {
                    continue;
                }

                let item = catalog.get(&request.item_id)?;
                validate_sale_price_cents(item.price_cents)?;
                let line = SaleLine::from_item(item, request.quantity);

                catalog.reserve(&request.item_id, request.quantity)?;
                reserved.push(line);
            }
            Ok(())
        })();

        if let Err(err) = result {
            // Undo everything this call reserved; the items were just
            // reserved, so the releases cannot fail.
            for line in &reserved {
                let _ = catalog.release(&line.item_id, line.quantity);
            }
            return Err(err);
        }

        Ok(reserved)
    }

    fn release_lines(catalog: &mut Catalog, lines: &[SaleLine]) -> CoreResult<()> {
        for line in lines {
            catalog.release(&line.item_id, line.quantity)?;
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Open sale operations
    // -------------------------------------------------------------------------

    /// Creates a new open sale, reserving every line.
    ///
    /// ## Preconditions
    /// - `requests` non-empty, every quantity positive
    /// - every referenced item exists, is priced (> 0) and has stock
    ///
    /// Returns the new sale id.
    pub fn add_sale(
        &mut self,
        catalog: &mut Catalog,
        client: ClientInfo,
        requests: &[LineRequest],
    ) -> CoreResult<String> {
        validate_name("client name", &client.name)?;
        validate_line_requests(requests)?;

        let lines = Self::reserve_requests(catalog, requests, &[])?;
        let sale = OpenSale::new(client, lines);
        let sale_id = sale.id.clone();

        info!(sale_id = %sale_id, total_cents = sale.total_cents, "Sale created");

        self.open.push(sale);
        Ok(sale_id)
    }

    /// Adds lines to an existing open sale, deduplicating by item id.
    ///
    /// Items already in the sale (or repeated within `requests`) are
    /// skipped: no double reservation, no duplicate line. The total is
    /// recomputed from the full line list afterwards.
    pub fn add_lines(
        &mut self,
        catalog: &mut Catalog,
        sale_id: &str,
        requests: &[LineRequest],
    ) -> CoreResult<()> {
        validate_line_requests(requests)?;

        // Existence check before reserving anything
        let existing: Vec<String> = self
            .get(sale_id)?
            .lines
            .iter()
            .map(|l| l.item_id.clone())
            .collect();

        let new_lines = Self::reserve_requests(catalog, requests, &existing)?;

        let sale = self.get_mut(sale_id)?;
        sale.lines.extend(new_lines);
        sale.recompute_total();

        debug!(sale_id = %sale_id, total_cents = sale.total_cents, "Lines added");
        Ok(())
    }

    /// Removes one line from an open sale, releasing its reservation.
    ///
    /// ## Errors
    /// `SaleNotFound` / `LineNotFound` when either id is unknown; the caller
    /// must not assume partial success.
    pub fn remove_line(
        &mut self,
        catalog: &mut Catalog,
        sale_id: &str,
        item_id: &str,
    ) -> CoreResult<()> {
        let sale = self
            .open
            .iter_mut()
            .find(|s| s.id == sale_id)
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))?;

        let pos = sale
            .lines
            .iter()
            .position(|l| l.item_id == item_id)
            .ok_or_else(|| CoreError::LineNotFound {
                sale_id: sale_id.to_string(),
                item_id: item_id.to_string(),
            })?;

        // Release before mutating the sale so a failed release (item gone
        // from the catalog) leaves the line list untouched.
        catalog.release(&sale.lines[pos].item_id, sale.lines[pos].quantity)?;
        sale.lines.remove(pos);
        sale.recompute_total();

        debug!(sale_id = %sale_id, item_id = %item_id, "Line removed");
        Ok(())
    }

    /// Marks the sale paid. Promotes it into the shipped pool immediately
    /// when freight is already paid.
    pub fn confirm_payment(
        &mut self,
        tracker: &mut DeliveryTracker,
        sale_id: &str,
    ) -> CoreResult<()> {
        let sale = self.get_mut(sale_id)?;
        sale.is_paid = true;

        info!(sale_id = %sale_id, "Payment confirmed");

        self.maybe_promote(tracker, sale_id);
        Ok(())
    }

    /// Updates the freight value and its paid flag. Promotes the sale when
    /// the product payment was already confirmed and freight becomes paid.
    pub fn update_freight(
        &mut self,
        tracker: &mut DeliveryTracker,
        sale_id: &str,
        freight_cents: i64,
        paid: bool,
    ) -> CoreResult<()> {
        validate_amount_cents("freight", freight_cents)?;

        let sale = self.get_mut(sale_id)?;
        sale.freight_cents = freight_cents;
        sale.is_freight_paid = paid;

        debug!(sale_id = %sale_id, freight_cents, paid, "Freight updated");

        self.maybe_promote(tracker, sale_id);
        Ok(())
    }

    /// Moves the sale into the shipped pool when both payment flags are set.
    ///
    /// The ONLY promotion site: called right after either flag changes,
    /// never eagerly or lazily elsewhere. A sale lives in exactly one of
    /// {open set, shipped pool} at any time.
    fn maybe_promote(&mut self, tracker: &mut DeliveryTracker, sale_id: &str) {
        let Some(pos) = self
            .open
            .iter()
            .position(|s| s.id == sale_id && s.is_fully_paid())
        else {
            return;
        };

        let sale = self.open.remove(pos);
        info!(sale_id = %sale.id, total_cents = sale.total_cents, "Sale promoted to shipped pool");
        tracker.accept(sale);
    }

    /// Deletes a sale from whichever set holds it, releasing all its lines.
    ///
    /// Works on the open set and on the shipped pool; delivered records are
    /// terminal and refuse deletion.
    pub fn delete_sale(
        &mut self,
        catalog: &mut Catalog,
        tracker: &mut DeliveryTracker,
        sale_id: &str,
    ) -> CoreResult<()> {
        if let Some(pos) = self.open.iter().position(|s| s.id == sale_id) {
            let sale = self.open.remove(pos);
            Self::release_lines(catalog, &sale.lines)?;
            info!(sale_id = %sale_id, "Open sale deleted");
            return Ok(());
        }

        if let Some(record) = tracker.take(sale_id)? {
            // A cancelled delivery already released its lines
            if record.reservations_held {
                Self::release_lines(catalog, &record.sale.lines)?;
            }
            info!(sale_id = %sale_id, "Promoted sale deleted");
            return Ok(());
        }

        Err(CoreError::SaleNotFound(sale_id.to_string()))
    }

    // -------------------------------------------------------------------------
    // Draft staging
    // -------------------------------------------------------------------------

    /// Stages one line into the draft, reserving it immediately.
    ///
    /// Staging the same item twice is rejected: the first reservation
    /// already holds the stock.
    pub fn stage_line(&mut self, catalog: &mut Catalog, request: LineRequest) -> CoreResult<()> {
        validate_quantity(request.quantity)?;

        if self.draft.lines.iter().any(|l| l.item_id == request.item_id) {
            return Err(ValidationError::Duplicate {
                field: "item".to_string(),
                value: request.item_id,
            }
            .into());
        }

        let item = catalog.get(&request.item_id)?;
        validate_sale_price_cents(item.price_cents)?;
        let line = SaleLine::from_item(item, request.quantity);

        catalog.reserve(&request.item_id, request.quantity)?;
        debug!(item_id = %request.item_id, quantity = request.quantity, "Line staged");
        self.draft.lines.push(line);

        Ok(())
    }

    /// Sets the client for the draft.
    pub fn set_draft_client(&mut self, client: ClientInfo) -> CoreResult<()> {
        validate_name("client name", &client.name)?;
        self.draft.client = Some(client);
        Ok(())
    }

    /// Cancels the draft: releases every staged reservation and clears the
    /// staged client and lines.
    pub fn cancel_draft(&mut self, catalog: &mut Catalog) -> CoreResult<()> {
        let lines = std::mem::take(&mut self.draft.lines);
        self.draft.client = None;

        Self::release_lines(catalog, &lines)?;

        debug!(released = lines.len(), "Draft cancelled");
        Ok(())
    }

    /// Turns the draft into an open sale.
    ///
    /// The staged lines are already reserved, so nothing is re-reserved
    /// here. A client passed in overrides the staged one. Returns the new
    /// sale id.
    pub fn commit_draft(&mut self, client: Option<ClientInfo>) -> CoreResult<String> {
        if self.draft.is_empty() {
            return Err(ValidationError::Empty {
                field: "lines".to_string(),
            }
            .into());
        }

        let client = client
            .or_else(|| self.draft.client.take())
            .ok_or_else(|| ValidationError::Required {
                field: "client".to_string(),
            })?;
        validate_name("client name", &client.name)?;

        let lines = std::mem::take(&mut self.draft.lines);
        self.draft.client = None;

        let sale = OpenSale::new(client, lines);
        let sale_id = sale.id.clone();

        info!(sale_id = %sale_id, total_cents = sale.total_cents, "Draft committed");

        self.open.push(sale);
        Ok(sale_id)
    }

    /// Read-only view of the draft.
    pub fn draft(&self) -> &SaleDraft {
        &self.draft
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Looks up an open sale by id.
    pub fn get(&self, sale_id: &str) -> CoreResult<&OpenSale> {
        self.open
            .iter()
            .find(|s| s.id == sale_id)
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))
    }

    fn get_mut(&mut self, sale_id: &str) -> CoreResult<&mut OpenSale> {
        self.open
            .iter_mut()
            .find(|s| s.id == sale_id)
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))
    }

    /// Snapshot of the open set, insertion-ordered.
    pub fn list_open(&self) -> Vec<OpenSale> {
        self.open.to_vec()
    }

    /// Number of open sales.
    pub fn open_count(&self) -> usize {
        self.open.len()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
