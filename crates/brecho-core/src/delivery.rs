//! # Delivery Tracker
//!
//! Progresses promoted sales (the shipped pool) through delivery.
//!
//! ## Status Derivation
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │            Status is a pure function of the dates                   │
//! │                                                                     │
//! │  delivered_date set  ──────────────────────────►  DELIVERED         │
//! │  shipped_date set    ──────────────────────────►  SHIPPED           │
//! │  delivery_date set   ──────────────────────────►  SCHEDULED         │
//! │  none set            ──────────────────────────►  PENDING           │
//! │                                                                     │
//! │  Derived on every read, never cached: the status cannot drift       │
//! │  from the dates that define it.                                     │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Confirming delivery is the ONLY path that permanently removes stock from
//! the catalog; until then every unit a sale holds is merely reserved and
//! fully recoverable through cancellation.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use ts_rs::TS;

use crate::catalog::Catalog;
use crate::error::{CoreError, CoreResult, ValidationError};
use crate::types::{DeliveryStatus, OpenSale};

/// Derives the delivery status from which dates are present.
///
/// Pure and total: later stamps win, so a delivery-date edit never resets
/// shipment or delivery information.
pub fn derive_status(
    delivery_date: Option<NaiveDate>,
    shipped_date: Option<NaiveDate>,
    delivered_date: Option<NaiveDate>,
) -> DeliveryStatus {
    if delivered_date.is_some() {
        DeliveryStatus::Delivered
    } else if shipped_date.is_some() {
        DeliveryStatus::Shipped
    } else if delivery_date.is_some() {
        DeliveryStatus::Scheduled
    } else {
        DeliveryStatus::Pending
    }
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// =============================================================================
// Delivery Record
// =============================================================================

/// A promoted sale plus its shipment/delivery stamps.
///
/// Holds dates only; the status is always derived via [`derive_status`].
/// The delivery date itself lives on the underlying sale record.
#[derive(Debug, Clone)]
pub struct DeliveryRecord {
    pub sale: OpenSale,
    pub shipped_date: Option<NaiveDate>,
    pub delivered_date: Option<NaiveDate>,
    /// Whether the lines are still counted in the catalog's reservation
    /// counters. Cleared on cancellation (the release) and on confirmed
    /// delivery (the removal); taken again when a cancelled delivery is
    /// rescheduled. Guarantees release happens exactly once per reserve.
    pub(crate) reservations_held: bool,
}

impl DeliveryRecord {
    fn new(sale: OpenSale) -> Self {
        DeliveryRecord {
            sale,
            shipped_date: None,
            delivered_date: None,
            reservations_held: true,
        }
    }

    /// Current status, derived from the dates.
    pub fn status(&self) -> DeliveryStatus {
        derive_status(self.sale.delivery_date, self.shipped_date, self.delivered_date)
    }
}

/// Read snapshot of a delivery record with the status materialized, for
/// presentation consumers.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DeliveryView {
    pub sale: OpenSale,
    pub status: DeliveryStatus,
    #[ts(as = "Option<String>")]
    pub shipped_date: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub delivered_date: Option<NaiveDate>,
}

impl From<&DeliveryRecord> for DeliveryView {
    fn from(record: &DeliveryRecord) -> Self {
        DeliveryView {
            sale: record.sale.clone(),
            status: record.status(),
            shipped_date: record.shipped_date,
            delivered_date: record.delivered_date,
        }
    }
}

// =============================================================================
// Delivery Tracker
// =============================================================================

/// Owns the shipped pool: promoted sales awaiting delivery progression.
///
/// The tracker never owns catalog data; it issues release/remove calls back
/// to the [`Catalog`] on cancellation and confirmed delivery.
#[derive(Debug, Default)]
pub struct DeliveryTracker {
    pool: Vec<DeliveryRecord>,
}

impl DeliveryTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        DeliveryTracker { pool: Vec::new() }
    }

    /// Intake for sales promoted out of the ledger's open set.
    pub(crate) fn accept(&mut self, sale: OpenSale) {
        debug!(sale_id = %sale.id, "Accepted into shipped pool");
        self.pool.push(DeliveryRecord::new(sale));
    }

    /// Removes a record for sale deletion. Delivered records are terminal
    /// and refuse removal.
    pub(crate) fn take(&mut self, sale_id: &str) -> CoreResult<Option<DeliveryRecord>> {
        let Some(pos) = self.pool.iter().position(|r| r.sale.id == sale_id) else {
            return Ok(None);
        };

        if self.pool[pos].status() == DeliveryStatus::Delivered {
            return Err(CoreError::InvalidDeliveryStatus {
                sale_id: sale_id.to_string(),
                status: DeliveryStatus::Delivered,
                operation: "delete",
            });
        }

        Ok(Some(self.pool.remove(pos)))
    }

    fn get_record_mut(&mut self, sale_id: &str) -> CoreResult<&mut DeliveryRecord> {
        self.pool
            .iter_mut()
            .find(|r| r.sale.id == sale_id)
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))
    }

    // -------------------------------------------------------------------------
    // Operations
    // -------------------------------------------------------------------------

    /// Schedules the delivery for `date`.
    ///
    /// ## Preconditions
    /// - `date >= today`
    /// - Not yet shipped or delivered
    ///
    /// After a cancellation the record no longer holds its reservations;
    /// scheduling takes them again (all lines or none) before setting the
    /// date, so a rescheduled delivery is backed by stock like a fresh one.
    pub fn schedule_delivery(
        &mut self,
        catalog: &mut Catalog,
        sale_id: &str,
        date: NaiveDate,
    ) -> CoreResult<()> {
        let record = self.get_record_mut(sale_id)?;

        let status = record.status();
        if matches!(status, DeliveryStatus::Shipped | DeliveryStatus::Delivered) {
            return Err(CoreError::InvalidDeliveryStatus {
                sale_id: sale_id.to_string(),
                status,
                operation: "schedule delivery",
            });
        }

        if date < today() {
            return Err(ValidationError::PastDate {
                field: "delivery date".to_string(),
            }
            .into());
        }

        if !record.reservations_held {
            let mut taken = 0;
            let result = (|| -> CoreResult<()> {
                for line in &record.sale.lines {
                    catalog.reserve(&line.item_id, line.quantity)?;
                    taken += 1;
                }
                Ok(())
            })();

            if let Err(err) = result {
                for line in &record.sale.lines[..taken] {
                    let _ = catalog.release(&line.item_id, line.quantity);
                }
                return Err(err);
            }
            record.reservations_held = true;
        }

        record.sale.delivery_date = Some(date);
        info!(sale_id = %sale_id, %date, "Delivery scheduled");
        Ok(())
    }

    /// Confirms shipment, stamping `shipped_date = today`.
    ///
    /// Requires a scheduled delivery date and no prior shipment.
    pub fn confirm_shipment(&mut self, sale_id: &str) -> CoreResult<()> {
        let record = self.get_record_mut(sale_id)?;

        let status = record.status();
        if status != DeliveryStatus::Scheduled {
            return Err(CoreError::InvalidDeliveryStatus {
                sale_id: sale_id.to_string(),
                status,
                operation: "confirm shipment",
            });
        }

        record.shipped_date = Some(today());
        info!(sale_id = %sale_id, "Shipment confirmed");
        Ok(())
    }

    /// Confirms delivery: permanently deducts every line's stock from the
    /// catalog, stamps `delivered_date = today`. Terminal.
    ///
    /// This is the only operation in the system that removes stock; all
    /// earlier stages only hold reservations. Every line's item is checked
    /// before any deduction so a failure leaves the catalog untouched.
    pub fn confirm_delivery(&mut self, catalog: &mut Catalog, sale_id: &str) -> CoreResult<()> {
        let record = self.get_record_mut(sale_id)?;

        let status = record.status();
        if status != DeliveryStatus::Shipped {
            return Err(CoreError::InvalidDeliveryStatus {
                sale_id: sale_id.to_string(),
                status,
                operation: "confirm delivery",
            });
        }

        // Pre-validate all lines so the removal loop below cannot fail
        // half-way through.
        for line in &record.sale.lines {
            let item = catalog.get(&line.item_id)?;
            if line.quantity > item.quantity {
                return Err(CoreError::InsufficientStock {
                    item_id: line.item_id.clone(),
                    available: item.quantity,
                    requested: line.quantity,
                });
            }
        }

        for line in &record.sale.lines {
            catalog.remove(&line.item_id, line.quantity)?;
        }

        // The removal consumed the reservations
        record.reservations_held = false;
        record.delivered_date = Some(today());
        info!(sale_id = %sale_id, "Delivery confirmed, stock deducted");
        Ok(())
    }

    /// Cancels the delivery: releases every line back to the catalog,
    /// clears all delivery dates (status returns to PENDING by derivation),
    /// including the delivery date on the underlying sale record.
    ///
    /// A record that already gave up its reservations (earlier cancel)
    /// only has its dates cleared; the release never runs twice.
    pub fn cancel_delivery(&mut self, catalog: &mut Catalog, sale_id: &str) -> CoreResult<()> {
        let record = self.get_record_mut(sale_id)?;

        let status = record.status();
        if status == DeliveryStatus::Delivered {
            return Err(CoreError::InvalidDeliveryStatus {
                sale_id: sale_id.to_string(),
                status,
                operation: "cancel delivery",
            });
        }

        if record.reservations_held {
            for line in &record.sale.lines {
                catalog.release(&line.item_id, line.quantity)?;
            }
            record.reservations_held = false;
        }

        record.sale.delivery_date = None;
        record.shipped_date = None;
        record.delivered_date = None;

        info!(sale_id = %sale_id, "Delivery cancelled, reservations released");
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Reads
    // -------------------------------------------------------------------------

    /// Looks up one delivery by sale id.
    pub fn get(&self, sale_id: &str) -> CoreResult<DeliveryView> {
        self.pool
            .iter()
            .find(|r| r.sale.id == sale_id)
            .map(DeliveryView::from)
            .ok_or_else(|| CoreError::SaleNotFound(sale_id.to_string()))
    }

    /// Snapshot of the shipped pool with statuses derived at read time.
    pub fn list(&self) -> Vec<DeliveryView> {
        self.pool.iter().map(DeliveryView::from).collect()
    }

    /// Number of records in the shipped pool.
    pub fn len(&self) -> usize {
        self.pool.len()
    }

    /// Whether the shipped pool is empty.
    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
