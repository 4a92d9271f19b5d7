//! The stock ledger: sole mutator of product stock counts.
//!
//! A batch is validated against one snapshot taken under the catalog's write
//! lock and then committed in full, so concurrent batches serialize and a
//! rejected batch leaves every count untouched.

use std::collections::{HashMap, HashSet};

use common::{OrderLine, ProductId, ReservationToken, StockRequest};

use crate::error::{LedgerError, QuantityIssue, Result};
use crate::model::Product;
use crate::store::{InMemoryCatalog, Reservation};

/// Result of releasing a reservation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Stock of a committed batch was returned.
    Restocked { lines: usize },
    /// The token had already been released.
    AlreadyReleased,
    /// Nothing was committed under the token; it is now closed for use.
    NothingReserved,
}

/// Authoritative stock counts backed by the shared catalog state.
#[derive(Debug, Clone)]
pub struct StockLedger {
    catalog: InMemoryCatalog,
}

impl StockLedger {
    pub fn new(catalog: InMemoryCatalog) -> Self {
        Self { catalog }
    }

    /// Validates and applies a batch with no reservation token.
    #[tracing::instrument(skip(self, requests), fields(requests = requests.len()))]
    pub async fn finalize_batch(&self, requests: &[StockRequest]) -> Result<Vec<OrderLine>> {
        let mut state = self.catalog.write().await;
        let lines = plan_batch(&state.products, requests).inspect_err(|e| {
            metrics::counter!("stock_batches_rejected_total").increment(1);
            tracing::warn!(error = %e, "stock batch rejected");
        })?;
        commit(&mut state.products, &lines);
        metrics::counter!("stock_batches_committed_total").increment(1);
        Ok(lines)
    }

    /// Idempotent finalize under a reservation token.
    ///
    /// A token seen before replays its recorded lines without touching stock.
    /// A released token is refused.
    #[tracing::instrument(skip(self, requests), fields(%token, requests = requests.len()))]
    pub async fn finalize(
        &self,
        token: ReservationToken,
        requests: &[StockRequest],
    ) -> Result<Vec<OrderLine>> {
        let mut state = self.catalog.write().await;
        match state.reservations.get(&token) {
            Some(Reservation::Committed(lines)) => {
                tracing::info!("reservation already committed, replaying lines");
                return Ok(lines.clone());
            }
            Some(Reservation::Released) => return Err(LedgerError::TokenReleased(token)),
            None => {}
        }

        let lines = plan_batch(&state.products, requests).inspect_err(|e| {
            metrics::counter!("stock_batches_rejected_total").increment(1);
            tracing::warn!(error = %e, "stock batch rejected");
        })?;
        commit(&mut state.products, &lines);
        state
            .reservations
            .insert(token, Reservation::Committed(lines.clone()));
        metrics::counter!("stock_batches_committed_total").increment(1);
        tracing::info!(lines = lines.len(), "stock batch committed");
        Ok(lines)
    }

    /// Returns the stock taken under `token`, exactly once.
    ///
    /// Releasing an unknown token leaves a tombstone so a finalize arriving
    /// late with that token cannot take stock afterwards.
    #[tracing::instrument(skip(self), fields(%token))]
    pub async fn release(&self, token: ReservationToken) -> ReleaseOutcome {
        let mut state = self.catalog.write().await;
        let previous = state.reservations.insert(token, Reservation::Released);
        match previous {
            Some(Reservation::Committed(lines)) => {
                for line in &lines {
                    match state.products.get_mut(&line.product_id) {
                        Some(product) => product.stock_amount += line.amount,
                        None => tracing::warn!(
                            product_id = %line.product_id,
                            "released line names a removed product"
                        ),
                    }
                }
                metrics::counter!("stock_reservations_released_total").increment(1);
                tracing::info!(lines = lines.len(), "reservation released");
                ReleaseOutcome::Restocked { lines: lines.len() }
            }
            Some(Reservation::Released) => ReleaseOutcome::AlreadyReleased,
            None => {
                tracing::info!("released token had no reservation");
                ReleaseOutcome::NothingReserved
            }
        }
    }
}

/// Computes the lines a batch would produce without mutating anything.
///
/// Requests are deduplicated by product keeping the first occurrence. Unknown
/// products are skipped, then a negative amount fails the batch, a zero
/// amount is dropped and an amount above stock fails the batch.
fn plan_batch(
    products: &HashMap<ProductId, Product>,
    requests: &[StockRequest],
) -> Result<Vec<OrderLine>> {
    let mut seen = HashSet::with_capacity(requests.len());
    let mut lines = Vec::with_capacity(requests.len());

    for request in requests {
        if !seen.insert(request.product_id) {
            continue;
        }
        let Some(product) = products.get(&request.product_id) else {
            tracing::debug!(product_id = %request.product_id, "skipping unknown product");
            continue;
        };
        let amount = match u32::try_from(request.amount) {
            Ok(0) => continue,
            Ok(amount) => amount,
            Err(_) => {
                return Err(LedgerError::InvalidQuantity {
                    product_id: product.id,
                    reason: QuantityIssue::BelowZero,
                });
            }
        };
        if amount > product.stock_amount {
            return Err(LedgerError::InvalidQuantity {
                product_id: product.id,
                reason: QuantityIssue::ExceedsStock,
            });
        }
        lines.push(OrderLine::new(product.id, product.price, amount));
    }

    Ok(lines)
}

fn commit(products: &mut HashMap<ProductId, Product>, lines: &[OrderLine]) {
    for line in lines {
        if let Some(product) = products.get_mut(&line.product_id) {
            product.stock_amount -= line.amount;
        }
    }
}

#[cfg(test)]
mod tests {
    use common::Money;

    use super::*;

    async fn ledger_with(stocks: &[(u32, i64)]) -> (StockLedger, InMemoryCatalog, Vec<ProductId>) {
        let catalog = InMemoryCatalog::new();
        let mut ids = Vec::new();
        for (i, (stock, cents)) in stocks.iter().enumerate() {
            let product = Product::new(format!("p{i}"), Money::from_cents(*cents), *stock);
            ids.push(product.id);
            catalog.insert_product(product).await;
        }
        (StockLedger::new(catalog.clone()), catalog, ids)
    }

    #[tokio::test]
    async fn produces_price_snapshot_lines_and_decrements() {
        let (ledger, catalog, ids) = ledger_with(&[(5, 1000), (3, 250)]).await;
        let lines = ledger
            .finalize_batch(&[StockRequest::new(ids[0], 2), StockRequest::new(ids[1], 3)])
            .await
            .unwrap();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].unit_price, Money::from_cents(1000));
        assert_eq!(lines[0].line_total, Money::from_cents(2000));
        assert_eq!(lines[1].line_total, Money::from_cents(750));
        assert_eq!(catalog.stock_of(ids[0]).await, Some(3));
        assert_eq!(catalog.stock_of(ids[1]).await, Some(0));
    }

    #[tokio::test]
    async fn first_duplicate_wins() {
        let (ledger, catalog, ids) = ledger_with(&[(5, 100)]).await;
        let lines = ledger
            .finalize_batch(&[StockRequest::new(ids[0], 1), StockRequest::new(ids[0], 4)])
            .await
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].amount, 1);
        assert_eq!(catalog.stock_of(ids[0]).await, Some(4));
    }

    #[tokio::test]
    async fn zero_amounts_and_unknown_products_are_skipped() {
        let (ledger, catalog, ids) = ledger_with(&[(5, 100), (5, 100)]).await;
        let lines = ledger
            .finalize_batch(&[
                StockRequest::new(ids[0], 0),
                StockRequest::new(ProductId::new(), 3),
                StockRequest::new(ids[1], 2),
            ])
            .await
            .unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].product_id, ids[1]);
        assert_eq!(catalog.stock_of(ids[0]).await, Some(5));
    }

    #[tokio::test]
    async fn unknown_product_with_negative_amount_is_still_skipped() {
        let (ledger, _, _) = ledger_with(&[]).await;
        let lines = ledger
            .finalize_batch(&[StockRequest::new(ProductId::new(), -4)])
            .await
            .unwrap();
        assert!(lines.is_empty());
    }

    #[tokio::test]
    async fn invalid_request_late_in_batch_changes_nothing() {
        let (ledger, catalog, ids) = ledger_with(&[(5, 100), (1, 100)]).await;

        let over = ledger
            .finalize_batch(&[StockRequest::new(ids[0], 2), StockRequest::new(ids[1], 2)])
            .await;
        assert_eq!(
            over,
            Err(LedgerError::InvalidQuantity {
                product_id: ids[1],
                reason: QuantityIssue::ExceedsStock
            })
        );

        let negative = ledger
            .finalize_batch(&[StockRequest::new(ids[0], 2), StockRequest::new(ids[1], -1)])
            .await
            .unwrap_err();
        assert_eq!(negative.to_string(), format!("amount below zero for product {}", ids[1]));

        assert_eq!(catalog.stock_of(ids[0]).await, Some(5));
        assert_eq!(catalog.stock_of(ids[1]).await, Some(1));
    }

    #[tokio::test]
    async fn same_token_replays_without_second_decrement() {
        let (ledger, catalog, ids) = ledger_with(&[(4, 100)]).await;
        let token = ReservationToken::new();
        let first = ledger
            .finalize(token, &[StockRequest::new(ids[0], 3)])
            .await
            .unwrap();
        let again = ledger
            .finalize(token, &[StockRequest::new(ids[0], 3)])
            .await
            .unwrap();

        assert_eq!(first, again);
        assert_eq!(catalog.stock_of(ids[0]).await, Some(1));
    }

    #[tokio::test]
    async fn release_restocks_once_and_closes_token() {
        let (ledger, catalog, ids) = ledger_with(&[(4, 100)]).await;
        let token = ReservationToken::new();
        ledger
            .finalize(token, &[StockRequest::new(ids[0], 3)])
            .await
            .unwrap();

        assert_eq!(ledger.release(token).await, ReleaseOutcome::Restocked { lines: 1 });
        assert_eq!(ledger.release(token).await, ReleaseOutcome::AlreadyReleased);
        assert_eq!(catalog.stock_of(ids[0]).await, Some(4));

        let late = ledger.finalize(token, &[StockRequest::new(ids[0], 1)]).await;
        assert_eq!(late, Err(LedgerError::TokenReleased(token)));
    }

    #[tokio::test]
    async fn release_before_finalize_blocks_late_finalize() {
        let (ledger, catalog, ids) = ledger_with(&[(4, 100)]).await;
        let token = ReservationToken::new();

        assert_eq!(ledger.release(token).await, ReleaseOutcome::NothingReserved);
        assert!(ledger
            .finalize(token, &[StockRequest::new(ids[0], 1)])
            .await
            .is_err());
        assert_eq!(catalog.stock_of(ids[0]).await, Some(4));
    }

    #[tokio::test]
    async fn rejected_tokened_batch_is_not_recorded() {
        let (ledger, catalog, ids) = ledger_with(&[(1, 100)]).await;
        let token = ReservationToken::new();
        assert!(ledger
            .finalize(token, &[StockRequest::new(ids[0], 2)])
            .await
            .is_err());

        catalog.set_stock(ids[0], 2).await;
        let lines = ledger
            .finalize(token, &[StockRequest::new(ids[0], 2)])
            .await
            .unwrap();
        assert_eq!(lines[0].amount, 2);
    }
}
