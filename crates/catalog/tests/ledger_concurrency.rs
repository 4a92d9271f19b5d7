//! Concurrency properties of the stock ledger.

use catalog::{InMemoryCatalog, Product, StockLedger};
use common::{Money, ProductId, ReservationToken, StockRequest};

struct Harness {
    catalog: InMemoryCatalog,
    ledger: StockLedger,
}

impl Harness {
    fn new() -> Self {
        let catalog = InMemoryCatalog::new();
        let ledger = StockLedger::new(catalog.clone());
        Self { catalog, ledger }
    }

    async fn product(&self, stock: u32) -> ProductId {
        let product = Product::new("Contested item", Money::from_cents(990), stock);
        let id = product.id;
        self.catalog.insert_product(product).await;
        id
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn concurrent_batches_never_oversell() {
    let h = Harness::new();
    let stock = 25;
    let product_id = h.product(stock).await;

    // 40 batches of 1..=3 units ask for far more than is available.
    let mut handles = Vec::new();
    for i in 0..40 {
        let ledger = h.ledger.clone();
        let amount = (i % 3) + 1;
        handles.push(tokio::spawn(async move {
            ledger
                .finalize(ReservationToken::new(), &[StockRequest::new(product_id, amount)])
                .await
        }));
    }

    let mut accepted: u32 = 0;
    for handle in handles {
        if let Ok(lines) = handle.await.unwrap() {
            accepted += lines.iter().map(|l| l.amount).sum::<u32>();
        }
    }

    let remaining = h.catalog.stock_of(product_id).await.unwrap();
    assert!(accepted <= stock);
    assert_eq!(accepted + remaining, stock);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn rejected_batches_leave_every_product_unchanged() {
    let h = Harness::new();
    let plenty = h.product(100).await;
    let scarce = h.product(1).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let ledger = h.ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .finalize_batch(&[
                    StockRequest::new(plenty, 5),
                    StockRequest::new(scarce, 2),
                ])
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_err());
    }

    assert_eq!(h.catalog.stock_of(plenty).await, Some(100));
    assert_eq!(h.catalog.stock_of(scarce).await, Some(1));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn replayed_token_under_contention_decrements_once() {
    let h = Harness::new();
    let product_id = h.product(10).await;
    let token = ReservationToken::new();

    let mut handles = Vec::new();
    for _ in 0..10 {
        let ledger = h.ledger.clone();
        handles.push(tokio::spawn(async move {
            ledger
                .finalize(token, &[StockRequest::new(product_id, 4)])
                .await
        }));
    }
    for handle in handles {
        assert_eq!(handle.await.unwrap().unwrap()[0].amount, 4);
    }

    assert_eq!(h.catalog.stock_of(product_id).await, Some(6));
}
