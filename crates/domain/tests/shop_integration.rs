//! Integration tests for orders and carts.

use catalog::{InMemoryCatalog, Product};
use common::{Money, OrderId, OrderLine, ProductId, UserId};
use domain::{CartError, CartService, DomainError, OrderError, OrderService};
use journal::InMemoryJournal;

fn line(cents: i64, amount: u32) -> OrderLine {
    OrderLine::new(ProductId::new(), Money::from_cents(cents), amount)
}

#[tokio::test]
async fn placed_order_reads_back_for_its_owner_only() {
    let service = OrderService::new(InMemoryJournal::new());
    let owner = UserId::new();
    let order_id = OrderId::new();

    let placed = service
        .place(order_id, owner, vec![line(1000, 2)])
        .await
        .unwrap();
    assert_eq!(placed.sum(), Money::from_cents(2000));

    assert!(service.exists(order_id).await.unwrap());
    assert!(service.get_for_user(owner, order_id).await.unwrap().is_some());
    assert!(service
        .get_for_user(UserId::new(), order_id)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn same_order_id_cannot_be_placed_twice() {
    let service = OrderService::new(InMemoryJournal::new());
    let order_id = OrderId::new();
    let user = UserId::new();

    service
        .place(order_id, user, vec![line(100, 1)])
        .await
        .unwrap();
    let again = service.place(order_id, user, vec![line(100, 1)]).await;
    assert!(matches!(
        again,
        Err(DomainError::Order(OrderError::AlreadyPlaced(id))) if id == order_id
    ));
}

#[tokio::test]
async fn listing_defaults_to_newest_first_and_honours_ordering() {
    let journal = InMemoryJournal::new();
    let service = OrderService::new(journal);
    let user = UserId::new();

    let mut ids = Vec::new();
    for (cents, amount) in [(500, 1), (100, 5), (300, 2)] {
        let id = OrderId::new();
        service
            .place(id, user, vec![line(cents, amount)])
            .await
            .unwrap();
        ids.push(id);
        tokio::time::sleep(std::time::Duration::from_millis(2)).await;
    }
    service
        .place(OrderId::new(), UserId::new(), vec![line(1, 1)])
        .await
        .unwrap();

    let newest_first: Vec<_> = service
        .list_for_user(user, None)
        .await
        .unwrap()
        .iter()
        .filter_map(|o| o.order_id())
        .collect();
    assert_eq!(newest_first, vec![ids[2], ids[1], ids[0]]);

    let by_sum: Vec<_> = service
        .list_for_user(user, Some("sum.asc"))
        .await
        .unwrap()
        .iter()
        .map(|o| o.sum().cents())
        .collect();
    assert_eq!(by_sum, vec![500, 500, 600]);

    let by_amount: Vec<_> = service
        .list_for_user(user, Some("productsAmount.desc"))
        .await
        .unwrap()
        .iter()
        .map(|o| o.products_amount())
        .collect();
    assert_eq!(by_amount, vec![5, 2, 1]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_adds_of_same_product_insert_once() {
    let catalog = InMemoryCatalog::new();
    let product = Product::new("Coffee", Money::from_cents(900), 5);
    let product_id = product.id;
    catalog.insert_product(product).await;

    let service = CartService::new(catalog);
    let cart = service.cart_for_user(UserId::new()).await;

    let mut handles = Vec::new();
    for _ in 0..8 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.add_item(cart.id, product_id).await
        }));
    }

    let mut added = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => added += 1,
            Err(e) => assert_eq!(e, CartError::AlreadyInCart(product_id)),
        }
    }
    assert_eq!(added, 1);
    assert_eq!(service.list_items(cart.id).await.len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_increments_are_not_lost() {
    let catalog = InMemoryCatalog::new();
    let product = Product::new("Sugar", Money::from_cents(150), 100);
    let product_id = product.id;
    catalog.insert_product(product).await;

    let service = CartService::new(catalog);
    let cart = service.cart_for_user(UserId::new()).await;
    let item = service.add_item(cart.id, product_id).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..20 {
        let service = service.clone();
        handles.push(tokio::spawn(async move {
            service.change_amount(cart.id, item.id, 1).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(service.list_items(cart.id).await[0].amount, 21);
}
