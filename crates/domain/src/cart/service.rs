use std::collections::HashMap;
use std::sync::Arc;

use common::{CartId, CartItemId, ProductId, UserId};
use tokio::sync::{Mutex, RwLock};

use super::error::CartError;
use super::lookup::ProductLookup;
use super::model::{Cart, CartItem};

#[derive(Debug, Default)]
struct CartIndex {
    carts: HashMap<CartId, Arc<Mutex<Cart>>>,
    by_user: HashMap<UserId, CartId>,
}

/// Cart operations. Mutations of one cart are serialized by that cart's own
/// lock; different carts proceed independently.
///
/// Stock checks here are advisory. The stock ledger checks again at checkout.
pub struct CartService<P: ProductLookup> {
    lookup: P,
    index: Arc<RwLock<CartIndex>>,
}

impl<P: ProductLookup + Clone> Clone for CartService<P> {
    fn clone(&self) -> Self {
        Self {
            lookup: self.lookup.clone(),
            index: Arc::clone(&self.index),
        }
    }
}

impl<P: ProductLookup> CartService<P> {
    pub fn new(lookup: P) -> Self {
        Self {
            lookup,
            index: Arc::default(),
        }
    }

    /// The user's cart, created empty on first access.
    #[tracing::instrument(skip(self))]
    pub async fn cart_for_user(&self, user_id: UserId) -> Cart {
        let handle = {
            let mut index = self.index.write().await;
            let existing = index
                .by_user
                .get(&user_id)
                .and_then(|id| index.carts.get(id))
                .cloned();
            match existing {
                Some(handle) => handle,
                None => {
                    let cart = Cart::new(user_id);
                    let id = cart.id;
                    let handle = Arc::new(Mutex::new(cart));
                    index.carts.insert(id, Arc::clone(&handle));
                    index.by_user.insert(user_id, id);
                    tracing::debug!(cart_id = %id, "cart created");
                    handle
                }
            }
        };
        let cart = handle.lock().await.clone();
        cart
    }

    async fn handle(&self, cart_id: CartId) -> Option<Arc<Mutex<Cart>>> {
        self.index.read().await.carts.get(&cart_id).cloned()
    }

    async fn existing(&self, cart_id: CartId) -> Result<Arc<Mutex<Cart>>, CartError> {
        self.handle(cart_id)
            .await
            .ok_or(CartError::CartNotFound(cart_id))
    }

    /// Adds one unit of a product that is in stock and not yet in the cart.
    #[tracing::instrument(skip(self))]
    pub async fn add_item(
        &self,
        cart_id: CartId,
        product_id: ProductId,
    ) -> Result<CartItem, CartError> {
        let handle = self.existing(cart_id).await?;
        let mut cart = handle.lock().await;

        let product = self
            .lookup
            .product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound(product_id))?;
        if product.stock_amount < 1 {
            return Err(CartError::OutOfStock(product_id));
        }
        if cart.contains_product(product_id) {
            return Err(CartError::AlreadyInCart(product_id));
        }

        let item = CartItem {
            id: CartItemId::new(),
            product_id,
            amount: 1,
        };
        cart.items.push(item);
        Ok(item)
    }

    /// Moves an item's amount by `delta`.
    ///
    /// Returns the updated item, or `None` when the amount dropped to zero or
    /// below and the item was removed. An item whose product has disappeared
    /// is removed and reported as not found.
    #[tracing::instrument(skip(self))]
    pub async fn change_amount(
        &self,
        cart_id: CartId,
        item_id: CartItemId,
        delta: i32,
    ) -> Result<Option<CartItem>, CartError> {
        let handle = self.existing(cart_id).await?;
        let mut cart = handle.lock().await;

        let item = *cart.item(item_id).ok_or(CartError::ItemNotFound(item_id))?;
        let Some(product) = self.lookup.product(item.product_id).await? else {
            cart.remove(item_id);
            tracing::info!(%item_id, product_id = %item.product_id, "removed stale cart item");
            return Err(CartError::StaleItem {
                item_id,
                product_id: item.product_id,
            });
        };

        let target = i64::from(item.amount) + i64::from(delta);
        if target <= 0 {
            cart.remove(item_id);
            return Ok(None);
        }
        // `target` is positive and at most u32::MAX + i32::MAX here.
        let requested = u32::try_from(target).unwrap_or(u32::MAX);
        if requested > product.stock_amount {
            return Err(CartError::InsufficientStock {
                requested,
                available: product.stock_amount,
            });
        }

        let entry = cart.item_mut(item_id).ok_or(CartError::ItemNotFound(item_id))?;
        entry.amount = requested;
        Ok(Some(*entry))
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete_item(&self, cart_id: CartId, item_id: CartItemId) -> Result<(), CartError> {
        let handle = self.existing(cart_id).await?;
        let removed = handle.lock().await.remove(item_id);
        if removed {
            Ok(())
        } else {
            Err(CartError::ItemNotFound(item_id))
        }
    }

    /// Removes the given items and leaves everything else in the cart.
    ///
    /// Returns how many were removed. Unknown carts and items are ignored.
    #[tracing::instrument(skip(self, item_ids), fields(items = item_ids.len()))]
    pub async fn remove_items(&self, cart_id: CartId, item_ids: &[CartItemId]) -> usize {
        let Some(handle) = self.handle(cart_id).await else {
            return 0;
        };
        let mut cart = handle.lock().await;
        let before = cart.items.len();
        cart.items.retain(|item| !item_ids.contains(&item.id));
        before - cart.items.len()
    }

    /// Empties the cart. Unknown carts are ignored.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self, cart_id: CartId) {
        if let Some(handle) = self.handle(cart_id).await {
            handle.lock().await.items.clear();
        }
    }

    pub async fn list_items(&self, cart_id: CartId) -> Vec<CartItem> {
        let Some(handle) = self.handle(cart_id).await else {
            return Vec::new();
        };
        let items = handle.lock().await.items.clone();
        items
    }
}

#[cfg(test)]
mod tests {
    use catalog::{InMemoryCatalog, Product};
    use common::Money;

    use super::*;

    async fn setup(stock: u32) -> (CartService<InMemoryCatalog>, InMemoryCatalog, CartId, ProductId) {
        let catalog = InMemoryCatalog::new();
        let product = Product::new("Tea", Money::from_cents(400), stock);
        let product_id = product.id;
        catalog.insert_product(product).await;
        let service = CartService::new(catalog.clone());
        let cart = service.cart_for_user(UserId::new()).await;
        (service, catalog, cart.id, product_id)
    }

    #[tokio::test]
    async fn cart_is_created_once_per_user() {
        let service = CartService::new(InMemoryCatalog::new());
        let user = UserId::new();
        let first = service.cart_for_user(user).await;
        let second = service.cart_for_user(user).await;
        assert_eq!(first.id, second.id);
        assert!(first.is_empty());
        assert_ne!(service.cart_for_user(UserId::new()).await.id, first.id);
    }

    #[tokio::test]
    async fn add_item_rules() {
        let (service, catalog, cart_id, product_id) = setup(1).await;

        let item = service.add_item(cart_id, product_id).await.unwrap();
        assert_eq!(item.amount, 1);
        assert_eq!(
            service.add_item(cart_id, product_id).await,
            Err(CartError::AlreadyInCart(product_id))
        );

        let missing = ProductId::new();
        assert_eq!(
            service.add_item(cart_id, missing).await,
            Err(CartError::ProductNotFound(missing))
        );

        let empty = Product::new("Gone", Money::from_cents(100), 0);
        let empty_id = empty.id;
        catalog.insert_product(empty).await;
        assert_eq!(
            service.add_item(cart_id, empty_id).await,
            Err(CartError::OutOfStock(empty_id))
        );

        let unknown_cart = CartId::new();
        assert_eq!(
            service.add_item(unknown_cart, product_id).await,
            Err(CartError::CartNotFound(unknown_cart))
        );
    }

    #[tokio::test]
    async fn change_amount_below_one_deletes() {
        let (service, _, cart_id, product_id) = setup(10).await;
        let item = service.add_item(cart_id, product_id).await.unwrap();
        service.change_amount(cart_id, item.id, 2).await.unwrap();

        let result = service.change_amount(cart_id, item.id, -5).await.unwrap();
        assert!(result.is_none());
        assert!(service.list_items(cart_id).await.is_empty());
    }

    #[tokio::test]
    async fn change_amount_over_stock_keeps_amount() {
        let (service, _, cart_id, product_id) = setup(6).await;
        let item = service.add_item(cart_id, product_id).await.unwrap();
        service.change_amount(cart_id, item.id, 2).await.unwrap();

        let result = service.change_amount(cart_id, item.id, 5).await;
        assert_eq!(
            result,
            Err(CartError::InsufficientStock {
                requested: 8,
                available: 6
            })
        );
        assert_eq!(service.list_items(cart_id).await[0].amount, 3);
    }

    #[tokio::test]
    async fn stale_item_is_removed_on_touch() {
        let (service, catalog, cart_id, product_id) = setup(3).await;
        let item = service.add_item(cart_id, product_id).await.unwrap();
        catalog.remove_product(product_id).await;

        // Untouched stale items stay in the cart.
        assert_eq!(service.list_items(cart_id).await.len(), 1);

        let err = service.change_amount(cart_id, item.id, 1).await.unwrap_err();
        assert_eq!(err.kind(), common::ErrorKind::NotFound);
        assert!(service.list_items(cart_id).await.is_empty());
    }

    #[tokio::test]
    async fn delete_and_clear() {
        let (service, _, cart_id, product_id) = setup(3).await;
        let item = service.add_item(cart_id, product_id).await.unwrap();

        service.delete_item(cart_id, item.id).await.unwrap();
        assert_eq!(
            service.delete_item(cart_id, item.id).await,
            Err(CartError::ItemNotFound(item.id))
        );

        service.add_item(cart_id, product_id).await.unwrap();
        service.clear(cart_id).await;
        service.clear(cart_id).await;
        service.clear(CartId::new()).await;
        assert!(service.list_items(cart_id).await.is_empty());
    }

    #[tokio::test]
    async fn remove_items_keeps_the_rest() {
        let (service, catalog, cart_id, tea) = setup(3).await;
        let coffee = Product::new("Coffee", Money::from_cents(900), 3);
        let coffee_id = coffee.id;
        catalog.insert_product(coffee).await;

        let ordered = service.add_item(cart_id, tea).await.unwrap();
        let later = service.add_item(cart_id, coffee_id).await.unwrap();

        assert_eq!(service.remove_items(cart_id, &[ordered.id]).await, 1);
        assert_eq!(service.list_items(cart_id).await, vec![later]);

        assert_eq!(service.remove_items(cart_id, &[ordered.id]).await, 0);
        assert_eq!(service.remove_items(CartId::new(), &[later.id]).await, 0);
    }
}
