//! Cart operations.

use chrono::Utc;
use common::{CartItemId, Money, Principal, ProductId};
use domain::{CartItem, DomainError};
use store::{CartStore, InventoryStore, ProductStore};

use crate::error::{CommerceError, Result};

/// Customer cart operations.
///
/// The cart is advisory: adding to it validates against live availability
/// but reserves nothing. Stock is only held from checkout onwards, so a
/// line that was fine when added can still fail at checkout.
#[derive(Clone)]
pub struct CartService<S> {
    store: S,
}

impl<S> CartService<S>
where
    S: CartStore + InventoryStore + ProductStore,
{
    /// Creates a cart service over a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Adds a product to the caller's cart, merging into an existing
    /// `(product, variant)` line if one exists.
    ///
    /// The merged total is validated against live availability, so a
    /// second add of an almost-sold-out product fails rather than
    /// silently building an unfulfillable cart.
    #[tracing::instrument(skip(self))]
    pub async fn add(
        &self,
        principal: Principal,
        product_id: &ProductId,
        variant: Option<String>,
        quantity: u32,
    ) -> Result<CartItem> {
        let customer = principal
            .customer_id()
            .ok_or(CommerceError::AuthenticationRequired)?;
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity(quantity as i64).into());
        }

        let product = self.store.get_product(product_id).await?;
        if !product.is_sellable() {
            return Err(CommerceError::ProductUnavailable(product_id.clone()));
        }

        let existing = self
            .store
            .cart_items(customer)
            .await?
            .into_iter()
            .find(|line| line.same_line(product_id, variant.as_deref()));

        let mut item = match existing {
            Some(mut line) => {
                line.quantity += quantity;
                line
            }
            None => CartItem::new(customer, product_id.clone(), variant, quantity),
        };

        self.check_available(product_id, item.quantity as i64).await?;

        item.updated_at = Utc::now();
        self.store.upsert_cart_item(&item).await?;
        Ok(item)
    }

    /// Sets the quantity of a cart line the caller owns.
    #[tracing::instrument(skip(self))]
    pub async fn set_quantity(
        &self,
        principal: Principal,
        item_id: CartItemId,
        quantity: u32,
    ) -> Result<CartItem> {
        if quantity < 1 {
            return Err(DomainError::InvalidQuantity(quantity as i64).into());
        }

        let mut item = self.owned_item(principal, item_id).await?;
        self.check_available(&item.product_id, quantity as i64).await?;

        item.quantity = quantity;
        item.updated_at = Utc::now();
        self.store.upsert_cart_item(&item).await?;
        Ok(item)
    }

    /// Removes a cart line the caller owns.
    pub async fn remove(&self, principal: Principal, item_id: CartItemId) -> Result<()> {
        let item = self.owned_item(principal, item_id).await?;
        self.store.remove_cart_item(item.id).await?;
        Ok(())
    }

    /// Empties the caller's cart.
    pub async fn clear(&self, principal: Principal) -> Result<()> {
        let customer = principal
            .customer_id()
            .ok_or(CommerceError::AuthenticationRequired)?;
        self.store.clear_cart(customer).await?;
        Ok(())
    }

    /// Returns the caller's cart lines.
    pub async fn items(&self, principal: Principal) -> Result<Vec<CartItem>> {
        let customer = principal
            .customer_id()
            .ok_or(CommerceError::AuthenticationRequired)?;
        Ok(self.store.cart_items(customer).await?)
    }

    /// Returns the total unit count across the caller's cart.
    pub async fn total_items(&self, principal: Principal) -> Result<u32> {
        Ok(self.items(principal).await?.iter().map(|i| i.quantity).sum())
    }

    /// Returns the cart total at live product prices. This is a preview;
    /// the binding price snapshot is taken at checkout.
    pub async fn total_price(&self, principal: Principal) -> Result<Money> {
        let mut total = Money::zero();
        for item in self.items(principal).await? {
            let product = self.store.get_product(&item.product_id).await?;
            total += product.price.multiply(item.quantity);
        }
        Ok(total)
    }

    async fn check_available(&self, product_id: &ProductId, requested: i64) -> Result<()> {
        let record = self.store.get_inventory(product_id).await?;
        if !record.can_fulfill(requested) {
            return Err(CommerceError::OutOfStock {
                product: product_id.clone(),
                requested,
                available: record.available(),
            });
        }
        Ok(())
    }

    /// Fetches a line and checks the caller owns it. A foreign line reads
    /// as not found rather than revealing it exists.
    async fn owned_item(&self, principal: Principal, item_id: CartItemId) -> Result<CartItem> {
        let customer = principal
            .customer_id()
            .ok_or(CommerceError::AuthenticationRequired)?;
        let item = self.store.get_cart_item(item_id).await?;
        if item.customer_id != customer {
            return Err(store::StoreError::not_found("cart item", item_id).into());
        }
        Ok(item)
    }
}
