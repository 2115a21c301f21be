//! Cart operations over the document store.

use common::{PrincipalId, ProductId};
use doc_store::{CollectionId, DocumentStore, Mutation};

use crate::cart::Cart;
use crate::error::{CartError, Result};
use crate::line_item::{LineItem, Product, Variant};
use crate::session::SessionProvider;
use crate::summary::{OrderSummary, PricingConfig};

/// Collection name holding a principal's cart documents.
pub const CART_COLLECTION: &str = "cart";

/// A cart snapshot together with whether it can be written to.
#[derive(Debug, Clone, PartialEq)]
pub struct CartState {
    pub cart: Cart,
    /// True when nobody is signed in: the cart is the empty placeholder and
    /// every write would fail with `AuthRequired`.
    pub read_only: bool,
}

impl CartState {
    fn anonymous() -> Self {
        Self {
            cart: Cart::default(),
            read_only: true,
        }
    }
}

/// A live view of a principal's cart.
///
/// While signed in this follows the store subscription; signed out it serves
/// a single empty snapshot and then ends.
#[derive(Debug)]
pub struct CartWatch {
    sub: Option<doc_store::Subscription>,
    served_empty: bool,
}

impl CartWatch {
    /// Returns the next cart snapshot, starting with the current one.
    /// Returns `None` once the watch has ended.
    pub async fn next(&mut self) -> Option<Cart> {
        match &mut self.sub {
            Some(sub) => {
                let docs = sub.next().await?;
                Some(Cart::from_documents(&docs))
            }
            None => {
                if self.served_empty {
                    return None;
                }
                self.served_empty = true;
                Some(Cart::default())
            }
        }
    }

    /// Stops the watch. Subsequent calls to [`next`](Self::next) return `None`.
    pub fn cancel(&mut self) {
        if let Some(sub) = &mut self.sub {
            sub.cancel();
        }
        self.served_empty = true;
    }
}

/// Cart engine: loads, watches, and mutates the signed-in principal's cart.
///
/// Every mutation goes through the store's atomic `update` so concurrent
/// writers cannot lose each other's changes.
#[derive(Debug, Clone)]
pub struct CartService<S, P> {
    store: S,
    session: P,
    pricing: PricingConfig,
}

impl<S, P> CartService<S, P>
where
    S: DocumentStore,
    P: SessionProvider,
{
    pub fn new(store: S, session: P, pricing: PricingConfig) -> Self {
        Self {
            store,
            session,
            pricing,
        }
    }

    pub fn pricing(&self) -> &PricingConfig {
        &self.pricing
    }

    pub fn session(&self) -> &P {
        &self.session
    }

    fn principal(&self) -> Result<PrincipalId> {
        self.session
            .current_principal()
            .ok_or(CartError::AuthRequired)
    }

    fn collection(&self, principal: &PrincipalId) -> CollectionId {
        CollectionId::new(principal.clone(), CART_COLLECTION)
    }

    /// Loads the current cart. Signed out, this is an empty read-only cart
    /// rather than an error.
    pub async fn load(&self) -> Result<CartState> {
        let Some(principal) = self.session.current_principal() else {
            return Ok(CartState::anonymous());
        };

        let docs = self.store.list(&self.collection(&principal)).await?;
        Ok(CartState {
            cart: Cart::from_documents(&docs),
            read_only: false,
        })
    }

    /// Opens a live watch on the cart. Signed out, the watch serves one empty
    /// snapshot and ends.
    pub async fn watch(&self) -> Result<CartWatch> {
        let Some(principal) = self.session.current_principal() else {
            return Ok(CartWatch {
                sub: None,
                served_empty: false,
            });
        };

        let sub = self.store.subscribe(&self.collection(&principal)).await?;
        Ok(CartWatch {
            sub: Some(sub),
            served_empty: false,
        })
    }

    /// Adds a product to the cart, accumulating quantity onto an existing
    /// line item for the same product. A variant given here overwrites the
    /// stored one; `None` leaves it alone.
    #[tracing::instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_item(
        &self,
        product: &Product,
        variant: Option<Variant>,
        increment_by: u32,
    ) -> Result<()> {
        if increment_by < 1 {
            return Err(CartError::InvalidIncrement {
                increment: increment_by,
            });
        }

        let principal = self.principal()?;
        let collection = self.collection(&principal);
        let product = product.clone();
        let id = product.id.to_string();

        self.store
            .update(
                &collection,
                &id,
                Box::new(move |current| {
                    let item = match current {
                        Some(doc) => {
                            let mut item = LineItem::from_document(doc);
                            item.quantity = item.quantity.saturating_add(increment_by);
                            if let Some(variant) = variant {
                                item.variant = variant;
                            }
                            item
                        }
                        None => {
                            LineItem::from_product(&product, variant.unwrap_or_default(), increment_by)
                        }
                    };
                    Mutation::Put(item.to_data())
                }),
            )
            .await?;

        metrics::counter!("cart_items_added_total").increment(1);
        tracing::info!(increment_by, "item added to cart");
        Ok(())
    }

    /// Adjusts a line item's quantity by a signed delta, clamping at 1. A
    /// missing line item is left missing.
    #[tracing::instrument(skip(self), fields(product_id = %product_id))]
    pub async fn change_quantity(&self, product_id: &ProductId, delta: i64) -> Result<()> {
        let principal = self.principal()?;
        let collection = self.collection(&principal);
        let id = product_id.to_string();

        self.store
            .update(
                &collection,
                &id,
                Box::new(move |current| {
                    let Some(doc) = current else {
                        return Mutation::Keep;
                    };
                    let mut item = LineItem::from_document(doc);
                    let next = (i64::from(item.quantity) + delta).max(1);
                    let next = u32::try_from(next).unwrap_or(u32::MAX);
                    if next == item.quantity {
                        return Mutation::Keep;
                    }
                    item.quantity = next;
                    Mutation::Put(item.to_data())
                }),
            )
            .await?;

        metrics::counter!("cart_quantity_changes_total").increment(1);
        Ok(())
    }

    /// Removes a line item. Removing an absent item is a no-op.
    #[tracing::instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_item(&self, product_id: &ProductId) -> Result<()> {
        let principal = self.principal()?;
        self.store
            .delete(&self.collection(&principal), product_id.as_str())
            .await?;

        metrics::counter!("cart_items_removed_total").increment(1);
        Ok(())
    }

    /// Empties the cart.
    #[tracing::instrument(skip(self))]
    pub async fn clear(&self) -> Result<()> {
        let principal = self.principal()?;
        self.store.clear(&self.collection(&principal)).await?;
        tracing::info!("cart cleared");
        Ok(())
    }

    /// Computes the order summary for the current cart.
    pub async fn summary(&self) -> Result<OrderSummary> {
        let state = self.load().await?;
        Ok(OrderSummary::compute(&state.cart, &self.pricing))
    }
}
