//! Order placement.
//!
//! Checkout is a three-step write against a store with no transactions:
//! order header, then order lines, then cart clear. The header insert is
//! compensated (deleted) if the line insert fails, so an order never exists
//! without its lines. A failed cart clear after a fully written order is
//! logged and tolerated; the order stands.

use tracing::{error, warn};

use super::App;
use crate::backend::rows::{NewOrder, NewOrderLine, ShippingAddressJson};
use crate::checkout::{CartTotals, compute_totals};
use crate::error::AppError;
use crate::models::Order;
use crate::payments::PaymentIntent;
use crate::router::Page;
use maison_core::{OrderId, OrderStatus, PaymentKind, ProfileId};

/// Everything the checkout form submits.
#[derive(Debug, Clone)]
pub struct PlaceOrderRequest {
    pub address: String,
    pub payment_method: PaymentKind,
    pub notes: String,
    /// Processor reference from a confirmed card payment.
    pub payment_intent_id: Option<String>,
}

impl App {
    /// Totals for the current cart under the configured policy.
    #[must_use]
    pub fn cart_totals(&self) -> CartTotals {
        compute_totals(&self.cart, &self.checkout)
    }

    /// Open a payment intent for the current cart total.
    ///
    /// The card variant of checkout calls this first; the UI confirms the
    /// intent with collected card details and passes the returned id into
    /// [`App::place_order`].
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when nobody is signed in, a
    /// validation error for an empty cart, or the proxy error.
    pub async fn begin_card_payment(&mut self) -> Result<PaymentIntent, AppError> {
        self.profile_id_or_login()?;
        if self.cart.is_empty() {
            return Err(AppError::Validation("Your cart is empty".into()));
        }
        let totals = self.cart_totals();
        Ok(self.payments.create_payment_intent(totals.total).await?)
    }

    /// Place an order for the current cart.
    ///
    /// Initial status is `confirmed` when a card payment arrives with its
    /// processor reference, `processing` otherwise. On success the cart is
    /// cleared, the order heads the local history, both collections are
    /// re-fetched, and navigation lands on home.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when nobody is signed in, a
    /// validation error for a blank address or empty cart, or the backend
    /// error from the failed step.
    pub async fn place_order(&mut self, request: PlaceOrderRequest) -> Result<Order, AppError> {
        let user = self.profile_id_or_login()?;
        if request.address.trim().is_empty() {
            return Err(AppError::Validation("Shipping address is required".into()));
        }
        if self.cart.is_empty() {
            return Err(AppError::Validation("Your cart is empty".into()));
        }

        self.loading = true;
        let result = self.place_order_inner(user, &request).await;
        self.loading = false;
        result
    }

    async fn place_order_inner(
        &mut self,
        user: ProfileId,
        request: &PlaceOrderRequest,
    ) -> Result<Order, AppError> {
        let totals = self.cart_totals();
        let status = if request.payment_method == PaymentKind::Card
            && request.payment_intent_id.is_some()
        {
            OrderStatus::Confirmed
        } else {
            OrderStatus::Processing
        };

        let header = self
            .data
            .insert_order(&NewOrder {
                user_id: user.as_uuid(),
                subtotal: totals.subtotal.amount(),
                shipping: totals.shipping.amount(),
                tax: totals.tax.amount(),
                total: totals.total.amount(),
                status,
                shipping_address: ShippingAddressJson {
                    address: request.address.trim().to_string(),
                },
                payment_method: request.payment_method,
                notes: request.notes.clone(),
                payment_intent_id: request.payment_intent_id.clone(),
            })
            .await?;
        let order_id = OrderId::new(header.id);

        let lines: Vec<NewOrderLine> = self
            .cart
            .iter()
            .map(|line| NewOrderLine {
                order_id: header.id,
                item_id: line.item.id.as_i64(),
                qty: line.qty,
                unit_price: line.item.price.amount(),
            })
            .collect();

        if let Err(err) = self.data.insert_order_lines(&lines).await {
            // Compensate: take the orphaned header back out.
            if let Err(cleanup_err) = self.data.delete_order(order_id).await {
                error!(
                    order_id = %order_id,
                    error = %cleanup_err,
                    "Failed to remove orphaned order header",
                );
            }
            return Err(err.into());
        }

        if let Err(err) = self.data.clear_cart(user).await {
            warn!(order_id = %order_id, error = %err, "Order placed but cart cleanup failed");
        }
        self.cart.clear();

        let order = Order::from(header);
        self.orders.insert(0, order.clone());
        self.refresh_orders().await;
        self.refresh_cart().await;
        self.change_page(Page::Home);
        Ok(order)
    }
}
