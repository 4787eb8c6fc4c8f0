//! Checkout totals.
//!
//! One pure function computes every number the checkout page shows, so the
//! figure the user approves is exactly the figure written to the order row
//! and charged by the payment processor.

use rust_decimal::Decimal;

use crate::models::CartLine;
use maison_core::Price;

/// Deployment-level pricing policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutPolicy {
    /// Flat fee applied to every non-empty cart. Antique plates ship crated
    /// and insured, which is why the default is steep.
    pub shipping_fee: Price,
    /// Fraction of the subtotal charged as tax, when the deployment has one.
    pub tax_rate: Option<Decimal>,
}

impl Default for CheckoutPolicy {
    fn default() -> Self {
        Self {
            shipping_fee: Price::from_dollars(150),
            tax_rate: None,
        }
    }
}

/// The four numbers on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartTotals {
    pub subtotal: Price,
    pub shipping: Price,
    pub tax: Price,
    pub total: Price,
}

/// Compute totals for a cart.
///
/// Subtotal is the sum of `unit price x quantity` over all lines. Shipping
/// is the flat fee, waived for an empty cart. Tax applies to the subtotal
/// only. The total is the sum of the other three.
#[must_use]
pub fn compute_totals(lines: &[CartLine], policy: &CheckoutPolicy) -> CartTotals {
    let subtotal: Price = lines.iter().map(CartLine::line_total).sum();
    let shipping = if lines.is_empty() {
        Price::ZERO
    } else {
        policy.shipping_fee
    };
    let tax = policy
        .tax_rate
        .map_or(Price::ZERO, |rate| Price::new(subtotal.amount() * rate));
    let total = subtotal + shipping + tax;

    CartTotals {
        subtotal,
        shipping,
        tax,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Item;
    use maison_core::{CartLineId, ItemId};

    fn line(id: i64, dollars: i64, qty: u32) -> CartLine {
        CartLine {
            line_id: CartLineId::new(id),
            item: Item {
                id: ItemId::new(id),
                title: format!("Plate {id}"),
                price: Price::from_dollars(dollars),
                img: "/images/placeholder.png".to_string(),
                kind: "Dinner Plate".to_string(),
                origin: "France".to_string(),
                era: Some(1890),
                material: "Porcelain".to_string(),
                date: None,
            },
            qty,
        }
    }

    #[test]
    fn test_totals_without_tax() {
        let cart = [line(1, 100, 2), line(2, 50, 1)];
        let totals = compute_totals(&cart, &CheckoutPolicy::default());
        assert_eq!(totals.subtotal, Price::from_dollars(250));
        assert_eq!(totals.shipping, Price::from_dollars(150));
        assert_eq!(totals.tax, Price::ZERO);
        assert_eq!(totals.total, Price::from_dollars(400));
    }

    #[test]
    fn test_totals_with_tax_rate() {
        let policy = CheckoutPolicy {
            shipping_fee: Price::from_dollars(150),
            tax_rate: Some(Decimal::new(10, 2)), // 0.10
        };
        let cart = [line(1, 100, 2), line(2, 50, 1)];
        let totals = compute_totals(&cart, &policy);
        assert_eq!(totals.tax, Price::from_dollars(25));
        assert_eq!(totals.total, Price::from_dollars(425));
    }

    #[test]
    fn test_empty_cart_owes_nothing() {
        let totals = compute_totals(&[], &CheckoutPolicy::default());
        assert_eq!(totals.subtotal, Price::ZERO);
        assert_eq!(totals.shipping, Price::ZERO);
        assert_eq!(totals.tax, Price::ZERO);
        assert_eq!(totals.total, Price::ZERO);
    }

    #[test]
    fn test_quantity_multiplies_unit_price() {
        let cart = [line(1, 45, 4)];
        let totals = compute_totals(&cart, &CheckoutPolicy::default());
        assert_eq!(totals.subtotal, Price::from_dollars(180));
    }
}
