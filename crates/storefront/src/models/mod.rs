//! Domain models for the storefront.
//!
//! These types represent what the UI renders, separate from the wire row
//! types in [`crate::backend::rows`]. The `From<Row>` conversions live here
//! and are the single place where backfill defaults (placeholder image,
//! "Unknown" provenance) get applied.

use chrono::{DateTime, Utc};

use crate::backend::rows::{
    CartLineRow, FavoriteRow, ItemRow, ListingRow, NotificationRow, OrderRow, ShippingAddressJson,
    StoredCardRow,
};
use maison_core::catalog::{FALLBACK_IMAGE, UNKNOWN_TAG};
use maison_core::{
    CartLineId, FavoriteId, ItemId, ListingId, NotificationId, OrderId, OrderStatus, PaymentKind,
    Price, ProfileId, StoredCardId,
};

/// A catalog item.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    /// Unique item ID.
    pub id: ItemId,
    /// Display title, e.g. "Meissen Dinner Plate".
    pub title: String,
    /// Asking price.
    pub price: Price,
    /// Image URL; a placeholder when the listing has no photo.
    pub img: String,
    /// Kind of piece (dinner plate, soup bowl, ...).
    pub kind: String,
    /// Country or region of origin.
    pub origin: String,
    /// Approximate year of manufacture.
    pub era: Option<i32>,
    /// Material (porcelain, bone china, ...).
    pub material: String,
    /// Human-readable listing date, e.g. "Mar 4, 2026".
    pub date: Option<String>,
}

impl From<ItemRow> for Item {
    fn from(row: ItemRow) -> Self {
        Self {
            id: ItemId::new(row.id),
            title: row.title,
            price: Price::new(row.price),
            img: row.img.unwrap_or_else(|| FALLBACK_IMAGE.to_string()),
            kind: row.kind.unwrap_or_else(|| UNKNOWN_TAG.to_string()),
            origin: row.origin.unwrap_or_else(|| UNKNOWN_TAG.to_string()),
            era: row.era,
            material: row.material.unwrap_or_else(|| UNKNOWN_TAG.to_string()),
            date: row.date,
        }
    }
}

/// One line of a user's cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartLine {
    /// ID of the cart row itself (not the item).
    pub line_id: CartLineId,
    /// The item in the cart.
    pub item: Item,
    /// How many of it.
    pub qty: u32,
}

impl CartLine {
    /// Price of this line (`unit price x quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.item.price.times(self.qty)
    }
}

impl From<CartLineRow> for CartLine {
    fn from(row: CartLineRow) -> Self {
        Self {
            line_id: CartLineId::new(row.id),
            item: row.item.into(),
            qty: row.qty,
        }
    }
}

/// An item a user has marked as a favorite.
#[derive(Debug, Clone, PartialEq)]
pub struct FavoriteItem {
    pub favorite_id: FavoriteId,
    pub item: Item,
}

impl From<FavoriteRow> for FavoriteItem {
    fn from(row: FavoriteRow) -> Self {
        Self {
            favorite_id: FavoriteId::new(row.id),
            item: row.item.into(),
        }
    }
}

/// Where an order ships to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShippingAddress {
    pub address: String,
}

impl From<ShippingAddressJson> for ShippingAddress {
    fn from(json: ShippingAddressJson) -> Self {
        Self {
            address: json.address,
        }
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: OrderId,
    pub user_id: ProfileId,
    pub subtotal: Price,
    pub shipping: Price,
    /// Zero when the deployment charges no tax.
    pub tax: Price,
    pub total: Price,
    pub status: OrderStatus,
    pub shipping_address: Option<ShippingAddress>,
    pub payment_method: PaymentKind,
    pub notes: Option<String>,
    /// Processor reference for card payments.
    pub payment_intent_id: Option<String>,
    pub placed_at: DateTime<Utc>,
}

impl From<OrderRow> for Order {
    fn from(row: OrderRow) -> Self {
        Self {
            id: OrderId::new(row.id),
            user_id: ProfileId::new(row.user_id),
            subtotal: Price::new(row.subtotal),
            shipping: Price::new(row.shipping),
            tax: Price::new(row.tax.unwrap_or_default()),
            total: Price::new(row.total),
            status: row.status,
            shipping_address: row.shipping_address.map(Into::into),
            payment_method: row.payment_method,
            notes: row.notes,
            payment_intent_id: row.payment_intent_id,
            placed_at: row.placed_at,
        }
    }
}

/// An in-app notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationRecord {
    pub id: NotificationId,
    pub title: String,
    pub message: Option<String>,
    pub is_read: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<NotificationRow> for NotificationRecord {
    fn from(row: NotificationRow) -> Self {
        Self {
            id: NotificationId::new(row.id),
            title: row.title,
            message: row.message,
            is_read: row.is_read,
            created_at: row.created_at,
        }
    }
}

/// A card the user saved for later checkouts. Display data only; the
/// processor holds the actual payment method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCard {
    pub id: StoredCardId,
    pub brand: String,
    pub last4: String,
}

impl From<StoredCardRow> for StoredCard {
    fn from(row: StoredCardRow) -> Self {
        Self {
            id: StoredCardId::new(row.id),
            brand: row.brand,
            last4: row.last4,
        }
    }
}

/// An item tied to the account that listed it.
#[derive(Debug, Clone, PartialEq)]
pub struct ListedItem {
    pub listing_id: ListingId,
    pub item: Item,
}

impl From<ListingRow> for ListedItem {
    fn from(row: ListingRow) -> Self {
        Self {
            listing_id: ListingId::new(row.id),
            item: row.item.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn bare_item_row() -> ItemRow {
        ItemRow {
            id: 7,
            title: "Limoges Saucer".to_string(),
            price: Decimal::new(4500, 2),
            img: None,
            kind: None,
            origin: None,
            material: None,
            date: None,
            era: None,
            created_at: None,
        }
    }

    #[test]
    fn test_item_backfills_missing_columns() {
        let item = Item::from(bare_item_row());
        assert_eq!(item.img, FALLBACK_IMAGE);
        assert_eq!(item.kind, UNKNOWN_TAG);
        assert_eq!(item.origin, UNKNOWN_TAG);
        assert_eq!(item.material, UNKNOWN_TAG);
        assert_eq!(item.era, None);
    }

    #[test]
    fn test_cart_line_total() {
        let line = CartLine {
            line_id: CartLineId::new(1),
            item: Item::from(bare_item_row()),
            qty: 3,
        };
        assert_eq!(line.line_total(), Price::new(Decimal::new(13500, 2)));
    }

    #[test]
    fn test_order_without_tax_reads_as_zero() {
        let row = OrderRow {
            id: 10,
            user_id: uuid::Uuid::nil(),
            subtotal: Decimal::from(250),
            shipping: Decimal::from(150),
            tax: None,
            total: Decimal::from(400),
            status: OrderStatus::Processing,
            shipping_address: Some(ShippingAddressJson {
                address: "12 Rue de la Faience, Paris".to_string(),
            }),
            payment_method: PaymentKind::CashOnDelivery,
            notes: None,
            payment_intent_id: None,
            placed_at: chrono::Utc::now(),
        };
        let order = Order::from(row);
        assert_eq!(order.tax, Price::ZERO);
        assert_eq!(order.total, Price::from_dollars(400));
        assert!(order.payment_intent_id.is_none());
    }
}
