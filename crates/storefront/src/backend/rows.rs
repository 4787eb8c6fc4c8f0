//! Wire types for the row API.
//!
//! Shapes match the backend tables column-for-column. Reads are lenient
//! (nullable columns are `Option`, legacy columns stay readable); insert
//! payloads send exactly the columns the table owns, letting the database
//! fill ids and timestamps.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use maison_core::{OrderStatus, PaymentKind};

// =============================================================================
// profiles
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRow {
    pub id: Uuid,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Current role column; absent on rows written before roles existed.
    #[serde(default)]
    pub role: Option<String>,
    /// Legacy flag that predates the role column.
    #[serde(default)]
    pub is_seller: Option<bool>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewProfile {
    pub id: Uuid,
    pub display_name: String,
    pub email: Option<String>,
    pub role: String,
}

// =============================================================================
// items
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ItemRow {
    pub id: i64,
    pub title: String,
    pub price: Decimal,
    #[serde(default)]
    pub img: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub origin: Option<String>,
    #[serde(default)]
    pub era: Option<i32>,
    #[serde(default)]
    pub material: Option<String>,
    /// Human-formatted listing date (e.g. "Dec 5, 2025").
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewItem {
    pub title: String,
    pub price: Decimal,
    pub img: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub origin: String,
    pub era: i32,
    pub material: String,
    pub date: String,
}

// =============================================================================
// cart_items
// =============================================================================

/// A cart row joined with its item (`select=id,qty,items(*)`).
#[derive(Debug, Clone, Deserialize)]
pub struct CartLineRow {
    pub id: i64,
    pub qty: u32,
    #[serde(rename = "items")]
    pub item: ItemRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewCartLine {
    pub user_id: Uuid,
    pub item_id: i64,
    pub qty: u32,
}

// =============================================================================
// favorites
// =============================================================================

/// A favorite row joined with its item (`select=id,items(*)`).
#[derive(Debug, Clone, Deserialize)]
pub struct FavoriteRow {
    pub id: i64,
    #[serde(rename = "items")]
    pub item: ItemRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewFavorite {
    pub user_id: Uuid,
    pub item_id: i64,
}

// =============================================================================
// orders / order_items
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct OrderRow {
    pub id: i64,
    pub user_id: Uuid,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    #[serde(default)]
    pub tax: Option<Decimal>,
    pub total: Decimal,
    pub status: OrderStatus,
    #[serde(default)]
    pub shipping_address: Option<ShippingAddressJson>,
    pub payment_method: PaymentKind,
    #[serde(default)]
    pub notes: Option<String>,
    /// Processor reference, present on card orders only.
    #[serde(default)]
    pub payment_intent_id: Option<String>,
    pub placed_at: DateTime<Utc>,
}

/// The `shipping_address` JSON column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShippingAddressJson {
    pub address: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewOrder {
    pub user_id: Uuid,
    pub subtotal: Decimal,
    pub shipping: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddressJson,
    pub payment_method: PaymentKind,
    pub notes: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_intent_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewOrderLine {
    pub order_id: i64,
    pub item_id: i64,
    pub qty: u32,
    pub unit_price: Decimal,
}

// =============================================================================
// notifications
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct NotificationRow {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub is_read: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

// =============================================================================
// payment_methods
// =============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct StoredCardRow {
    pub id: i64,
    pub brand: String,
    pub last4: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewStoredCard {
    pub user_id: Uuid,
    pub brand: String,
    pub last4: String,
}

// =============================================================================
// seller_items
// =============================================================================

/// A listing row joined with its item (`select=id,items(*)`).
#[derive(Debug, Clone, Deserialize)]
pub struct ListingRow {
    pub id: i64,
    #[serde(rename = "items")]
    pub item: ItemRow,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewListing {
    pub seller_id: Uuid,
    pub item_id: i64,
}
