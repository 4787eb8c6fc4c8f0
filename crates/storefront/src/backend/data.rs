//! Row API client.
//!
//! Thin typed layer over the backend's REST surface: one method per query or
//! mutation the storefront issues. Filters ride in the query string
//! (`column=eq.value`), inserts that need the created row back send
//! `Prefer: return=representation`, and the public catalog read is cached for
//! five minutes.

use std::sync::{Arc, RwLock};
use std::time::Duration;

use moka::future::Cache;
use reqwest::Method;
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::rows::{
    CartLineRow, FavoriteRow, ItemRow, ListingRow, NewCartLine, NewFavorite, NewItem, NewListing,
    NewOrder, NewOrderLine, NewProfile, NewStoredCard, NotificationRow, OrderRow, ProfileRow,
    StoredCardRow,
};
use super::{BackendError, error_message};
use crate::config::BackendConfig;
use maison_core::{ItemId, NotificationId, OrderId, OrderStatus, ProfileId, Role, StoredCardId};

const CATALOG_CACHE_KEY: &str = "items";

/// Client for the backend's row API.
///
/// Cheap to clone; clones share the HTTP pool, the catalog cache, and the
/// bearer slot, so a token set after sign-in is visible everywhere.
#[derive(Clone)]
pub struct DataClient {
    inner: Arc<DataClientInner>,
}

struct DataClientInner {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    /// Signed-in user's access token; `None` falls back to the publishable key.
    bearer: RwLock<Option<SecretString>>,
    catalog_cache: Cache<String, Arc<Vec<ItemRow>>>,
}

impl DataClient {
    /// Create a new row API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build or the API key is
    /// not a valid header value.
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "apikey",
            HeaderValue::from_str(config.api_key.expose_secret())
                .map_err(|e| BackendError::Parse(format!("Invalid API key format: {e}")))?,
        );
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder().default_headers(headers).build()?;

        let catalog_cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Ok(Self {
            inner: Arc::new(DataClientInner {
                client,
                base_url: config.base_url.clone(),
                api_key: config.api_key.clone(),
                bearer: RwLock::new(None),
                catalog_cache,
            }),
        })
    }

    /// Install (or clear) the signed-in user's access token.
    ///
    /// Visible to every clone of this client.
    pub fn set_bearer(&self, token: Option<SecretString>) {
        let mut slot = match self.inner.bearer.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = token;
    }

    fn bearer_token(&self) -> String {
        let slot = match self.inner.bearer.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        slot.map_or_else(
            || self.inner.api_key.expose_secret().to_string(),
            |token| token.expose_secret().to_string(),
        )
    }

    fn request(&self, method: Method, table: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/rest/v1/{table}", self.inner.base_url);
        self.inner
            .client
            .request(method, url)
            .bearer_auth(self.bearer_token())
    }

    // =========================================================================
    // Generic request helpers
    // =========================================================================

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, BackendError> {
        let response = self
            .request(Method::GET, table)
            .query(query)
            .send()
            .await?;
        let response = ok_or_api_error(response).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// Insert one row and return the created representation.
    async fn insert_returning<T, B>(&self, table: &str, body: &B) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .header("Accept", "application/vnd.pgrst.object+json")
            .json(body)
            .send()
            .await?;
        let response = ok_or_api_error(response).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    /// Insert one row (or an array of rows) without reading anything back.
    async fn insert<B: Serialize + Sync>(&self, table: &str, body: &B) -> Result<(), BackendError> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;
        ok_or_api_error(response).await.map(|_| ())
    }

    /// Insert-or-merge on the primary key, returning the resulting row.
    async fn upsert_returning<T, B>(&self, table: &str, body: &B) -> Result<T, BackendError>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let response = self
            .request(Method::POST, table)
            .header(
                "Prefer",
                "resolution=merge-duplicates,return=representation",
            )
            .header("Accept", "application/vnd.pgrst.object+json")
            .json(body)
            .send()
            .await?;
        let response = ok_or_api_error(response).await?;
        response
            .json()
            .await
            .map_err(|e| BackendError::Parse(e.to_string()))
    }

    async fn update<B: Serialize + Sync>(
        &self,
        table: &str,
        filters: &[(&str, String)],
        body: &B,
    ) -> Result<(), BackendError> {
        let response = self
            .request(Method::PATCH, table)
            .query(filters)
            .header("Prefer", "return=minimal")
            .json(body)
            .send()
            .await?;
        ok_or_api_error(response).await.map(|_| ())
    }

    async fn delete(&self, table: &str, filters: &[(&str, String)]) -> Result<(), BackendError> {
        let response = self
            .request(Method::DELETE, table)
            .query(filters)
            .send()
            .await?;
        ok_or_api_error(response).await.map(|_| ())
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Look up a profile by identity.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; a missing row is `Ok(None)`.
    #[instrument(skip(self), fields(profile_id = %id))]
    pub async fn profile(&self, id: ProfileId) -> Result<Option<ProfileRow>, BackendError> {
        let rows: Vec<ProfileRow> = self
            .select("profiles", &[("select", "*".into()), ("id", eq(id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Create the profile row for a first sign-in.
    ///
    /// Runs as an insert-or-merge so a concurrent first sign-in (two tabs)
    /// cannot fail on the primary key.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, new_profile), fields(profile_id = %new_profile.id))]
    pub async fn create_profile(
        &self,
        new_profile: &NewProfile,
    ) -> Result<ProfileRow, BackendError> {
        self.upsert_returning("profiles", new_profile).await
    }

    /// Update a profile's display name.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn update_display_name(
        &self,
        id: ProfileId,
        display_name: &str,
    ) -> Result<(), BackendError> {
        self.update(
            "profiles",
            &[("id", eq(id))],
            &serde_json::json!({ "display_name": display_name }),
        )
        .await
    }

    /// Set a profile's role.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(profile_id = %id, role = %role))]
    pub async fn set_profile_role(&self, id: ProfileId, role: Role) -> Result<(), BackendError> {
        self.update(
            "profiles",
            &[("id", eq(id))],
            &serde_json::json!({ "role": role.to_string() }),
        )
        .await
    }

    /// Every profile, newest account first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn all_profiles(&self) -> Result<Vec<ProfileRow>, BackendError> {
        self.select(
            "profiles",
            &[("select", "*".into()), ("order", "created_at.desc".into())],
        )
        .await
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// The public catalog, newest listing first. Cached for five minutes.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn catalog_items(&self) -> Result<Vec<ItemRow>, BackendError> {
        if let Some(cached) = self.inner.catalog_cache.get(CATALOG_CACHE_KEY).await {
            debug!("Cache hit for catalog");
            return Ok(cached.as_ref().clone());
        }

        let rows: Vec<ItemRow> = self
            .select(
                "items",
                &[("select", "*".into()), ("order", "id.desc".into())],
            )
            .await?;

        self.inner
            .catalog_cache
            .insert(CATALOG_CACHE_KEY.to_string(), Arc::new(rows.clone()))
            .await;

        Ok(rows)
    }

    /// Create a listing's item row.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, new_item), fields(title = %new_item.title))]
    pub async fn insert_item(&self, new_item: &NewItem) -> Result<ItemRow, BackendError> {
        let row = self.insert_returning("items", new_item).await?;
        self.inner.catalog_cache.invalidate(CATALOG_CACHE_KEY).await;
        Ok(row)
    }

    /// Remove an item (cart lines, favorites, and listing rows cascade).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(item_id = %id))]
    pub async fn delete_item(&self, id: ItemId) -> Result<(), BackendError> {
        self.delete("items", &[("id", eq(id))]).await?;
        self.inner.catalog_cache.invalidate(CATALOG_CACHE_KEY).await;
        Ok(())
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// A user's cart lines with their items.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn cart(&self, user: ProfileId) -> Result<Vec<CartLineRow>, BackendError> {
        self.select(
            "cart_items",
            &[("select", "id,qty,items(*)".into()), ("user_id", eq(user))],
        )
        .await
    }

    /// Add a fresh cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn insert_cart_line(
        &self,
        user: ProfileId,
        item: ItemId,
        qty: u32,
    ) -> Result<(), BackendError> {
        self.insert(
            "cart_items",
            &NewCartLine {
                user_id: user.as_uuid(),
                item_id: item.as_i64(),
                qty,
            },
        )
        .await
    }

    /// Overwrite the quantity on a (user, item) cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn set_cart_qty(
        &self,
        user: ProfileId,
        item: ItemId,
        qty: u32,
    ) -> Result<(), BackendError> {
        self.update(
            "cart_items",
            &[("user_id", eq(user)), ("item_id", eq(item))],
            &serde_json::json!({ "qty": qty }),
        )
        .await
    }

    /// Drop a (user, item) cart line.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_cart_line(
        &self,
        user: ProfileId,
        item: ItemId,
    ) -> Result<(), BackendError> {
        self.delete(
            "cart_items",
            &[("user_id", eq(user)), ("item_id", eq(item))],
        )
        .await
    }

    /// Empty a user's cart (the final checkout step).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(user_id = %user))]
    pub async fn clear_cart(&self, user: ProfileId) -> Result<(), BackendError> {
        self.delete("cart_items", &[("user_id", eq(user))]).await
    }

    // =========================================================================
    // Favorites
    // =========================================================================

    /// A user's favorites with their items.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn favorites(&self, user: ProfileId) -> Result<Vec<FavoriteRow>, BackendError> {
        self.select(
            "favorites",
            &[("select", "id,items(*)".into()), ("user_id", eq(user))],
        )
        .await
    }

    /// Mark an item as a favorite.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn insert_favorite(&self, user: ProfileId, item: ItemId) -> Result<(), BackendError> {
        self.insert(
            "favorites",
            &NewFavorite {
                user_id: user.as_uuid(),
                item_id: item.as_i64(),
            },
        )
        .await
    }

    /// Remove an item from a user's favorites.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_favorite(&self, user: ProfileId, item: ItemId) -> Result<(), BackendError> {
        self.delete(
            "favorites",
            &[("user_id", eq(user)), ("item_id", eq(item))],
        )
        .await
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// A user's orders, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn orders_for(&self, user: ProfileId) -> Result<Vec<OrderRow>, BackendError> {
        self.select(
            "orders",
            &[
                ("select", "*".into()),
                ("user_id", eq(user)),
                ("order", "placed_at.desc".into()),
            ],
        )
        .await
    }

    /// Every order, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn all_orders(&self) -> Result<Vec<OrderRow>, BackendError> {
        self.select(
            "orders",
            &[("select", "*".into()), ("order", "placed_at.desc".into())],
        )
        .await
    }

    /// A single order by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails; a missing row is `Ok(None)`.
    pub async fn order(&self, id: OrderId) -> Result<Option<OrderRow>, BackendError> {
        let rows: Vec<OrderRow> = self
            .select("orders", &[("select", "*".into()), ("id", eq(id))])
            .await?;
        Ok(rows.into_iter().next())
    }

    /// Write the order header and return it with its assigned id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, new_order), fields(user_id = %new_order.user_id))]
    pub async fn insert_order(&self, new_order: &NewOrder) -> Result<OrderRow, BackendError> {
        self.insert_returning("orders", new_order).await
    }

    /// Remove an order header (compensation for a failed line write).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: OrderId) -> Result<(), BackendError> {
        self.delete("orders", &[("id", eq(id))]).await
    }

    /// Write all of an order's lines in one request.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, lines), fields(count = lines.len()))]
    pub async fn insert_order_lines(&self, lines: &[NewOrderLine]) -> Result<(), BackendError> {
        self.insert("order_items", &lines).await
    }

    /// Move an order to a new status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self), fields(order_id = %id, status = %status))]
    pub async fn set_order_status(
        &self,
        id: OrderId,
        status: OrderStatus,
    ) -> Result<(), BackendError> {
        self.update(
            "orders",
            &[("id", eq(id))],
            &serde_json::json!({ "status": status.to_string() }),
        )
        .await
    }

    // =========================================================================
    // Notifications
    // =========================================================================

    /// A user's notifications, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn notifications(
        &self,
        user: ProfileId,
    ) -> Result<Vec<NotificationRow>, BackendError> {
        self.select(
            "notifications",
            &[
                ("select", "*".into()),
                ("user_id", eq(user)),
                ("order", "created_at.desc".into()),
            ],
        )
        .await
    }

    /// Flag a notification as read.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn mark_notification_read(&self, id: NotificationId) -> Result<(), BackendError> {
        self.update(
            "notifications",
            &[("id", eq(id))],
            &serde_json::json!({ "is_read": true }),
        )
        .await
    }

    // =========================================================================
    // Stored cards
    // =========================================================================

    /// A user's stored card records.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn stored_cards(&self, user: ProfileId) -> Result<Vec<StoredCardRow>, BackendError> {
        self.select(
            "payment_methods",
            &[("select", "*".into()), ("user_id", eq(user))],
        )
        .await
    }

    /// Save a card record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn insert_stored_card(&self, card: &NewStoredCard) -> Result<(), BackendError> {
        self.insert("payment_methods", card).await
    }

    /// Remove a card record.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn delete_stored_card(&self, id: StoredCardId) -> Result<(), BackendError> {
        self.delete("payment_methods", &[("id", eq(id))]).await
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// The items a seller account has listed.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn listings_for(&self, seller: ProfileId) -> Result<Vec<ListingRow>, BackendError> {
        self.select(
            "seller_items",
            &[("select", "id,items(*)".into()), ("seller_id", eq(seller))],
        )
        .await
    }

    /// Record which account listed an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn insert_listing(
        &self,
        seller: ProfileId,
        item: ItemId,
    ) -> Result<(), BackendError> {
        self.insert(
            "seller_items",
            &NewListing {
                seller_id: seller.as_uuid(),
                item_id: item.as_i64(),
            },
        )
        .await
    }
}

/// Render a `column=eq.value` filter value.
fn eq(value: impl std::fmt::Display) -> String {
    format!("eq.{value}")
}

async fn ok_or_api_error(response: reqwest::Response) -> Result<reqwest::Response, BackendError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(BackendError::Api {
        status: status.as_u16(),
        message: error_message(&body),
    })
}
