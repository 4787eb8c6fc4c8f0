//! Admin console operations.
//!
//! Every write here is gated by a client-side role check before the call
//! goes out. The backend enforces the same rules; the check here exists for
//! immediate feedback, not as a security boundary.

use chrono::{Datelike, Utc};
use tracing::error;

use super::App;
use crate::backend::rows::NewItem;
use crate::error::AppError;
use crate::models::{Item, Order};
use crate::session::Profile;
use maison_core::catalog::{FALLBACK_IMAGE, UNKNOWN_TAG};
use maison_core::{ItemId, OrderId, OrderStatus, Price, ProfileId, Role};

/// An image file collected by the listing form.
#[derive(Debug, Clone)]
pub struct ItemImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// The listing form as submitted. Only title and price are mandatory;
/// everything else falls back to a sensible default.
#[derive(Debug, Clone, Default)]
pub struct NewListingForm {
    pub title: String,
    pub price: String,
    pub image: Option<ItemImage>,
    pub kind: Option<String>,
    pub origin: Option<String>,
    pub era: Option<i32>,
    pub material: Option<String>,
}

/// Headline numbers for the admin dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_items: usize,
    pub total_orders: usize,
    pub total_users: usize,
    /// Orders still in `processing`.
    pub pending_orders: usize,
    /// Sum of every order's total, whatever its status.
    pub total_revenue: Price,
}

impl App {
    fn require_admin(&self) -> Result<ProfileId, AppError> {
        let Some(profile) = self.session.profile() else {
            return Err(AppError::SignInRequired);
        };
        if !profile.role.is_admin() {
            return Err(AppError::Forbidden("admin access required".into()));
        }
        Ok(profile.id)
    }

    /// Create a listing: optional image upload, item row, then the listing
    /// row tying it to this account.
    ///
    /// The item insert is compensated (deleted) if the listing insert fails,
    /// so no item ends up unowned.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-admins, a validation error for a
    /// missing title or malformed price, or the storage/backend error.
    pub async fn add_item(&mut self, form: NewListingForm) -> Result<Item, AppError> {
        let seller = self.require_admin()?;
        let title = form.title.trim().to_string();
        if title.is_empty() {
            return Err(AppError::Validation("Title is required".into()));
        }
        let price = Price::parse(&form.price)
            .map_err(|err| AppError::Validation(err.to_string()))?;

        self.loading = true;
        let result = self.add_item_inner(seller, &title, price, form).await;
        self.loading = false;
        result
    }

    async fn add_item_inner(
        &mut self,
        seller: ProfileId,
        title: &str,
        price: Price,
        form: NewListingForm,
    ) -> Result<Item, AppError> {
        let img = match form.image {
            Some(image) => {
                let path = format!(
                    "{}-{}",
                    Utc::now().timestamp_millis(),
                    sanitize_file_name(&image.file_name)
                );
                self.storage
                    .upload(
                        self.access_token.as_ref(),
                        &self.image_bucket,
                        &path,
                        image.bytes,
                        &image.content_type,
                    )
                    .await?;
                self.storage.public_url(&self.image_bucket, &path)
            }
            None => FALLBACK_IMAGE.to_string(),
        };

        let now = Utc::now();
        let row = self
            .data
            .insert_item(&NewItem {
                title: title.to_string(),
                price: price.amount(),
                img,
                kind: or_unknown(form.kind),
                origin: or_unknown(form.origin),
                era: form.era.unwrap_or_else(|| now.year()),
                material: or_unknown(form.material),
                date: now.format("%b %-d, %Y").to_string(),
            })
            .await?;
        let item_id = ItemId::new(row.id);

        if let Err(err) = self.data.insert_listing(seller, item_id).await {
            // Compensate: an item nobody owns cannot be managed later.
            if let Err(cleanup_err) = self.data.delete_item(item_id).await {
                error!(
                    item_id = %item_id,
                    error = %cleanup_err,
                    "Failed to remove item after listing write failed",
                );
            }
            return Err(err.into());
        }

        self.load_catalog().await;
        self.refresh_listings().await;
        Ok(Item::from(row))
    }

    /// Remove an item this account listed.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-admins or for items listed by a
    /// different account, or the backend error.
    pub async fn delete_item(&mut self, item_id: ItemId) -> Result<(), AppError> {
        self.require_admin()?;
        self.refresh_listings().await;
        if !self.listings.iter().any(|listing| listing.item.id == item_id) {
            return Err(AppError::Forbidden(
                "only the listing account can remove an item".into(),
            ));
        }

        self.data.delete_item(item_id).await?;
        self.load_catalog().await;
        self.refresh_listings().await;
        Ok(())
    }

    /// Move an order along its lifecycle.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-admins, a not-found error for a
    /// missing order, an [`AppError::InvalidStatusChange`] for a transition
    /// the lifecycle does not allow, or the backend error.
    pub async fn update_order_status(
        &mut self,
        order_id: OrderId,
        status: OrderStatus,
    ) -> Result<(), AppError> {
        self.require_admin()?;
        let Some(order) = self.data.order(order_id).await? else {
            return Err(AppError::NotFound(format!("order {order_id}")));
        };
        if !order.status.can_transition_to(status) {
            return Err(AppError::InvalidStatusChange {
                from: order.status,
                to: status,
            });
        }
        self.data.set_order_status(order_id, status).await?;
        Ok(())
    }

    /// Grant or revoke the admin role on a profile.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-admins, or the backend error.
    pub async fn update_user_role(&mut self, user: ProfileId, role: Role) -> Result<(), AppError> {
        self.require_admin()?;
        self.data.set_profile_role(user, role).await?;
        Ok(())
    }

    /// Every order in the store, most recent first.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-admins, or the backend error.
    pub async fn fetch_all_orders(&self) -> Result<Vec<Order>, AppError> {
        self.require_admin()?;
        let rows = self.data.all_orders().await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Every profile, newest account first.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-admins, or the backend error.
    pub async fn fetch_all_users(&self) -> Result<Vec<Profile>, AppError> {
        self.require_admin()?;
        let rows = self.data.all_profiles().await?;
        Ok(rows.into_iter().map(Profile::from_row).collect())
    }

    /// Headline numbers for the dashboard, derived from full reads.
    ///
    /// # Errors
    ///
    /// Returns a forbidden error for non-admins, or the backend error.
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, AppError> {
        self.require_admin()?;
        let items = self.data.catalog_items().await?;
        let orders = self.data.all_orders().await?;
        let users = self.data.all_profiles().await?;

        let pending_orders = orders
            .iter()
            .filter(|order| order.status == OrderStatus::Processing)
            .count();
        let total_revenue = orders.iter().map(|order| Price::new(order.total)).sum();

        Ok(DashboardStats {
            total_items: items.len(),
            total_orders: orders.len(),
            total_users: users.len(),
            pending_orders,
            total_revenue,
        })
    }
}

fn or_unknown(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| UNKNOWN_TAG.to_string())
}

/// File names become URL path segments; keep them boring.
fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '-'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::super::tests::{signed_in_app, test_app};
    use super::*;

    #[tokio::test]
    async fn test_customer_cannot_add_items() {
        let mut app = signed_in_app(Role::Customer);
        let err = app
            .add_item(NewListingForm {
                title: "Meissen Charger".to_string(),
                price: "480".to_string(),
                ..NewListingForm::default()
            })
            .await;
        assert!(matches!(err, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_anonymous_admin_op_requires_sign_in() {
        let mut app = test_app();
        let err = app
            .update_user_role(ProfileId::new(uuid::Uuid::nil()), Role::Admin)
            .await;
        assert!(matches!(err, Err(AppError::SignInRequired)));
    }

    #[tokio::test]
    async fn test_add_item_rejects_malformed_price() {
        let mut app = signed_in_app(Role::Admin);
        let err = app
            .add_item(NewListingForm {
                title: "Sevres Platter".to_string(),
                price: "four hundred".to_string(),
                ..NewListingForm::default()
            })
            .await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        let err = app
            .add_item(NewListingForm {
                title: "Sevres Platter".to_string(),
                price: "-5".to_string(),
                ..NewListingForm::default()
            })
            .await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_add_item_requires_title() {
        let mut app = signed_in_app(Role::Admin);
        let err = app
            .add_item(NewListingForm {
                title: "   ".to_string(),
                price: "100".to_string(),
                ..NewListingForm::default()
            })
            .await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(
            sanitize_file_name("my plate photo (1).jpg"),
            "my-plate-photo--1-.jpg"
        );
        assert_eq!(sanitize_file_name("simple.png"), "simple.png");
    }
}
