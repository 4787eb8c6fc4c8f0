//! Admin console flows against in-process mock services.
//!
//! Covers the role gate, inventory management with its storage upload,
//! order status moves, and the dashboard rollup. Fully self-contained; each
//! test starts its own mock backend and card processor.
//!
//! Run with: cargo test -p maison-integration-tests

#![allow(clippy::unwrap_used)]

use maison_core::{OrderId, OrderStatus, Price, ProfileId, Role};
use maison_integration_tests::TestContext;
use maison_storefront::app::{ItemImage, NewListingForm};
use maison_storefront::error::AppError;
use maison_storefront::router::{Page, View};
use serde_json::json;

fn listing(title: &str, price: &str) -> NewListingForm {
    NewListingForm {
        title: title.to_string(),
        price: price.to_string(),
        ..Default::default()
    }
}

// =============================================================================
// Role gate
// =============================================================================

#[tokio::test]
async fn admin_sign_in_lands_on_the_dashboard() {
    let ctx = TestContext::start().await;
    ctx.backend.seed_admin("margaux@example.com");

    let app = ctx.signed_in_app("margaux@example.com").await;

    assert_eq!(app.session().profile().unwrap().role, Role::Admin);
    assert_eq!(app.current_page(), Page::AdminDashboard);
}

#[tokio::test]
async fn admin_pages_render_home_for_customers() {
    let ctx = TestContext::start().await;
    ctx.backend.seed_customer("claire@example.com");

    let mut app = ctx.signed_in_app("claire@example.com").await;
    app.change_page(Page::AdminDashboard);

    // The page sticks but the view shown is home.
    assert_eq!(app.current_page(), Page::AdminDashboard);
    assert_eq!(app.current_view(), View::Home);
}

#[tokio::test]
async fn admin_operations_require_the_admin_role() {
    let ctx = TestContext::start().await;
    let user = ctx.backend.seed_customer("claire@example.com");
    let order = ctx.backend.seed_order(user, "processing");

    let mut app = ctx.signed_in_app("claire@example.com").await;

    let err = app
        .update_order_status(OrderId::new(order), OrderStatus::Shipped)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = app.fetch_all_orders().await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    // The row never moved.
    assert_eq!(ctx.backend.rows("orders")[0]["status"], json!("processing"));
}

// =============================================================================
// Order management
// =============================================================================

#[tokio::test]
async fn order_status_follows_the_allowed_moves() {
    let ctx = TestContext::start().await;
    let customer = ctx.backend.seed_customer("claire@example.com");
    let order = ctx.backend.seed_order(customer, "processing");
    ctx.backend.seed_admin("margaux@example.com");

    let mut app = ctx.signed_in_app("margaux@example.com").await;

    app.update_order_status(OrderId::new(order), OrderStatus::Shipped)
        .await
        .unwrap();
    assert_eq!(ctx.backend.rows("orders")[0]["status"], json!("shipped"));

    app.update_order_status(OrderId::new(order), OrderStatus::Delivered)
        .await
        .unwrap();
    assert_eq!(ctx.backend.rows("orders")[0]["status"], json!("delivered"));
}

#[tokio::test]
async fn order_status_rejects_a_skipped_move() {
    let ctx = TestContext::start().await;
    let customer = ctx.backend.seed_customer("claire@example.com");
    let order = ctx.backend.seed_order(customer, "processing");
    ctx.backend.seed_admin("margaux@example.com");

    let mut app = ctx.signed_in_app("margaux@example.com").await;
    let err = app
        .update_order_status(OrderId::new(order), OrderStatus::Delivered)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AppError::InvalidStatusChange {
            from: OrderStatus::Processing,
            to: OrderStatus::Delivered,
        }
    ));
    assert_eq!(ctx.backend.rows("orders")[0]["status"], json!("processing"));
}

#[tokio::test]
async fn updating_a_user_role_writes_the_profile_row() {
    let ctx = TestContext::start().await;
    let customer = ctx.backend.seed_customer("claire@example.com");
    ctx.backend.seed_admin("margaux@example.com");

    let mut app = ctx.signed_in_app("margaux@example.com").await;
    app.update_user_role(ProfileId::new(customer), Role::Admin)
        .await
        .unwrap();

    let promoted = ctx
        .backend
        .rows("profiles")
        .into_iter()
        .find(|row| row["id"] == json!(customer))
        .unwrap();
    assert_eq!(promoted["role"], json!("admin"));

    let users = app.fetch_all_users().await.unwrap();
    assert!(users.iter().all(|user| user.role == Role::Admin));
}

// =============================================================================
// Inventory
// =============================================================================

#[tokio::test]
async fn adding_an_item_lists_it_for_the_admin() {
    let ctx = TestContext::start().await;
    ctx.backend.seed_admin("margaux@example.com");

    let mut app = ctx.signed_in_app("margaux@example.com").await;
    let item = app.add_item(listing("Imari Charger", "480")).await.unwrap();

    assert_eq!(item.title, "Imari Charger");
    assert_eq!(item.price, Price::from_dollars(480));
    // No photo supplied, so the placeholder image is used.
    assert_eq!(item.img, "/images/placeholder.png");
    assert_eq!(item.kind, "Unknown");
    assert!(item.era.is_some());

    let items = ctx.backend.rows("items");
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["price"], json!("480"));
    assert_eq!(ctx.backend.table_len("seller_items"), 1);

    assert!(app.catalog().iter().any(|i| i.title == "Imari Charger"));
    assert_eq!(app.listings().len(), 1);
}

#[tokio::test]
async fn adding_an_item_uploads_the_photo() {
    let ctx = TestContext::start().await;
    ctx.backend.seed_admin("margaux@example.com");

    let mut app = ctx.signed_in_app("margaux@example.com").await;
    let mut form = listing("Sevres Dessert Plate", "250");
    form.image = Some(ItemImage {
        file_name: "sevres plate.jpg".to_string(),
        content_type: "image/jpeg".to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF],
    });

    let item = app.add_item(form).await.unwrap();

    let uploads = ctx.backend.uploads();
    assert_eq!(uploads.len(), 1);
    assert!(uploads[0].starts_with("item-images/"));
    assert!(uploads[0].ends_with("-sevres-plate.jpg"));
    assert!(
        item.img
            .contains("/storage/v1/object/public/item-images/")
    );
}

#[tokio::test]
async fn deleting_an_item_requires_owning_the_listing() {
    let ctx = TestContext::start().await;
    ctx.backend.seed_admin("margaux@example.com");
    ctx.backend.seed_admin("aurelien@example.com");

    let mut owner = ctx.signed_in_app("margaux@example.com").await;
    let item = owner
        .add_item(listing("Imari Charger", "480"))
        .await
        .unwrap();

    let mut other = ctx.signed_in_app("aurelien@example.com").await;
    let err = other.delete_item(item.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(ctx.backend.table_len("items"), 1);

    owner.delete_item(item.id).await.unwrap();
    assert_eq!(ctx.backend.table_len("items"), 0);
    assert_eq!(ctx.backend.table_len("seller_items"), 0);
    assert!(owner.listings().is_empty());
}

// =============================================================================
// Dashboard
// =============================================================================

#[tokio::test]
async fn dashboard_stats_summarize_the_tables() {
    let ctx = TestContext::start().await;
    let customer = ctx.backend.seed_customer("claire@example.com");
    ctx.backend.seed_admin("margaux@example.com");
    ctx.backend.seed_item("Sevres Dessert Plate", 250);
    ctx.backend.seed_item("Imari Charger", 480);
    ctx.backend.seed_order(customer, "processing");
    ctx.backend.seed_order(customer, "delivered");

    let app = ctx.signed_in_app("margaux@example.com").await;
    let stats = app.dashboard_stats().await.unwrap();

    assert_eq!(stats.total_items, 2);
    assert_eq!(stats.total_orders, 2);
    assert_eq!(stats.total_users, 2);
    assert_eq!(stats.pending_orders, 1);
    // Both seeded orders total $400.
    assert_eq!(stats.total_revenue, Price::from_dollars(800));
}
