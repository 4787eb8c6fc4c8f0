//! Application core.
//!
//! [`App`] owns everything the UI shell needs: session state, the current
//! page, and client-held copies of the signed-in user's remote collections.
//! UI events arrive as method calls; the shell re-reads the accessors after
//! each one. Collection loads are best-effort (an empty list beats a dead
//! screen), mutations return typed errors, and every mutation re-fetches the
//! collection it touched.

mod account;
mod admin;
mod cart;
mod orders;

pub use admin::{DashboardStats, ItemImage, NewListingForm};
pub use orders::PlaceOrderRequest;

use secrecy::SecretString;
use tracing::{instrument, warn};

use crate::backend::rows::NewProfile;
use crate::backend::{
    AuthClient, AuthError, AuthSession, AuthUser, DataClient, SignUpResult, StorageClient,
};
use crate::checkout::CheckoutPolicy;
use crate::config::StorefrontConfig;
use crate::error::AppError;
use crate::models::{
    CartLine, FavoriteItem, Item, ListedItem, NotificationRecord, Order, StoredCard,
};
use crate::payments::PaymentsClient;
use crate::router::{Page, View, resolve_settled, view_for};
use crate::session::{DEFAULT_DISPLAY_NAME, Profile, SessionEvent, SessionState};
use maison_core::{Email, ProfileId, Role};

/// How a non-erroring sign-up ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Confirmations are off; the user is signed in.
    SignedIn,
    /// The account exists and a confirmation email is on its way.
    ConfirmationRequired,
}

/// The storefront application core.
pub struct App {
    data: DataClient,
    auth: AuthClient,
    storage: StorageClient,
    payments: PaymentsClient,
    checkout: CheckoutPolicy,
    image_bucket: String,

    session: SessionState,
    access_token: Option<SecretString>,
    current_page: Page,
    history: Vec<Page>,
    loading: bool,

    catalog: Vec<Item>,
    cart: Vec<CartLine>,
    favorites: Vec<FavoriteItem>,
    orders: Vec<Order>,
    notifications: Vec<NotificationRecord>,
    cards: Vec<StoredCard>,
    listings: Vec<ListedItem>,
}

impl App {
    /// Build the application from its configuration.
    ///
    /// Starts anonymous on the loading page; call [`App::load_catalog`] and
    /// [`App::finish_bootstrap`] once the shell is up.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the HTTP clients fail to build.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let data = DataClient::new(&config.backend)?;
        let auth = AuthClient::new(&config.backend)?;
        let storage = StorageClient::new(&config.backend)?;
        let payments = PaymentsClient::new(&config.payments_url)?;

        Ok(Self {
            data,
            auth,
            storage,
            payments,
            checkout: config.checkout,
            image_bucket: config.image_bucket,
            session: SessionState::Anonymous,
            access_token: None,
            current_page: Page::Loading,
            history: Vec::new(),
            loading: false,
            catalog: Vec::new(),
            cart: Vec::new(),
            favorites: Vec::new(),
            orders: Vec::new(),
            notifications: Vec::new(),
            cards: Vec::new(),
            listings: Vec::new(),
        })
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[must_use]
    pub const fn session(&self) -> &SessionState {
        &self.session
    }

    #[must_use]
    pub const fn current_page(&self) -> Page {
        self.current_page
    }

    /// The view to draw for the current page and session.
    #[must_use]
    pub fn current_view(&self) -> View {
        view_for(self.current_page, &self.session)
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub const fn checkout_policy(&self) -> &CheckoutPolicy {
        &self.checkout
    }

    #[must_use]
    pub fn catalog(&self) -> &[Item] {
        &self.catalog
    }

    #[must_use]
    pub fn cart(&self) -> &[CartLine] {
        &self.cart
    }

    #[must_use]
    pub fn favorites(&self) -> &[FavoriteItem] {
        &self.favorites
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[must_use]
    pub fn notifications(&self) -> &[NotificationRecord] {
        &self.notifications
    }

    #[must_use]
    pub fn stored_cards(&self) -> &[StoredCard] {
        &self.cards
    }

    #[must_use]
    pub fn listings(&self) -> &[ListedItem] {
        &self.listings
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Leave the boot screen once the shell has finished its first paint.
    pub fn finish_bootstrap(&mut self) {
        if self.current_page == Page::Loading {
            self.current_page = Page::Starting;
        }
    }

    /// Navigate to a page, resolving guards against the current session.
    ///
    /// The page being left is pushed onto the back stack even when the
    /// request redirects.
    pub fn change_page(&mut self, page: Page) {
        self.history.push(self.current_page);
        self.current_page = resolve_settled(page, &self.session);
    }

    /// Navigate by wire token. Unknown tokens land on the session's landing
    /// page.
    pub fn change_page_token(&mut self, token: &str) {
        let target = Page::from_token(token).unwrap_or_else(|| Page::landing(&self.session));
        self.change_page(target);
    }

    /// Pop the back stack, re-resolving the popped page against the current
    /// session. An empty stack goes home.
    pub fn go_back(&mut self) {
        let target = self.history.pop().unwrap_or(Page::Home);
        self.current_page = resolve_settled(target, &self.session);
    }

    // =========================================================================
    // Session lifecycle
    // =========================================================================

    /// Load the public catalog. Failure logs and leaves the catalog empty.
    pub async fn load_catalog(&mut self) {
        self.loading = true;
        match self.data.catalog_items().await {
            Ok(rows) => self.catalog = rows.into_iter().map(Into::into).collect(),
            Err(err) => {
                warn!(error = %err, "Failed to load catalog");
                self.catalog.clear();
            }
        }
        self.loading = false;
    }

    /// React to an auth lifecycle event from the surrounding shell.
    ///
    /// # Errors
    ///
    /// Returns an error if a restored session's profile cannot be loaded or
    /// created; the app reverts to anonymous first.
    pub async fn handle_session_event(&mut self, event: SessionEvent) -> Result<(), AppError> {
        match event {
            SessionEvent::SignedIn(session) => self.complete_sign_in(session).await,
            SessionEvent::SignedOut => {
                self.reset_to_anonymous();
                Ok(())
            }
        }
    }

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty fields, the mapped auth error on
    /// rejection, and any profile-load failure from the sign-in completion.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<(), AppError> {
        if email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation("Email and password are required".into()));
        }
        let email = Email::normalize(email)
            .map_err(|_| AppError::Validation("Enter a valid email address".into()))?;

        self.loading = true;
        let result = self.sign_in_inner(&email, password).await;
        self.loading = false;
        result
    }

    async fn sign_in_inner(&mut self, email: &Email, password: &str) -> Result<(), AppError> {
        let session = match self.auth.sign_in(email, password).await {
            Ok(session) => session,
            Err(AuthError::EmailNotConfirmed) => {
                // Nudge the confirmation email along before surfacing the error.
                if let Err(resend_err) = self.auth.resend_confirmation(email).await {
                    warn!(error = %resend_err, "Failed to resend confirmation email");
                }
                return Err(AuthError::EmailNotConfirmed.into());
            }
            Err(err) => return Err(err.into()),
        };
        self.complete_sign_in(session).await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns a validation error for empty fields or a short password, and
    /// the mapped auth error on rejection (including a duplicate email).
    pub async fn sign_up(
        &mut self,
        display_name: &str,
        email: &str,
        password: &str,
    ) -> Result<SignUpOutcome, AppError> {
        let display_name = display_name.trim();
        if display_name.is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation("All fields are required".into()));
        }
        if password.chars().count() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters".into(),
            ));
        }
        let email = Email::normalize(email)
            .map_err(|_| AppError::Validation("Enter a valid email address".into()))?;

        self.loading = true;
        let result = self.sign_up_inner(display_name, &email, password).await;
        self.loading = false;
        result
    }

    async fn sign_up_inner(
        &mut self,
        display_name: &str,
        email: &Email,
        password: &str,
    ) -> Result<SignUpOutcome, AppError> {
        match self.auth.sign_up(email, password, display_name).await? {
            SignUpResult::Session(session) => {
                self.complete_sign_in(session).await?;
                Ok(SignUpOutcome::SignedIn)
            }
            SignUpResult::ConfirmationRequired => Ok(SignUpOutcome::ConfirmationRequired),
        }
    }

    /// Sign out. Remote revocation is best-effort; local state always clears.
    pub async fn sign_out(&mut self) {
        if let Some(token) = self.access_token.take() {
            if let Err(err) = self.auth.sign_out(&token).await {
                warn!(error = %err, "Remote sign-out failed; clearing local session anyway");
            }
        }
        self.reset_to_anonymous();
    }

    #[instrument(skip_all, fields(user_id = %auth_session.user.id))]
    async fn complete_sign_in(&mut self, auth_session: AuthSession) -> Result<(), AppError> {
        let user_id = ProfileId::new(auth_session.user.id);
        self.data.set_bearer(Some(auth_session.access_token.clone()));
        self.access_token = Some(auth_session.access_token.clone());
        self.session = SessionState::LoadingProfile { user_id };

        let profile = match self.load_or_create_profile(&auth_session.user).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(error = %err, "Profile resolution failed; reverting to anonymous");
                self.reset_to_anonymous();
                return Err(err);
            }
        };

        self.session = SessionState::SignedIn { profile };
        self.load_user_collections().await;

        let landing = Page::landing(&self.session);
        self.change_page(landing);
        Ok(())
    }

    async fn load_or_create_profile(&mut self, user: &AuthUser) -> Result<Profile, AppError> {
        let user_id = ProfileId::new(user.id);
        if let Some(row) = self.data.profile(user_id).await? {
            return Ok(Profile::from_row(row));
        }

        let display_name = user
            .user_metadata
            .display_name
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| {
                user.email
                    .as_deref()
                    .and_then(|email| email.split('@').next())
                    .filter(|local| !local.is_empty())
                    .map(String::from)
            })
            .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string());

        let row = self
            .data
            .create_profile(&NewProfile {
                id: user.id,
                display_name,
                email: user.email.clone(),
                role: Role::Customer.to_string(),
            })
            .await?;
        Ok(Profile::from_row(row))
    }

    fn reset_to_anonymous(&mut self) {
        self.data.set_bearer(None);
        self.access_token = None;
        self.session = SessionState::Anonymous;
        self.cart.clear();
        self.favorites.clear();
        self.orders.clear();
        self.notifications.clear();
        self.cards.clear();
        self.listings.clear();
        self.history.clear();
        self.current_page = Page::Login;
    }

    /// The signed-in profile id, or a routed `SignInRequired` error.
    ///
    /// Mutations call this first: a signed-out user is sent to the login
    /// page and no write is attempted.
    fn profile_id_or_login(&mut self) -> Result<ProfileId, AppError> {
        if let Some(profile) = self.session.profile() {
            return Ok(profile.id);
        }
        self.change_page(Page::Login);
        Err(AppError::SignInRequired)
    }

    // =========================================================================
    // Collection loads
    // =========================================================================

    async fn load_user_collections(&mut self) {
        self.refresh_cart().await;
        self.refresh_favorites().await;
        self.refresh_orders().await;
        self.refresh_notifications().await;
        self.refresh_stored_cards().await;
        self.refresh_listings().await;
    }

    /// Re-fetch the cart. No-op when signed out; failure empties the copy.
    pub async fn refresh_cart(&mut self) {
        let Some(user) = self.session.profile().map(|p| p.id) else {
            return;
        };
        match self.data.cart(user).await {
            Ok(rows) => self.cart = rows.into_iter().map(Into::into).collect(),
            Err(err) => {
                warn!(error = %err, "Failed to load cart");
                self.cart.clear();
            }
        }
    }

    /// Re-fetch favorites. No-op when signed out; failure empties the copy.
    pub async fn refresh_favorites(&mut self) {
        let Some(user) = self.session.profile().map(|p| p.id) else {
            return;
        };
        match self.data.favorites(user).await {
            Ok(rows) => self.favorites = rows.into_iter().map(Into::into).collect(),
            Err(err) => {
                warn!(error = %err, "Failed to load favorites");
                self.favorites.clear();
            }
        }
    }

    /// Re-fetch order history. No-op when signed out; failure empties the copy.
    pub async fn refresh_orders(&mut self) {
        let Some(user) = self.session.profile().map(|p| p.id) else {
            return;
        };
        match self.data.orders_for(user).await {
            Ok(rows) => self.orders = rows.into_iter().map(Into::into).collect(),
            Err(err) => {
                warn!(error = %err, "Failed to load orders");
                self.orders.clear();
            }
        }
    }

    /// Re-fetch notifications. No-op when signed out; failure empties the copy.
    pub async fn refresh_notifications(&mut self) {
        let Some(user) = self.session.profile().map(|p| p.id) else {
            return;
        };
        match self.data.notifications(user).await {
            Ok(rows) => self.notifications = rows.into_iter().map(Into::into).collect(),
            Err(err) => {
                warn!(error = %err, "Failed to load notifications");
                self.notifications.clear();
            }
        }
    }

    /// Re-fetch stored cards. No-op when signed out; failure empties the copy.
    pub async fn refresh_stored_cards(&mut self) {
        let Some(user) = self.session.profile().map(|p| p.id) else {
            return;
        };
        match self.data.stored_cards(user).await {
            Ok(rows) => self.cards = rows.into_iter().map(Into::into).collect(),
            Err(err) => {
                warn!(error = %err, "Failed to load stored cards");
                self.cards.clear();
            }
        }
    }

    /// Re-fetch the admin's own listings. No-op for non-admin sessions.
    pub async fn refresh_listings(&mut self) {
        let Some(user) = self
            .session
            .profile()
            .filter(|p| p.role.is_admin())
            .map(|p| p.id)
        else {
            return;
        };
        match self.data.listings_for(user).await {
            Ok(rows) => self.listings = rows.into_iter().map(Into::into).collect(),
            Err(err) => {
                warn!(error = %err, "Failed to load listings");
                self.listings.clear();
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;
    use crate::config::BackendConfig;
    use uuid::Uuid;

    pub(crate) fn test_app() -> App {
        let config = StorefrontConfig {
            backend: BackendConfig {
                base_url: "http://127.0.0.1:9".to_string(),
                api_key: SecretString::from("test-key-1234567890".to_string()),
            },
            payments_url: "http://127.0.0.1:9/api".to_string(),
            checkout: CheckoutPolicy::default(),
            image_bucket: "item-images".to_string(),
        };
        App::new(config).unwrap()
    }

    pub(crate) fn signed_in_app(role: Role) -> App {
        let mut app = test_app();
        app.session = SessionState::SignedIn {
            profile: Profile {
                id: ProfileId::new(Uuid::nil()),
                display_name: "Claire".to_string(),
                email: None,
                role,
                created_at: None,
            },
        };
        app.current_page = Page::landing(&app.session);
        app
    }

    #[test]
    fn test_bootstrap_moves_loading_to_starting() {
        let mut app = test_app();
        assert_eq!(app.current_page(), Page::Loading);
        app.finish_bootstrap();
        assert_eq!(app.current_page(), Page::Starting);
        // Idempotent once past the boot screen.
        app.finish_bootstrap();
        assert_eq!(app.current_page(), Page::Starting);
    }

    #[test]
    fn test_anonymous_navigation_to_private_page_lands_on_login() {
        let mut app = test_app();
        app.change_page(Page::Cart);
        assert_eq!(app.current_page(), Page::Login);
        assert_eq!(app.current_view(), View::Login);
    }

    #[test]
    fn test_unknown_token_falls_back_by_role() {
        let mut app = test_app();
        app.change_page_token("no-such-page");
        assert_eq!(app.current_page(), Page::Home);

        let mut admin = signed_in_app(Role::Admin);
        admin.change_page_token("no-such-page");
        assert_eq!(admin.current_page(), Page::AdminDashboard);
    }

    #[test]
    fn test_go_back_pops_history() {
        let mut app = signed_in_app(Role::Customer);
        app.change_page(Page::Categories);
        app.change_page(Page::Cart);
        assert_eq!(app.current_page(), Page::Cart);
        app.go_back();
        assert_eq!(app.current_page(), Page::Categories);
        app.go_back();
        assert_eq!(app.current_page(), Page::Home);
        // Stack exhausted: home is the floor.
        app.go_back();
        assert_eq!(app.current_page(), Page::Home);
    }

    #[test]
    fn test_back_stack_re_resolves_against_current_session() {
        let mut app = signed_in_app(Role::Customer);
        app.change_page(Page::Cart);
        // Session expires while the user sits on the cart page.
        app.session = SessionState::Anonymous;
        app.go_back(); // popped page is home, fine for anonymous
        assert_eq!(app.current_page(), Page::Home);
        app.change_page(Page::Checkout);
        assert_eq!(app.current_page(), Page::Login);
    }

    #[tokio::test]
    async fn test_sign_in_validation_rejects_blank_fields() {
        let mut app = test_app();
        let err = app.sign_in("", "password").await;
        assert!(matches!(err, Err(AppError::Validation(_))));
        let err = app.sign_in("claire@example.com", "").await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_sign_up_validation_rejects_short_password() {
        let mut app = test_app();
        let err = app.sign_up("Claire", "claire@example.com", "12345").await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }
}
