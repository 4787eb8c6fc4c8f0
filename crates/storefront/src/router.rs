//! View routing.
//!
//! Navigation is resolved synchronously: a requested [`Page`] plus the
//! current [`SessionState`] always yields a [`Resolution`] before anything is
//! rendered. There is no "render first, bounce later" window, so a signed-out
//! user never sees a flash of a private page.
//!
//! The rules, in order:
//!
//! 1. `Loading` and `Starting` render themselves for everyone.
//! 2. A signed-in user asking for `Login` or `SignUp` is sent to their
//!    landing page instead.
//! 3. Without a settled profile, any non-public page redirects to `Login`.
//! 4. `AddItem` and the admin pages require the admin role. A signed-in
//!    customer asking for an admin page is shown the home view in place; for
//!    `AddItem` they are redirected home.
//! 5. Anything else renders as requested.

use crate::session::SessionState;

/// Every page the storefront can be asked to show.
///
/// Tokens are the wire names the UI shell uses ("adminDashboard",
/// "paymentMethod", ...); [`Page::from_token`] accepts them and
/// [`Page::token`] renders them back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    Loading,
    Starting,
    Login,
    SignUp,
    Home,
    Categories,
    Cart,
    Checkout,
    Favorites,
    History,
    Notifications,
    PaymentMethods,
    Personal,
    Security,
    Profile,
    AddItem,
    AdminDashboard,
    AdminInventory,
    AdminOrders,
    AdminUsers,
}

impl Page {
    /// All pages, for iteration in guards and tests.
    pub const ALL: [Self; 20] = [
        Self::Loading,
        Self::Starting,
        Self::Login,
        Self::SignUp,
        Self::Home,
        Self::Categories,
        Self::Cart,
        Self::Checkout,
        Self::Favorites,
        Self::History,
        Self::Notifications,
        Self::PaymentMethods,
        Self::Personal,
        Self::Security,
        Self::Profile,
        Self::AddItem,
        Self::AdminDashboard,
        Self::AdminInventory,
        Self::AdminOrders,
        Self::AdminUsers,
    ];

    /// Parse a wire token. Unknown tokens return `None`; the caller decides
    /// the fallback.
    #[must_use]
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "loading" => Some(Self::Loading),
            "starting" => Some(Self::Starting),
            "login" => Some(Self::Login),
            "signup" => Some(Self::SignUp),
            "home" => Some(Self::Home),
            "categories" => Some(Self::Categories),
            "cart" => Some(Self::Cart),
            "checkout" => Some(Self::Checkout),
            "favorites" => Some(Self::Favorites),
            "history" => Some(Self::History),
            "notifications" => Some(Self::Notifications),
            "paymentMethod" => Some(Self::PaymentMethods),
            "personal" => Some(Self::Personal),
            "security" => Some(Self::Security),
            "profile" => Some(Self::Profile),
            "addItem" => Some(Self::AddItem),
            "adminDashboard" => Some(Self::AdminDashboard),
            "adminInventory" => Some(Self::AdminInventory),
            "adminOrders" => Some(Self::AdminOrders),
            "adminUsers" => Some(Self::AdminUsers),
            _ => None,
        }
    }

    #[must_use]
    pub const fn token(self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Starting => "starting",
            Self::Login => "login",
            Self::SignUp => "signup",
            Self::Home => "home",
            Self::Categories => "categories",
            Self::Cart => "cart",
            Self::Checkout => "checkout",
            Self::Favorites => "favorites",
            Self::History => "history",
            Self::Notifications => "notifications",
            Self::PaymentMethods => "paymentMethod",
            Self::Personal => "personal",
            Self::Security => "security",
            Self::Profile => "profile",
            Self::AddItem => "addItem",
            Self::AdminDashboard => "adminDashboard",
            Self::AdminInventory => "adminInventory",
            Self::AdminOrders => "adminOrders",
            Self::AdminUsers => "adminUsers",
        }
    }

    /// Pages anyone may see, signed in or not.
    #[must_use]
    pub const fn is_public(self) -> bool {
        matches!(
            self,
            Self::Login | Self::SignUp | Self::Starting | Self::Home | Self::Categories
        )
    }

    /// The admin console pages.
    #[must_use]
    pub const fn is_admin_page(self) -> bool {
        matches!(
            self,
            Self::AdminDashboard | Self::AdminInventory | Self::AdminOrders | Self::AdminUsers
        )
    }

    /// Where a session lands after sign-in or an unknown navigation token.
    #[must_use]
    pub fn landing(session: &SessionState) -> Self {
        if session.is_admin() {
            Self::AdminDashboard
        } else {
            Self::Home
        }
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.token())
    }
}

/// What actually gets drawn.
///
/// Mostly one-to-one with [`Page`], but kept separate because a page can
/// resolve to a different view (a customer asking for an admin page is shown
/// `Home` without navigating).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Loading,
    Starting,
    Login,
    SignUp,
    Home,
    Categories,
    Cart,
    Checkout,
    Favorites,
    History,
    Notifications,
    PaymentMethods,
    Personal,
    Security,
    Profile,
    AddItem,
    AdminDashboard,
    AdminInventory,
    AdminOrders,
    AdminUsers,
}

/// Outcome of resolving one navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Draw this view for the requested page.
    Render(View),
    /// Navigate to a different page instead.
    Redirect(Page),
}

/// Resolve one requested page against the session.
#[must_use]
pub fn resolve(page: Page, session: &SessionState) -> Resolution {
    // Bootstrap pages are unconditional.
    match page {
        Page::Loading => return Resolution::Render(View::Loading),
        Page::Starting => return Resolution::Render(View::Starting),
        _ => {}
    }

    let signed_in = session.profile().is_some();

    if signed_in && matches!(page, Page::Login | Page::SignUp) {
        return Resolution::Redirect(Page::landing(session));
    }

    if !signed_in && !page.is_public() {
        return Resolution::Redirect(Page::Login);
    }

    if page == Page::AddItem && !session.is_admin() {
        return Resolution::Redirect(Page::Home);
    }

    if page.is_admin_page() && !session.is_admin() {
        // Signed-in customer poking at the console: show home where they
        // stand rather than navigating them around.
        return Resolution::Render(View::Home);
    }

    Resolution::Render(direct_view(page))
}

/// Follow redirects until a page renders, then return that page.
///
/// Redirect chains are short (at most request -> login, or login -> landing);
/// the hop cap only guards against future rule mistakes.
#[must_use]
pub fn resolve_settled(page: Page, session: &SessionState) -> Page {
    let mut current = page;
    for _ in 0..4 {
        match resolve(current, session) {
            Resolution::Render(_) => return current,
            Resolution::Redirect(next) => current = next,
        }
    }
    Page::Home
}

/// The view for a requested page once redirects have settled.
#[must_use]
pub fn view_for(page: Page, session: &SessionState) -> View {
    match resolve(resolve_settled(page, session), session) {
        Resolution::Render(view) => view,
        // A settled page renders by definition; keep the router total anyway.
        Resolution::Redirect(_) => View::Home,
    }
}

const fn direct_view(page: Page) -> View {
    match page {
        Page::Loading => View::Loading,
        Page::Starting => View::Starting,
        Page::Login => View::Login,
        Page::SignUp => View::SignUp,
        Page::Home => View::Home,
        Page::Categories => View::Categories,
        Page::Cart => View::Cart,
        Page::Checkout => View::Checkout,
        Page::Favorites => View::Favorites,
        Page::History => View::History,
        Page::Notifications => View::Notifications,
        Page::PaymentMethods => View::PaymentMethods,
        Page::Personal => View::Personal,
        Page::Security => View::Security,
        Page::Profile => View::Profile,
        Page::AddItem => View::AddItem,
        Page::AdminDashboard => View::AdminDashboard,
        Page::AdminInventory => View::AdminInventory,
        Page::AdminOrders => View::AdminOrders,
        Page::AdminUsers => View::AdminUsers,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Profile;
    use maison_core::{ProfileId, Role};
    use uuid::Uuid;

    fn anonymous() -> SessionState {
        SessionState::Anonymous
    }

    fn loading_profile() -> SessionState {
        SessionState::LoadingProfile {
            user_id: ProfileId::new(Uuid::nil()),
        }
    }

    fn signed_in(role: Role) -> SessionState {
        SessionState::SignedIn {
            profile: Profile {
                id: ProfileId::new(Uuid::nil()),
                display_name: "Claire".to_string(),
                email: None,
                role,
                created_at: None,
            },
        }
    }

    #[test]
    fn test_token_round_trip_for_every_page() {
        for page in Page::ALL {
            assert_eq!(Page::from_token(page.token()), Some(page), "{page:?}");
        }
    }

    #[test]
    fn test_unknown_token_is_none() {
        assert_eq!(Page::from_token("paymentMethods"), None);
        assert_eq!(Page::from_token(""), None);
        assert_eq!(Page::from_token("HOME"), None);
    }

    #[test]
    fn test_payment_methods_token_is_singular() {
        assert_eq!(Page::PaymentMethods.token(), "paymentMethod");
    }

    #[test]
    fn test_bootstrap_pages_render_for_everyone() {
        for session in [anonymous(), signed_in(Role::Customer), signed_in(Role::Admin)] {
            assert_eq!(
                resolve(Page::Loading, &session),
                Resolution::Render(View::Loading)
            );
            assert_eq!(
                resolve(Page::Starting, &session),
                Resolution::Render(View::Starting)
            );
        }
    }

    #[test]
    fn test_anonymous_sees_public_pages() {
        for page in [Page::Login, Page::SignUp, Page::Home, Page::Categories] {
            assert!(matches!(
                resolve(page, &anonymous()),
                Resolution::Render(_)
            ));
        }
    }

    #[test]
    fn test_anonymous_private_page_redirects_to_login() {
        for page in [
            Page::Cart,
            Page::Checkout,
            Page::Favorites,
            Page::History,
            Page::Notifications,
            Page::PaymentMethods,
            Page::Personal,
            Page::Security,
            Page::Profile,
            Page::AddItem,
            Page::AdminDashboard,
            Page::AdminUsers,
        ] {
            assert_eq!(
                resolve(page, &anonymous()),
                Resolution::Redirect(Page::Login),
                "{page:?}"
            );
        }
    }

    #[test]
    fn test_loading_profile_counts_as_signed_out() {
        assert_eq!(
            resolve(Page::Cart, &loading_profile()),
            Resolution::Redirect(Page::Login)
        );
    }

    #[test]
    fn test_signed_in_customer_bounces_off_auth_pages() {
        let session = signed_in(Role::Customer);
        assert_eq!(
            resolve(Page::Login, &session),
            Resolution::Redirect(Page::Home)
        );
        assert_eq!(
            resolve(Page::SignUp, &session),
            Resolution::Redirect(Page::Home)
        );
    }

    #[test]
    fn test_signed_in_admin_bounces_to_dashboard() {
        let session = signed_in(Role::Admin);
        assert_eq!(
            resolve(Page::Login, &session),
            Resolution::Redirect(Page::AdminDashboard)
        );
    }

    #[test]
    fn test_customer_sees_home_in_place_of_admin_pages() {
        let session = signed_in(Role::Customer);
        for page in [
            Page::AdminDashboard,
            Page::AdminInventory,
            Page::AdminOrders,
            Page::AdminUsers,
        ] {
            assert_eq!(resolve(page, &session), Resolution::Render(View::Home));
            // No navigation happens: the page stands, the view is home.
            assert_eq!(resolve_settled(page, &session), page);
            assert_eq!(view_for(page, &session), View::Home);
        }
    }

    #[test]
    fn test_customer_redirected_home_from_add_item() {
        assert_eq!(
            resolve(Page::AddItem, &signed_in(Role::Customer)),
            Resolution::Redirect(Page::Home)
        );
    }

    #[test]
    fn test_admin_reaches_console_and_add_item() {
        let session = signed_in(Role::Admin);
        assert_eq!(
            resolve(Page::AdminOrders, &session),
            Resolution::Render(View::AdminOrders)
        );
        assert_eq!(
            resolve(Page::AddItem, &session),
            Resolution::Render(View::AddItem)
        );
    }

    #[test]
    fn test_settling_follows_redirect_chains() {
        // Anonymous cart request: cart -> login, which renders.
        assert_eq!(resolve_settled(Page::Cart, &anonymous()), Page::Login);
        assert_eq!(view_for(Page::Cart, &anonymous()), View::Login);

        // Admin asking for signup: signup -> dashboard, which renders.
        assert_eq!(
            resolve_settled(Page::SignUp, &signed_in(Role::Admin)),
            Page::AdminDashboard
        );
    }

    #[test]
    fn test_customer_pages_render_for_customers() {
        let session = signed_in(Role::Customer);
        assert_eq!(view_for(Page::Cart, &session), View::Cart);
        assert_eq!(view_for(Page::Checkout, &session), View::Checkout);
        assert_eq!(view_for(Page::PaymentMethods, &session), View::PaymentMethods);
    }

    #[test]
    fn test_landing_by_role() {
        assert_eq!(Page::landing(&anonymous()), Page::Home);
        assert_eq!(Page::landing(&signed_in(Role::Customer)), Page::Home);
        assert_eq!(
            Page::landing(&signed_in(Role::Admin)),
            Page::AdminDashboard
        );
    }
}
