//! Session state: who is signed in and what the storefront knows about them.

use chrono::{DateTime, Utc};

use crate::backend::AuthSession;
use crate::backend::rows::ProfileRow;
use maison_core::{Email, ProfileId, Role};

/// Display name used when an account carries none of its own.
pub const DEFAULT_DISPLAY_NAME: &str = "New User";

/// A user's profile, resolved from its backend row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    pub id: ProfileId,
    pub display_name: String,
    /// Missing or malformed email columns read as `None` rather than failing
    /// the sign-in.
    pub email: Option<Email>,
    pub role: Role,
    pub created_at: Option<DateTime<Utc>>,
}

impl Profile {
    #[must_use]
    pub fn from_row(row: ProfileRow) -> Self {
        Self {
            id: ProfileId::new(row.id),
            display_name: row
                .display_name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_DISPLAY_NAME.to_string()),
            email: row.email.and_then(|e| Email::parse(&e).ok()),
            role: Role::from_row(row.role.as_deref(), row.is_seller),
            created_at: row.created_at,
        }
    }
}

/// Where the session currently stands.
///
/// `LoadingProfile` covers the window between token acceptance and the
/// profile row arriving; route resolution treats it like `Anonymous` so a
/// half-signed-in user never reaches a private page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Anonymous,
    LoadingProfile {
        user_id: ProfileId,
    },
    SignedIn {
        profile: Profile,
    },
}

impl SessionState {
    /// The signed-in profile, if the session has settled.
    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        match self {
            Self::SignedIn { profile } => Some(profile),
            Self::Anonymous | Self::LoadingProfile { .. } => None,
        }
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.profile().map(|profile| profile.role)
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role().is_some_and(|role| role.is_admin())
    }

    #[must_use]
    pub const fn is_signed_in(&self) -> bool {
        matches!(self, Self::SignedIn { .. })
    }
}

/// Auth lifecycle events delivered by the surrounding shell, e.g. a session
/// restored from disk at startup or an expiry notice.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    SignedIn(AuthSession),
    SignedOut,
}
