//! Account settings: stored cards, notifications, personal info, security.

use rand::Rng;
use rand::seq::IndexedRandom;

use super::App;
use crate::backend::rows::NewStoredCard;
use crate::error::AppError;
use crate::session::SessionState;
use maison_core::{Email, NotificationId, StoredCardId};

/// Brands the demo card generator draws from.
const CARD_BRANDS: [&str; 3] = ["Visa", "Mastercard", "Amex"];

impl App {
    /// Save a demo card: a random brand and last-four, display data only.
    /// The processor never sees it.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when nobody is signed in, or the
    /// backend error from the write.
    pub async fn add_stored_card(&mut self) -> Result<(), AppError> {
        let user = self.profile_id_or_login()?;

        let (brand, last4) = {
            let mut rng = rand::rng();
            let brand = CARD_BRANDS.choose(&mut rng).copied().unwrap_or("Visa");
            let last4: u16 = rng.random_range(1000..=9999);
            (brand.to_string(), last4.to_string())
        };

        self.loading = true;
        let result = self
            .data
            .insert_stored_card(&NewStoredCard {
                user_id: user.as_uuid(),
                brand,
                last4,
            })
            .await;
        if result.is_ok() {
            self.refresh_stored_cards().await;
        }
        self.loading = false;
        result.map_err(Into::into)
    }

    /// Remove a stored card record.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when nobody is signed in, or the
    /// backend error from the write.
    pub async fn remove_stored_card(&mut self, id: StoredCardId) -> Result<(), AppError> {
        self.profile_id_or_login()?;
        self.loading = true;
        let result = self.data.delete_stored_card(id).await;
        if result.is_ok() {
            self.refresh_stored_cards().await;
        }
        self.loading = false;
        result.map_err(Into::into)
    }

    /// Flag a notification as read and re-fetch the list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when nobody is signed in, or the
    /// backend error from the write.
    pub async fn mark_notification_read(&mut self, id: NotificationId) -> Result<(), AppError> {
        self.profile_id_or_login()?;
        self.data.mark_notification_read(id).await?;
        self.refresh_notifications().await;
        Ok(())
    }

    /// Update the profile's display name, locally and remotely.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when nobody is signed in, a
    /// validation error for a blank name, or the backend error.
    pub async fn update_display_name(&mut self, display_name: &str) -> Result<(), AppError> {
        let user = self.profile_id_or_login()?;
        let display_name = display_name.trim();
        if display_name.is_empty() {
            return Err(AppError::Validation("Display name is required".into()));
        }

        self.data.update_display_name(user, display_name).await?;
        if let SessionState::SignedIn { profile } = &mut self.session {
            profile.display_name = display_name.to_string();
        }
        Ok(())
    }

    /// Change the signed-in user's password.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when nobody is signed in, a
    /// validation error when the confirmation mismatches or the password is
    /// under six characters, or the auth error.
    pub async fn change_password(
        &mut self,
        new_password: &str,
        confirm_password: &str,
    ) -> Result<(), AppError> {
        self.profile_id_or_login()?;
        if new_password.chars().count() < 6 {
            return Err(AppError::Validation(
                "Password must be at least 6 characters".into(),
            ));
        }
        if new_password != confirm_password {
            return Err(AppError::Validation("New passwords do not match".into()));
        }
        let Some(token) = self.access_token.clone() else {
            return Err(AppError::SignInRequired);
        };
        self.auth.update_password(&token, new_password).await?;
        Ok(())
    }

    /// Email a password recovery link. Works signed out (the login page
    /// offers it).
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed email, or the auth error.
    pub async fn request_password_reset(&mut self, email: &str) -> Result<(), AppError> {
        let email = Email::normalize(email)
            .map_err(|_| AppError::Validation("Enter a valid email address".into()))?;
        self.auth.request_password_reset(&email).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{signed_in_app, test_app};
    use crate::error::AppError;
    use crate::router::Page;
    use maison_core::{Role, StoredCardId};

    #[tokio::test]
    async fn test_signed_out_card_save_routes_to_login() {
        let mut app = test_app();
        let err = app.add_stored_card().await;
        assert!(matches!(err, Err(AppError::SignInRequired)));
        assert_eq!(app.current_page(), Page::Login);
    }

    #[tokio::test]
    async fn test_password_change_requires_matching_confirmation() {
        let mut app = signed_in_app(Role::Customer);
        let err = app.change_password("plates123", "plates124").await;
        assert!(matches!(err, Err(AppError::Validation(_))));

        let err = app.change_password("short", "short").await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_blank_display_name_is_rejected() {
        let mut app = signed_in_app(Role::Customer);
        let err = app.update_display_name("  ").await;
        assert!(matches!(err, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_signed_out_card_removal_routes_to_login() {
        let mut app = test_app();
        let err = app.remove_stored_card(StoredCardId::new(1)).await;
        assert!(matches!(err, Err(AppError::SignInRequired)));
    }
}
