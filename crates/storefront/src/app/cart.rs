//! Cart and favorites operations.

use super::App;
use crate::error::AppError;
use maison_core::ItemId;

impl App {
    /// Add an item to the cart.
    ///
    /// An existing line for the item gains one unit; otherwise a fresh line
    /// with quantity 1 is written. The cart is re-fetched either way.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] (after routing to login) when
    /// nobody is signed in, or the backend error from the write.
    pub async fn add_to_cart(&mut self, item_id: ItemId) -> Result<(), AppError> {
        let user = self.profile_id_or_login()?;
        let existing_qty = self
            .cart
            .iter()
            .find(|line| line.item.id == item_id)
            .map(|line| line.qty);

        match existing_qty {
            Some(qty) => self.data.set_cart_qty(user, item_id, qty + 1).await?,
            None => self.data.insert_cart_line(user, item_id, 1).await?,
        }
        self.refresh_cart().await;
        Ok(())
    }

    /// Set the quantity on a cart line. Quantities below 1 are a no-op, not
    /// a removal; deleting a line is its own action.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when nobody is signed in, or the
    /// backend error from the write.
    pub async fn update_cart_qty(&mut self, item_id: ItemId, qty: u32) -> Result<(), AppError> {
        let user = self.profile_id_or_login()?;
        if qty < 1 {
            return Ok(());
        }
        self.data.set_cart_qty(user, item_id, qty).await?;
        self.refresh_cart().await;
        Ok(())
    }

    /// Remove an item's line from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when nobody is signed in, or the
    /// backend error from the write.
    pub async fn remove_from_cart(&mut self, item_id: ItemId) -> Result<(), AppError> {
        let user = self.profile_id_or_login()?;
        self.data.delete_cart_line(user, item_id).await?;
        self.refresh_cart().await;
        Ok(())
    }

    /// Toggle an item's favorite flag: remove the mark if present, add it
    /// otherwise, then re-fetch favorites.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::SignInRequired`] when nobody is signed in, or the
    /// backend error from the write.
    pub async fn toggle_favorite(&mut self, item_id: ItemId) -> Result<(), AppError> {
        let user = self.profile_id_or_login()?;
        let is_favorite = self.favorites.iter().any(|fav| fav.item.id == item_id);

        if is_favorite {
            self.data.delete_favorite(user, item_id).await?;
        } else {
            self.data.insert_favorite(user, item_id).await?;
        }
        self.refresh_favorites().await;
        Ok(())
    }
}
