//! Menu Item Model
//!
//! The menu is owned by the catalog collaborator; the order core only reads it.

use serde::{Deserialize, Serialize};

/// Menu item class, decides which preparation station gets the ticket
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MenuItemClass {
    #[default]
    Food,
    Drink,
}

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    /// Price in cents
    pub price_cents: i64,
    pub available: bool,
    pub class: MenuItemClass,
    /// Preparation notes shown on the station screen
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
}
