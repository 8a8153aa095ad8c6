//! Menu Catalog - 菜单查询（外部协作者）
//!
//! 订单核心只通过 [`MenuCatalog`] 读取菜单：加菜时快照名称/价格/站点，
//! 出品队列在查询时读取制作说明和图片。

use parking_lot::RwLock;
use shared::models::{MenuItem, MenuItemClass};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Menu-item lookup consumed by the order core
pub trait MenuCatalog: Send + Sync {
    fn get(&self, id: &str) -> Option<MenuItem>;
    fn list(&self) -> Vec<MenuItem>;
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("Failed to read menu file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid menu file: {0}")]
    Parse(#[from] serde_json::Error),
}

/// In-memory catalog
#[derive(Debug, Default)]
pub struct InMemoryMenuCatalog {
    items: RwLock<HashMap<String, MenuItem>>,
}

impl InMemoryMenuCatalog {
    pub fn new(items: impl IntoIterator<Item = MenuItem>) -> Self {
        Self {
            items: RwLock::new(items.into_iter().map(|m| (m.id.clone(), m)).collect()),
        }
    }

    /// Built-in demo menu (pizzas, pasta, desserts, drinks)
    pub fn with_demo_menu() -> Self {
        Self::new(demo_menu())
    }

    /// Load a JSON array of [`MenuItem`]
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let items: Vec<MenuItem> = serde_json::from_str(&content)?;
        Ok(Self::new(items))
    }

    /// Insert or replace a menu item
    pub fn upsert(&self, item: MenuItem) {
        self.items.write().insert(item.id.clone(), item);
    }

    /// Toggle availability, returns false when the item is unknown
    pub fn set_available(&self, id: &str, available: bool) -> bool {
        match self.items.write().get_mut(id) {
            Some(item) => {
                item.available = available;
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl MenuCatalog for InMemoryMenuCatalog {
    fn get(&self, id: &str) -> Option<MenuItem> {
        self.items.read().get(id).cloned()
    }

    /// Sorted by class, then name
    fn list(&self) -> Vec<MenuItem> {
        let mut items: Vec<MenuItem> = self.items.read().values().cloned().collect();
        items.sort_by(|a, b| {
            (a.class == MenuItemClass::Drink, &a.name).cmp(&(b.class == MenuItemClass::Drink, &b.name))
        });
        items
    }
}

fn menu_item(id: &str, name: &str, price_cents: i64, class: MenuItemClass, recipe: &str) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        price_cents,
        available: true,
        class,
        recipe_text: Some(recipe.to_string()),
        image_ref: None,
    }
}

/// 演示菜单
pub fn demo_menu() -> Vec<MenuItem> {
    use MenuItemClass::{Drink, Food};
    vec![
        menu_item("margherita", "Margherita", 900, Food, "Tomate, mozzarella, basilic"),
        menu_item("diavola", "Diavola", 1200, Food, "Tomate, mozzarella, salami piment"),
        menu_item("quattro-formaggi", "Quattro Formaggi", 1300, Food, "Mozzarella, gorgonzola, parmesan"),
        menu_item("carbonara", "Carbonara", 1400, Food, "Oeuf, guanciale, pecorino"),
        menu_item("bolognese", "Bolognese", 1350, Food, "Ragout de boeuf"),
        menu_item("tiramisu", "Tiramisu", 700, Food, "Cafe, mascarpone"),
        menu_item("panna-cotta", "Panna Cotta", 650, Food, "Vanille, coulis fruits rouges"),
        menu_item("coca-cola", "Coca-Cola", 300, Drink, "33cl"),
        menu_item("eau-plate", "Eau Plate", 200, Drink, "50cl"),
        menu_item("spritz", "Spritz", 850, Drink, "Aperol, prosecco"),
    ]
}
