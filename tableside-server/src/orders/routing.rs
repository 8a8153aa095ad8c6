//! Station router
//!
//! The only place the menu taxonomy meets the preparation floor: a new station
//! class only needs a new arm here.

use shared::models::{MenuItemClass, Station};

/// DRINK → BAR, everything else → KITCHEN
pub fn route_station(class: MenuItemClass) -> Station {
    match class {
        MenuItemClass::Drink => Station::Bar,
        MenuItemClass::Food => Station::Kitchen,
    }
}
