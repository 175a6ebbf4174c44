//! Reference-data index and the combined "restaurant orders" view.

use serde::Serialize;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tracing::{debug, warn};

use crate::analyzers::CategoryKey;
use crate::records::{Category, MenuItem, Order};

/// Menu items and categories indexed by id.
#[derive(Debug, Default)]
pub struct Catalog<'a> {
    items: HashMap<u64, &'a MenuItem>,
    categories: HashMap<u64, &'a Category>,
}

impl<'a> Catalog<'a> {
    /// Builds the index. When an id appears twice the first row wins.
    pub fn new(menu_items: &'a [MenuItem], categories: &'a [Category]) -> Self {
        let mut catalog = Catalog::default();

        for item in menu_items {
            if let Entry::Vacant(slot) = catalog.items.entry(item.item_id) {
                slot.insert(item);
            } else {
                warn!(item_id = item.item_id, "Duplicate menu item id, keeping first");
            }
        }

        for category in categories {
            if let Entry::Vacant(slot) = catalog.categories.entry(category.category_id) {
                slot.insert(category);
            } else {
                warn!(
                    category_id = category.category_id,
                    "Duplicate category id, keeping first"
                );
            }
        }

        catalog
    }

    pub fn item(&self, item_id: u64) -> Option<&'a MenuItem> {
        self.items.get(&item_id).copied()
    }

    pub fn category(&self, category_id: u64) -> Option<&'a Category> {
        self.categories.get(&category_id).copied()
    }

    /// Resolves one order against the menu. The category is looked up too but
    /// may be missing; only an unknown item leaves the order unresolved.
    pub fn resolve<'o>(&self, order: &'o Order) -> Option<OrderLine<'o>>
    where
        'a: 'o,
    {
        let item = self.item(order.item_id)?;
        let category = self.category(item.category_id);
        if category.is_none() {
            debug!(
                order_id = order.order_id,
                category_id = item.category_id,
                "Menu item references unknown category"
            );
        }
        Some(OrderLine {
            order,
            item,
            category,
        })
    }

    /// Joins every order with its menu item and category. Orders whose item
    /// cannot be found are left out and counted once each.
    pub fn join<'o>(&self, orders: &'o [Order]) -> Joined<'o>
    where
        'a: 'o,
    {
        let mut joined = Joined {
            lines: Vec::with_capacity(orders.len()),
            discarded: 0,
        };

        for order in orders {
            match self.resolve(order) {
                Some(line) => joined.lines.push(line),
                None => {
                    debug!(
                        order_id = order.order_id,
                        item_id = order.item_id,
                        "Order references unknown menu item"
                    );
                    joined.discarded += 1;
                }
            }
        }

        if joined.discarded > 0 {
            warn!(discarded = joined.discarded, "Orders with unresolved references");
        }

        joined
    }
}

/// An order line with its menu item resolved. `category` is `None` when the
/// item points at a category that is not in the catalog.
#[derive(Debug, Clone, Copy)]
pub struct OrderLine<'a> {
    pub order: &'a Order,
    pub item: &'a MenuItem,
    pub category: Option<&'a Category>,
}

impl OrderLine<'_> {
    /// price × quantity
    pub fn total(&self) -> f64 {
        self.item.price * f64::from(self.order.quantity)
    }

    pub fn category_key(&self) -> Option<CategoryKey> {
        self.category.map(|c| CategoryKey {
            id: c.category_id,
            name: c.category_name.clone(),
        })
    }

    /// Flattened row for CSV export.
    pub fn to_row(&self) -> CombinedRow {
        CombinedRow {
            order_id: self.order.order_id,
            customer_id: self.order.customer_id,
            order_placed: self.order.order_placed.format("%Y-%m-%d %H:%M:%S").to_string(),
            item_id: self.item.item_id,
            item_name: self.item.item_name.clone(),
            category_id: self.category.map(|c| c.category_id),
            category_name: self.category.map(|c| c.category_name.clone()),
            quantity: self.order.quantity,
            price: self.item.price,
            total: self.total(),
            payment_method: self.order.payment_method.clone(),
            order_status: self.order.order_status.to_string(),
            year_month: self.order.order_placed.format("%m-%Y").to_string(),
        }
    }
}

/// Output of [`Catalog::join`].
#[derive(Debug, Clone, Default)]
pub struct Joined<'a> {
    pub lines: Vec<OrderLine<'a>>,
    pub discarded: usize,
}

/// One row of the combined restaurant orders table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CombinedRow {
    pub order_id: u64,
    pub customer_id: u64,
    pub order_placed: String,
    pub item_id: u64,
    pub item_name: String,
    pub category_id: Option<u64>,
    pub category_name: Option<String>,
    pub quantity: u32,
    pub price: f64,
    pub total: f64,
    pub payment_method: String,
    pub order_status: String,
    pub year_month: String,
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use crate::records::{Feedback, OrderStatus};
    use chrono::NaiveDate;

    pub fn category(id: u64, name: &str) -> Category {
        Category {
            category_id: id,
            category_name: name.to_string(),
        }
    }

    pub fn item(id: u64, name: &str, price: f64, category_id: u64) -> MenuItem {
        MenuItem {
            item_id: id,
            item_name: name.to_string(),
            description: None,
            price,
            category_id,
            is_vegetarian: false,
            is_spicy: false,
            is_gluten_free: false,
        }
    }

    pub fn order(order_id: u64, item_id: u64, customer_id: u64, quantity: u32) -> Order {
        order_at(order_id, item_id, customer_id, quantity, (2023, 1, 15, 12))
    }

    pub fn order_at(
        order_id: u64,
        item_id: u64,
        customer_id: u64,
        quantity: u32,
        (y, m, d, h): (i32, u32, u32, u32),
    ) -> Order {
        Order {
            order_id,
            item_id,
            customer_id,
            quantity,
            special_request: None,
            subtotal: None,
            payment_method: "Card".to_string(),
            order_status: OrderStatus::Completed,
            order_placed: NaiveDate::from_ymd_opt(y, m, d)
                .unwrap()
                .and_hms_opt(h, 0, 0)
                .unwrap(),
        }
    }

    pub fn feedback(
        order_id: Option<u64>,
        item_id: u64,
        rating: Option<f64>,
        aspect: &str,
    ) -> Feedback {
        Feedback {
            order_id,
            customer_id: 1,
            item_id,
            comment: None,
            rating,
            aspect: (!aspect.is_empty()).then(|| aspect.to_string()),
            submitted_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_join_resolves_item_and_category() {
        let categories = vec![category(1, "Food")];
        let menu = vec![item(10, "Pizza", 10.0, 1)];
        let orders = vec![order(1, 10, 100, 2)];

        let catalog = Catalog::new(&menu, &categories);
        let joined = catalog.join(&orders);

        assert_eq!(joined.discarded, 0);
        assert_eq!(joined.lines.len(), 1);
        assert_eq!(joined.lines[0].category.unwrap().category_name, "Food");
        assert_eq!(joined.lines[0].total(), 20.0);
    }

    #[test]
    fn test_join_discards_unknown_item_once() {
        let categories = vec![category(1, "Food")];
        let menu = vec![item(10, "Pizza", 10.0, 1)];
        let orders = vec![order(1, 10, 100, 2), order(2, 99, 100, 1)];

        let joined = Catalog::new(&menu, &categories).join(&orders);

        assert_eq!(joined.lines.len(), 1);
        assert_eq!(joined.discarded, 1);
    }

    #[test]
    fn test_join_keeps_item_with_unknown_category() {
        let categories = vec![category(1, "Food")];
        let menu = vec![item(10, "Pizza", 10.0, 1), item(11, "Mystery", 3.0, 42)];
        let orders = vec![order(1, 11, 100, 2)];

        let joined = Catalog::new(&menu, &categories).join(&orders);

        assert_eq!(joined.discarded, 0);
        assert_eq!(joined.lines.len(), 1);
        assert!(joined.lines[0].category.is_none());
        assert!(joined.lines[0].category_key().is_none());
        assert_eq!(joined.lines[0].total(), 6.0);

        let row = joined.lines[0].to_row();
        assert_eq!(row.item_name, "Mystery");
        assert_eq!(row.category_name, None);
    }

    #[test]
    fn test_duplicate_ids_keep_first() {
        let categories = vec![category(1, "Food"), category(1, "Shadow")];
        let menu = vec![item(10, "Pizza", 10.0, 1), item(10, "Impostor", 99.0, 1)];
        let catalog = Catalog::new(&menu, &categories);

        assert_eq!(catalog.item(10).unwrap().item_name, "Pizza");
        assert_eq!(catalog.category(1).unwrap().category_name, "Food");
    }

    #[test]
    fn test_combined_row_year_month() {
        let categories = vec![category(1, "Food")];
        let menu = vec![item(10, "Pizza", 10.0, 1)];
        let orders = vec![order_at(5, 10, 7, 3, (2023, 3, 9, 19))];

        let joined = Catalog::new(&menu, &categories).join(&orders);
        let row = joined.lines[0].to_row();

        assert_eq!(row.year_month, "03-2023");
        assert_eq!(row.total, 30.0);
        assert_eq!(row.order_status, "Completed");
    }
}
