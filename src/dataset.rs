//! All four tables loaded together.

use serde::Serialize;
use tracing::info;

use crate::catalog::Catalog;
use crate::config::DataFiles;
use crate::error::Result;
use crate::parser::{load_categories, load_feedback, load_menu, load_orders};
use crate::records::{Category, Feedback, MenuItem, Order};

/// Rows rejected at load time, per file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SkippedRows {
    pub categories: usize,
    pub menu: usize,
    pub orders: usize,
    pub feedback: usize,
}

impl SkippedRows {
    pub fn total(&self) -> usize {
        self.categories + self.menu + self.orders + self.feedback
    }
}

#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub categories: Vec<Category>,
    pub menu: Vec<MenuItem>,
    pub orders: Vec<Order>,
    pub feedback: Vec<Feedback>,
    pub skipped: SkippedRows,
}

impl Dataset {
    /// Loads every table. Any missing file aborts the whole load.
    pub fn load(files: &DataFiles) -> Result<Self> {
        let categories = load_categories(&files.categories)?;
        let menu = load_menu(&files.menu)?;
        let orders = load_orders(&files.orders)?;
        let feedback = load_feedback(&files.feedback)?;

        let dataset = Self {
            skipped: SkippedRows {
                categories: categories.skipped,
                menu: menu.skipped,
                orders: orders.skipped,
                feedback: feedback.skipped,
            },
            categories: categories.records,
            menu: menu.records,
            orders: orders.records,
            feedback: feedback.records,
        };

        info!(
            categories = dataset.categories.len(),
            menu_items = dataset.menu.len(),
            orders = dataset.orders.len(),
            feedback = dataset.feedback.len(),
            skipped = dataset.skipped.total(),
            "Dataset loaded"
        );

        Ok(dataset)
    }

    pub fn catalog(&self) -> Catalog<'_> {
        Catalog::new(&self.menu, &self.categories)
    }
}
