//! Input file locations.
//!
//! Paths default to the file names the datasets ship with, resolved against a
//! data directory. Each can be overridden from the environment (a `.env` file
//! is honoured by the binary):
//!
//! | Variable                      | Default                |
//! |-------------------------------|------------------------|
//! | `ORDER_ANALYTICS_DATA_DIR`    | `data`                 |
//! | `ORDER_ANALYTICS_CATEGORIES`  | `<dir>/categories.csv` |
//! | `ORDER_ANALYTICS_MENU`        | `<dir>/menu.csv`       |
//! | `ORDER_ANALYTICS_ORDERS`      | `<dir>/order_data.csv` |
//! | `ORDER_ANALYTICS_FEEDBACK`    | `<dir>/feedback_data.csv` |

use std::path::{Path, PathBuf};

pub const DEFAULT_DATA_DIR: &str = "data";
pub const DATA_DIR_VAR: &str = "ORDER_ANALYTICS_DATA_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataFiles {
    pub categories: PathBuf,
    pub menu: PathBuf,
    pub orders: PathBuf,
    pub feedback: PathBuf,
}

impl DataFiles {
    /// Standard file names inside `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            categories: dir.join("categories.csv"),
            menu: dir.join("menu.csv"),
            orders: dir.join("order_data.csv"),
            feedback: dir.join("feedback_data.csv"),
        }
    }

    /// Resolves paths from an explicit directory, falling back to
    /// `ORDER_ANALYTICS_DATA_DIR` and then [`DEFAULT_DATA_DIR`], and applies
    /// per-file environment overrides.
    pub fn resolve(dir: Option<&Path>) -> Self {
        Self::resolve_with(dir, |key| std::env::var(key).ok())
    }

    fn resolve_with(dir: Option<&Path>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let dir = dir
            .map(Path::to_path_buf)
            .or_else(|| lookup(DATA_DIR_VAR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));

        let mut files = Self::in_dir(&dir);
        let overrides = [
            ("ORDER_ANALYTICS_CATEGORIES", &mut files.categories),
            ("ORDER_ANALYTICS_MENU", &mut files.menu),
            ("ORDER_ANALYTICS_ORDERS", &mut files.orders),
            ("ORDER_ANALYTICS_FEEDBACK", &mut files.feedback),
        ];
        for (key, slot) in overrides {
            if let Some(path) = lookup(key) {
                *slot = PathBuf::from(path);
            }
        }
        files
    }
}

impl Default for DataFiles {
    fn default() -> Self {
        Self::in_dir(DEFAULT_DATA_DIR)
    }
}
