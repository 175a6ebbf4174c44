//! Typed rows for the restaurant tables.
//!
//! Each struct mirrors one CSV file. Column headers are lower-cased by the
//! parser before deserialization, so `Customer_ID` and `customer_id` both map
//! to the same field.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A menu category (`categories.csv`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Category {
    pub category_id: u64,
    pub category_name: String,
}

/// A menu entry (`menu.csv`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MenuItem {
    pub item_id: u64,
    pub item_name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: f64,
    pub category_id: u64,
    #[serde(default, deserialize_with = "coerce::flag")]
    pub is_vegetarian: bool,
    #[serde(default, deserialize_with = "coerce::flag")]
    pub is_spicy: bool,
    #[serde(default, deserialize_with = "coerce::flag")]
    pub is_gluten_free: bool,
}

/// One line of a customer transaction (`order_data.csv`).
///
/// A transaction with several dishes shows up as several lines sharing the
/// same `order_id`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Order {
    pub order_id: u64,
    pub item_id: u64,
    pub customer_id: u64,
    pub quantity: u32,
    #[serde(default)]
    pub special_request: Option<String>,
    #[serde(default)]
    pub subtotal: Option<f64>,
    pub payment_method: String,
    pub order_status: OrderStatus,
    #[serde(deserialize_with = "coerce::timestamp")]
    pub order_placed: NaiveDateTime,
}

/// A customer review (`feedback_data.csv`).
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Feedback {
    #[serde(default)]
    pub order_id: Option<u64>,
    pub customer_id: u64,
    pub item_id: u64,
    #[serde(default, rename = "feedback_text")]
    pub comment: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default, rename = "feedback_category")]
    pub aspect: Option<String>,
    #[serde(
        default,
        rename = "submission_timestamp",
        deserialize_with = "coerce::optional_timestamp"
    )]
    pub submitted_at: Option<NaiveDateTime>,
}

/// Fulfilment state of an order line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
pub enum OrderStatus {
    Completed,
    InProgress,
    Cancelled,
    Other(String),
}

impl OrderStatus {
    /// Completed and in-progress orders both count as fulfilled.
    pub fn is_fulfilled(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::InProgress)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, OrderStatus::Cancelled)
    }
}

impl From<String> for OrderStatus {
    fn from(raw: String) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "completed" => OrderStatus::Completed,
            "in progress" | "in_progress" | "inprogress" => OrderStatus::InProgress,
            "cancelled" | "canceled" => OrderStatus::Cancelled,
            _ => OrderStatus::Other(raw.trim().to_string()),
        }
    }
}

impl From<OrderStatus> for String {
    fn from(status: OrderStatus) -> Self {
        status.to_string()
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderStatus::Completed => f.write_str("Completed"),
            OrderStatus::InProgress => f.write_str("In Progress"),
            OrderStatus::Cancelled => f.write_str("Cancelled"),
            OrderStatus::Other(s) => f.write_str(s),
        }
    }
}

/// Row-level checks that serde's type coercion cannot express.
pub trait Validate {
    /// Returns a reason when the row must be rejected.
    fn validate(&self) -> Option<String>;
}

impl Validate for Category {
    fn validate(&self) -> Option<String> {
        if self.category_name.trim().is_empty() {
            return Some("empty category_name".into());
        }
        None
    }
}

impl Validate for MenuItem {
    fn validate(&self) -> Option<String> {
        if !self.price.is_finite() || self.price < 0.0 {
            return Some(format!("invalid price {}", self.price));
        }
        None
    }
}

impl Validate for Order {
    fn validate(&self) -> Option<String> {
        match self.subtotal {
            Some(s) if !s.is_finite() || s < 0.0 => Some(format!("invalid subtotal {s}")),
            _ => None,
        }
    }
}

impl Validate for Feedback {
    fn validate(&self) -> Option<String> {
        match self.rating {
            Some(r) if !r.is_finite() || !(0.0..=5.0).contains(&r) => {
                Some(format!("rating {r} outside 0..=5"))
            }
            _ => None,
        }
    }
}

/// Lenient deserializers for the loosely typed source columns.
mod coerce {
    use chrono::{DateTime, NaiveDate, NaiveDateTime};
    use serde::de::{self, Deserialize, Deserializer};

    const DATETIME_FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%d %H:%M",
        "%m/%d/%Y %H:%M:%S",
        "%m/%d/%Y %H:%M",
    ];

    pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.naive_utc());
        }
        for fmt in DATETIME_FORMATS {
            if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(dt);
            }
        }
        ["%Y-%m-%d", "%m/%d/%Y"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    pub fn parse_flag(raw: &str) -> Option<bool> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "0" | "" => Some(false),
            _ => None,
        }
    }

    pub fn timestamp<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognised timestamp '{raw}'")))
    }

    pub fn optional_timestamp<'de, D>(deserializer: D) -> Result<Option<NaiveDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        parse_timestamp(&raw)
            .map(Some)
            .ok_or_else(|| de::Error::custom(format!("unrecognised timestamp '{raw}'")))
    }

    pub fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        parse_flag(&raw).ok_or_else(|| de::Error::custom(format!("not a boolean: '{raw}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Timelike};

    #[test]
    fn test_order_status_from_source_labels() {
        assert_eq!(OrderStatus::from("Completed".to_string()), OrderStatus::Completed);
        assert_eq!(OrderStatus::from("In Progress".to_string()), OrderStatus::InProgress);
        assert_eq!(OrderStatus::from("canceled".to_string()), OrderStatus::Cancelled);
        assert_eq!(
            OrderStatus::from(" Refunded ".to_string()),
            OrderStatus::Other("Refunded".into())
        );
    }

    #[test]
    fn test_order_status_fulfilment() {
        assert!(OrderStatus::Completed.is_fulfilled());
        assert!(OrderStatus::InProgress.is_fulfilled());
        assert!(!OrderStatus::Cancelled.is_fulfilled());
        assert!(OrderStatus::Cancelled.is_cancelled());
    }

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 4, 9)
            .unwrap()
            .and_hms_opt(18, 30, 0)
            .unwrap();
        assert_eq!(coerce::parse_timestamp("2023-04-09 18:30:00"), Some(expected));
        assert_eq!(coerce::parse_timestamp("2023-04-09 18:30"), Some(expected));
        assert_eq!(coerce::parse_timestamp("04/09/2023 18:30"), Some(expected));
        assert_eq!(coerce::parse_timestamp("2023-04-09T18:30:00Z"), Some(expected));
        assert_eq!(
            coerce::parse_timestamp("2023-04-09").map(|t| t.hour()),
            Some(0)
        );
        assert_eq!(coerce::parse_timestamp("last tuesday"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(coerce::parse_flag("True"), Some(true));
        assert_eq!(coerce::parse_flag("FALSE"), Some(false));
        assert_eq!(coerce::parse_flag("1"), Some(true));
        assert_eq!(coerce::parse_flag("maybe"), None);
    }

    #[test]
    fn test_validate_rejects_negative_price() {
        let item = MenuItem {
            item_id: 1,
            item_name: "Soup".into(),
            description: None,
            price: -1.0,
            category_id: 1,
            is_vegetarian: false,
            is_spicy: false,
            is_gluten_free: false,
        };
        assert!(item.validate().is_some());
    }

    #[test]
    fn test_validate_rating_range() {
        let mut fb = Feedback {
            order_id: None,
            customer_id: 1,
            item_id: 1,
            comment: None,
            rating: Some(5.0),
            aspect: Some("Service".into()),
            submitted_at: None,
        };
        assert!(fb.validate().is_none());
        fb.rating = Some(7.5);
        assert!(fb.validate().is_some());
        fb.rating = None;
        assert!(fb.validate().is_none());
    }
}
