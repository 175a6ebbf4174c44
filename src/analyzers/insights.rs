//! Business metrics built on top of the aggregator.

use serde::Serialize;
use std::collections::HashSet;
use std::fmt::Display;

use crate::analyzers::aggregate::count_by;
use crate::analyzers::rank::{most_common, top_n};
use crate::analyzers::types::{Aggregation, CategoryKey, Count, ItemKey};
use crate::analyzers::utility::{mean, pct};
use crate::catalog::{Catalog, OrderLine};
use crate::records::{Feedback, Order};

const TOP_RATING: f64 = 5.0;
const LOW_RATING: f64 = 2.0;

/// Headline numbers for the whole dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverallMetrics {
    /// Gross merchandise value: Σ price × quantity over resolved lines.
    pub gmv: f64,
    /// Mean price × quantity per resolved line.
    pub average_order_value: f64,
    pub orders_placed: usize,
    pub orders_completed: usize,
    pub orders_canceled: usize,
    pub unique_customers: usize,
}

impl OverallMetrics {
    /// Order counts are distinct order ids over every order row; money figures
    /// only cover lines whose item price is known.
    pub fn compute(orders: &[Order], lines: &[OrderLine<'_>]) -> Self {
        let totals: Vec<f64> = lines.iter().map(OrderLine::total).collect();

        let distinct = |pred: &dyn Fn(&Order) -> bool| {
            orders
                .iter()
                .filter(|o| pred(*o))
                .map(|o| o.order_id)
                .collect::<HashSet<_>>()
                .len()
        };

        Self {
            gmv: totals.iter().sum(),
            average_order_value: mean(&totals),
            orders_placed: distinct(&|_| true),
            orders_completed: distinct(&|o| o.order_status.is_fulfilled()),
            orders_canceled: distinct(&|o| o.order_status.is_cancelled()),
            unique_customers: orders
                .iter()
                .map(|o| o.customer_id)
                .collect::<HashSet<_>>()
                .len(),
        }
    }
}

/// The customer with the most order lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TopCustomer {
    pub customer_id: u64,
    pub order_lines: u64,
}

/// Repeat-customer statistics, counted over order lines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomerActivity {
    pub unique_customers: usize,
    pub more_than_twice: usize,
    pub more_than_five: usize,
    pub more_than_ten: usize,
    pub most_valuable: Option<TopCustomer>,
}

impl CustomerActivity {
    pub fn compute(orders: &[Order]) -> Self {
        let per_customer = count_by(orders, |o| o.customer_id);
        let above = |n: u64| per_customer.values().filter(|c| c.0 > n).count();

        Self {
            unique_customers: per_customer.len(),
            more_than_twice: above(2),
            more_than_five: above(5),
            more_than_ten: above(10),
            most_valuable: most_common(&per_customer).map(|(customer_id, count)| TopCustomer {
                customer_id,
                order_lines: count.0,
            }),
        }
    }
}

/// One slice of a breakdown: a label, its count and its share of the total.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Share {
    pub label: String,
    pub count: u64,
    pub percent: f64,
}

/// Every group of a count aggregation as a share, largest first.
pub fn shares<K>(agg: &Aggregation<K, Count>) -> Vec<Share>
where
    K: Ord + Clone + Display,
{
    let total: u64 = agg.values().map(|c| c.0).sum();
    top_n(agg, agg.len())
        .into_iter()
        .map(|(label, count)| Share {
            label: label.to_string(),
            count: count.0,
            percent: pct(count.0, total),
        })
        .collect()
}

/// Transactions per payment method. Rows with a blank method are not counted.
pub fn payment_trends(orders: &[Order]) -> Vec<Share> {
    shares(&count_by(
        orders.iter().filter(|o| !o.payment_method.is_empty()),
        |o| o.payment_method.clone(),
    ))
}

/// Order lines per category. Lines without a known category are left out.
pub fn category_trends(lines: &[OrderLine<'_>]) -> Vec<Share> {
    shares(&category_counts(lines))
}

/// Single-answer insights: what sells most and what customers talk about.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Highlights {
    pub most_ordered_item: Option<String>,
    pub most_ordered_category: Option<String>,
    /// Item with the most top ratings.
    pub favorite_item: Option<String>,
    /// Feedback aspect with the most top ratings.
    pub most_liked_aspect: Option<String>,
    /// Feedback aspect with the most ratings below 2.
    pub least_liked_aspect: Option<String>,
}

impl Highlights {
    pub fn compute(lines: &[OrderLine<'_>], feedback: &[Feedback], catalog: &Catalog<'_>) -> Self {
        let loved = || feedback.iter().filter(|f| f.rating == Some(TOP_RATING));
        let disliked = feedback
            .iter()
            .filter(|f| f.rating.is_some_and(|r| r < LOW_RATING));

        let loved_items = count_by(
            loved().filter_map(|f| catalog.item(f.item_id)),
            |item| ItemKey {
                id: item.item_id,
                name: item.item_name.clone(),
            },
        );

        Self {
            most_ordered_item: label_of(&count_by(lines, item_key)),
            most_ordered_category: label_of(&category_counts(lines)),
            favorite_item: label_of(&loved_items),
            most_liked_aspect: label_of(&count_by(
                loved().filter_map(|f| f.aspect.as_ref()),
                String::clone,
            )),
            least_liked_aspect: label_of(&count_by(
                disliked.filter_map(|f| f.aspect.as_ref()),
                String::clone,
            )),
        }
    }
}

fn label_of<K: Ord + Clone + Display>(agg: &Aggregation<K, Count>) -> Option<String> {
    most_common(agg).map(|(k, _)| k.to_string())
}

fn item_key(line: &OrderLine<'_>) -> ItemKey {
    ItemKey {
        id: line.item.item_id,
        name: line.item.item_name.clone(),
    }
}

fn category_counts(lines: &[OrderLine<'_>]) -> Aggregation<CategoryKey, Count> {
    let mut agg = Aggregation::<_, Count>::new();
    for line in lines {
        match line.category_key() {
            Some(key) => agg.group_mut(key).increment(),
            None => agg.discard(),
        }
    }
    agg
}
