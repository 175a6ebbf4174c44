use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::analyzers::types::{
    Aggregation, CategoryKey, Count, ItemKey, RatingSummary, SalesTotals,
};
use crate::catalog::{Catalog, OrderLine};
use crate::records::{Category, Feedback, MenuItem, Order};

/// Groups orders by their item's category and sums quantity and
/// price × quantity.
///
/// Orders whose item (or the item's category) is unknown are left out and
/// each adds one to the discard tally.
pub fn aggregate_by_category(
    orders: &[Order],
    menu_items: &[MenuItem],
    categories: &[Category],
) -> Aggregation<CategoryKey, SalesTotals> {
    let joined = Catalog::new(menu_items, categories).join(orders);
    let mut agg = category_totals(&joined.lines);
    agg.add_discarded(joined.discarded);
    agg
}

/// Per-category totals over already joined lines. Lines whose item has no
/// known category are discarded and tallied.
pub fn category_totals(lines: &[OrderLine<'_>]) -> Aggregation<CategoryKey, SalesTotals> {
    let mut agg = Aggregation::<_, SalesTotals>::new();
    for line in lines {
        match line.category_key() {
            Some(key) => agg.group_mut(key).add(line),
            None => agg.discard(),
        }
    }
    agg
}

/// Per-item totals over joined lines.
pub fn aggregate_by_item(lines: &[OrderLine<'_>]) -> Aggregation<ItemKey, SalesTotals> {
    let mut agg = Aggregation::<_, SalesTotals>::new();
    for line in lines {
        let key = ItemKey {
            id: line.item.item_id,
            name: line.item.item_name.clone(),
        };
        agg.group_mut(key).add(line);
    }
    agg
}

/// Calendar bucket for time-based aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Month,
}

impl Period {
    /// First day of the bucket containing `ts`.
    pub fn start_of(self, ts: NaiveDateTime) -> NaiveDate {
        let date = ts.date();
        match self {
            Period::Day => date,
            Period::Month => date.with_day(1).unwrap_or(date),
        }
    }

    /// Display label for a bucket start: `YYYY-MM-DD` or `MM-YYYY`.
    pub fn label(self, start: NaiveDate) -> String {
        match self {
            Period::Day => start.format("%Y-%m-%d").to_string(),
            Period::Month => start.format("%m-%Y").to_string(),
        }
    }
}

/// Sales totals per day or month, keyed by the first day of the bucket so that
/// keys sort chronologically.
pub fn aggregate_by_period(
    lines: &[OrderLine<'_>],
    period: Period,
) -> Aggregation<NaiveDate, SalesTotals> {
    let mut agg = Aggregation::<_, SalesTotals>::new();
    for line in lines {
        agg.group_mut(period.start_of(line.order.order_placed))
            .add(line);
    }
    agg
}

/// Which reference a feedback row is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackKey {
    Order,
    Item,
}

/// Mean rating per order or per item.
///
/// Rows without a rating are ignored. When grouping by order, rows that carry
/// no order reference are discarded and tallied.
pub fn aggregate_feedback(
    feedback: &[Feedback],
    key: FeedbackKey,
) -> Aggregation<u64, RatingSummary> {
    let mut agg = Aggregation::<_, RatingSummary>::new();
    for fb in feedback {
        let Some(rating) = fb.rating else {
            continue;
        };
        let group = match key {
            FeedbackKey::Order => fb.order_id,
            FeedbackKey::Item => Some(fb.item_id),
        };
        match group {
            Some(id) => agg.group_mut(id).push(rating),
            None => agg.discard(),
        }
    }
    agg
}

/// Mean rating per menu item, with item names resolved through `catalog`.
/// Ratings for items missing from the menu are discarded and tallied.
pub fn item_ratings(
    feedback: &[Feedback],
    catalog: &Catalog<'_>,
) -> Aggregation<ItemKey, RatingSummary> {
    let mut agg = Aggregation::<_, RatingSummary>::new();
    for fb in feedback {
        let Some(rating) = fb.rating else {
            continue;
        };
        match catalog.item(fb.item_id) {
            Some(item) => agg
                .group_mut(ItemKey {
                    id: item.item_id,
                    name: item.item_name.clone(),
                })
                .push(rating),
            None => agg.discard(),
        }
    }
    agg
}

/// Occurrence count of each key, like a value count over one column.
pub fn count_by<'a, T, K, I, F>(records: I, key: F) -> Aggregation<K, Count>
where
    T: 'a,
    K: Ord,
    I: IntoIterator<Item = &'a T>,
    F: Fn(&T) -> K,
{
    let mut agg = Aggregation::<K, Count>::new();
    for record in records {
        agg.group_mut(key(record)).increment();
    }
    agg
}

/// Quantity and revenue over every joined line.
pub fn grand_total(lines: &[OrderLine<'_>]) -> SalesTotals {
    let mut total = SalesTotals::default();
    for line in lines {
        total.add(line);
    }
    total
}

/// Number of order lines placed in each hour of the day.
pub fn hourly_histogram<'a>(orders: impl IntoIterator<Item = &'a Order>) -> [u64; 24] {
    let mut bins = [0u64; 24];
    for order in orders {
        bins[order.order_placed.hour() as usize] += 1;
    }
    bins
}
