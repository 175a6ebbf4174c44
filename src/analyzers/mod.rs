//! Order aggregation and restaurant insights.
//!
//! The aggregator groups order lines and feedback by category, item, period or
//! any other key, producing [`Aggregation`] maps that carry a discard tally for
//! records that could not be resolved. Rankings and the headline business
//! metrics are computed on top of those maps.

pub mod aggregate;
pub mod insights;
pub mod rank;
pub mod types;
pub mod utility;

pub use aggregate::{
    FeedbackKey, Period, aggregate_by_category, aggregate_by_item, aggregate_by_period,
    aggregate_feedback, category_totals, count_by, grand_total, hourly_histogram, item_ratings,
};
pub use rank::{most_common, top_n, top_n_by};
pub use types::{
    Aggregation, CategoryKey, Count, ItemKey, Metric, RatingSummary, SalesTotals,
};
