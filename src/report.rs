//! The complete analytics report, ready for rendering or serialization.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::debug;

use crate::analyzers::insights::{
    CustomerActivity, Highlights, OverallMetrics, Share, category_trends, payment_trends,
};
use crate::analyzers::{
    Period, SalesTotals, aggregate_by_item, aggregate_by_period, category_totals, grand_total,
    hourly_histogram, item_ratings, top_n, top_n_by,
};
use crate::dataset::{Dataset, SkippedRows};

/// A ranked category or item with its sales.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSales {
    pub rank: usize,
    pub id: u64,
    pub name: String,
    pub lines: u64,
    pub quantity: u64,
    pub revenue: f64,
}

/// A ranked item with its mean rating.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRating {
    pub rank: usize,
    pub id: u64,
    pub name: String,
    pub ratings: u64,
    pub mean: f64,
}

/// Sales for one calendar month.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PeriodSales {
    pub period: String,
    pub start: NaiveDate,
    pub quantity: u64,
    pub revenue: f64,
}

/// Records that did not make it into the figures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct DataQuality {
    pub skipped_rows: SkippedRows,
    /// Orders whose menu item is unknown.
    pub discarded_orders: usize,
    /// Order lines left out of category figures because the item's category
    /// is unknown.
    pub uncategorized_lines: usize,
    /// Ratings for items missing from the menu.
    pub discarded_feedback: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub overall: OverallMetrics,
    pub totals: SalesTotals,
    pub customers: CustomerActivity,
    pub payments: Vec<Share>,
    pub categories: Vec<Share>,
    pub highlights: Highlights,
    pub top_categories: Vec<RankedSales>,
    pub top_items: Vec<RankedSales>,
    pub top_rated_items: Vec<RankedRating>,
    pub monthly_sales: Vec<PeriodSales>,
    pub hourly_orders: [u64; 24],
    pub data_quality: DataQuality,
}

impl Report {
    /// Runs every aggregation over `dataset`. `top` bounds each ranking.
    #[tracing::instrument(skip(dataset))]
    pub fn build(dataset: &Dataset, top: usize) -> Self {
        let catalog = dataset.catalog();
        let joined = catalog.join(&dataset.orders);
        let lines = &joined.lines;

        let ranked_sales = |ranked: Vec<(u64, String, SalesTotals)>| -> Vec<RankedSales> {
            ranked
                .into_iter()
                .enumerate()
                .map(|(i, (id, name, t))| RankedSales {
                    rank: i + 1,
                    id,
                    name,
                    lines: t.lines,
                    quantity: t.quantity,
                    revenue: t.revenue,
                })
                .collect()
        };

        let by_category = category_totals(lines);
        let top_categories = ranked_sales(
            top_n(&by_category, top)
                .into_iter()
                .map(|(k, t)| (k.id, k.name, t))
                .collect(),
        );

        let top_items = ranked_sales(
            top_n_by(&aggregate_by_item(lines), top, |t| t.quantity as f64)
                .into_iter()
                .map(|(k, t)| (k.id, k.name, t))
                .collect(),
        );

        let ratings = item_ratings(&dataset.feedback, &catalog);
        let top_rated_items = top_n(&ratings, top)
            .into_iter()
            .enumerate()
            .map(|(i, (k, s))| RankedRating {
                rank: i + 1,
                id: k.id,
                name: k.name,
                ratings: s.count,
                mean: s.mean,
            })
            .collect();

        let monthly_sales = aggregate_by_period(lines, Period::Month)
            .into_iter()
            .map(|(start, t)| PeriodSales {
                period: Period::Month.label(start),
                start,
                quantity: t.quantity,
                revenue: t.revenue,
            })
            .collect();

        let report = Self {
            generated_at: Utc::now(),
            overall: OverallMetrics::compute(&dataset.orders, lines),
            totals: grand_total(lines),
            customers: CustomerActivity::compute(&dataset.orders),
            payments: payment_trends(&dataset.orders),
            categories: category_trends(lines),
            highlights: Highlights::compute(lines, &dataset.feedback, &catalog),
            top_categories,
            top_items,
            top_rated_items,
            monthly_sales,
            hourly_orders: hourly_histogram(&dataset.orders),
            data_quality: DataQuality {
                skipped_rows: dataset.skipped,
                discarded_orders: joined.discarded,
                uncategorized_lines: by_category.discarded(),
                discarded_feedback: ratings.discarded(),
            },
        };

        debug!(
            lines = lines.len(),
            discarded_orders = joined.discarded,
            "Report built"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::fixtures::*;

    fn dataset() -> Dataset {
        let mut orders = vec![
            order_at(1, 10, 100, 2, (2023, 1, 5, 12)),
            order_at(1, 20, 100, 1, (2023, 1, 5, 12)),
            order_at(2, 20, 101, 6, (2023, 2, 1, 18)),
            order_at(3, 30, 102, 1, (2023, 2, 3, 19)),
            order_at(4, 99, 103, 1, (2023, 2, 3, 19)),
        ];
        orders[2].payment_method = "Cash".into();

        Dataset {
            categories: vec![category(1, "Food"), category(2, "Drink"), category(3, "Dessert")],
            menu: vec![
                item(10, "Pizza", 10.0, 1),
                item(20, "Soda", 2.0, 2),
                item(30, "Gelato", 4.5, 3),
            ],
            orders,
            feedback: vec![
                feedback(None, 10, Some(5.0), "Food Quality"),
                feedback(None, 20, Some(3.0), "Service"),
                feedback(None, 404, Some(1.0), "Service"),
            ],
            skipped: SkippedRows {
                orders: 2,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_report_rankings() {
        let report = Report::build(&dataset(), 2);

        assert_eq!(report.top_categories.len(), 2);
        assert_eq!(report.top_categories[0].name, "Food");
        assert_eq!(report.top_categories[0].revenue, 20.0);
        assert_eq!(report.top_categories[1].name, "Drink");
        assert_eq!(report.top_categories[1].rank, 2);

        assert_eq!(report.top_items[0].name, "Soda");
        assert_eq!(report.top_items[0].quantity, 7);

        assert_eq!(report.top_rated_items[0].name, "Pizza");
        assert_eq!(report.top_rated_items[0].mean, 5.0);
    }

    #[test]
    fn test_report_totals_and_quality() {
        let report = Report::build(&dataset(), 5);

        assert_eq!(report.totals.quantity, 10);
        assert_eq!(report.totals.revenue, 20.0 + 2.0 + 12.0 + 4.5);
        assert_eq!(report.overall.gmv, report.totals.revenue);
        assert_eq!(report.data_quality.discarded_orders, 1);
        assert_eq!(report.data_quality.discarded_feedback, 1);
        assert_eq!(report.data_quality.skipped_rows.orders, 2);
    }

    #[test]
    fn test_report_keeps_uncategorized_lines_in_sales() {
        let mut dataset = dataset();
        dataset.menu.push(item(40, "Chef Special", 8.0, 42));
        dataset.orders.push(order_at(5, 40, 104, 1, (2023, 2, 4, 20)));

        let report = Report::build(&dataset, 5);

        assert_eq!(report.totals.revenue, 20.0 + 2.0 + 12.0 + 4.5 + 8.0);
        assert_eq!(report.overall.gmv, report.totals.revenue);
        assert!(report.top_items.iter().any(|i| i.name == "Chef Special"));
        assert_eq!(report.top_categories.len(), 3);
        assert_eq!(report.data_quality.discarded_orders, 1);
        assert_eq!(report.data_quality.uncategorized_lines, 1);
    }

    #[test]
    fn test_report_monthly_and_hourly() {
        let report = Report::build(&dataset(), 5);

        let periods: Vec<&str> = report.monthly_sales.iter().map(|p| p.period.as_str()).collect();
        assert_eq!(periods, vec!["01-2023", "02-2023"]);
        assert_eq!(report.monthly_sales[0].revenue, 22.0);

        assert_eq!(report.hourly_orders[12], 2);
        assert_eq!(report.hourly_orders[19], 2);
        assert_eq!(report.hourly_orders.iter().sum::<u64>(), 5);
    }

    #[test]
    fn test_report_on_empty_dataset() {
        let report = Report::build(&Dataset::default(), 5);

        assert!(report.top_categories.is_empty());
        assert!(report.monthly_sales.is_empty());
        assert!(report.payments.is_empty());
        assert_eq!(report.overall.orders_placed, 0);
        assert!(report.highlights.most_ordered_item.is_none());
    }
}
