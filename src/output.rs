//! Output formatting and persistence for analytics reports.
//!
//! Supports plain-text tables with bar charts, JSON serialization, and CSV
//! export of the combined order lines.

use flate2::Compression;
use flate2::write::GzEncoder;
use serde::Serialize;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, info};

use crate::analyzers::insights::Share;
use crate::catalog::OrderLine;
use crate::error::Result;
use crate::report::Report;

const BAR_WIDTH: usize = 40;

/// Which chart [`render_chart`] draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Chart {
    /// Order lines per hour of the day.
    OrderingTimes,
    /// Revenue per month.
    MonthlySales,
    /// Share of order lines per category.
    Categories,
}

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &Report) {
    debug!("{:#?}", report);
}

/// Serializes any report section as pretty JSON.
pub fn to_json<T: Serialize>(value: &T) -> Result<String> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Writes a report section as pretty JSON followed by a newline.
pub fn print_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    writeln!(out, "{}", to_json(value)?)?;
    Ok(())
}

pub fn render_overall(out: &mut impl Write, report: &Report) -> io::Result<()> {
    let o = &report.overall;
    heading(out, "Overall Analytics")?;
    writeln!(out, "  {:<28} {}", "GMV", money0(o.gmv))?;
    writeln!(out, "  {:<28} {}", "Orders Placed", o.orders_placed)?;
    writeln!(out, "  {:<28} {}", "Unique Customers Served", o.unique_customers)?;
    writeln!(out, "  {:<28} {}", "Average Order Value", money2(o.average_order_value))?;
    writeln!(out, "  {:<28} {}", "Orders Completed", o.orders_completed)?;
    writeln!(out, "  {:<28} {}", "Orders Canceled", o.orders_canceled)?;
    writeln!(out)?;
    writeln!(
        out,
        "Your restaurant recorded {} in sales. There were a total of {} orders placed, \
         of which {} were fulfilled and {} were canceled.",
        money0(o.gmv),
        o.orders_placed,
        o.orders_completed,
        o.orders_canceled
    )?;

    if !report.top_categories.is_empty() {
        writeln!(out)?;
        writeln!(out, "  Top categories by revenue")?;
        for c in &report.top_categories {
            writeln!(
                out,
                "  {:>3}. {:<24} {:>8} items {:>12}",
                c.rank,
                c.name,
                c.quantity,
                money2(c.revenue)
            )?;
        }
    }

    if !report.top_items.is_empty() {
        writeln!(out)?;
        writeln!(out, "  Top items by quantity")?;
        for i in &report.top_items {
            writeln!(
                out,
                "  {:>3}. {:<24} {:>8} items {:>12}",
                i.rank,
                i.name,
                i.quantity,
                money2(i.revenue)
            )?;
        }
    }
    Ok(())
}

pub fn render_payments(out: &mut impl Write, report: &Report) -> io::Result<()> {
    heading(out, "Payment Trends")?;
    match report.payments.first() {
        Some(top) => writeln!(
            out,
            "The most preferred payment method used by your customers was {}, used in {} transactions.",
            top.label, top.count
        )?,
        None => writeln!(out, "No transactions recorded.")?,
    }
    writeln!(out)?;
    share_table(out, "Payment Method", &report.payments)
}

pub fn render_customers(out: &mut impl Write, report: &Report) -> io::Result<()> {
    let c = &report.customers;
    let h = &report.highlights;
    heading(out, "Customer Trends")?;
    writeln!(
        out,
        "Out of your {} unique customers, {} ordered more than twice, {} more than 5 times \
         and {} more than 10 times.",
        c.unique_customers, c.more_than_twice, c.more_than_five, c.more_than_ten
    )?;
    if let Some(mvc) = c.most_valuable {
        writeln!(
            out,
            "Your most valuable customer (#{}) ordered {} times.",
            mvc.customer_id, mvc.order_lines
        )?;
    }

    let facts = [
        ("Most ordered category", &h.most_ordered_category),
        ("Most ordered item", &h.most_ordered_item),
        ("Most loved item", &h.favorite_item),
        ("Most liked aspect", &h.most_liked_aspect),
        ("Top area to improve", &h.least_liked_aspect),
    ];
    writeln!(out)?;
    for (label, value) in facts {
        writeln!(out, "  {:<24} {}", label, value.as_deref().unwrap_or("n/a"))?;
    }

    if !report.top_rated_items.is_empty() {
        writeln!(out)?;
        writeln!(out, "  Best rated items")?;
        for r in &report.top_rated_items {
            writeln!(
                out,
                "  {:>3}. {:<24} {:>4.2} ({} ratings)",
                r.rank, r.name, r.mean, r.ratings
            )?;
        }
    }
    Ok(())
}

pub fn render_chart(out: &mut impl Write, report: &Report, chart: Chart) -> io::Result<()> {
    match chart {
        Chart::OrderingTimes => {
            heading(out, "Customer Ordering Times")?;
            let rows: Vec<(String, f64)> = report
                .hourly_orders
                .iter()
                .enumerate()
                .map(|(hour, n)| (format!("{hour:02}:00"), *n as f64))
                .collect();
            bar_chart(out, &rows, |v| format!("{v:.0}"))
        }
        Chart::MonthlySales => {
            heading(out, "Monthly Sales Volumes")?;
            let rows: Vec<(String, f64)> = report
                .monthly_sales
                .iter()
                .map(|p| (p.period.clone(), p.revenue))
                .collect();
            bar_chart(out, &rows, money2)
        }
        Chart::Categories => {
            heading(out, "Customer Ordering Behavior by Categories")?;
            let rows: Vec<(String, f64)> = report
                .categories
                .iter()
                .map(|s| (s.label.clone(), s.percent))
                .collect();
            bar_chart(out, &rows, |v| format!("{v:.1}%"))
        }
    }
}

pub fn render_data_quality(out: &mut impl Write, report: &Report) -> io::Result<()> {
    let q = &report.data_quality;
    if q.skipped_rows.total() == 0
        && q.discarded_orders == 0
        && q.uncategorized_lines == 0
        && q.discarded_feedback == 0
    {
        return Ok(());
    }
    heading(out, "Data Quality")?;
    writeln!(
        out,
        "  Skipped rows: categories {}, menu {}, orders {}, feedback {}",
        q.skipped_rows.categories, q.skipped_rows.menu, q.skipped_rows.orders, q.skipped_rows.feedback
    )?;
    writeln!(out, "  Orders with unknown items:   {}", q.discarded_orders)?;
    writeln!(out, "  Lines without a category:    {}", q.uncategorized_lines)?;
    writeln!(out, "  Ratings for unknown items:   {}", q.discarded_feedback)
}

/// Every section, one after the other.
pub fn render_text(out: &mut impl Write, report: &Report) -> io::Result<()> {
    render_overall(out, report)?;
    render_payments(out, report)?;
    render_customers(out, report)?;
    for chart in [Chart::OrderingTimes, Chart::MonthlySales, Chart::Categories] {
        render_chart(out, report, chart)?;
    }
    render_data_quality(out, report)
}

/// Writes the combined order lines to `path` as CSV, gzip-compressed when
/// `gzip` is set.
pub fn write_lines_csv(path: &Path, lines: &[OrderLine<'_>], gzip: bool) -> Result<()> {
    debug!(path = %path.display(), rows = lines.len(), gzip, "Exporting combined orders");

    let file = File::create(path)?;
    if gzip {
        let encoder = GzEncoder::new(file, Compression::default());
        let encoder = write_rows(encoder, lines)?;
        encoder.finish()?;
    } else {
        write_rows(file, lines)?;
    }

    info!(path = %path.display(), rows = lines.len(), "Combined orders exported");
    Ok(())
}

fn write_rows<W: Write>(sink: W, lines: &[OrderLine<'_>]) -> Result<W> {
    let mut writer = csv::Writer::from_writer(sink);
    for line in lines {
        writer.serialize(line.to_row()).map_err(io::Error::from)?;
    }
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| io::Error::other(e.to_string()).into())
}

fn heading(out: &mut impl Write, title: &str) -> io::Result<()> {
    writeln!(out)?;
    writeln!(out, "== {title} ==")?;
    writeln!(out)
}

fn share_table(out: &mut impl Write, label: &str, rows: &[Share]) -> io::Result<()> {
    writeln!(out, "  {:<20} {:>12} {:>8}", label, "Count", "Share")?;
    for s in rows {
        writeln!(out, "  {:<20} {:>12} {:>7.1}%", s.label, s.count, s.percent)?;
    }
    Ok(())
}

fn bar_chart(
    out: &mut impl Write,
    rows: &[(String, f64)],
    fmt_value: impl Fn(f64) -> String,
) -> io::Result<()> {
    if rows.is_empty() {
        return writeln!(out, "  (no data)");
    }
    let max = rows.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let label_width = rows.iter().map(|(l, _)| l.len()).max().unwrap_or(0);

    for (label, value) in rows {
        let filled = if max > 0.0 {
            ((value / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        writeln!(
            out,
            "  {:<lw$} | {:<bw$} {}",
            label,
            "#".repeat(filled),
            fmt_value(*value),
            lw = label_width,
            bw = BAR_WIDTH
        )?;
    }
    Ok(())
}

fn money0(v: f64) -> String {
    format!("$ {v:.0}")
}

fn money2(v: f64) -> String {
    format!("$ {v:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;
    use crate::catalog::fixtures::*;
    use crate::dataset::Dataset;
    use flate2::read::GzDecoder;
    use std::fs;
    use std::io::Read;

    fn sample_report() -> Report {
        let dataset = Dataset {
            categories: vec![category(1, "Food"), category(2, "Drink")],
            menu: vec![item(10, "Pizza", 10.0, 1), item(20, "Soda", 2.0, 2)],
            orders: vec![
                order_at(1, 10, 1, 2, (2023, 3, 1, 12)),
                order_at(2, 20, 2, 3, (2023, 4, 2, 19)),
            ],
            feedback: vec![feedback(None, 10, Some(5.0), "Food Quality")],
            ..Default::default()
        };
        Report::build(&dataset, 3)
    }

    fn rendered(f: impl Fn(&mut Vec<u8>) -> io::Result<()>) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&sample_report());
    }

    #[test]
    fn test_print_json_round_trips_fields() {
        let report = sample_report();
        let mut buf = Vec::new();
        print_json(&mut buf, &report).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["overall"]["gmv"], 26.0);
        assert_eq!(value["monthly_sales"][0]["period"], "03-2023");
        assert_eq!(value["hourly_orders"].as_array().unwrap().len(), 24);
    }

    #[test]
    fn test_render_overall() {
        let text = rendered(|out| render_overall(out, &sample_report()));
        assert!(text.contains("== Overall Analytics =="));
        assert!(text.contains("$ 26 in sales"));
        assert!(text.contains("$ 13.00"));
    }

    #[test]
    fn test_render_payments() {
        let text = rendered(|out| render_payments(out, &sample_report()));
        assert!(text.contains("was Card, used in 2 transactions"));
        assert!(text.contains("100.0%"));
    }

    #[test]
    fn test_render_customers_highlights() {
        let text = rendered(|out| render_customers(out, &sample_report()));
        assert!(text.contains("Most loved item"));
        assert!(text.contains("Pizza"));
        assert!(text.contains("n/a"));
    }

    #[test]
    fn test_render_chart_hours() {
        let text = rendered(|out| render_chart(out, &sample_report(), Chart::OrderingTimes));
        let bars: Vec<&str> = text.lines().filter(|l| l.contains(" | ")).collect();
        assert_eq!(bars.len(), 24);
        assert!(bars[12].contains(&"#".repeat(BAR_WIDTH)));
        assert!(!bars[3].contains('#'));
    }

    #[test]
    fn test_bar_chart_empty() {
        let text = rendered(|out| bar_chart(out, &[], |v| v.to_string()));
        assert!(text.contains("(no data)"));
    }

    #[test]
    fn test_data_quality_hidden_when_clean() {
        let text = rendered(|out| render_data_quality(out, &sample_report()));
        assert!(text.is_empty());
    }

    #[test]
    fn test_write_lines_csv_plain_and_gzip() {
        let categories = vec![category(1, "Food")];
        let menu = vec![item(10, "Pizza", 10.0, 1)];
        let orders = vec![order(1, 10, 1, 2), order(2, 10, 2, 1)];
        let joined = Catalog::new(&menu, &categories).join(&orders);
        let dir = tempfile::tempdir().unwrap();

        let plain = dir.path().join("orders.csv");
        write_lines_csv(&plain, &joined.lines, false).unwrap();
        let content = fs::read_to_string(&plain).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("order_id,customer_id"));

        let gz = dir.path().join("orders.csv.gz");
        write_lines_csv(&gz, &joined.lines, true).unwrap();
        let mut decoded = String::new();
        GzDecoder::new(File::open(&gz).unwrap())
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, content);
    }
}
