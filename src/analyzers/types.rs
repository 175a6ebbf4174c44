//! Data types used by the aggregation pipeline.

use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::btree_map;
use std::fmt;

use crate::catalog::OrderLine;

/// A numeric summary that can be ranked.
pub trait Metric {
    /// The value [`top_n`](crate::analyzers::rank::top_n) sorts by.
    fn metric(&self) -> f64;
}

/// Grouping key → summary, plus the number of input records that could not be
/// assigned to any group.
///
/// Keys are kept in a `BTreeMap`, so iteration order and every tie-break that
/// relies on it are deterministic.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation<K: Ord, V> {
    groups: BTreeMap<K, V>,
    discarded: usize,
}

impl<K: Ord, V> Default for Aggregation<K, V> {
    fn default() -> Self {
        Self {
            groups: BTreeMap::new(),
            discarded: 0,
        }
    }
}

impl<K: Ord, V> Aggregation<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the summary for `key`, creating an empty one on first use.
    pub fn group_mut(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.groups.entry(key).or_default()
    }

    /// Records one input that had no resolvable key.
    pub fn discard(&mut self) {
        self.discarded += 1;
    }

    pub(crate) fn add_discarded(&mut self, n: usize) {
        self.discarded += n;
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        self.groups.get(key)
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Discard tally.
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn iter(&self) -> btree_map::Iter<'_, K, V> {
        self.groups.iter()
    }

    pub fn keys(&self) -> btree_map::Keys<'_, K, V> {
        self.groups.keys()
    }

    pub fn values(&self) -> btree_map::Values<'_, K, V> {
        self.groups.values()
    }
}

impl<'a, K: Ord, V> IntoIterator for &'a Aggregation<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = btree_map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.iter()
    }
}

impl<K: Ord, V> IntoIterator for Aggregation<K, V> {
    type Item = (K, V);
    type IntoIter = btree_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Category grouping key. Ordered by id first, so rankings tie-break on the
/// category identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CategoryKey {
    pub id: u64,
    pub name: String,
}

impl fmt::Display for CategoryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Menu item grouping key, ordered by item id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ItemKey {
    pub id: u64,
    pub name: String,
}

impl fmt::Display for ItemKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Quantity and revenue summed over order lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SalesTotals {
    pub lines: u64,
    pub quantity: u64,
    pub revenue: f64,
}

impl SalesTotals {
    pub fn add(&mut self, line: &OrderLine<'_>) {
        self.lines += 1;
        self.quantity += u64::from(line.order.quantity);
        self.revenue += line.total();
    }

    pub fn merge(&mut self, other: &SalesTotals) {
        self.lines += other.lines;
        self.quantity += other.quantity;
        self.revenue += other.revenue;
    }
}

impl Metric for SalesTotals {
    fn metric(&self) -> f64 {
        self.revenue
    }
}

/// Running mean of ratings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RatingSummary {
    pub count: u64,
    pub total: f64,
    pub mean: f64,
}

impl RatingSummary {
    pub fn push(&mut self, rating: f64) {
        self.count += 1;
        self.total += rating;
        self.mean = self.total / self.count as f64;
    }
}

impl Metric for RatingSummary {
    fn metric(&self) -> f64 {
        self.mean
    }
}

/// Occurrence count, the equivalent of a value count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Count(pub u64);

impl Count {
    pub fn increment(&mut self) {
        self.0 += 1;
    }
}

impl Metric for Count {
    fn metric(&self) -> f64 {
        self.0 as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_summary_mean() {
        let mut s = RatingSummary::default();
        s.push(4.0);
        s.push(2.0);
        assert_eq!(s.count, 2);
        assert_eq!(s.mean, 3.0);
    }

    #[test]
    fn test_category_key_orders_by_id() {
        let drink = CategoryKey { id: 2, name: "Drink".into() };
        let food = CategoryKey { id: 1, name: "Food".into() };
        assert!(food < drink);
    }

    #[test]
    fn test_group_mut_creates_default() {
        let mut agg: Aggregation<&str, Count> = Aggregation::new();
        agg.group_mut("a").increment();
        agg.group_mut("a").increment();
        agg.discard();

        assert_eq!(agg.get(&"a"), Some(&Count(2)));
        assert_eq!(agg.len(), 1);
        assert_eq!(agg.discarded(), 1);
    }

    #[test]
    fn test_sales_totals_merge() {
        let mut a = SalesTotals { lines: 1, quantity: 2, revenue: 20.0 };
        let b = SalesTotals { lines: 1, quantity: 3, revenue: 6.0 };
        a.merge(&b);
        assert_eq!(a, SalesTotals { lines: 2, quantity: 5, revenue: 26.0 });
    }
}
