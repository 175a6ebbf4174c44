//! Ranking over aggregation results.

use std::cmp::Ordering;

use crate::analyzers::types::{Aggregation, Metric};

/// Top `n` groups by their [`Metric`], highest first.
///
/// Groups with equal metrics keep ascending key order. The input is not
/// modified, so repeated calls return the same ranking.
pub fn top_n<K, V>(agg: &Aggregation<K, V>, n: usize) -> Vec<(K, V)>
where
    K: Ord + Clone,
    V: Metric + Clone,
{
    top_n_by(agg, n, |v| v.metric())
}

/// Like [`top_n`], ranking by an arbitrary projection of the summary.
pub fn top_n_by<K, V, F>(agg: &Aggregation<K, V>, n: usize, metric: F) -> Vec<(K, V)>
where
    K: Ord + Clone,
    V: Clone,
    F: Fn(&V) -> f64,
{
    if n == 0 {
        return Vec::new();
    }

    let mut ranked: Vec<(&K, &V)> = agg.iter().collect();
    // BTreeMap iteration is already key-ascending and the sort is stable, so
    // equal metrics stay in key order.
    ranked.sort_by(|a, b| descending(metric(a.1), metric(b.1)));
    ranked
        .into_iter()
        .take(n)
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// The single highest-ranked key, if any.
pub fn most_common<K, V>(agg: &Aggregation<K, V>) -> Option<(K, V)>
where
    K: Ord + Clone,
    V: Metric + Clone,
{
    top_n(agg, 1).into_iter().next()
}

fn descending(a: f64, b: f64) -> Ordering {
    b.total_cmp(&a)
}
