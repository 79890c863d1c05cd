//! Grouping of points by a caller-chosen key.
//!
//! Groups keep the order in which their key was first seen. Callers that
//! want a ranking sort afterwards with [`sort_by_weight`], which is stable
//! so ties keep first-seen order.

use std::collections::HashMap;

use serde::Serialize;

use crate::Place;

/// Label used when a point carries no value for the grouping key.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Aggregate for one group key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSummary {
    /// Group key, e.g. a region, city or tag.
    pub key: String,
    /// Number of points in the group.
    pub count: usize,
    /// Sum of the points' weights.
    pub weight: f64,
}

/// Incremental group-by that preserves first-seen key order.
///
/// # Examples
/// ```
/// use waymark_core::RegionSummarizer;
///
/// let mut summarizer = RegionSummarizer::default();
/// summarizer.add("Lviv", 2.0);
/// summarizer.add("Kyiv", 1.0);
/// summarizer.add("Lviv", 4.0);
/// let groups = summarizer.finish();
/// assert_eq!(groups[0].key, "Lviv");
/// assert_eq!((groups[0].count, groups[0].weight), (2, 6.0));
/// assert_eq!(waymark_core::total_weight(&groups), 7.0);
/// ```
#[derive(Debug, Default, Clone)]
pub struct RegionSummarizer {
    groups: Vec<RegionSummary>,
    index: HashMap<String, usize>,
}

impl RegionSummarizer {
    /// Count one point of `weight` under `key`.
    pub fn add(&mut self, key: &str, weight: f64) {
        if let Some(group) = self
            .index
            .get(key)
            .and_then(|position| self.groups.get_mut(*position))
        {
            group.count += 1;
            group.weight += weight;
            return;
        }
        self.index.insert(key.to_owned(), self.groups.len());
        self.groups.push(RegionSummary {
            key: key.to_owned(),
            count: 1,
            weight,
        });
    }

    /// Number of distinct keys seen so far.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// `true` when nothing has been added.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups in first-seen order.
    pub fn finish(self) -> Vec<RegionSummary> {
        self.groups
    }
}

/// Group `items` by `key_fn`, summing `weight_fn` per group.
///
/// Output follows first-seen key order.
pub fn summarize<T, K, W>(
    items: impl IntoIterator<Item = T>,
    mut key_fn: K,
    mut weight_fn: W,
) -> Vec<RegionSummary>
where
    K: FnMut(&T) -> String,
    W: FnMut(&T) -> f64,
{
    let mut summarizer = RegionSummarizer::default();
    for item in items {
        summarizer.add(&key_fn(&item), weight_fn(&item));
    }
    summarizer.finish()
}

/// Group places by region, weighting each by its visit count.
///
/// Places without a region, or with an empty one, fall under
/// [`UNKNOWN_LABEL`].
pub fn summarize_by_region<'a>(places: impl IntoIterator<Item = &'a Place>) -> Vec<RegionSummary> {
    summarize(
        places,
        |place| region_key(place).to_owned(),
        |place| place.weight(),
    )
}

/// Region a place is grouped under.
pub fn region_key(place: &Place) -> &str {
    place
        .region
        .as_deref()
        .filter(|region| !region.trim().is_empty())
        .unwrap_or(UNKNOWN_LABEL)
}

/// Sum of all group weights.
pub fn total_weight(groups: &[RegionSummary]) -> f64 {
    groups.iter().map(|group| group.weight).sum()
}

/// `weight` as a whole percentage of `total`, rounded to nearest.
///
/// Returns `0` when `total` is zero or not a positive finite number.
///
/// # Examples
/// ```
/// use waymark_core::percent_of_total;
///
/// assert_eq!(percent_of_total(5.0, 6.0), 83);
/// assert_eq!(percent_of_total(3.0, 0.0), 0);
/// ```
pub fn percent_of_total(weight: f64, total: f64) -> u32 {
    if !total.is_finite() || total <= 0.0 || !weight.is_finite() {
        return 0;
    }
    let percent = (weight / total * 100.0).round();
    if percent <= 0.0 {
        0
    } else {
        percent.min(f64::from(u32::MAX)) as u32
    }
}

/// Stable sort by weight, heaviest first.
pub fn sort_by_weight(groups: &mut [RegionSummary]) {
    groups.sort_by(|a, b| b.weight.total_cmp(&a.weight));
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn kyiv_heavy() -> Vec<Place> {
        vec![
            Place::new("a", "Lavra", 50.4346, 30.5575)
                .expect("valid place")
                .with_region("Kyiv")
                .with_visits_count(2),
            Place::new("b", "Podil", 50.4657, 30.5155)
                .expect("valid place")
                .with_region("Kyiv")
                .with_visits_count(3),
            Place::new("c", "Roadside", 49.0, 32.0)
                .expect("valid place")
                .with_visits_count(1),
        ]
    }

    #[rstest]
    fn groups_by_region_with_unknown_default(kyiv_heavy: Vec<Place>) {
        let groups = summarize_by_region(&kyiv_heavy);
        assert_eq!(
            groups,
            vec![
                RegionSummary {
                    key: "Kyiv".to_owned(),
                    count: 2,
                    weight: 5.0,
                },
                RegionSummary {
                    key: UNKNOWN_LABEL.to_owned(),
                    count: 1,
                    weight: 1.0,
                },
            ]
        );
        let total = total_weight(&groups);
        assert_eq!(total, 6.0);
        assert_eq!(percent_of_total(groups[0].weight, total), 83);
    }

    #[rstest]
    fn blank_region_counts_as_unknown() {
        let place = Place::new("a", "Somewhere", 48.0, 30.0)
            .expect("valid place")
            .with_region("  ");
        assert_eq!(region_key(&place), UNKNOWN_LABEL);
    }

    #[rstest]
    fn keeps_first_seen_order() {
        let keys = ["b", "a", "c", "a", "b"];
        let groups = summarize(keys, |key| (*key).to_owned(), |_| 1.0);
        let order: Vec<&str> = groups.iter().map(|group| group.key.as_str()).collect();
        assert_eq!(order, ["b", "a", "c"]);
    }

    #[rstest]
    fn empty_input_yields_no_groups() {
        let groups = summarize(Vec::<Place>::new(), |_| String::new(), |_| 1.0);
        assert!(groups.is_empty());
    }

    #[rstest]
    #[case(1.0, 3.0, 33)]
    #[case(2.0, 3.0, 67)]
    #[case(1.0, 2.0, 50)]
    #[case(0.0, 5.0, 0)]
    #[case(4.0, 0.0, 0)]
    #[case(f64::NAN, 3.0, 0)]
    fn percent_rounds_to_nearest(#[case] weight: f64, #[case] total: f64, #[case] expected: u32) {
        assert_eq!(percent_of_total(weight, total), expected);
    }

    #[rstest]
    fn weight_sort_is_stable() {
        let mut groups = summarize(
            [("x", 1.0), ("y", 3.0), ("z", 1.0), ("w", 3.0)],
            |(key, _)| (*key).to_owned(),
            |(_, weight)| *weight,
        );
        sort_by_weight(&mut groups);
        let order: Vec<&str> = groups.iter().map(|group| group.key.as_str()).collect();
        assert_eq!(order, ["y", "w", "x", "z"]);
    }
}
