//! Dashboard statistics over the visited places.

use serde::Serialize;

use crate::{
    Place, RegionSummarizer, RegionSummary, UNKNOWN_LABEL, percent_of_total, region_key,
    sort_by_weight, summarize,
};

/// Number of cities kept in [`VisitStats::top_cities`].
pub const TOP_CITIES: usize = 6;
/// Number of tags kept in [`VisitStats::top_tags`].
pub const TOP_TAGS: usize = 8;

/// A region group together with its share of all visits.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionShare {
    /// Region group.
    #[serde(flatten)]
    pub summary: RegionSummary,
    /// Rounded share of all visits, `0` when there are none.
    pub percent: u32,
}

/// Visits recorded in one calendar month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyVisits {
    /// Month as `YYYY-MM` in UTC.
    pub month: String,
    /// Number of visits in the month.
    pub visits: usize,
}

/// Aggregate view returned to the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitStats {
    /// Sum of every place's visit counter.
    pub total_visits: u64,
    /// Per-region groups in first-seen order.
    pub regions: Vec<RegionShare>,
    /// Heaviest cities.
    pub top_cities: Vec<RegionSummary>,
    /// Heaviest tags.
    pub top_tags: Vec<RegionSummary>,
    /// Recorded visits per month in first-seen order.
    pub monthly: Vec<MonthlyVisits>,
}

impl VisitStats {
    /// Compute the dashboard statistics.
    ///
    /// Weights are visit counters. A place contributes its full weight to
    /// each of its tags.
    pub fn from_places(places: &[Place]) -> Self {
        let total_visits: u64 = places.iter().map(|place| u64::from(place.visits_count)).sum();
        let total = f64::from(u32::try_from(total_visits).unwrap_or(u32::MAX));

        let regions = summarize(
            places,
            |place| region_key(place).to_owned(),
            |place| place.weight(),
        )
        .into_iter()
        .map(|summary| RegionShare {
            percent: percent_of_total(summary.weight, total),
            summary,
        })
        .collect();

        let mut top_cities = summarize(places, |place| city_of(place), |place| place.weight());
        sort_by_weight(&mut top_cities);
        top_cities.truncate(TOP_CITIES);

        let mut tags = RegionSummarizer::default();
        for place in places {
            for tag in &place.tags {
                tags.add(tag, place.weight());
            }
        }
        let mut top_tags = tags.finish();
        sort_by_weight(&mut top_tags);
        top_tags.truncate(TOP_TAGS);

        Self {
            total_visits,
            regions,
            top_cities,
            top_tags,
            monthly: monthly_visits(places),
        }
    }
}

/// City a place is grouped under.
///
/// Uses the `city` field when set, else the second comma-separated part of
/// the address (the first is usually the street), else the first part.
pub fn city_of(place: &Place) -> String {
    if let Some(city) = place.city.as_deref().filter(|city| !city.trim().is_empty()) {
        return city.to_owned();
    }
    let mut parts = place.address.split(',').map(str::trim);
    let first = parts.next().filter(|part| !part.is_empty());
    let second = parts.next().filter(|part| !part.is_empty());
    second
        .or(first)
        .unwrap_or(UNKNOWN_LABEL)
        .to_owned()
}

fn monthly_visits(places: &[Place]) -> Vec<MonthlyVisits> {
    let mut months = RegionSummarizer::default();
    for visit in places.iter().flat_map(|place| &place.visits) {
        months.add(&visit.at.format("%Y-%m").to_string(), 1.0);
    }
    months
        .finish()
        .into_iter()
        .map(|group| MonthlyVisits {
            month: group.key,
            visits: group.count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Visit;
    use chrono::{TimeZone, Utc};
    use rstest::{fixture, rstest};

    fn visit(id: &str, year: i32, month: u32) -> Visit {
        let at = Utc
            .with_ymd_and_hms(year, month, 3, 10, 0, 0)
            .single()
            .expect("valid date");
        Visit::new(id, at, None, "")
    }

    #[fixture]
    fn places() -> Vec<Place> {
        let mut lavra = Place::new("a", "Lavra", 50.4346, 30.5575)
            .expect("valid place")
            .with_region("Kyiv")
            .with_address("Lavrska St, Kyiv, 01015")
            .with_tags(["church", "history"]);
        lavra.record_visit(visit("v1", 2024, 3));
        lavra.record_visit(visit("v2", 2024, 4));
        lavra.record_visit(visit("v3", 2024, 3));

        let mut market = Place::new("b", "Rynok Square", 49.8419, 24.0316)
            .expect("valid place")
            .with_region("Lviv")
            .with_city("Lviv")
            .with_tags(["history"]);
        market.record_visit(visit("v4", 2024, 4));

        let roadside = Place::new("c", "Roadside", 49.0, 32.0).expect("valid place");
        vec![lavra, market, roadside]
    }

    #[rstest]
    fn totals_and_region_shares(places: Vec<Place>) {
        let stats = VisitStats::from_places(&places);
        assert_eq!(stats.total_visits, 4);
        let shares: Vec<(&str, u32)> = stats
            .regions
            .iter()
            .map(|share| (share.summary.key.as_str(), share.percent))
            .collect();
        assert_eq!(shares, [("Kyiv", 75), ("Lviv", 25), (UNKNOWN_LABEL, 0)]);
    }

    #[rstest]
    fn cities_fall_back_to_address_parts(places: Vec<Place>) {
        let stats = VisitStats::from_places(&places);
        let cities: Vec<&str> = stats.top_cities.iter().map(|c| c.key.as_str()).collect();
        assert_eq!(cities, ["Kyiv", "Lviv", UNKNOWN_LABEL]);
    }

    #[rstest]
    fn tags_accumulate_place_weight(places: Vec<Place>) {
        let stats = VisitStats::from_places(&places);
        let tags: Vec<(&str, f64)> = stats
            .top_tags
            .iter()
            .map(|tag| (tag.key.as_str(), tag.weight))
            .collect();
        assert_eq!(tags, [("history", 4.0), ("church", 3.0)]);
    }

    #[rstest]
    fn monthly_in_first_seen_order(places: Vec<Place>) {
        let stats = VisitStats::from_places(&places);
        assert_eq!(
            stats.monthly,
            vec![
                MonthlyVisits {
                    month: "2024-03".to_owned(),
                    visits: 2,
                },
                MonthlyVisits {
                    month: "2024-04".to_owned(),
                    visits: 2,
                },
            ]
        );
    }

    #[rstest]
    fn no_places_give_zeroed_stats() {
        let stats = VisitStats::from_places(&[]);
        assert_eq!(stats.total_visits, 0);
        assert!(stats.regions.is_empty());
        assert!(stats.monthly.is_empty());
    }

    #[rstest]
    #[case("Street 1, Odesa, 65000", "Odesa")]
    #[case("Odesa", "Odesa")]
    #[case("", UNKNOWN_LABEL)]
    #[case("Street 1, , x", "Street 1")]
    fn city_from_address(#[case] address: &str, #[case] expected: &str) {
        let place = Place::new("p", "P", 46.48, 30.72)
            .expect("valid place")
            .with_address(address);
        assert_eq!(city_of(&place), expected);
    }

    #[rstest]
    fn top_lists_are_truncated() {
        let places: Vec<Place> = (0..10_u32)
            .map(|i| {
                Place::new(format!("p{i}"), "P", 48.0, 30.0)
                    .expect("valid place")
                    .with_city(format!("City {i}"))
                    .with_tags([format!("tag {i}")])
                    .with_visits_count(i)
            })
            .collect();
        let stats = VisitStats::from_places(&places);
        assert_eq!(stats.top_cities.len(), TOP_CITIES);
        assert_eq!(stats.top_tags.len(), TOP_TAGS);
        assert_eq!(stats.top_cities[0].key, "City 9");
    }

    #[rstest]
    fn serialises_camel_case(places: Vec<Place>) {
        let json = serde_json::to_value(VisitStats::from_places(&places)).expect("serialisable");
        assert_eq!(json["totalVisits"], 4);
        assert_eq!(json["regions"][0]["key"], "Kyiv");
        assert_eq!(json["regions"][0]["percent"], 75);
        assert_eq!(json["topCities"][0]["weight"], 3.0);
    }
}
