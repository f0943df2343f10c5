//! Listing query engine: filtering, sorting, pagination and facets over turfs

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::{Sport, Turf, TurfSummary};
use crate::types::{Pagination, PaginationMeta};
use crate::validation::FieldError;

/// Result ordering for listing search
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    PriceLow,
    PriceHigh,
    Rating,
    #[default]
    Newest,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::PriceLow => "price_low",
            SortKey::PriceHigh => "price_high",
            SortKey::Rating => "rating",
            SortKey::Newest => "newest",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "price_low" => Some(SortKey::PriceLow),
            "price_high" => Some(SortKey::PriceHigh),
            "rating" => Some(SortKey::Rating),
            "newest" => Some(SortKey::Newest),
            _ => None,
        }
    }
}

/// Raw query string parameters as received
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TurfQueryParams {
    pub search: Option<String>,
    pub sport: Option<String>,
    pub city: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

/// Validated listing query
#[derive(Debug, Clone, PartialEq)]
pub struct TurfQuery {
    pub search: Option<String>,
    pub sport: Option<Sport>,
    pub city: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub sort: SortKey,
    pub pagination: Pagination,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl TurfQueryParams {
    pub fn into_query(self, default_page_size: u32, max_page_size: u32) -> Result<TurfQuery, FieldError> {
        let sport = match non_blank(self.sport) {
            None => None,
            Some(s) if s.eq_ignore_ascii_case("all") => None,
            Some(s) => Some(
                Sport::parse(&s).ok_or_else(|| FieldError::new("sport", format!("Unknown sport: {s}")))?,
            ),
        };

        let sort = match non_blank(self.sort) {
            None => SortKey::default(),
            Some(s) => SortKey::parse(&s)
                .ok_or_else(|| FieldError::new("sort", format!("Unknown sort key: {s}")))?,
        };

        if let (Some(min), Some(max)) = (self.min_price, self.max_price) {
            if min > max {
                return Err(FieldError::new(
                    "min_price",
                    "Minimum price cannot exceed maximum price",
                ));
            }
        }

        let pagination =
            Pagination::from_query(self.page, self.page_size, default_page_size, max_page_size)?;

        Ok(TurfQuery {
            search: non_blank(self.search).map(|s| s.to_lowercase()),
            sport,
            city: non_blank(self.city).map(|s| s.to_lowercase()),
            min_price: self.min_price,
            max_price: self.max_price,
            sort,
            pagination,
        })
    }
}

impl TurfQuery {
    fn matches(&self, turf: &Turf) -> bool {
        if let Some(needle) = &self.search {
            let hit = [
                turf.name.as_str(),
                turf.description.as_str(),
                turf.location.city.as_str(),
                turf.location.address.as_str(),
                turf.contact.business_name.as_str(),
            ]
            .iter()
            .any(|hay| hay.to_lowercase().contains(needle.as_str()));
            if !hit {
                return false;
            }
        }
        if let Some(sport) = self.sport {
            if !turf.offers_sport(sport) {
                return false;
            }
        }
        if let Some(city) = &self.city {
            if !turf.location.city.to_lowercase().contains(city.as_str()) {
                return false;
            }
        }
        if self.min_price.is_some_and(|min| turf.price_per_hour < min) {
            return false;
        }
        if self.max_price.is_some_and(|max| turf.price_per_hour > max) {
            return false;
        }
        true
    }

    fn compare(&self, a: &Turf, b: &Turf) -> Ordering {
        let primary = match self.sort {
            SortKey::PriceLow => a.price_per_hour.cmp(&b.price_per_hour),
            SortKey::PriceHigh => b.price_per_hour.cmp(&a.price_per_hour),
            SortKey::Rating => b.rating.cmp(&a.rating),
            SortKey::Newest => Ordering::Equal,
        };
        primary
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| a.id.cmp(&b.id))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SportFacet {
    pub sport: Sport,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PriceRange {
    pub min: Decimal,
    pub max: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TurfFacets {
    pub cities: Vec<String>,
    pub sports: Vec<SportFacet>,
    pub price_range: Option<PriceRange>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurfSearchResult {
    pub data: Vec<TurfSummary>,
    pub pagination: PaginationMeta,
    pub facets: TurfFacets,
}

/// Run a listing query over a set of turfs.
///
/// Inactive turfs are never returned. City and sport facets cover every
/// active turf; the price range covers the filtered set.
pub fn search_turfs(turfs: &[Turf], query: &TurfQuery) -> TurfSearchResult {
    let active: Vec<&Turf> = turfs.iter().filter(|t| t.is_active).collect();

    let mut matched: Vec<&Turf> = active.iter().copied().filter(|t| query.matches(t)).collect();
    matched.sort_by(|a, b| query.compare(a, b));

    let price_range = matched
        .iter()
        .map(|t| t.price_per_hour)
        .fold(None, |range: Option<PriceRange>, price| match range {
            None => Some(PriceRange { min: price, max: price }),
            Some(r) => Some(PriceRange {
                min: r.min.min(price),
                max: r.max.max(price),
            }),
        });

    let facets = TurfFacets {
        cities: city_facet(&active),
        sports: sport_facet(&active),
        price_range,
    };

    let total = matched.len() as u64;
    let data = query
        .pagination
        .apply(&matched)
        .into_iter()
        .map(Turf::to_summary)
        .collect();

    TurfSearchResult {
        data,
        pagination: PaginationMeta::new(&query.pagination, total),
        facets,
    }
}

/// Distinct cities, deduplicated case-insensitively, first spelling wins
fn city_facet(turfs: &[&Turf]) -> Vec<String> {
    let mut seen: BTreeMap<String, String> = BTreeMap::new();
    for turf in turfs {
        let city = turf.location.city.trim();
        if city.is_empty() {
            continue;
        }
        seen.entry(city.to_lowercase())
            .or_insert_with(|| city.to_string());
    }
    seen.into_values().collect()
}

fn sport_facet(turfs: &[&Turf]) -> Vec<SportFacet> {
    let mut counts: BTreeMap<Sport, u64> = BTreeMap::new();
    for turf in turfs {
        for sport in &turf.sports {
            *counts.entry(*sport).or_default() += 1;
        }
    }
    counts
        .into_iter()
        .map(|(sport, count)| SportFacet { sport, count })
        .collect()
}
