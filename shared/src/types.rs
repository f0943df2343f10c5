//! Common types used across the platform

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::validation::FieldError;

/// Reference to an object held by the media host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaRef {
    pub url: String,
    /// Opaque identifier assigned by the media host
    pub object_id: String,
}

impl MediaRef {
    pub fn new(url: impl Into<String>, object_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            object_id: object_id.into(),
        }
    }
}

/// Logical folders on the media host
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MediaFolder {
    Turfs,
    PaymentProofs,
    PaymentQr,
}

impl MediaFolder {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaFolder::Turfs => "turfs",
            MediaFolder::PaymentProofs => "payment-proofs",
            MediaFolder::PaymentQr => "payment-qr",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "turfs" => Some(MediaFolder::Turfs),
            "payment-proofs" => Some(MediaFolder::PaymentProofs),
            "payment-qr" => Some(MediaFolder::PaymentQr),
            _ => None,
        }
    }
}

/// Postal location of a turf or owner business
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Location {
    pub address: String,
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pincode: Option<String>,
}

impl Location {
    /// Address and city are the fields the marketplace cannot do without
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.address.trim().is_empty() {
            return Err(FieldError::new("location.address", "Address cannot be empty"));
        }
        if self.city.trim().is_empty() {
            return Err(FieldError::new("location.city", "City cannot be empty"));
        }
        Ok(())
    }
}

/// Pagination parameters
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

impl Pagination {
    /// Build pagination from optional query values.
    ///
    /// Pages are 1-based; a page size above `max_per_page` is clamped rather
    /// than rejected.
    pub fn from_query(
        page: Option<u32>,
        per_page: Option<u32>,
        default_per_page: u32,
        max_per_page: u32,
    ) -> Result<Self, FieldError> {
        let page = page.unwrap_or(1);
        if page == 0 {
            return Err(FieldError::new("page", "Page numbers start at 1"));
        }
        let per_page = per_page.unwrap_or(default_per_page);
        if per_page == 0 {
            return Err(FieldError::new("page_size", "Page size must be positive"));
        }
        Ok(Self {
            page,
            per_page: per_page.min(max_per_page),
        })
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.per_page)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.per_page)
    }

    /// Slice the current page out of an already ordered collection
    pub fn apply<T: Clone>(&self, items: &[T]) -> Vec<T> {
        let start = usize::try_from(self.offset()).unwrap_or(usize::MAX);
        items
            .iter()
            .skip(start)
            .take(self.per_page as usize)
            .cloned()
            .collect()
    }
}

/// Paginated response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

/// Pagination metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaginationMeta {
    pub page: u32,
    pub per_page: u32,
    pub total_items: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl PaginationMeta {
    pub fn new(pagination: &Pagination, total_items: u64) -> Self {
        let per_page = u64::from(pagination.per_page.max(1));
        let total_pages = u32::try_from(total_items.div_ceil(per_page)).unwrap_or(u32::MAX);

        Self {
            page: pagination.page,
            per_page: pagination.per_page,
            total_items,
            total_pages,
            has_next: pagination.page < total_pages,
            has_prev: pagination.page > 1,
        }
    }
}

/// Inclusive calendar date range for queries
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, FieldError> {
        if start > end {
            return Err(FieldError::new("from", "Range start must not be after its end"));
        }
        Ok(Self { start, end })
    }

    /// A range of `days` days beginning at `start`.
    ///
    /// Fails on field `from` when the range would run past the last
    /// representable date.
    pub fn starting_at(start: NaiveDate, days: u32) -> Result<Self, FieldError> {
        let span = i64::from(days.max(1)) - 1;
        let end = start
            .checked_add_signed(Duration::days(span))
            .ok_or_else(|| FieldError::new("from", "Range start is too far in the future"))?;
        Ok(Self { start, end })
    }

    /// Number of days covered, both ends included
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn dates(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}
