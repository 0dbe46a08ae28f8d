//! Listing search
//!
//! Query construction follows the marketplace's long-standing precedence:
//! status and location text combine, but a price range (both bounds > 0)
//! replaces the whole predicate. A buyer who supplies a price range therefore
//! sees every listing in range regardless of status or location text.

use bson::{doc, Document as BsonDocument, Regex};

use crate::shared::error::Result;
use super::entity::{Listing, VerificationStatus};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRange {
    pub minimum: f64,
    pub maximum: f64,
}

impl PriceRange {
    /// Both bounds must be positive; otherwise the range is ignored.
    pub fn from_bounds(minimum: Option<f64>, maximum: Option<f64>) -> Option<Self> {
        match (minimum, maximum) {
            (Some(minimum), Some(maximum)) if minimum > 0.0 && maximum > 0.0 => {
                Some(Self { minimum, maximum })
            }
            _ => None,
        }
    }
}

/// Filter applied to both the page query and the count query.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingPredicate {
    Attributes {
        status: Option<VerificationStatus>,
        location: Option<String>,
    },
    Price(PriceRange),
}

impl ListingPredicate {
    pub fn to_filter(&self) -> BsonDocument {
        match self {
            ListingPredicate::Attributes { status, location } => {
                let mut filter = BsonDocument::new();
                if let Some(status) = status {
                    filter.insert("status", status.as_str());
                }
                if let Some(text) = location {
                    filter.insert(
                        "location",
                        Regex {
                            pattern: regex::escape(text),
                            options: "i".to_string(),
                        },
                    );
                }
                filter
            }
            ListingPredicate::Price(range) => doc! {
                "minimumPrice": { "$gte": range.minimum },
                "maximumPrice": { "$lte": range.maximum },
            },
        }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            ListingPredicate::Attributes { status, location } => {
                let status_ok = status.map_or(true, |s| listing.status == s);
                let location_ok = location.as_ref().map_or(true, |text| {
                    listing.location.to_lowercase().contains(&text.to_lowercase())
                });
                status_ok && location_ok
            }
            ListingPredicate::Price(range) => {
                listing.minimum_price >= range.minimum && listing.maximum_price <= range.maximum
            }
        }
    }
}

/// A search request. `page` is 1-indexed.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingSearch {
    pub status: Option<VerificationStatus>,
    pub location: Option<String>,
    pub price: Option<PriceRange>,
    pub page: u32,
    /// Page size; `None` returns every match
    pub size: Option<u32>,
}

impl ListingSearch {
    pub fn new(
        status: Option<&str>,
        location: Option<&str>,
        minimum_price: Option<f64>,
        maximum_price: Option<f64>,
        page: Option<u32>,
        size: Option<u32>,
    ) -> Result<Self> {
        let status = status
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .transpose()?;
        let location = location
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from);

        Ok(Self {
            status,
            location,
            price: PriceRange::from_bounds(minimum_price, maximum_price),
            page: page.unwrap_or(1).max(1),
            size: size.filter(|s| *s > 0),
        })
    }

    pub fn predicate(&self) -> ListingPredicate {
        match self.price {
            Some(range) => ListingPredicate::Price(range),
            None => ListingPredicate::Attributes {
                status: self.status,
                location: self.location.clone(),
            },
        }
    }

    /// Documents to skip (0-indexed page × size).
    pub fn skip(&self) -> u64 {
        match self.size {
            Some(size) => u64::from(self.page - 1) * u64::from(size),
            None => 0,
        }
    }

    pub fn limit(&self) -> Option<i64> {
        self.size.map(i64::from)
    }
}

/// One page of results plus the total number of matches.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub listings: Vec<Listing>,
    pub count: u64,
}
