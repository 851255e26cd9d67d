use crate::{DOWN_PAYMENT_RATE, listing::{DealRating, Listing}, rank::SortMode};
use carvault_syntax::{ParsedSearch, SearchContext};
use jiff::{Timestamp, tz::TimeZone};
use tracing::debug;

/// Facet selections plus the raw search text. A plain value holder the
/// filter engine reads on every pass; owned by whoever drives the session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterState {
    pub make: Option<String>,
    pub model: Option<String>,
    pub year: Option<i32>,
    /// `"min-max"` price bucket; malformed buckets impose no constraint.
    pub price_bucket: Option<String>,
    /// Case-insensitive substring of the body type.
    pub body: Option<String>,
    pub tag: Tag,
    pub query: String,
    pub sort: SortMode,
}

/// Quick-filter tag group, single-select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tag {
    #[default]
    All,
    GreatDeal,
    Electric,
    Hybrid,
}

/// Snapshots the ambient values the query parser needs, once per pass.
pub fn capture_search_context() -> SearchContext {
    let zoned = Timestamp::now().to_zoned(TimeZone::system());
    SearchContext {
        current_year: i32::from(zoned.date().year()),
    }
}

/// Runs the predicate chain over the full set and returns the indices of the
/// survivors. Order is unspecified until ranking; a fresh vector every call.
pub fn filter_listings(
    listings: &[Listing],
    state: &FilterState,
    search: &ParsedSearch,
) -> Vec<usize> {
    let keywords: Vec<&str> = search.keywords.iter().map(String::as_str).collect();
    let matched: Vec<usize> = listings
        .iter()
        .enumerate()
        .filter(|(_, listing)| passes(listing, state, search, &keywords))
        .map(|(index, _)| index)
        .collect();
    debug!("Filter pass kept {} of {} listings", matched.len(), listings.len());
    matched
}

/// All predicates must hold; any single failure excludes the listing.
fn passes(listing: &Listing, state: &FilterState, search: &ParsedSearch, keywords: &[&str]) -> bool {
    if let Some(make) = &state.make {
        if listing.make != *make {
            return false;
        }
    }
    if let Some(model) = &state.model {
        if listing.model != *model {
            return false;
        }
    }
    if let Some(year) = state.year {
        if listing.year != year {
            return false;
        }
    }
    if let Some(body) = &state.body {
        if !listing.body_type.to_lowercase().contains(&body.to_lowercase()) {
            return false;
        }
    }
    if let Some((min, max)) = state.price_bucket.as_deref().and_then(parse_price_bucket) {
        if listing.price < min || listing.price > max {
            return false;
        }
    }

    if let Some(max_down) = search.max_down_payment {
        if listing.price * DOWN_PAYMENT_RATE > max_down {
            return false;
        }
    }
    if let Some(max_price) = search.max_price {
        if listing.price > max_price {
            return false;
        }
    }
    if let Some(min_price) = search.min_price {
        if listing.price < min_price {
            return false;
        }
    }
    if let Some(min_year) = search.min_year {
        if listing.year < min_year {
            return false;
        }
    }
    if let Some(max_mileage) = search.max_mileage {
        if listing.mileage > max_mileage {
            return false;
        }
    }
    if search.max_monthly.is_some() || search.min_monthly.is_some() {
        let monthly = monthly_payment(listing.price);
        if let Some(max_monthly) = search.max_monthly {
            if monthly > max_monthly {
                return false;
            }
        }
        if let Some(min_monthly) = search.min_monthly {
            if monthly < min_monthly {
                return false;
            }
        }
    }

    if !keywords.is_empty() {
        let haystack = format!(
            "{} {} {} {} {} {}",
            listing.year,
            listing.make,
            listing.model,
            listing.trim,
            listing.body_type,
            listing.fuel_type
        )
        .to_lowercase();
        if !keywords.iter().all(|keyword| haystack.contains(keyword)) {
            return false;
        }
    }

    match state.tag {
        Tag::All => {}
        Tag::GreatDeal => {
            if listing.deal_rating != DealRating::GreatDeal {
                return false;
            }
        }
        Tag::Electric => {
            if listing.fuel_type != "Electric" {
                return false;
            }
        }
        Tag::Hybrid => {
            if !listing.fuel_type.contains("Hybrid") {
                return false;
            }
        }
    }

    true
}

/// 60-month payment on the balance after the assumed down payment, at a flat
/// 7% markup. Matches the figure shown next to every listing.
pub fn monthly_payment(price: f64) -> f64 {
    let down_payment = (price * DOWN_PAYMENT_RATE).round();
    (((price - down_payment) * 1.07) / 60.0).round()
}

fn parse_price_bucket(raw: &str) -> Option<(f64, f64)> {
    let (min, max) = raw.split_once('-')?;
    let min = min.trim().parse::<f64>().ok()?;
    let max = max.trim().parse::<f64>().ok()?;
    Some((min, max))
}
