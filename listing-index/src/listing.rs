use serde::{Deserialize, Serialize};

/// Coarse price-quality label attached upstream. Feed tokens arrive as
/// SCREAMING_SNAKE strings and anything unrecognized collapses to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DealRating {
    GreatDeal,
    GoodDeal,
    FairDeal,
    HighPrice,
    Overpriced,
    #[default]
    Unknown,
}

impl DealRating {
    pub fn from_feed_token(raw: &str) -> Self {
        match raw {
            "GREAT_PRICE" => DealRating::GreatDeal,
            "GOOD_PRICE" => DealRating::GoodDeal,
            "FAIR_PRICE" => DealRating::FairDeal,
            "HIGH_PRICE" => DealRating::HighPrice,
            "OVERPRICED" => DealRating::Overpriced,
            _ => DealRating::Unknown,
        }
    }

    /// Human label, the form the tag filter and briefs use.
    pub fn label(&self) -> &'static str {
        match self {
            DealRating::GreatDeal => "Great Deal",
            DealRating::GoodDeal => "Good Deal",
            DealRating::FairDeal => "Fair Deal",
            DealRating::HighPrice => "High Price",
            DealRating::Overpriced => "Overpriced",
            DealRating::Unknown => "No Price Analysis",
        }
    }

    pub fn is_rated(&self) -> bool {
        !matches!(self, DealRating::Unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Dealer {
    pub name: String,
    pub rating: f64,
    pub reviews: u32,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Location {
    pub city: String,
    pub state: String,
    pub zip: String,
    pub distance: f64,
}

/// One canonical listing, produced by the ingestion adapter. Immutable for
/// the lifetime of a session; the pipeline never mutates listings in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    pub id: String,
    pub year: i32,
    pub make: String,
    pub model: String,
    pub trim: String,
    pub price: f64,
    pub mileage: f64,
    pub exterior_color: String,
    pub interior_color: String,
    pub transmission: String,
    pub fuel_type: String,
    pub drivetrain: String,
    pub body_type: String,
    pub image_url: String,
    pub deal_rating: DealRating,
    /// Upstream 0–100 deal quality score; 0 when the feed had none.
    pub deal_score: f64,
    /// Signed dollars versus market average; positive = below market.
    pub price_differential: Option<f64>,
    pub days_on_market: Option<f64>,
    pub dealer: Dealer,
    pub location: Location,
    pub features: Vec<String>,
    pub vin: String,
    pub stock_number: String,
}

impl Listing {
    /// Display title, `"2021 BMW X5"` style.
    pub fn title(&self) -> String {
        format!("{} {} {}", self.year, self.make, self.model)
            .trim()
            .to_string()
    }
}
