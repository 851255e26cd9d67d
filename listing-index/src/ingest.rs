use crate::listing::{DealRating, Dealer, Listing, Location};
use anyhow::{Context, Result};
use hashbrown::HashSet;
use itertools::Itertools;
use serde::Deserialize;
use std::{fs::File, io::BufReader, path::Path, time::Instant};
use tracing::{info, warn};

const FALLBACK_IMAGE_URL: &str =
    "https://images.unsplash.com/photo-1492144534655-ae79c964c9d7?w=800";

/// The two wire shapes the feed can carry. The original implementation
/// sniffed one key to decide which schema a record used; here the union is
/// explicit and `normalize` is the single validating adapter.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawRecord {
    /// A record already using the canonical field names.
    Canonical(CanonicalRecord),
    /// A dealer-feed record (aggregator export, camelCase keys). All fields
    /// optional; this variant doubles as the catch-all so a sparse record
    /// degrades to defaults instead of failing the batch.
    DealerFeed(DealerFeedRecord),
}

/// Feed ids arrive as numbers or strings; canonically they are opaque text.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Float(f64),
    Text(String),
}

impl RawId {
    fn into_string(self) -> String {
        match self {
            RawId::Number(value) => value.to_string(),
            RawId::Float(value) => value.to_string(),
            RawId::Text(value) => value,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CanonicalRecord {
    #[serde(default)]
    pub id: Option<RawId>,
    pub year: i32,
    pub make: String,
    pub model: String,
    #[serde(default)]
    pub trim: String,
    pub price: f64,
    #[serde(default)]
    pub mileage: f64,
    #[serde(default)]
    pub exterior_color: Option<String>,
    #[serde(default)]
    pub interior_color: Option<String>,
    #[serde(default)]
    pub transmission: Option<String>,
    #[serde(default)]
    pub fuel_type: Option<String>,
    #[serde(default)]
    pub drivetrain: Option<String>,
    #[serde(default)]
    pub body_type: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub deal_rating: DealRating,
    #[serde(default)]
    pub deal_score: f64,
    #[serde(default)]
    pub price_differential: Option<f64>,
    #[serde(default)]
    pub days_on_market: Option<f64>,
    #[serde(default)]
    pub dealer: Option<Dealer>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub vin: String,
    #[serde(default)]
    pub stock_number: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DealerFeedRecord {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub car_year: Option<i32>,
    #[serde(default)]
    pub make_name: Option<String>,
    #[serde(default)]
    pub model_name: Option<String>,
    #[serde(default)]
    pub trim_name: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub mileage: Option<f64>,
    #[serde(default)]
    pub localized_exterior_color: Option<String>,
    #[serde(default)]
    pub exterior_color_name: Option<String>,
    #[serde(default)]
    pub localized_interior_color: Option<String>,
    #[serde(default)]
    pub interior_color: Option<String>,
    #[serde(default)]
    pub localized_transmission: Option<String>,
    #[serde(default)]
    pub localized_fuel_type: Option<String>,
    #[serde(default)]
    pub localized_drive_train: Option<String>,
    #[serde(default)]
    pub drive_train: Option<String>,
    #[serde(default)]
    pub body_type_name: Option<String>,
    #[serde(default)]
    pub original_picture_data: Option<PictureData>,
    #[serde(default)]
    pub deal_rating: Option<String>,
    #[serde(default)]
    pub deal_score: Option<f64>,
    #[serde(default)]
    pub price_differential: Option<f64>,
    #[serde(default)]
    pub days_on_market: Option<f64>,
    #[serde(default)]
    pub service_provider_name: Option<String>,
    #[serde(default)]
    pub dealer_name: Option<String>,
    #[serde(default)]
    pub seller_rating: Option<f64>,
    #[serde(default)]
    pub review_count: Option<u32>,
    #[serde(default)]
    pub phone_number_string: Option<String>,
    #[serde(default)]
    pub seller_city: Option<String>,
    #[serde(default)]
    pub seller_region: Option<String>,
    #[serde(default)]
    pub seller_postal_code: Option<String>,
    #[serde(default)]
    pub distance: Option<f64>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub vin: Option<String>,
    #[serde(default)]
    pub stock_number: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PictureData {
    #[serde(default)]
    pub url: Option<String>,
}

/// Converts either raw shape into the canonical [`Listing`], substituting the
/// documented defaults for absent fields. `index` is the record's position in
/// the feed, used as the fallback identity.
pub fn normalize(raw: RawRecord, index: usize) -> Listing {
    match raw {
        RawRecord::Canonical(record) => normalize_canonical(record, index),
        RawRecord::DealerFeed(record) => normalize_dealer_feed(record, index),
    }
}

fn normalize_canonical(record: CanonicalRecord, index: usize) -> Listing {
    Listing {
        id: record
            .id
            .map(RawId::into_string)
            .unwrap_or_else(|| index.to_string()),
        year: record.year,
        make: record.make,
        model: record.model,
        trim: record.trim,
        price: record.price,
        mileage: record.mileage,
        exterior_color: record.exterior_color.unwrap_or_else(|| "Unknown".into()),
        interior_color: record.interior_color.unwrap_or_else(|| "Unknown".into()),
        transmission: record.transmission.unwrap_or_else(|| "Automatic".into()),
        fuel_type: record.fuel_type.unwrap_or_else(|| "Gasoline".into()),
        drivetrain: record.drivetrain.unwrap_or_else(|| "FWD".into()),
        body_type: record.body_type.unwrap_or_else(|| "Sedan".into()),
        image_url: record.image_url.unwrap_or_else(|| FALLBACK_IMAGE_URL.into()),
        deal_rating: record.deal_rating,
        deal_score: record.deal_score,
        price_differential: record.price_differential,
        days_on_market: record.days_on_market,
        dealer: record.dealer.unwrap_or_else(default_dealer),
        location: record.location.unwrap_or_else(default_location),
        features: record.features,
        vin: record.vin,
        stock_number: record.stock_number,
    }
}

fn normalize_dealer_feed(record: DealerFeedRecord, index: usize) -> Listing {
    Listing {
        id: record
            .id
            .map(RawId::into_string)
            .unwrap_or_else(|| index.to_string()),
        year: record.car_year.unwrap_or(2020),
        make: record.make_name.unwrap_or_else(|| "Unknown".into()),
        model: record.model_name.unwrap_or_else(|| "Unknown".into()),
        trim: record.trim_name.unwrap_or_default(),
        price: record.price.unwrap_or(0.0),
        mileage: record.mileage.unwrap_or(0.0),
        exterior_color: record
            .localized_exterior_color
            .or(record.exterior_color_name)
            .unwrap_or_else(|| "Unknown".into()),
        interior_color: record
            .localized_interior_color
            .or(record.interior_color)
            .unwrap_or_else(|| "Unknown".into()),
        transmission: record
            .localized_transmission
            .unwrap_or_else(|| "Automatic".into()),
        fuel_type: record
            .localized_fuel_type
            .unwrap_or_else(|| "Gasoline".into()),
        drivetrain: record
            .localized_drive_train
            .or(record.drive_train)
            .unwrap_or_else(|| "FWD".into()),
        body_type: record.body_type_name.unwrap_or_else(|| "Sedan".into()),
        image_url: record
            .original_picture_data
            .and_then(|picture| picture.url)
            .unwrap_or_else(|| FALLBACK_IMAGE_URL.into()),
        deal_rating: record
            .deal_rating
            .map(|token| DealRating::from_feed_token(&token))
            .unwrap_or_default(),
        deal_score: record.deal_score.unwrap_or(0.0),
        price_differential: record.price_differential,
        days_on_market: record.days_on_market,
        dealer: Dealer {
            name: record
                .service_provider_name
                .or(record.dealer_name)
                .unwrap_or_else(|| "Local Dealer".into()),
            rating: record.seller_rating.unwrap_or(4.0),
            reviews: record.review_count.unwrap_or(0),
            phone: record.phone_number_string.unwrap_or_default(),
        },
        location: Location {
            city: record.seller_city.unwrap_or_else(|| "Houston, TX".into()),
            state: record.seller_region.unwrap_or_else(|| "TX".into()),
            zip: record.seller_postal_code.unwrap_or_else(|| "77479".into()),
            distance: record.distance.unwrap_or(0.0),
        },
        features: record.options,
        vin: record.vin.unwrap_or_default(),
        stock_number: record.stock_number.unwrap_or_default(),
    }
}

fn default_dealer() -> Dealer {
    Dealer {
        name: "Local Dealer".into(),
        rating: 4.0,
        reviews: 0,
        phone: String::new(),
    }
}

fn default_location() -> Location {
    Location {
        city: "Houston, TX".into(),
        state: "TX".into(),
        zip: "77479".into(),
        distance: 0.0,
    }
}

/// One-shot bulk load of the listings feed. Failure here is terminal for the
/// session; a single malformed record is skipped, not fatal.
pub fn load_listings(path: &Path) -> Result<Vec<Listing>> {
    let load_time = Instant::now();
    let file = File::open(path).context("Failed to open listings feed")?;
    let records: Vec<serde_json::Value> =
        serde_json::from_reader(BufReader::new(file)).context("Failed to decode listings feed")?;

    let total = records.len();
    let mut listings = Vec::with_capacity(total);
    for (index, value) in records.into_iter().enumerate() {
        match serde_json::from_value::<RawRecord>(value) {
            Ok(raw) => listings.push(normalize(raw, index)),
            Err(err) => warn!("Skipping unreadable record {index}: {err}"),
        }
    }

    info!(
        "Loaded {} of {} listings in {:?}",
        listings.len(),
        total,
        load_time.elapsed()
    );
    Ok(listings)
}

/// Distinct facet choices derived from the loaded set: makes ascending,
/// years newest-first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FacetOptions {
    pub makes: Vec<String>,
    pub years: Vec<i32>,
}

pub fn facet_options(listings: &[Listing]) -> FacetOptions {
    let makes: HashSet<&str> = listings.iter().map(|listing| listing.make.as_str()).collect();
    let years: HashSet<i32> = listings.iter().map(|listing| listing.year).collect();
    FacetOptions {
        makes: makes.into_iter().map(str::to_string).sorted().collect(),
        years: years.into_iter().sorted_by(|a, b| b.cmp(a)).collect(),
    }
}

/// Distinct models offered by one make, ascending.
pub fn models_for_make(listings: &[Listing], make: &str) -> Vec<String> {
    let models: HashSet<&str> = listings
        .iter()
        .filter(|listing| listing.make == make)
        .map(|listing| listing.model.as_str())
        .collect();
    models.into_iter().map(str::to_string).sorted().collect()
}
