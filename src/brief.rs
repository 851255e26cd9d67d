use listing_index::{DOWN_PAYMENT_RATE, Listing, Persona, persona_score, value_score};
use serde::Serialize;

/// Where a listing sits against the market average, in whole dollars.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub enum MarketDelta {
    Below(f64),
    Above(f64),
    Unavailable,
}

/// How much of the underlying record is actually present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
}

/// The per-listing summary bundle: scores, affordability, market context,
/// risk flags and tradeoffs. Data only; presentation happens elsewhere.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DealBrief {
    pub title: String,
    pub deal_rating_label: &'static str,
    pub value_score: u8,
    pub persona_score: Option<u8>,
    pub down_payment: f64,
    pub monthly_payment: Option<f64>,
    pub market_delta: MarketDelta,
    pub days_on_market: Option<f64>,
    pub confidence: Confidence,
    pub flags: Vec<String>,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
}

/// Builds the brief for one listing under the current persona.
pub fn deal_brief(listing: &Listing, persona: Persona) -> DealBrief {
    let down_payment = (listing.price * DOWN_PAYMENT_RATE).round();
    DealBrief {
        title: listing.title(),
        deal_rating_label: listing.deal_rating.label(),
        value_score: value_score(listing),
        persona_score: persona_score(listing, persona),
        down_payment,
        monthly_payment: monthly_estimate(listing.price, down_payment),
        market_delta: market_delta(listing),
        days_on_market: listing.days_on_market.filter(|&days| days > 0.0),
        confidence: confidence(listing),
        flags: risk_flags(listing),
        pros: pros(listing),
        cons: cons(listing),
    }
}

/// 60-month payment on the financed balance at a flat 7% markup; `None` when
/// there is no price to finance or the estimate rounds away to nothing.
pub fn monthly_estimate(price: f64, down_payment: f64) -> Option<f64> {
    if price <= 0.0 {
        return None;
    }
    let monthly = (((price - down_payment) * 1.07) / 60.0).round();
    (monthly > 0.0).then_some(monthly)
}

fn market_delta(listing: &Listing) -> MarketDelta {
    match listing.price_differential {
        Some(differential) if differential > 0.0 => MarketDelta::Below(differential.round()),
        Some(differential) => MarketDelta::Above(differential.abs().round()),
        None => MarketDelta::Unavailable,
    }
}

const CONFIDENCE_HIGH: f64 = 0.78;
const CONFIDENCE_MEDIUM: f64 = 0.52;

/// Fraction of expected signals actually present in the record.
fn confidence(listing: &Listing) -> Confidence {
    let signals = [
        listing.price > 0.0,
        listing.mileage >= 0.0,
        listing.deal_rating.is_rated(),
        listing.price_differential.is_some(),
        listing.days_on_market.is_some(),
        !listing.dealer.name.is_empty(),
        !listing.image_url.is_empty(),
    ];
    let present = signals.iter().filter(|&&signal| signal).count();
    let score = present as f64 / signals.len() as f64;
    if score >= CONFIDENCE_HIGH {
        Confidence::High
    } else if score >= CONFIDENCE_MEDIUM {
        Confidence::Medium
    } else {
        Confidence::Low
    }
}

fn risk_flags(listing: &Listing) -> Vec<String> {
    let mut flags = Vec::new();
    if listing.vin.is_empty() {
        flags.push("Missing VIN (ask dealer to confirm)".to_string());
    }
    if listing.dealer.name.is_empty() {
        flags.push("Dealer name missing".to_string());
    }
    if listing.image_url.is_empty() {
        flags.push("No photo URL found".to_string());
    }
    if !listing.deal_rating.is_rated() {
        flags.push("No price analysis available".to_string());
    }
    if listing.mileage > 85_000.0 {
        flags.push("High mileage for most buyers".to_string());
    }
    if listing.days_on_market.is_some_and(|days| days >= 65.0) {
        flags.push("Long time on market (check history)".to_string());
    }
    if listing
        .price_differential
        .is_some_and(|differential| differential < -2_000.0)
    {
        flags.push("Priced above market average".to_string());
    }
    if listing.price > 0.0 && listing.price < 6_000.0 {
        flags.push("Very low price (verify title + condition)".to_string());
    }
    flags
}

const TRADEOFF_LIMIT: usize = 4;

fn pros(listing: &Listing) -> Vec<String> {
    let mut pros = Vec::new();
    let label = listing.deal_rating.label();
    if listing.deal_rating.is_rated() && (label.contains("Great") || label.contains("Good")) {
        pros.push(format!("{label} rating"));
    }
    if let Some(differential) = listing.price_differential {
        if differential > 0.0 {
            pros.push(format!("{} below market", dollars(differential)));
        }
    }
    if listing.mileage > 0.0 && listing.mileage <= 30_000.0 {
        pros.push("Low mileage".to_string());
    }
    let fuel = listing.fuel_type.to_lowercase();
    if fuel.contains("electric") {
        pros.push("Electric (lower fuel cost)".to_string());
    }
    if fuel.contains("hybrid") {
        pros.push("Hybrid (better efficiency)".to_string());
    }
    pros.truncate(TRADEOFF_LIMIT);
    pros
}

fn cons(listing: &Listing) -> Vec<String> {
    let mut cons = Vec::new();
    if let Some(differential) = listing.price_differential {
        if differential < 0.0 {
            cons.push(format!("{} above market", dollars(differential.abs())));
        }
    }
    if listing.mileage > 65_000.0 {
        cons.push("Higher mileage".to_string());
    }
    if listing.days_on_market.is_some_and(|days| days >= 55.0) {
        cons.push("Long time on market".to_string());
    }
    if listing.vin.is_empty() {
        cons.push("VIN missing".to_string());
    }
    if listing.dealer.name.is_empty() {
        cons.push("Dealer info incomplete".to_string());
    }
    if listing.image_url.is_empty() {
        cons.push("Photos missing".to_string());
    }
    if listing.price <= 0.0 {
        cons.push("Price missing".to_string());
    }
    cons.truncate(TRADEOFF_LIMIT);
    cons
}

/// `$12,345` style whole-dollar formatting.
pub fn dollars(amount: f64) -> String {
    let whole = amount.round().abs() as u64;
    let digits = whole.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (position, ch) in digits.chars().enumerate() {
        if position > 0 && (digits.len() - position) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if amount.round() < 0.0 { "-" } else { "" };
    format!("{sign}${grouped}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use listing_index::{DealRating, Dealer, Location};

    fn listing() -> Listing {
        Listing {
            id: "1".into(),
            year: 2021,
            make: "BMW".into(),
            model: "X5".into(),
            trim: "xDrive40i".into(),
            price: 43_000.0,
            mileage: 28_000.0,
            exterior_color: "Black".into(),
            interior_color: "Tan".into(),
            transmission: "Automatic".into(),
            fuel_type: "Gasoline".into(),
            drivetrain: "AWD".into(),
            body_type: "SUV / Crossover".into(),
            image_url: "https://example.com/x5.jpg".into(),
            deal_rating: DealRating::GreatDeal,
            deal_score: 82.0,
            price_differential: Some(1_800.0),
            days_on_market: Some(12.0),
            dealer: Dealer {
                name: "Momentum BMW".into(),
                rating: 4.5,
                reviews: 412,
                phone: String::new(),
            },
            location: Location::default(),
            features: Vec::new(),
            vin: "WBA12345".into(),
            stock_number: String::new(),
        }
    }

    #[test]
    fn complete_record_reads_high_confidence() {
        let brief = deal_brief(&listing(), Persona::All);
        assert_eq!(brief.confidence, Confidence::High);
        assert_eq!(brief.market_delta, MarketDelta::Below(1_800.0));
        assert_eq!(brief.persona_score, None);
        assert_eq!(brief.down_payment, 6_450.0);
        // round((43000 - 6450) * 1.07 / 60) = round(651.8) = 652.
        assert_eq!(brief.monthly_payment, Some(652.0));
        assert!(brief.flags.is_empty());
        assert!(brief.pros.contains(&"Great Deal rating".to_string()));
        assert!(brief.pros.contains(&"$1,800 below market".to_string()));
    }

    #[test]
    fn sparse_record_reads_low_confidence_and_flags() {
        let mut sparse = listing();
        sparse.price = 0.0;
        sparse.deal_rating = DealRating::Unknown;
        sparse.price_differential = None;
        sparse.days_on_market = None;
        sparse.dealer.name = String::new();
        sparse.image_url = String::new();
        sparse.vin = String::new();

        let brief = deal_brief(&sparse, Persona::All);
        assert_eq!(brief.confidence, Confidence::Low);
        assert_eq!(brief.monthly_payment, None);
        assert_eq!(brief.market_delta, MarketDelta::Unavailable);
        assert!(brief.flags.contains(&"Missing VIN (ask dealer to confirm)".to_string()));
        assert!(brief.cons.contains(&"Price missing".to_string()));
    }

    #[test]
    fn above_market_listing_gets_the_con() {
        let mut overpriced = listing();
        overpriced.price_differential = Some(-2_500.0);
        let brief = deal_brief(&overpriced, Persona::All);
        assert_eq!(brief.market_delta, MarketDelta::Above(2_500.0));
        assert!(brief.flags.contains(&"Priced above market average".to_string()));
        assert!(brief.cons.contains(&"$2,500 above market".to_string()));
    }

    #[test]
    fn persona_brief_includes_the_match_score() {
        let brief = deal_brief(&listing(), Persona::Family);
        assert!(brief.persona_score.is_some());
    }

    #[test]
    fn dollars_groups_thousands() {
        assert_eq!(dollars(0.0), "$0");
        assert_eq!(dollars(999.0), "$999");
        assert_eq!(dollars(1_800.0), "$1,800");
        assert_eq!(dollars(1_234_567.0), "$1,234,567");
    }

    #[test]
    fn tradeoffs_are_truncated() {
        let mut worst = listing();
        worst.price_differential = Some(-3_000.0);
        worst.mileage = 90_000.0;
        worst.days_on_market = Some(80.0);
        worst.vin = String::new();
        worst.dealer.name = String::new();
        worst.image_url = String::new();
        let brief = deal_brief(&worst, Persona::All);
        assert_eq!(brief.cons.len(), TRADEOFF_LIMIT);
    }
}
