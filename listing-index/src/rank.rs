use crate::{DOWN_PAYMENT_RATE, listing::Listing};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Buyer archetype that reweights the default ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Persona {
    #[default]
    All,
    Commuter,
    Family,
    Roadtrip,
    Performance,
    Ev,
    Budget,
}

impl Persona {
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::All => "all",
            Persona::Commuter => "commuter",
            Persona::Family => "family",
            Persona::Roadtrip => "roadtrip",
            Persona::Performance => "performance",
            Persona::Ev => "ev",
            Persona::Budget => "budget",
        }
    }
}

impl FromStr for Persona {
    type Err = UnknownPersona;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.to_ascii_lowercase().as_str() {
            "all" => Ok(Persona::All),
            "commuter" => Ok(Persona::Commuter),
            "family" => Ok(Persona::Family),
            "roadtrip" => Ok(Persona::Roadtrip),
            "performance" => Ok(Persona::Performance),
            "ev" => Ok(Persona::Ev),
            "budget" => Ok(Persona::Budget),
            _ => Err(UnknownPersona(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPersona(pub String);

impl std::fmt::Display for UnknownPersona {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown persona: {:?}", self.0)
    }
}

impl std::error::Error for UnknownPersona {}

/// Explicit sort selections; `Default` is the score-driven order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Default,
    PriceAsc,
    PriceDesc,
    Mileage,
    Year,
}

impl FromStr for SortMode {
    type Err = UnknownSortMode;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "" | "default" => Ok(SortMode::Default),
            "price-asc" => Ok(SortMode::PriceAsc),
            "price-desc" => Ok(SortMode::PriceDesc),
            "mileage" => Ok(SortMode::Mileage),
            "year" => Ok(SortMode::Year),
            _ => Err(UnknownSortMode(raw.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSortMode(pub String);

impl std::fmt::Display for UnknownSortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown sort mode: {:?}", self.0)
    }
}

impl std::error::Error for UnknownSortMode {}

/// One entry of the ranked result set: an index into the session's listing
/// slice plus the two transient scores. Recomputed on every pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedListing {
    pub index: usize,
    pub value_score: u8,
    pub persona_score: Option<u8>,
}

/// Deal/value heuristic, 0–99. Base 58, rewarded for deal score and
/// below-market pricing, fresher inventory, penalized for mileage.
pub fn value_score(listing: &Listing) -> u8 {
    let mut score = 58.0;
    score += clamp(listing.deal_score * 0.4, 0.0, 26.0);
    if let Some(differential) = listing.price_differential {
        score += clamp(differential / 700.0, -12.0, 16.0);
    }
    if let Some(days) = listing.days_on_market {
        if days > 0.0 {
            score += clamp(12.0 - days / 16.0, -8.0, 12.0);
        }
    }
    if listing.mileage > 0.0 {
        score -= clamp((listing.mileage - 35_000.0) / 16_000.0, 0.0, 16.0);
    }
    finalize(score)
}

/// Persona-fit heuristic, 0–99; `None` when no persona is selected. A shared
/// market core plus one fixed additive rule set per persona.
pub fn persona_score(listing: &Listing, persona: Persona) -> Option<u8> {
    if persona == Persona::All {
        return None;
    }

    let body = listing.body_type.to_lowercase();
    let fuel = listing.fuel_type.to_lowercase();
    let drivetrain = listing.drivetrain.to_lowercase();
    let transmission = listing.transmission.to_lowercase();
    let price = listing.price;
    let mileage = listing.mileage;
    let down_payment = if price > 0.0 { price * DOWN_PAYMENT_RATE } else { 0.0 };

    let mut score = 55.0;
    score += clamp(listing.deal_score * 0.35, 0.0, 22.0);
    if let Some(differential) = listing.price_differential {
        score += clamp(differential / 600.0, -14.0, 16.0);
    }
    if let Some(days) = listing.days_on_market {
        if days > 0.0 {
            score += clamp(10.0 - days / 18.0, -6.0, 10.0);
        }
    }
    if mileage > 0.0 {
        score -= clamp((mileage - 35_000.0) / 18_000.0, 0.0, 12.0);
    }

    match persona {
        Persona::All => unreachable!("handled above"),
        Persona::Commuter => {
            if fuel.contains("electric") {
                score += 18.0;
            }
            if fuel.contains("hybrid") {
                score += 10.0;
            }
            if body.contains("sedan") {
                score += 8.0;
            }
            if mileage > 0.0 && mileage <= 30_000.0 {
                score += 10.0;
            }
            if down_payment > 0.0 && down_payment <= 4_500.0 {
                score += 8.0;
            }
        }
        Persona::Family => {
            if body.contains("suv") {
                score += 16.0;
            }
            if body.contains("van") {
                score += 14.0;
            }
            if body.contains("truck") {
                score += 6.0;
            }
            if drivetrain.contains("awd") || drivetrain.contains("4wd") {
                score += 8.0;
            }
            if mileage > 0.0 && mileage <= 50_000.0 {
                score += 6.0;
            }
        }
        Persona::Roadtrip => {
            if body.contains("suv") {
                score += 10.0;
            }
            if drivetrain.contains("awd") || drivetrain.contains("4wd") {
                score += 10.0;
            }
            if fuel.contains("diesel") {
                score += 6.0;
            }
            if transmission.contains("automatic") {
                score += 3.0;
            }
            if mileage > 0.0 && mileage <= 60_000.0 {
                score += 6.0;
            }
        }
        Persona::Performance => {
            if body.contains("coupe") {
                score += 16.0;
            }
            if body.contains("luxury") {
                score += 10.0;
            }
            if price >= 35_000.0 {
                score += 8.0;
            }
            if drivetrain.contains("awd") || drivetrain.contains("rwd") {
                score += 6.0;
            }
        }
        Persona::Ev => {
            if fuel.contains("electric") {
                score += 28.0;
            }
            if fuel.contains("hybrid") {
                score -= 8.0;
            }
            if !fuel.contains("electric") && !fuel.contains("ev") {
                score -= 18.0;
            }
        }
        Persona::Budget => {
            if down_payment > 0.0 {
                score += clamp((7_000.0 - down_payment) / 500.0, -10.0, 16.0);
            }
            if price > 0.0 {
                score += clamp((28_000.0 - price) / 1_200.0, -10.0, 18.0);
            }
            if listing.deal_score >= 70.0 {
                score += 6.0;
            }
        }
    }

    Some(finalize(score))
}

/// Scores the candidate set and orders it. Explicit sort modes use direct
/// numeric comparators; the default order is persona match (when one is
/// selected) with the upstream deal score as tie-break, missing treated as 0.
pub fn rank_listings(
    listings: &[Listing],
    candidates: Vec<usize>,
    persona: Persona,
    sort: SortMode,
) -> Vec<RankedListing> {
    let mut ranked: Vec<RankedListing> = candidates
        .into_iter()
        .map(|index| RankedListing {
            index,
            value_score: value_score(&listings[index]),
            persona_score: persona_score(&listings[index], persona),
        })
        .collect();

    match sort {
        SortMode::PriceAsc => {
            ranked.sort_by(|a, b| listings[a.index].price.total_cmp(&listings[b.index].price));
        }
        SortMode::PriceDesc => {
            ranked.sort_by(|a, b| listings[b.index].price.total_cmp(&listings[a.index].price));
        }
        SortMode::Mileage => {
            ranked.sort_by(|a, b| listings[a.index].mileage.total_cmp(&listings[b.index].mileage));
        }
        SortMode::Year => {
            ranked.sort_by(|a, b| listings[b.index].year.cmp(&listings[a.index].year));
        }
        SortMode::Default => {
            ranked.sort_by(|a, b| {
                let by_persona = b.persona_score.unwrap_or(0).cmp(&a.persona_score.unwrap_or(0));
                by_persona.then_with(|| {
                    listings[b.index]
                        .deal_score
                        .total_cmp(&listings[a.index].deal_score)
                })
            });
        }
    }

    ranked
}

fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

fn finalize(score: f64) -> u8 {
    clamp(score.round(), 0.0, 99.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listing::{DealRating, Dealer, Location};

    fn base_listing() -> Listing {
        Listing {
            id: "t".into(),
            year: 2021,
            make: "Test".into(),
            model: "Car".into(),
            trim: String::new(),
            price: 20_000.0,
            mileage: 0.0,
            exterior_color: "Unknown".into(),
            interior_color: "Unknown".into(),
            transmission: "Automatic".into(),
            fuel_type: "Gasoline".into(),
            drivetrain: "FWD".into(),
            body_type: "Sedan".into(),
            image_url: String::new(),
            deal_rating: DealRating::Unknown,
            deal_score: 0.0,
            price_differential: None,
            days_on_market: None,
            dealer: Dealer::default(),
            location: Location::default(),
            features: Vec::new(),
            vin: String::new(),
            stock_number: String::new(),
        }
    }

    #[test]
    fn value_score_worked_example() {
        let mut listing = base_listing();
        listing.deal_score = 80.0;
        listing.price_differential = Some(0.0);
        listing.days_on_market = Some(0.0);
        // 58 + min(80 * 0.4, 26) + 0 + 0 - 0 = 84.
        assert_eq!(value_score(&listing), 84);
    }

    #[test]
    fn value_score_mileage_penalty_caps_at_16() {
        let mut listing = base_listing();
        listing.mileage = 500_000.0;
        assert_eq!(value_score(&listing), 42);
    }

    #[test]
    fn value_score_clamps_into_range() {
        let mut listing = base_listing();
        listing.deal_score = 100.0;
        listing.price_differential = Some(100_000.0);
        listing.days_on_market = Some(1.0);
        assert_eq!(value_score(&listing), 99);
    }

    #[test]
    fn persona_all_has_no_score() {
        assert_eq!(persona_score(&base_listing(), Persona::All), None);
    }

    #[test]
    fn ev_persona_rewards_and_punishes_fuel() {
        let mut electric = base_listing();
        electric.fuel_type = "Electric".into();
        let mut hybrid = base_listing();
        hybrid.fuel_type = "Hybrid".into();
        let gas = base_listing();

        // Shared core for these listings: 55.
        assert_eq!(persona_score(&electric, Persona::Ev), Some(83));
        // Hybrid: -8 (hybrid) -18 (not electric/ev) = 29.
        assert_eq!(persona_score(&hybrid, Persona::Ev), Some(29));
        assert_eq!(persona_score(&gas, Persona::Ev), Some(37));
    }

    #[test]
    fn commuter_persona_bonus_stack() {
        let mut listing = base_listing();
        listing.fuel_type = "Electric".into();
        listing.mileage = 25_000.0;
        listing.price = 28_000.0;
        // core: 55 - clamp((25000-35000)/18000, 0, 12)=0 => 55
        // +18 electric, +8 sedan, +10 low mileage; down 4200 <= 4500 => +8.
        assert_eq!(persona_score(&listing, Persona::Commuter), Some(99));
    }

    #[test]
    fn budget_persona_uses_price_and_down_payment_ramps() {
        let mut listing = base_listing();
        listing.price = 10_000.0;
        listing.deal_score = 80.0;
        // core: 55 + min(80*0.35, 22) = 77
        // down 1500: clamp((7000-1500)/500, -10, 16) = 11
        // price: clamp((28000-10000)/1200, -10, 18) = 15
        // deal_score >= 70: +6  => 109 -> clamped 99.
        assert_eq!(persona_score(&listing, Persona::Budget), Some(99));
    }

    #[test]
    fn default_sort_is_deal_score_descending_for_all() {
        let mut listings = Vec::new();
        for deal_score in [10.0, 90.0, 50.0] {
            let mut listing = base_listing();
            listing.deal_score = deal_score;
            listings.push(listing);
        }
        let ranked = rank_listings(&listings, vec![0, 1, 2], Persona::All, SortMode::Default);
        let scores: Vec<f64> = ranked.iter().map(|r| listings[r.index].deal_score).collect();
        assert_eq!(scores, [90.0, 50.0, 10.0]);
        for pair in ranked.windows(2) {
            assert!(listings[pair[0].index].deal_score >= listings[pair[1].index].deal_score);
        }
    }

    #[test]
    fn default_sort_uses_persona_then_deal_score() {
        let mut ev_weak_deal = base_listing();
        ev_weak_deal.fuel_type = "Electric".into();
        ev_weak_deal.deal_score = 10.0;
        let mut gas_strong_deal = base_listing();
        gas_strong_deal.deal_score = 95.0;
        let mut gas_better_deal = base_listing();
        gas_better_deal.deal_score = 99.0;

        let listings = vec![ev_weak_deal, gas_strong_deal, gas_better_deal];
        let ranked = rank_listings(&listings, vec![0, 1, 2], Persona::Ev, SortMode::Default);

        // The electric listing outranks both despite the weaker deal score.
        assert_eq!(ranked[0].index, 0);
        // Equal persona scores fall back to deal score descending.
        assert_eq!(ranked[1].index, 2);
        assert_eq!(ranked[2].index, 1);
        for pair in ranked.windows(2) {
            let first = pair[0].persona_score.unwrap_or(0);
            let second = pair[1].persona_score.unwrap_or(0);
            assert!(first >= second);
        }
    }

    #[test]
    fn explicit_sort_modes_use_direct_comparators() {
        let mut cheap_old = base_listing();
        cheap_old.price = 8_000.0;
        cheap_old.year = 2016;
        cheap_old.mileage = 90_000.0;
        let mut dear_new = base_listing();
        dear_new.price = 45_000.0;
        dear_new.year = 2024;
        dear_new.mileage = 1_000.0;
        let listings = vec![cheap_old, dear_new];

        let order = |sort| {
            rank_listings(&listings, vec![0, 1], Persona::All, sort)
                .into_iter()
                .map(|r| r.index)
                .collect::<Vec<_>>()
        };
        assert_eq!(order(SortMode::PriceAsc), [0, 1]);
        assert_eq!(order(SortMode::PriceDesc), [1, 0]);
        assert_eq!(order(SortMode::Mileage), [1, 0]);
        assert_eq!(order(SortMode::Year), [1, 0]);
    }
}
