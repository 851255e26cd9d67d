//! # CarVault's natural-language search parser
//!
//! `carvault-syntax` turns free-text shopping queries like `"5k down bmw suv"`
//! or `"under 400/mo low miles"` into a structured [`ParsedSearch`] so the
//! rest of CarVault can filter listings without re-deriving the phrase rules.
//!
//! The grammar is deliberately tiny: a handful of budget idioms, a
//! down-payment phrase, monthly-payment bounds, price bounds, and whatever is
//! left over becomes keyword tokens. Matching runs in a fixed order and every
//! pass marks its tokens as consumed, so a number claimed by the monthly pass
//! can never be re-read as a cash price.
//!
//! ## Example
//! ```
//! use carvault_syntax::{parse_search, SearchContext};
//!
//! let context = SearchContext { current_year: 2026 };
//! let parsed = parse_search("under $30k newish bmw suv", context);
//! assert_eq!(parsed.max_price, Some(30_000.0));
//! assert_eq!(parsed.min_year, Some(2022));
//! assert_eq!(parsed.keywords, ["bmw", "suv"]);
//! ```

/// Ambient values the parser needs but must not capture itself, so the parse
/// stays a pure function. Callers snapshot the context once per pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchContext {
    /// Calendar year used by the `newish`/`modern` idiom.
    pub current_year: i32,
}

/// Structured constraints extracted from one query string.
///
/// Every bound is optional; a malformed number leaves its bound unset rather
/// than defaulting to zero. Keywords keep their original order, case-folded.
///
/// ```
/// use carvault_syntax::{parse_search, SearchContext};
/// let parsed = parse_search("5k down", SearchContext { current_year: 2026 });
/// assert_eq!(parsed.max_down_payment, Some(5000.0));
/// assert!(parsed.keywords.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParsedSearch {
    /// `"<amount> down"`: ceiling on the assumed down payment.
    pub max_down_payment: Option<f64>,
    /// `"under <amount>"` and friends, or the `cheap`/`budget` idiom.
    pub max_price: Option<f64>,
    /// `"over <amount>"` and friends.
    pub min_price: Option<f64>,
    /// `"under <amount>/mo"` and friends.
    pub max_monthly: Option<f64>,
    /// `"over <amount>/mo"` and friends.
    pub min_monthly: Option<f64>,
    /// The `newish`/`modern` idiom: current year minus four.
    pub min_year: Option<i32>,
    /// The `low miles`/`low mileage` idiom.
    pub max_mileage: Option<f64>,
    /// Leftover tokens of length > 1, order preserved.
    pub keywords: Vec<String>,
}

impl ParsedSearch {
    /// True when no bound is set and no keyword survived.
    ///
    /// ```
    /// use carvault_syntax::{parse_search, SearchContext};
    /// let context = SearchContext { current_year: 2026 };
    /// assert!(parse_search("  a 1 ", context).is_empty());
    /// assert!(!parse_search("bmw", context).is_empty());
    /// ```
    pub fn is_empty(&self) -> bool {
        self.max_down_payment.is_none()
            && self.max_price.is_none()
            && self.min_price.is_none()
            && self.max_monthly.is_none()
            && self.min_monthly.is_none()
            && self.min_year.is_none()
            && self.max_mileage.is_none()
            && self.keywords.is_empty()
    }
}

/// Parses a free-text query into [`ParsedSearch`].
///
/// The passes run in a fixed order (idioms, down payment, monthly bounds,
/// price bounds, keywords) and each consumes its tokens before the next
/// runs, so `"under 400/mo"` sets a monthly ceiling and never a price one.
///
/// ```
/// use carvault_syntax::{parse_search, SearchContext};
/// let context = SearchContext { current_year: 2026 };
///
/// let parsed = parse_search("under 400/mo bmw suv", context);
/// assert_eq!(parsed.max_monthly, Some(400.0));
/// assert_eq!(parsed.max_price, None);
/// assert_eq!(parsed.keywords, ["bmw", "suv"]);
/// ```
pub fn parse_search(input: &str, context: SearchContext) -> ParsedSearch {
    let mut scan = Scan::new(input);
    let mut result = ParsedSearch::default();

    scan.match_idioms(&mut result, context);
    result.max_down_payment = scan.match_down_payment();
    // Monthly bounds must claim their numbers before the price passes run.
    result.max_monthly = scan.match_bound(CEILING_CUES, Marker::Monthly);
    result.min_monthly = scan.match_bound(FLOOR_CUES, Marker::Monthly);
    if let Some(price) = scan.match_bound(CEILING_CUES, Marker::None) {
        // An explicit ceiling wins over the `cheap` idiom default.
        result.max_price = Some(price);
    }
    result.min_price = scan.match_bound(FLOOR_CUES, Marker::None);
    result.keywords = scan.keywords();

    result
}

const CEILING_CUES: &[Cue] = &[
    Cue::Word("under"),
    Cue::Word("below"),
    Cue::Pair("less", "than"),
    Cue::Word("max"),
];

const FLOOR_CUES: &[Cue] = &[
    Cue::Word("over"),
    Cue::Word("above"),
    Cue::Pair("more", "than"),
    Cue::Word("min"),
];

const NEWISH_YEAR_BACK: i32 = 4;
const LOW_MILES_CEILING: f64 = 35_000.0;
const CHEAP_PRICE_CEILING: f64 = 15_000.0;

#[derive(Clone, Copy)]
enum Cue {
    Word(&'static str),
    Pair(&'static str, &'static str),
}

#[derive(Clone, Copy)]
enum Marker {
    /// Bare amount: a cash price bound.
    None,
    /// Amount must carry a per-month marker (`/mo`, `mo`, `per month`,
    /// `monthly`), glued or as following tokens.
    Monthly,
}

/// Token-level scanner. Tokens are case-folded up front; passes flip the
/// `used` flag for everything they claim and the keyword pass collects the
/// rest.
struct Scan {
    tokens: Vec<String>,
    used: Vec<bool>,
}

impl Scan {
    fn new(input: &str) -> Self {
        let tokens: Vec<String> = input
            .split_whitespace()
            .map(|token| token.to_lowercase())
            .collect();
        let used = vec![false; tokens.len()];
        Self { tokens, used }
    }

    fn match_idioms(&mut self, result: &mut ParsedSearch, context: SearchContext) {
        for i in 0..self.tokens.len() {
            if self.used[i] {
                continue;
            }
            match self.tokens[i].as_str() {
                "newish" | "modern" => {
                    result.min_year = Some(context.current_year - NEWISH_YEAR_BACK);
                    self.used[i] = true;
                }
                "cheap" | "budget" => {
                    result.max_price = Some(CHEAP_PRICE_CEILING);
                    self.used[i] = true;
                }
                "low" => {
                    if let Some(next) = self.free_token(i + 1) {
                        if next == "miles" || next == "mileage" {
                            result.max_mileage = Some(LOW_MILES_CEILING);
                            self.used[i] = true;
                            self.used[i + 1] = true;
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// `<amount> down`; the first unclaimed occurrence wins.
    fn match_down_payment(&mut self) -> Option<f64> {
        for i in 0..self.tokens.len() {
            if self.used[i] {
                continue;
            }
            let Some(amount) = parse_amount(&self.tokens[i]) else {
                continue;
            };
            if self.free_token(i + 1) == Some("down") {
                self.used[i] = true;
                self.used[i + 1] = true;
                return Some(amount);
            }
        }
        None
    }

    /// `<cue> <amount>` with an optional per-month marker requirement. The
    /// scan only consumes tokens on a full match, so a cue followed by a
    /// marker-less amount is left intact for the price passes.
    fn match_bound(&mut self, cues: &[Cue], marker: Marker) -> Option<f64> {
        for i in 0..self.tokens.len() {
            if self.used[i] {
                continue;
            }
            let Some(after_cue) = self.match_cue(cues, i) else {
                continue;
            };
            let Some(amount_token) = self.free_token(after_cue) else {
                continue;
            };

            match marker {
                Marker::None => {
                    let Some(amount) = parse_amount(amount_token) else {
                        continue;
                    };
                    self.consume(i, after_cue);
                    return Some(amount);
                }
                Marker::Monthly => {
                    // Glued form first: `400/mo`, `$450mo`.
                    if let Some(amount) = strip_monthly_suffix(amount_token).and_then(parse_amount)
                    {
                        self.consume(i, after_cue);
                        return Some(amount);
                    }
                    let Some(amount) = parse_amount(amount_token) else {
                        continue;
                    };
                    if let Some(end) = self.match_monthly_marker(after_cue + 1) {
                        self.consume(i, end);
                        return Some(amount);
                    }
                }
            }
        }
        None
    }

    /// Returns the index just past the cue when `cues` matches at `i`.
    fn match_cue(&self, cues: &[Cue], i: usize) -> Option<usize> {
        for cue in cues {
            match *cue {
                Cue::Word(word) => {
                    if self.tokens[i] == word {
                        return Some(i + 1);
                    }
                }
                Cue::Pair(first, second) => {
                    if self.tokens[i] == first && self.free_token(i + 1) == Some(second) {
                        return Some(i + 2);
                    }
                }
            }
        }
        None
    }

    /// Matches the detached monthly markers starting at `i`; returns the last
    /// index of the marker.
    fn match_monthly_marker(&self, i: usize) -> Option<usize> {
        match self.free_token(i)? {
            "/mo" | "mo" | "monthly" => Some(i),
            "per" if self.free_token(i + 1) == Some("month") => Some(i + 1),
            _ => None,
        }
    }

    fn consume(&mut self, from: usize, to: usize) {
        for flag in &mut self.used[from..=to] {
            *flag = true;
        }
    }

    fn free_token(&self, i: usize) -> Option<&str> {
        if i < self.tokens.len() && !self.used[i] {
            Some(self.tokens[i].as_str())
        } else {
            None
        }
    }

    fn keywords(self) -> Vec<String> {
        self.tokens
            .into_iter()
            .zip(self.used)
            .filter(|(token, used)| !used && token.chars().count() > 1)
            .map(|(token, _)| token)
            .collect()
    }
}

/// Parses a money-ish literal: optional `$`, `,` separators stripped, and a
/// trailing `k` meaning thousands. Anything else is "no amount", never zero.
///
/// ```
/// use carvault_syntax::parse_amount;
/// assert_eq!(parse_amount("$5,000"), Some(5000.0));
/// assert_eq!(parse_amount("7.5k"), Some(7500.0));
/// assert_eq!(parse_amount("cheap"), None);
/// assert_eq!(parse_amount("5k5"), None);
/// ```
pub fn parse_amount(raw: &str) -> Option<f64> {
    let stripped = raw.strip_prefix('$').unwrap_or(raw).replace(',', "");
    let (digits, multiplier) = match stripped.strip_suffix('k') {
        Some(prefix) => (prefix, 1000.0),
        None => (stripped.as_str(), 1.0),
    };

    if digits.is_empty() || !is_plain_number(digits) {
        return None;
    }
    digits.parse::<f64>().ok().map(|value| value * multiplier)
}

/// `<digits>[.digits]`: at most one dot, at least one digit, nothing else.
fn is_plain_number(value: &str) -> bool {
    let mut dots = 0;
    let mut digit_seen = false;
    for ch in value.chars() {
        match ch {
            '0'..='9' => digit_seen = true,
            '.' => dots += 1,
            _ => return false,
        }
    }
    digit_seen && dots <= 1
}

fn strip_monthly_suffix(token: &str) -> Option<&str> {
    token
        .strip_suffix("/mo")
        .or_else(|| token.strip_suffix("mo"))
}
