use carvault_syntax::{parse_search, ParsedSearch, SearchContext};

const CONTEXT: SearchContext = SearchContext { current_year: 2026 };

fn parse(input: &str) -> ParsedSearch {
    parse_search(input, CONTEXT)
}

#[test]
fn ceiling_cue_matrix() {
    let cases = [
        ("under 20000", 20_000.0),
        ("below 20000", 20_000.0),
        ("less than 20000", 20_000.0),
        ("max 20000", 20_000.0),
        ("under $20,000", 20_000.0),
        ("under 20k", 20_000.0),
        ("UNDER 20K", 20_000.0),
    ];
    for (query, expected) in cases {
        let parsed = parse(query);
        assert_eq!(parsed.max_price, Some(expected), "query: {query:?}");
        assert!(parsed.keywords.is_empty(), "query: {query:?}");
    }
}

#[test]
fn floor_cue_matrix() {
    let cases = [
        ("over 8000", 8000.0),
        ("above 8000", 8000.0),
        ("more than 8000", 8000.0),
        ("min 8000", 8000.0),
        ("over $8k", 8000.0),
    ];
    for (query, expected) in cases {
        let parsed = parse(query);
        assert_eq!(parsed.min_price, Some(expected), "query: {query:?}");
    }
}

#[test]
fn monthly_marker_matrix() {
    let cases = [
        "under 400/mo",
        "under $400/mo",
        "under 400 /mo",
        "under 400 mo",
        "under 400 monthly",
        "under 400 per month",
    ];
    for query in cases {
        let parsed = parse(query);
        assert_eq!(parsed.max_monthly, Some(400.0), "query: {query:?}");
        assert_eq!(parsed.max_price, None, "query: {query:?}");
        assert!(parsed.keywords.is_empty(), "query: {query:?}");
    }
}

#[test]
fn mixed_query_claims_each_number_once() {
    let parsed = parse("$4k down under 450/mo under 30000 newish low miles honda crv");
    assert_eq!(parsed.max_down_payment, Some(4000.0));
    assert_eq!(parsed.max_monthly, Some(450.0));
    assert_eq!(parsed.max_price, Some(30_000.0));
    assert_eq!(parsed.min_year, Some(2022));
    assert_eq!(parsed.max_mileage, Some(35_000.0));
    assert_eq!(parsed.keywords, ["honda", "crv"]);
}

#[test]
fn unrecognized_text_is_only_keywords() {
    let parsed = parse("reliable red wagon with sunroof");
    assert_eq!(
        parsed.keywords,
        ["reliable", "red", "wagon", "with", "sunroof"]
    );
    assert!(parsed.max_price.is_none());
    assert!(parsed.min_price.is_none());
    assert!(parsed.max_monthly.is_none());
    assert!(parsed.min_monthly.is_none());
    assert!(parsed.max_down_payment.is_none());
    assert!(parsed.min_year.is_none());
    assert!(parsed.max_mileage.is_none());
}

#[test]
fn empty_and_whitespace_queries() {
    assert!(parse("").is_empty());
    assert!(parse("   \t  ").is_empty());
}

#[test]
fn numbers_without_cues_stay_keywords() {
    // `2019` is a model-year style keyword, not a price.
    let parsed = parse("2019 mazda");
    assert_eq!(parsed.max_price, None);
    assert_eq!(parsed.keywords, ["2019", "mazda"]);
}

#[test]
fn down_payment_does_not_shadow_price_bounds() {
    let parsed = parse("3000 down under 20000");
    assert_eq!(parsed.max_down_payment, Some(3000.0));
    assert_eq!(parsed.max_price, Some(20_000.0));
}
