use crate::{
    CompareToggle, DealBrief, SessionPrefs, Shortlist, deal_brief, read_prefs_from_file,
    write_prefs_to_file,
};
use anyhow::Result;
use carvault_syntax::{SearchContext, parse_search};
use listing_index::{
    BatchFeed, FacetOptions, FeedResponse, FilterState, Listing, Persona, capture_search_context,
    facet_options, filter_listings, load_listings, models_for_make, rank_listings,
};
use std::path::Path;
use tracing::info;

/// Totals reported by a filter pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplySummary {
    /// Listings that survived the predicate chain.
    pub matched: usize,
    /// Size of the full loaded set.
    pub total: usize,
}

/// One row of a served page: the listing plus its transient scores.
#[derive(Debug, Clone, Copy)]
pub struct PageEntry<'a> {
    pub listing: &'a Listing,
    pub value_score: u8,
    pub persona_score: Option<u8>,
}

/// Page request outcome with listings resolved.
#[derive(Debug)]
pub enum SessionPage<'a> {
    Page(Vec<PageEntry<'a>>),
    Busy,
    Exhausted,
}

/// The explicit session/context object the whole pipeline hangs off. Owns the
/// loaded listing set, the facet state, the persona, the shortlist and the
/// batch feed; every operation returns data, never markup. There are no
/// ambient globals: drop the session, drop the state.
pub struct Session {
    listings: Vec<Listing>,
    pub filter: FilterState,
    persona: Persona,
    shortlist: Shortlist,
    feed: BatchFeed,
}

impl Session {
    /// Bulk-loads the listings feed. Failure here is terminal: without its
    /// listing set the pipeline cannot run.
    pub fn load(path: &Path) -> Result<Self> {
        let listings = load_listings(path)?;
        Ok(Self::from_listings(listings))
    }

    pub fn from_listings(listings: Vec<Listing>) -> Self {
        info!("Session ready with {} listings", listings.len());
        Self {
            listings,
            filter: FilterState::default(),
            persona: Persona::All,
            shortlist: Shortlist::new(),
            feed: BatchFeed::new(Vec::new()),
        }
    }

    /// Runs the full pipeline (parse, filter, rank) and rebinds the feed to
    /// the fresh ranked set.
    pub fn apply(&mut self) -> ApplySummary {
        self.apply_with_context(capture_search_context())
    }

    /// Same as [`apply`](Session::apply) with an explicit parser context, so
    /// callers (and tests) control the clock.
    pub fn apply_with_context(&mut self, context: SearchContext) -> ApplySummary {
        let search = parse_search(&self.filter.query, context);
        let matched = filter_listings(&self.listings, &self.filter, &search);
        let summary = ApplySummary {
            matched: matched.len(),
            total: self.listings.len(),
        };
        let ranked = rank_listings(&self.listings, matched, self.persona, self.filter.sort);
        self.feed = BatchFeed::new(ranked);
        summary
    }

    /// Serves the next page of the current ranked set. The feed guard applies:
    /// until [`page_done`](Session::page_done) is called, further requests are
    /// dropped with [`SessionPage::Busy`].
    pub fn next_page(&mut self) -> SessionPage<'_> {
        match self.feed.next_page() {
            FeedResponse::Page(entries) => SessionPage::Page(
                entries
                    .into_iter()
                    .map(|entry| PageEntry {
                        listing: &self.listings[entry.index],
                        value_score: entry.value_score,
                        persona_score: entry.persona_score,
                    })
                    .collect(),
            ),
            FeedResponse::Busy => SessionPage::Busy,
            FeedResponse::Exhausted => SessionPage::Exhausted,
        }
    }

    pub fn page_done(&mut self) {
        self.feed.complete();
    }

    pub fn shown(&self) -> usize {
        self.feed.shown()
    }

    pub fn matched(&self) -> usize {
        self.feed.total()
    }

    pub fn total(&self) -> usize {
        self.listings.len()
    }

    pub fn persona(&self) -> Persona {
        self.persona
    }

    pub fn set_persona(&mut self, persona: Persona) {
        self.persona = persona;
    }

    /// Resets every facet, the query and the persona; the caller re-applies.
    pub fn clear_filters(&mut self) {
        self.filter = FilterState::default();
        self.persona = Persona::All;
    }

    pub fn facets(&self) -> FacetOptions {
        facet_options(&self.listings)
    }

    pub fn models_for(&self, make: &str) -> Vec<String> {
        models_for_make(&self.listings, make)
    }

    pub fn listing_by_id(&self, id: &str) -> Option<&Listing> {
        self.listings.iter().find(|listing| listing.id == id)
    }

    pub fn brief(&self, id: &str) -> Option<DealBrief> {
        self.listing_by_id(id)
            .map(|listing| deal_brief(listing, self.persona))
    }

    pub fn toggle_favorite(&mut self, id: &str) -> bool {
        self.shortlist.toggle_favorite(id)
    }

    pub fn toggle_compare(&mut self, id: &str) -> CompareToggle {
        self.shortlist.toggle_compare(id)
    }

    pub fn shortlist(&self) -> &Shortlist {
        &self.shortlist
    }

    /// Saved listings in feed order.
    pub fn saved_view(&self) -> Vec<&Listing> {
        self.listings
            .iter()
            .filter(|listing| self.shortlist.is_favorite(&listing.id))
            .collect()
    }

    /// Compare-tray listings in insertion order; stale ids are skipped.
    pub fn compare_view(&self) -> Vec<&Listing> {
        self.shortlist
            .compare()
            .iter()
            .filter_map(|id| self.listing_by_id(id))
            .collect()
    }

    pub fn restore_prefs(&mut self, prefs: SessionPrefs) {
        self.persona = prefs.persona;
        self.shortlist = prefs.shortlist;
    }

    pub fn restore_prefs_from(&mut self, path: &Path) -> Result<()> {
        let prefs = read_prefs_from_file(path)?;
        self.restore_prefs(prefs);
        Ok(())
    }

    pub fn save_prefs_to(&self, path: &Path) -> Result<()> {
        let prefs = SessionPrefs {
            persona: self.persona,
            shortlist: self.shortlist.clone(),
        };
        write_prefs_to_file(path, &prefs)
    }
}
