mod feed;
mod filter;
mod ingest;
mod listing;
mod rank;

pub use feed::*;
pub use filter::*;
pub use ingest::*;
pub use listing::*;
pub use rank::*;

/// Canonical assumed down-payment fraction. The source data pipeline used 10%
/// in one spot and 15% everywhere user-visible; 15% is canonical here (see
/// DESIGN.md, decision D1).
pub const DOWN_PAYMENT_RATE: f64 = 0.15;
