mod brief;
mod persistent;
mod session;
mod shortlist;

pub use brief::*;
pub use persistent::*;
pub use session::*;
pub use shortlist::*;
