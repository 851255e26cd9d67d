use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
pub struct Cli {
    /// Listings feed (JSON array) to browse.
    #[clap(long, default_value = "cars.json")]
    pub data: PathBuf,
    /// Preferences blob; persona and shortlist are restored from here on
    /// start and saved on exit.
    #[clap(long, default_value = ".carvault-prefs")]
    pub prefs: PathBuf,
}
