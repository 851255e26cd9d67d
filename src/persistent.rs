use crate::shortlist::Shortlist;
use anyhow::{Context, Result, bail};
use bincode::{Decode, Encode, config::Configuration};
use listing_index::Persona;
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter},
    path::Path,
    str::FromStr,
    time::Instant,
};
use tracing::info;

const PREFS_VERSION: u32 = 1;
const BINCODE_CONFIG: Configuration = bincode::config::standard();

/// The session state that outlives a run: selected persona plus the
/// shortlist. The rest (facets, query, feed cursor) is ephemeral.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionPrefs {
    pub persona: Persona,
    pub shortlist: Shortlist,
}

#[derive(Encode, Decode)]
struct PrefsRecord {
    version: u32,
    persona: String,
    favorites: Vec<String>,
    compare: Vec<String>,
}

/// Reads the preferences blob. Callers treat any error as a fresh session.
pub fn read_prefs_from_file(path: &Path) -> Result<SessionPrefs> {
    let input = File::open(path).context("Failed to open prefs file")?;
    let mut input = BufReader::new(input);
    let record: PrefsRecord = bincode::decode_from_std_read(&mut input, BINCODE_CONFIG)
        .context("Failed to decode prefs")?;
    if record.version != PREFS_VERSION {
        bail!(
            "Unsupported prefs version: expected {PREFS_VERSION}, found {}",
            record.version
        );
    }
    let persona = Persona::from_str(&record.persona).unwrap_or_default();
    Ok(SessionPrefs {
        persona,
        shortlist: Shortlist::from_parts(record.favorites, record.compare),
    })
}

/// Writes the preferences blob atomically (tmp file + rename).
pub fn write_prefs_to_file(path: &Path, prefs: &SessionPrefs) -> Result<()> {
    let encode_time = Instant::now();
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let record = PrefsRecord {
        version: PREFS_VERSION,
        persona: prefs.persona.as_str().to_string(),
        favorites: prefs.shortlist.favorites(),
        compare: prefs.shortlist.compare().to_vec(),
    };
    let tmp_path = path.with_extension("cvtmp");
    {
        let output = File::create(&tmp_path).context("Failed to create prefs file")?;
        let mut output = BufWriter::new(output);
        bincode::encode_into_std_write(&record, &mut output, BINCODE_CONFIG)
            .context("Failed to encode prefs")?;
    }
    fs::rename(&tmp_path, path).context("Failed to rename prefs file")?;
    info!("Prefs write time: {:?}", encode_time.elapsed());
    Ok(())
}
