use anyhow::{Context, Result, bail};
use bincode::{Decode, Encode, config::Configuration};
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{BufReader, BufWriter, ErrorKind},
    path::{Path, PathBuf},
    time::{SystemTime, UNIX_EPOCH},
};
use tracing::info;

const STORE_VERSION: u32 = 1;
const BINCODE_CONFIG: Configuration = bincode::config::standard();

/// One stored book: pre-split words plus reading progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub words: Vec<String>,
    pub progress_index: usize,
    /// Unix seconds.
    pub added_at: u64,
    pub last_read: u64,
}

impl Book {
    /// Whole-percent reading progress, 0 for an empty book.
    pub fn progress_percent(&self) -> u32 {
        if self.words.is_empty() {
            return 0;
        }
        ((self.progress_index as f64 / self.words.len() as f64) * 100.0).round() as u32
    }
}

#[derive(Encode, Decode)]
struct StoreRecord {
    version: u32,
    next_id: u64,
    books: Vec<Book>,
}

/// File-backed bookshelf. Ids auto-increment and survive deletes; every
/// mutation is flushed with a tmp-file + rename write.
#[derive(Debug)]
pub struct BookStore {
    path: PathBuf,
    next_id: u64,
    books: Vec<Book>,
}

impl BookStore {
    /// Opens the store at `path`; a missing file is an empty shelf, a corrupt
    /// one is an error for the caller to decide about.
    pub fn open(path: &Path) -> Result<Self> {
        let file = match File::open(path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Ok(Self {
                    path: path.to_path_buf(),
                    next_id: 1,
                    books: Vec::new(),
                });
            }
            Err(err) => return Err(err).context("Failed to open book store"),
        };
        let mut input = BufReader::new(file);
        let record: StoreRecord = bincode::decode_from_std_read(&mut input, BINCODE_CONFIG)
            .context("Failed to decode book store")?;
        if record.version != STORE_VERSION {
            bail!(
                "Unsupported book store version: expected {STORE_VERSION}, found {}",
                record.version
            );
        }
        info!("Opened book store with {} books", record.books.len());
        Ok(Self {
            path: path.to_path_buf(),
            next_id: record.next_id,
            books: record.books,
        })
    }

    /// Adds a book and returns its id. Empty content is rejected.
    pub fn add(&mut self, title: &str, author: &str, words: Vec<String>) -> Result<u64> {
        if words.is_empty() {
            bail!("No text found in file");
        }
        let now = unix_now();
        let id = self.next_id;
        self.next_id += 1;
        self.books.push(Book {
            id,
            title: if title.is_empty() { "Untitled".into() } else { title.into() },
            author: if author.is_empty() { "Unknown".into() } else { author.into() },
            words,
            progress_index: 0,
            added_at: now,
            last_read: now,
        });
        self.flush()?;
        Ok(id)
    }

    pub fn get(&self, id: u64) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    /// All books, newest first.
    pub fn all(&self) -> Vec<&Book> {
        self.books.iter().rev().collect()
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Records how far the reader got; touches the last-read stamp.
    pub fn update_progress(&mut self, id: u64, index: usize) -> Result<()> {
        let Some(book) = self.books.iter_mut().find(|book| book.id == id) else {
            bail!("No book with id {id}");
        };
        book.progress_index = index.min(book.words.len());
        book.last_read = unix_now();
        self.flush()
    }

    pub fn delete(&mut self, id: u64) -> Result<()> {
        self.books.retain(|book| book.id != id);
        self.flush()
    }

    fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let record = StoreRecord {
            version: STORE_VERSION,
            next_id: self.next_id,
            books: self.books.clone(),
        };
        let tmp_path = self.path.with_extension("rsvptmp");
        {
            let output = File::create(&tmp_path).context("Failed to create book store file")?;
            let mut output = BufWriter::new(output);
            bincode::encode_into_std_write(&record, &mut output, BINCODE_CONFIG)
                .context("Failed to encode book store")?;
        }
        fs::rename(&tmp_path, &self.path).context("Failed to rename book store file")?;
        Ok(())
    }
}

/// Splits raw text into reader words: plain whitespace split, empties dropped.
pub fn process_text(text: &str) -> Vec<String> {
    text.split_whitespace().map(str::to_string).collect()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_secs())
        .unwrap_or(0)
}
