use crate::store::Book;
use std::time::Duration;

/// Progress is reported back to the store every this many words, so a long
/// session doesn't hammer the disk.
pub const SAVE_EVERY: usize = 50;
const SKIP_WORDS: usize = 10;

/// One displayed word split at its optimal recognition point: the pivot
/// character the eye should land on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub pre: String,
    pub pivot: char,
    pub post: String,
}

/// Outcome of one pacer step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tick {
    /// Show this frame. `save` carries the progress index to persist when a
    /// checkpoint is due.
    Word { frame: Frame, save: Option<usize> },
    /// The book is finished; persist the final index. The cursor rewinds to
    /// the start for the next session.
    Finished { save: usize },
}

/// The RSVP pacer: a pure word-array walker. The caller owns the clock and
/// calls [`advance`](Reader::advance) once per [`tick_interval`](Reader::tick_interval).
#[derive(Debug, Clone)]
pub struct Reader {
    words: Vec<String>,
    index: usize,
    wpm: u32,
}

impl Reader {
    pub fn new(words: Vec<String>, start_index: usize, wpm: u32) -> Self {
        let index = start_index.min(words.len());
        Self {
            words,
            index,
            wpm: wpm.max(1),
        }
    }

    /// Resumes a stored book at its saved progress. A book that was finished
    /// starts over from the top.
    pub fn resume(book: &Book, wpm: u32) -> Self {
        let start = if book.progress_index >= book.words.len() {
            0
        } else {
            book.progress_index
        };
        Self::new(book.words.clone(), start, wpm)
    }

    /// Time between words at the current pace: 60s divided by words/minute.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_secs_f64(60.0 / f64::from(self.wpm))
    }

    pub fn wpm(&self) -> u32 {
        self.wpm
    }

    pub fn set_wpm(&mut self, wpm: u32) {
        self.wpm = wpm.max(1);
    }

    pub fn position(&self) -> usize {
        self.index
    }

    pub fn is_finished(&self) -> bool {
        self.index >= self.words.len()
    }

    /// Steps one word forward.
    pub fn advance(&mut self) -> Tick {
        if self.index < self.words.len() {
            let frame = orp_frame(&self.words[self.index]);
            self.index += 1;
            let save = (self.index % SAVE_EVERY == 0).then_some(self.index);
            Tick::Word { frame, save }
        } else {
            let save = self.words.len();
            self.index = 0;
            Tick::Finished { save }
        }
    }

    /// Frame for the word under the cursor, without advancing.
    pub fn frame(&self) -> Option<Frame> {
        self.words.get(self.index).map(|word| orp_frame(word))
    }

    /// Jumps to a percentage of the book; out-of-range input is clamped.
    pub fn seek(&mut self, percent: f64) {
        let fraction = (percent / 100.0).clamp(0.0, 1.0);
        self.index = ((fraction * self.words.len() as f64) as usize).min(self.words.len());
    }

    pub fn rewind(&mut self) {
        self.index = self.index.saturating_sub(SKIP_WORDS);
    }

    pub fn forward(&mut self) {
        if self.words.is_empty() {
            return;
        }
        self.index = (self.index + SKIP_WORDS).min(self.words.len() - 1);
    }

    /// Whole-percent position in the book.
    pub fn progress(&self) -> f64 {
        if self.words.is_empty() {
            return 0.0;
        }
        (self.index as f64 / self.words.len() as f64) * 100.0
    }

    /// Estimated minutes to finish at the current pace, rounded up.
    pub fn minutes_left(&self) -> u32 {
        let words_left = self.words.len().saturating_sub(self.index);
        (words_left as f64 / f64::from(self.wpm)).ceil() as u32
    }
}

/// Splits a word at the middle character, the simple ORP heuristic.
fn orp_frame(word: &str) -> Frame {
    let chars: Vec<char> = word.chars().collect();
    if chars.is_empty() {
        return Frame {
            pre: String::new(),
            pivot: ' ',
            post: String::new(),
        };
    }
    let middle = chars.len() / 2;
    Frame {
        pre: chars[..middle].iter().collect(),
        pivot: chars[middle],
        post: chars[middle + 1..].iter().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(count: usize) -> Vec<String> {
        (0..count).map(|i| format!("word{i}")).collect()
    }

    #[test]
    fn pace_of_300_wpm_is_200ms() {
        let reader = Reader::new(words(10), 0, 300);
        assert_eq!(reader.tick_interval().as_millis(), 200);
    }

    #[test]
    fn wpm_floor_prevents_a_stalled_interval() {
        let reader = Reader::new(words(1), 0, 0);
        assert_eq!(reader.wpm(), 1);
    }

    #[test]
    fn orp_pivot_is_the_middle_character() {
        let frame = orp_frame("reading");
        assert_eq!(frame.pre, "rea");
        assert_eq!(frame.pivot, 'd');
        assert_eq!(frame.post, "ing");

        let tiny = orp_frame("a");
        assert_eq!(tiny.pre, "");
        assert_eq!(tiny.pivot, 'a');
        assert_eq!(tiny.post, "");
    }

    #[test]
    fn save_checkpoint_every_fifty_words() {
        let mut reader = Reader::new(words(120), 0, 300);
        let mut checkpoints = Vec::new();
        for _ in 0..120 {
            match reader.advance() {
                Tick::Word { save: Some(index), .. } => checkpoints.push(index),
                Tick::Word { .. } => {}
                Tick::Finished { .. } => panic!("finished early"),
            }
        }
        assert_eq!(checkpoints, [50, 100]);
        assert_eq!(reader.advance(), Tick::Finished { save: 120 });
        // The cursor rewound for the next session.
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn resume_restarts_a_finished_book() {
        let book = Book {
            id: 1,
            title: "T".into(),
            author: "A".into(),
            words: words(5),
            progress_index: 5,
            added_at: 0,
            last_read: 0,
        };
        let reader = Reader::resume(&book, 300);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn seek_clamps_and_tracks_percent() {
        let mut reader = Reader::new(words(200), 0, 300);
        reader.seek(50.0);
        assert_eq!(reader.position(), 100);
        assert_eq!(reader.progress(), 50.0);
        reader.seek(150.0);
        assert_eq!(reader.position(), 200);
        reader.seek(-10.0);
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn rewind_and_forward_skip_ten_words() {
        let mut reader = Reader::new(words(30), 15, 300);
        reader.rewind();
        assert_eq!(reader.position(), 5);
        reader.rewind();
        assert_eq!(reader.position(), 0);
        reader.forward();
        assert_eq!(reader.position(), 10);
        reader.seek(100.0);
        reader.forward();
        // Forward never runs past the last word.
        assert_eq!(reader.position(), 29);
    }

    #[test]
    fn minutes_left_rounds_up() {
        let reader = Reader::new(words(301), 0, 300);
        assert_eq!(reader.minutes_left(), 2);
    }
}
