//! Counts whitespace-separated words read from stdin and prints one
//! `count word` line per distinct word.
//!
//! ```text
//! cargo run --example word_count < some.txt | sort -r | head
//! ```
use prime_hashmap::{FnOps, PrimeHashMap, PutError, Resolution};
use std::cmp::Ordering;
use std::io::{self, BufRead, BufWriter, Write};

// Longest word in bytes; longer runs are counted as several words, like a
// fixed-width scan field.
const MAX_WORD: usize = 128;

#[derive(Debug)]
struct Entry {
    hash: u64,
    word: String,
    count: u32,
}

impl Entry {
    fn new(word: &str) -> Self {
        Entry {
            hash: djb2(word),
            word: word.to_string(),
            count: 0,
        }
    }
}

/// Splits `word` into pieces of at most `MAX_WORD` bytes, cutting only on
/// char boundaries.
fn pieces(word: &str) -> impl Iterator<Item = &str> {
    let mut rest = word;
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let mut end = rest.len().min(MAX_WORD);
        while !rest.is_char_boundary(end) {
            end -= 1;
        }
        let (piece, tail) = rest.split_at(end);
        rest = tail;
        Some(piece)
    })
}

// http://www.cse.yorku.ca/~oz/hash.html
fn djb2(s: &str) -> u64 {
    s.bytes()
        .fold(5381u64, |h, c| h.wrapping_mul(33).wrapping_add(c as u64))
}

fn compare(a: &Entry, b: &Entry) -> Ordering {
    a.hash.cmp(&b.hash).then_with(|| a.word.cmp(&b.word))
}

fn hash(e: &Entry) -> u64 {
    e.hash
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let mut counts = PrimeHashMap::with_ops(FnOps::new(compare, hash));

    let stdin = io::stdin();
    'read: for line in stdin.lock().lines() {
        for word in line?.split_whitespace().flat_map(pieces) {
            match counts.put(Entry::new(word), Resolution::Find) {
                Ok(out) => out.into_stored().count += 1,
                Err(PutError { error, .. }) => {
                    eprintln!("word_count: stopping early: {error}");
                    break 'read;
                }
            }
        }
    }

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    for e in &counts {
        writeln!(out, "{:05} {}", e.count, e.word)?;
    }
    out.flush()?;
    Ok(())
}
