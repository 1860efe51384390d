use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of uniform picks. Everything random in the game goes through this
/// so tests can pin the outcome.
pub trait RandomSource {
    /// Returns an index in `0..len`. `len` is never zero.
    fn next_index(&mut self, len: usize) -> usize;
}

/// Picks from the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct ThreadRandom;

impl RandomSource for ThreadRandom {
    fn next_index(&mut self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

/// Reproducible picks for `--seed` runs.
#[derive(Debug, Clone)]
pub struct SeededRandom {
    rng: StdRng,
}

impl SeededRandom {
    pub fn new(seed: u64) -> Self {
        Self { rng: StdRng::seed_from_u64(seed) }
    }
}

impl RandomSource for SeededRandom {
    fn next_index(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }
}

/// Seeded when `seed` is given, thread-local otherwise.
pub fn random_source(seed: Option<u64>) -> Box<dyn RandomSource + Send> {
    match seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    }
}

/// Choose one element of a slice, `None` when it is empty.
pub fn pick<'a, T>(items: &'a [T], rng: &mut dyn RandomSource) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    items.get(rng.next_index(items.len()))
}

/// Trim and lowercase a typed word.
pub fn normalize_word(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Generate a device-style user id: `user_<9 base36 chars>_<unix millis>`.
pub fn generate_user_id(rng: &mut dyn RandomSource) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let tag: String = (0..9)
        .map(|_| ALPHABET[rng.next_index(ALPHABET.len())] as char)
        .collect();
    format!("user_{}_{}", tag, chrono::Utc::now().timestamp_millis())
}
