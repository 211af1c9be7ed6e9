use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;

/// Used when a name has no ASCII alphanumerics left to build a slug from.
const FALLBACK_SLUG_BASE: &str = "recept";

/// Lower-cases `name` and collapses every run of characters outside
/// `[a-z0-9]` into one hyphen, without leading or trailing hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut pending_hyphen = false;

    for c in name.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(c);
        } else {
            pending_hyphen = true;
        }
    }

    slug
}

/// Slug source for created recipes: `slugify(name)` plus a wall-clock
/// millisecond suffix that never repeats within the process.
#[derive(Debug, Default)]
pub struct SlugGenerator {
    last: AtomicU64,
}

impl SlugGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    fn next_suffix(&self) -> u64 {
        let now = Utc::now().timestamp_millis().max(0) as u64;
        let mut current = self.last.load(Ordering::Relaxed);
        loop {
            let next = now.max(current + 1);
            match self
                .last
                .compare_exchange_weak(current, next, Ordering::Relaxed, Ordering::Relaxed)
            {
                Ok(_) => return next,
                Err(actual) => current = actual,
            }
        }
    }

    pub fn generate(&self, name: &str) -> String {
        let base = slugify(name);
        let base = if base.is_empty() {
            FALLBACK_SLUG_BASE
        } else {
            base.as_str()
        };

        format!("{base}-{}", self.next_suffix())
    }
}
