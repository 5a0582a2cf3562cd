// src/quiz/ranking.rs

use crate::models::answer::Direction;

/// Working order for the ranked-list question.
///
/// Seeded lazily the first time the ranked question becomes current and never
/// re-seeded while it holds items, even if the source answer changes later.
#[derive(Debug, Clone, Default)]
pub struct Ranking {
    items: Vec<String>,
}

impl Ranking {
    pub fn items(&self) -> &[String] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Fills the list from `source` unless it already holds items.
    /// Returns true if a seed happened.
    pub fn seed_with<I>(&mut self, source: I) -> bool
    where
        I: IntoIterator<Item = String>,
    {
        if !self.items.is_empty() {
            return false;
        }
        self.items = source.into_iter().collect();
        !self.items.is_empty()
    }

    /// Swaps `index` with its neighbour. Out-of-range moves leave the list untouched.
    pub fn swap(&mut self, index: usize, direction: Direction) -> bool {
        let neighbour = match direction {
            Direction::Up => index.checked_sub(1),
            Direction::Down => index.checked_add(1),
        };

        match neighbour {
            Some(other) if index < self.items.len() && other < self.items.len() => {
                self.items.swap(index, other);
                true
            }
            _ => false,
        }
    }
}
