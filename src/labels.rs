use std::fmt;

use rand::Rng;

use crate::matrix::Matrix;

/// Categories the shipped network was trained on, in output-row order.
pub const DEFAULT_LABELS: [&str; 7] = [
    "Banana", "Car", "Human", "Smiley", "Flower", "Crown", "Pants",
];

/// Category names index-aligned with the rows of a network's output.
///
/// Besides the fixed order used for predictions it keeps a pool of names
/// still to be drawn in the current game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRegistry {
    labels: Vec<String>,
    remaining: Vec<String>,
}

impl Default for LabelRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_LABELS)
    }
}

impl LabelRegistry {
    pub fn new<I, S>(labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        Self {
            remaining: labels.clone(),
            labels,
        }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    /// Name of the strongest row of a network output.
    pub fn label_for(&self, output: &Matrix) -> Option<&str> {
        self.label(output.argmax_row()?)
    }

    pub fn remaining(&self) -> &[String] {
        &self.remaining
    }

    /// A random name from the pool, taken out of it when `remove` is set.
    /// `None` once the pool is exhausted.
    pub fn random_next<R: Rng + ?Sized>(&mut self, rng: &mut R, remove: bool) -> Option<String> {
        if self.remaining.is_empty() {
            return None;
        }

        let index = rng.gen_range(0..self.remaining.len());
        if remove {
            Some(self.remaining.remove(index))
        } else {
            Some(self.remaining[index].clone())
        }
    }

    /// Refills the pool for a new game.
    pub fn reset(&mut self) {
        self.remaining = self.labels.clone();
    }
}

impl fmt::Display for LabelRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for name in &self.remaining {
            write!(f, "[{name}]")?;
        }
        Ok(())
    }
}
