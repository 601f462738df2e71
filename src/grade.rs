//! ISO letter grades and the single numeric-to-letter bucketer.
//!
//! Every adapter derives letters through [`letter_for`]; nothing else in the
//! crate maps numbers to letters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// ISO-style symbol grade letter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Letter {
    A,
    B,
    C,
    D,
    F,
}

impl Letter {
    pub fn as_str(&self) -> &'static str {
        match self {
            Letter::A => "A",
            Letter::B => "B",
            Letter::C => "C",
            Letter::D => "D",
            Letter::F => "F",
        }
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a numeric grade (0.0 to 4.0) to its letter.
///
/// The bucket is chosen by the integer part, so values between the
/// documented edges (0.95, 1.95, 2.95, 3.95) fall into the lower letter.
/// Only exactly 4.0 earns an A. Negative sentinels, NaN and anything above
/// 4.0 grade as F.
pub fn letter_for(value: f64) -> Letter {
    if value == 4.0 {
        Letter::A
    } else if (3.0..4.0).contains(&value) {
        Letter::B
    } else if (2.0..3.0).contains(&value) {
        Letter::C
    } else if (1.0..2.0).contains(&value) {
        Letter::D
    } else {
        Letter::F
    }
}

/// A numeric grade together with its derived letter.
///
/// The letter is never stored independently: construction and
/// deserialization both run the value through [`letter_for`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "GradeRecord")]
pub struct Grade {
    value: f64,
    letter: Letter,
}

#[derive(Deserialize)]
struct GradeRecord {
    value: f64,
}

impl From<GradeRecord> for Grade {
    fn from(record: GradeRecord) -> Self {
        Grade::new(record.value)
    }
}

impl Grade {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            letter: letter_for(value),
        }
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn letter(&self) -> Letter {
        self.letter
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1} ({})", self.value, self.letter)
    }
}
