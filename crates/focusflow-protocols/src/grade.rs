//! Reading grade levels.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GradeError;

/// Target reading level for simplification.
///
/// Only the values in [`Grade::ALL`] are representable. Serialized as a bare
/// integer, which is also what the remote service expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Grade(u8);

impl Grade {
    /// Every supported grade, in the order background precompute visits them.
    pub const ALL: [Grade; 6] = [Grade(2), Grade(3), Grade(4), Grade(5), Grade(6), Grade(8)];

    pub const DEFAULT: Grade = Grade(3);

    pub fn new(value: u8) -> Result<Self, GradeError> {
        Self::try_from(i64::from(value))
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Early-reader grades get the harsher fallback rules.
    pub fn is_early_reader(self) -> bool {
        self.0 <= 4
    }

    /// All grades except `self`, in [`Grade::ALL`] order.
    pub fn others(self) -> Vec<Grade> {
        Self::ALL.into_iter().filter(|g| *g != self).collect()
    }
}

impl Default for Grade {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl TryFrom<i64> for Grade {
    type Error = GradeError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|g| i64::from(g.0) == value)
            .ok_or(GradeError::OutOfSet(value))
    }
}

impl TryFrom<u8> for Grade {
    type Error = GradeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl FromStr for Grade {
    type Err = GradeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: i64 = s
            .trim()
            .parse()
            .map_err(|_| GradeError::Unparseable(s.to_string()))?;
        Self::try_from(value)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
