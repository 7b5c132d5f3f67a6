//! Letter grades for total scores.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Letter grade, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Grade {
    S,
    A,
    B,
    C,
    D,
    F,
}

/// Lower bound (inclusive) of each grade, checked from the top down.
pub const GRADE_THRESHOLDS: [(f64, Grade); 5] = [
    (9.0, Grade::S),
    (8.0, Grade::A),
    (6.5, Grade::B),
    (5.0, Grade::C),
    (3.0, Grade::D),
];

impl Grade {
    /// All grades, best first.
    pub const ALL: [Grade; 6] = [Grade::S, Grade::A, Grade::B, Grade::C, Grade::D, Grade::F];

    /// Classify a total score. A score exactly on a threshold takes the higher grade.
    pub fn from_score(total_score: f64) -> Grade {
        GRADE_THRESHOLDS
            .iter()
            .find(|(min, _)| total_score >= *min)
            .map(|(_, grade)| *grade)
            .unwrap_or(Grade::F)
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Grade::S => "S",
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(letter)
    }
}

impl FromStr for Grade {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "S" => Ok(Grade::S),
            "A" => Ok(Grade::A),
            "B" => Ok(Grade::B),
            "C" => Ok(Grade::C),
            "D" => Ok(Grade::D),
            "F" => Ok(Grade::F),
            other => Err(format!("unknown grade: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_boundaries_take_higher_grade() {
        assert_eq!(Grade::from_score(9.0), Grade::S);
        assert_eq!(Grade::from_score(8.0), Grade::A);
        assert_eq!(Grade::from_score(6.5), Grade::B);
        assert_eq!(Grade::from_score(5.0), Grade::C);
        assert_eq!(Grade::from_score(3.0), Grade::D);
    }

    #[test]
    fn just_below_boundaries() {
        assert_eq!(Grade::from_score(8.99), Grade::A);
        assert_eq!(Grade::from_score(7.9), Grade::B);
        assert_eq!(Grade::from_score(6.4), Grade::C);
        assert_eq!(Grade::from_score(4.9), Grade::D);
        assert_eq!(Grade::from_score(2.9), Grade::F);
    }

    #[test]
    fn extremes() {
        assert_eq!(Grade::from_score(10.0), Grade::S);
        assert_eq!(Grade::from_score(0.0), Grade::F);
    }

    #[test]
    fn display_and_parse() {
        for g in Grade::ALL {
            assert_eq!(g.to_string().parse::<Grade>().unwrap(), g);
        }
        assert!("E".parse::<Grade>().is_err());
    }
}
