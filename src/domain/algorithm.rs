//! Decision tree algorithms whose models drive the classifier.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::TreeTraderError;
use crate::domain::record::{parse_symbol, Symbolic};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DecisionTreeAlgorithm {
    Id3,
    C45,
    C50,
}

impl Symbolic for DecisionTreeAlgorithm {
    const SYMBOLS: &'static [(&'static str, Self)] = &[
        ("ID3", DecisionTreeAlgorithm::Id3),
        ("C45", DecisionTreeAlgorithm::C45),
        ("C50", DecisionTreeAlgorithm::C50),
    ];

    fn symbol(self) -> &'static str {
        match self {
            DecisionTreeAlgorithm::Id3 => "ID3",
            DecisionTreeAlgorithm::C45 => "C45",
            DecisionTreeAlgorithm::C50 => "C50",
        }
    }
}

impl fmt::Display for DecisionTreeAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for DecisionTreeAlgorithm {
    type Err = TreeTraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_symbol(s).map_err(|_| TreeTraderError::UnsupportedAlgorithm {
            algorithm: s.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_known_names() {
        assert_eq!("C45".parse::<DecisionTreeAlgorithm>().unwrap(), DecisionTreeAlgorithm::C45);
        assert_eq!("c50".parse::<DecisionTreeAlgorithm>().unwrap(), DecisionTreeAlgorithm::C50);
        assert_eq!("id3".parse::<DecisionTreeAlgorithm>().unwrap(), DecisionTreeAlgorithm::Id3);
    }

    #[test]
    fn unknown_name_is_unsupported() {
        let err = "CART".parse::<DecisionTreeAlgorithm>().unwrap_err();
        assert!(matches!(
            err,
            TreeTraderError::UnsupportedAlgorithm { ref algorithm } if algorithm == "CART"
        ));
    }

    #[test]
    fn display_round_trips_through_file_names() {
        assert_eq!(format!("A{}", DecisionTreeAlgorithm::C45), "AC45");
    }
}
