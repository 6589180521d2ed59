//! Customer type selection (individual vs business).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CustomerType {
    #[default]
    Individual,
    Business,
}

impl CustomerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Business => "business",
        }
    }

    pub fn is_business(&self) -> bool {
        matches!(self, Self::Business)
    }

    /// Lenient parse used for UI selections: anything unrecognised is individual.
    pub fn from_selection(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl FromStr for CustomerType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "business" => Ok(Self::Business),
            other => Err(TypesError::UnknownCustomerType(other.to_string())),
        }
    }
}

impl fmt::Display for CustomerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("Business".parse::<CustomerType>().unwrap(), CustomerType::Business);
        assert_eq!(" INDIVIDUAL ".parse::<CustomerType>().unwrap(), CustomerType::Individual);
    }

    #[test]
    fn unknown_selection_falls_back_to_individual() {
        assert_eq!(CustomerType::from_selection(Some("sole-trader")), CustomerType::Individual);
        assert_eq!(CustomerType::from_selection(None), CustomerType::Individual);
    }
}
