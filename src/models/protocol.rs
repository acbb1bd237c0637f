use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QaError;

/// GLOBE measurement protocols understood by the quality checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Protocol {
    SkyConditions,
    LandCovers,
    MosquitoHabitatMapper,
    TreeHeights,
}

impl Protocol {
    pub const ALL: [Protocol; 4] = [
        Protocol::SkyConditions,
        Protocol::LandCovers,
        Protocol::MosquitoHabitatMapper,
        Protocol::TreeHeights,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::SkyConditions => "sky_conditions",
            Protocol::LandCovers => "land_covers",
            Protocol::MosquitoHabitatMapper => "mosquito_habitat_mapper",
            Protocol::TreeHeights => "tree_heights",
        }
    }

    /// Prefix the GLOBE API puts in front of protocol-specific property names,
    /// e.g. `skyconditions` for `sky_conditions`.
    pub fn key_prefix(&self) -> String {
        self.as_str().replace('_', "")
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = QaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::ALL
            .into_iter()
            .find(|p| p.as_str() == s.trim())
            .ok_or_else(|| QaError::InvalidProtocol(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_prefix_strips_underscores() {
        assert_eq!(Protocol::SkyConditions.key_prefix(), "skyconditions");
        assert_eq!(
            Protocol::MosquitoHabitatMapper.key_prefix(),
            "mosquitohabitatmapper"
        );
        assert_eq!(Protocol::TreeHeights.key_prefix(), "treeheights");
    }

    #[test]
    fn test_parse_protocol() {
        assert_eq!(
            "land_covers".parse::<Protocol>().unwrap(),
            Protocol::LandCovers
        );
        assert!("hydrology".parse::<Protocol>().is_err());
    }
}
