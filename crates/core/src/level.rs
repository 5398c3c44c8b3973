use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// One of the four administrative tiers, ordered parent-first.
///
/// Codes are strictly hierarchical: a child's code is always prefixed by
/// its parent's code (province 2 digits, regency 5, district 8, village 13).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Province,
    Regency,
    District,
    Village,
}

impl Level {
    /// All levels in required processing order (ancestors before children).
    pub const ALL: [Level; 4] = [
        Level::Province,
        Level::Regency,
        Level::District,
        Level::Village,
    ];

    /// Fixed width of canonical codes at this level.
    pub fn code_width(self) -> usize {
        match self {
            Level::Province => 2,
            Level::Regency => 5,
            Level::District => 8,
            Level::Village => 13,
        }
    }

    /// The immediate parent level, if any.
    pub fn parent(self) -> Option<Level> {
        match self {
            Level::Province => None,
            Level::Regency => Some(Level::Province),
            Level::District => Some(Level::Regency),
            Level::Village => Some(Level::District),
        }
    }

    /// Ancestor levels from province down to the immediate parent.
    pub fn ancestors(self) -> &'static [Level] {
        match self {
            Level::Province => &[],
            Level::Regency => &[Level::Province],
            Level::District => &[Level::Province, Level::Regency],
            Level::Village => &[Level::Province, Level::Regency, Level::District],
        }
    }

    /// Name of the canonical reference table for this level.
    pub fn table(self) -> &'static str {
        match self {
            Level::Province => "provinces",
            Level::Regency => "regencies",
            Level::District => "districts",
            Level::Village => "villages",
        }
    }

    /// Raw attribute keys carried by source features for this level:
    /// `(code_key, name_key)`, as they appear in the shapefile attributes.
    pub fn raw_keys(self) -> (&'static str, &'static str) {
        match self {
            Level::Province => ("KODE_PROV", "PROVINSI"),
            Level::Regency => ("KODE_KK", "KAB_KOTA"),
            Level::District => ("KODE_KEC", "KECAMATAN"),
            Level::Village => ("KODE_KD", "NAME"),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Level::Province => "province",
            Level::Regency => "regency",
            Level::District => "district",
            Level::Village => "village",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The level argument was not one of the four known tiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseLevelError(pub String);

impl fmt::Display for ParseLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid level '{}' (expected provinces, regencies, districts, or villages)",
            self.0
        )
    }
}

impl std::error::Error for ParseLevelError {}

impl FromStr for Level {
    type Err = ParseLevelError;

    /// Accepts both singular and plural spellings (`regency` / `regencies`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "province" | "provinces" => Ok(Level::Province),
            "regency" | "regencies" => Ok(Level::Regency),
            "district" | "districts" => Ok(Level::District),
            "village" | "villages" => Ok(Level::Village),
            _ => Err(ParseLevelError(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_widths_are_hierarchical() {
        let mut prev = 0;
        for level in Level::ALL {
            assert!(level.code_width() > prev);
            prev = level.code_width();
        }
    }

    #[test]
    fn ancestors_ordered_province_first() {
        assert_eq!(
            Level::Village.ancestors(),
            &[Level::Province, Level::Regency, Level::District]
        );
        assert!(Level::Province.ancestors().is_empty());
    }

    #[test]
    fn parse_accepts_plural_and_singular() {
        assert_eq!("regencies".parse::<Level>().unwrap(), Level::Regency);
        assert_eq!("village".parse::<Level>().unwrap(), Level::Village);
        assert_eq!("PROVINCES".parse::<Level>().unwrap(), Level::Province);
        assert!("county".parse::<Level>().is_err());
    }

    #[test]
    fn display_matches_as_str() {
        assert_eq!(Level::District.to_string(), "district");
    }
}
