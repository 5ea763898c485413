#![forbid(unsafe_code)]

//! Caller-facing size values.
//!
//! Callers describe overlay widths either as an absolute number of cells or
//! as a percentage of the space available to the overlay. A [`Dimension`] is
//! resolved against the available extent at render time and never resolves to
//! more than that extent.

use std::fmt;

/// A length that is either absolute or relative to the available extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    /// Absolute number of cells.
    Cells(u16),
    /// Percentage of the available extent (values above 100 are treated as 100).
    Percent(u8),
}

impl Dimension {
    /// Resolve to cells against `available`.
    pub fn resolve(self, available: u16) -> u16 {
        match self {
            Self::Cells(cells) => cells.min(available),
            Self::Percent(percent) => {
                let percent = u32::from(percent.min(100));
                (u32::from(available) * percent / 100) as u16
            }
        }
    }
}

impl From<u16> for Dimension {
    fn from(cells: u16) -> Self {
        Self::Cells(cells)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cells(cells) => write!(f, "{cells}"),
            Self::Percent(percent) => write!(f, "{percent}%"),
        }
    }
}

/// Error returned when parsing a [`Dimension`] from text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseDimensionError {
    input: String,
}

impl fmt::Display for ParseDimensionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "invalid dimension {:?}: expected cells (\"40\") or a percentage (\"50%\")",
            self.input
        )
    }
}

impl std::error::Error for ParseDimensionError {}

impl std::str::FromStr for Dimension {
    type Err = ParseDimensionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let err = || ParseDimensionError {
            input: s.to_string(),
        };
        if let Some(percent) = trimmed.strip_suffix('%') {
            let value: u8 = percent.trim().parse().map_err(|_| err())?;
            if value > 100 {
                return Err(err());
            }
            return Ok(Self::Percent(value));
        }
        trimmed.parse().map(Self::Cells).map_err(|_| err())
    }
}
