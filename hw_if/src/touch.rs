//! # Touch pattern module
//!
//! The touch hardware decodes finger gestures into a small integer code. The meaning of a code
//! depends on the robot's current mode, so this module only validates the code range.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt, str::FromStr};
use thiserror::Error;

// ------------------------------------------------------------------------------------------------
// CONSTANTS
// ------------------------------------------------------------------------------------------------

/// Lowest valid touch pattern code.
pub const MIN_TOUCH_CODE: u8 = 1;

/// Highest valid touch pattern code.
pub const MAX_TOUCH_CODE: u8 = 7;

// ------------------------------------------------------------------------------------------------
// DATA STRUCTURES
// ------------------------------------------------------------------------------------------------

/// A validated touch pattern code in the range `[MIN_TOUCH_CODE, MAX_TOUCH_CODE]`.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct TouchPattern(u8);

// ------------------------------------------------------------------------------------------------
// ENUMERATIONS
// ------------------------------------------------------------------------------------------------

/// Possible touch pattern decoding errors.
#[derive(Debug, Error, Eq, PartialEq)]
pub enum TouchPatternError {
    #[error(
        "Touch code {0} is out of range, expected a value between {} and {}",
        MIN_TOUCH_CODE,
        MAX_TOUCH_CODE
    )]
    OutOfRange(u8),

    #[error("Could not parse touch code from \"{0}\"")]
    InvalidFormat(String),
}

// ------------------------------------------------------------------------------------------------
// IMPLEMENTATIONS
// ------------------------------------------------------------------------------------------------

impl TouchPattern {
    /// Get the raw code.
    pub fn code(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for TouchPattern {
    type Error = TouchPatternError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        if (MIN_TOUCH_CODE..=MAX_TOUCH_CODE).contains(&code) {
            Ok(TouchPattern(code))
        } else {
            Err(TouchPatternError::OutOfRange(code))
        }
    }
}

impl From<TouchPattern> for u8 {
    fn from(pattern: TouchPattern) -> Self {
        pattern.0
    }
}

impl FromStr for TouchPattern {
    type Err = TouchPatternError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code: u8 = s
            .trim()
            .parse()
            .map_err(|_| TouchPatternError::InvalidFormat(s.to_string()))?;

        TouchPattern::try_from(code)
    }
}

impl fmt::Display for TouchPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_code_range() {
        assert_eq!(TouchPattern::try_from(0), Err(TouchPatternError::OutOfRange(0)));
        assert_eq!(TouchPattern::try_from(8), Err(TouchPatternError::OutOfRange(8)));

        for code in MIN_TOUCH_CODE..=MAX_TOUCH_CODE {
            assert_eq!(TouchPattern::try_from(code).unwrap().code(), code);
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(" 5 ".parse::<TouchPattern>().unwrap().code(), 5);
        assert_eq!(
            "9".parse::<TouchPattern>(),
            Err(TouchPatternError::OutOfRange(9))
        );
        assert_eq!(
            "five".parse::<TouchPattern>(),
            Err(TouchPatternError::InvalidFormat("five".to_string()))
        );
    }

    #[test]
    fn test_deserialise_rejects_bad_code() {
        assert!(serde_json::from_str::<TouchPattern>("3").is_ok());
        assert!(serde_json::from_str::<TouchPattern>("12").is_err());
    }
}
