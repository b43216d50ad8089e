//! # Touch script interpreter module
//!
//! This module provides an interpreter for touch scripts, allowing the touch gestures a user would
//! make to be replayed at fixed times. A script is a list of `<time_s>: <code>;` entries, for
//! example:
//!
//! ```text
//! # Enter calibration and bump the first servo twice
//! 0.5: 5;
//! 1.0: 4;
//! 1.5: 4;
//! ```

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// Internal
use crate::session::get_elapsed_seconds;
use hw_if::touch::{TouchPattern, TouchPatternError};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A touch which is scripted to occur at a specific time.
#[derive(Debug)]
pub struct ScriptedTouch {
    /// The time the touch is supposed to occur at
    exec_time_s: f64,

    /// The touch pattern
    pattern: TouchPattern,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use `.get_pending_touches` to acquire
/// a list of touches that are due.
#[derive(Debug)]
pub struct ScriptInterpreter {
    script_path: Option<PathBuf>,
    touches: VecDeque<ScriptedTouch>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0:?}")]
    ScriptNotFound(PathBuf),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error("Script contains an invalid timestamp: {0}. Should be a float (like 1.0)")]
    InvalidTimestamp(String),

    #[error("Script contains an invalid touch at {0} s: {1}")]
    InvalidTouch(f64, TouchPatternError),

    #[error("Script timestamps must not decrease, found {1} s after {0} s")]
    OutOfOrder(f64, f64),
}

#[derive(Debug, PartialEq)]
pub enum PendingTouches {
    None,
    Some(Vec<TouchPattern>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ScriptInterpreter {
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(path));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let mut si = Self::from_script(&script)?;
        si.script_path = Some(path);

        Ok(si)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {
        let mut touches: VecDeque<ScriptedTouch> = VecDeque::new();

        // Comments run from `#` to the end of the line and are ignored by the pattern
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;#]*);")
            .multi_line(true)
            .build()
            .expect("touch script regex is valid");

        for cap in re.captures_iter(script) {
            let time_str = &cap[1];
            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|_| ScriptError::InvalidTimestamp(time_str.to_string()))?;

            let pattern: TouchPattern = cap[3]
                .parse()
                .map_err(|e| ScriptError::InvalidTouch(exec_time_s, e))?;

            if let Some(last) = touches.back() {
                if exec_time_s < last.exec_time_s {
                    return Err(ScriptError::OutOfOrder(last.exec_time_s, exec_time_s));
                }
            }

            touches.push_back(ScriptedTouch {
                exec_time_s,
                pattern,
            });
        }

        if touches.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            script_path: None,
            touches,
        })
    }

    /// Return the touches that are due at the current session time.
    pub fn get_pending_touches(&mut self) -> PendingTouches {
        self.get_pending_touches_at(get_elapsed_seconds())
    }

    /// Return the touches that are due at the given time.
    pub fn get_pending_touches_at(&mut self, current_time_s: f64) -> PendingTouches {
        if self.touches.is_empty() {
            return PendingTouches::EndOfScript;
        }

        let mut due = vec![];

        while let Some(t) = self.touches.front() {
            if t.exec_time_s > current_time_s {
                break;
            }
            due.push(t.pattern);
            self.touches.pop_front();
        }

        if due.is_empty() {
            PendingTouches::None
        } else {
            PendingTouches::Some(due)
        }
    }

    /// Get the number of touches remaining in the script
    pub fn get_num_touches(&self) -> usize {
        self.touches.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.touches.back() {
            Some(t) => t.exec_time_s,
            None => 0f64,
        }
    }

    /// Path the script was loaded from, if any.
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::convert::TryFrom;

    fn tp(code: u8) -> TouchPattern {
        TouchPattern::try_from(code).unwrap()
    }

    #[test]
    fn test_parse_and_replay() {
        let script = "# enter calibration\n0.5: 5;\n1.0: 4;\n1.0: 4; # twice\n2.25 : 2;\n";
        let mut si = ScriptInterpreter::from_script(script).unwrap();

        assert_eq!(si.get_num_touches(), 4);
        assert_eq!(si.get_duration(), 2.25);

        assert_eq!(si.get_pending_touches_at(0.1), PendingTouches::None);
        assert_eq!(si.get_pending_touches_at(0.5), PendingTouches::Some(vec![tp(5)]));
        assert_eq!(
            si.get_pending_touches_at(1.5),
            PendingTouches::Some(vec![tp(4), tp(4)])
        );
        assert_eq!(si.get_pending_touches_at(3.0), PendingTouches::Some(vec![tp(2)]));
        assert_eq!(si.get_pending_touches_at(3.0), PendingTouches::EndOfScript);
    }

    #[test]
    fn test_empty_script() {
        assert!(matches!(
            ScriptInterpreter::from_script("# nothing here\n"),
            Err(ScriptError::ScriptEmpty)
        ));
    }

    #[test]
    fn test_invalid_touch() {
        assert!(matches!(
            ScriptInterpreter::from_script("1.0: 9;"),
            Err(ScriptError::InvalidTouch(t, TouchPatternError::OutOfRange(9))) if t == 1.0
        ));
    }

    #[test]
    fn test_out_of_order() {
        assert!(matches!(
            ScriptInterpreter::from_script("2.0: 1;\n1.0: 2;"),
            Err(ScriptError::OutOfOrder(_, _))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            ScriptInterpreter::new("/nonexistent/script.hts"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
