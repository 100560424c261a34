//! # Error Types
//!
//! This module defines the error type shared by the chordbook model.
//!
//! ## Error Types
//! - `Validation` - A sequence measure breaks a structural invariant (1-indexed measure number)
//! - `InvalidSequence` - Sequence-wide settings are out of range (time signature, line size)
//! - `MeasureNotFound` - An edit addressed a measure id that is not in the sequence
//! - `BeatOutOfRange` - An edit addressed a beat position outside `1..=numerator`
//! - `InvalidEnding` - Ending brackets other than 1. and 2.
//! - `Template` - A chord template document could not be loaded
//! - `Parse` - A sequence or chord document could not be parsed
//!
//! ## Usage
//! ```rust
//! use chordbook_core::{parse_sequence, validate, ChordbookError};
//!
//! let sequence = parse_sequence("time_signature_numerator: 3\ntime_signature_denominator: 4\nmeasures_per_line: 4\n")?;
//! match validate(&sequence) {
//!     Ok(()) => println!("Sequence is well formed"),
//!     Err(ChordbookError::Validation { measure, message }) => {
//!         eprintln!("Measure {}: {}", measure, message);
//!     }
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! # Ok::<(), ChordbookError>(())
//! ```

use thiserror::Error;

use crate::ids::MeasureId;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ChordbookError {
    /// Structural error in a single measure.
    ///
    /// # Example
    /// ```
    /// # use chordbook_core::ChordbookError;
    /// let err = ChordbookError::Validation {
    ///     measure: 3,
    ///     message: "expected 4 beats, found 3".to_string(),
    /// };
    /// assert_eq!(err.to_string(), "Invalid sequence at measure 3: expected 4 beats, found 3");
    /// ```
    #[error("Invalid sequence at measure {measure}: {message}")]
    Validation { measure: usize, message: String },

    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Measure {0} not found")]
    MeasureNotFound(MeasureId),

    /// # Example
    /// ```
    /// # use chordbook_core::ChordbookError;
    /// let err = ChordbookError::BeatOutOfRange { beat_position: 5, beats: 4 };
    /// assert_eq!(err.to_string(), "Beat 5 is out of range for a measure of 4 beats");
    /// ```
    #[error("Beat {beat_position} is out of range for a measure of {beats} beats")]
    BeatOutOfRange { beat_position: u8, beats: u8 },

    #[error("Invalid ending number {0}: only first (1) and second (2) endings are supported")]
    InvalidEnding(u8),

    #[error("Invalid chord template '{name}': {message}")]
    Template { name: String, message: String },

    #[error("Parse error: {0}")]
    Parse(String),
}
