//! Error types for projection runs.
//!
//! Only structural violations of the year-sequencing invariant are fatal;
//! everything else in the engine degrades to logged defaults.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Empty year sequence (startYear={start_year}, endYear={end_year})")]
    EmptyYears { start_year: i32, end_year: i32 },

    #[error("Year sequence broken: expected {expected}, found {found}")]
    YearSequence { expected: i32, found: i32 },

    #[error("Missing prior-year activity when advancing to {year}")]
    MissingPriorActivity { year: i32 },
}

pub type EngineResult<T> = Result<T, EngineError>;
