//! # prepwise planner
//!
//! Pure planning logic on top of `prepwise-core`: day allocation, prompt
//! rendering for the external curriculum producer, boundary validation of
//! the day window, and coverage checks for uploaded curricula.
//!
//! Nothing here performs I/O. Every function takes the [`Syllabus`] it
//! plans against as an argument.
//!
//! [`Syllabus`]: prepwise_core::Syllabus

pub mod allocation;
pub mod coverage;
pub mod prompt;
pub mod range;

pub use allocation::{
    Allocation, AllocationDiagnostics, AllocationResult, SubjectAllocation, TopicAllocation,
    adjusted_days, allocate, baseline_days, subject_strength,
};
pub use coverage::{CoverageReport, UnscheduledSubtopic};
pub use prompt::render_prompt;
pub use range::DayRange;
