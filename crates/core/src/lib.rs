//! # prepwise core
//!
//! Domain types, traits, and error definitions for the prepwise study-plan
//! service. This crate has **no framework dependencies**: it defines the
//! domain model that the planner, store and gateway crates build on.
//!
//! - [`syllabus`]: the static curriculum catalog and subject mapping
//! - [`strength`]: proficiency ratings and the majority vote
//! - [`curriculum`]: day-keyed plans returned by the generative producer
//! - [`plan`] / [`progress`]: stored records and completion tracking
//! - [`store`]: the document-store trait

pub mod curriculum;
pub mod error;
pub mod plan;
pub mod progress;
pub mod store;
pub mod strength;
pub mod syllabus;

// Re-export key types at crate root for ergonomics
pub use curriculum::{Curriculum, DaySubject, DaySubtopic, DaySummary, DayTopic, PlanDay};
pub use error::{CurriculumError, PlannerError, StoreError};
pub use plan::{PlanRequest, PlanStatus, RequestStatus, StudyPlan, UserProfile};
pub use progress::{ProgressSummary, SubtopicRef};
pub use store::PlanStore;
pub use strength::{Strength, TopicStrengths};
pub use syllabus::{CurriculumCatalog, Subject, SubjectMapping, Syllabus, SyllabusWarning, Topic};
