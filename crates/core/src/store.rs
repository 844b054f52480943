//! PlanStore trait: the document-store seam.
//!
//! Requests, plans and user profiles live behind this trait. Implementations
//! must apply each mutating call as a single atomic step: a progress toggle
//! reads, flips and recounts under one lock so concurrent updates to the
//! same plan cannot overwrite each other.

use async_trait::async_trait;
use std::collections::BTreeMap;

use crate::error::StoreError;
use crate::plan::{PlanRequest, RequestStatus, StudyPlan, UserProfile};
use crate::progress::{ProgressSummary, SubtopicRef};

/// Implementations: in-memory (default, tests) and a JSON snapshot file.
#[async_trait]
pub trait PlanStore: Send + Sync {
    /// The backend name (e.g., "memory", "file").
    fn name(&self) -> &str;

    /// Store a new request. Fails with `Conflict` if the user already has an
    /// open (pending or approved) request.
    async fn create_request(&self, request: PlanRequest) -> Result<PlanRequest, StoreError>;

    async fn get_request(&self, id: &str) -> Result<Option<PlanRequest>, StoreError>;

    /// All requests, newest first.
    async fn list_requests(&self) -> Result<Vec<PlanRequest>, StoreError>;

    /// The user's pending or approved request, if any.
    async fn open_request_for_user(&self, user_id: &str)
    -> Result<Option<PlanRequest>, StoreError>;

    async fn update_request_status(
        &self,
        id: &str,
        status: RequestStatus,
        actor: Option<&str>,
    ) -> Result<PlanRequest, StoreError>;

    /// Store a plan, approve its request and make it the user's current plan.
    async fn create_plan(&self, plan: StudyPlan) -> Result<StudyPlan, StoreError>;

    async fn get_plan(&self, id: &str) -> Result<Option<StudyPlan>, StoreError>;

    async fn current_plan_for_user(&self, user_id: &str)
    -> Result<Option<StudyPlan>, StoreError>;

    /// Insert or update a profile. Empty name/email fields keep stored values.
    async fn upsert_user(&self, profile: UserProfile) -> Result<UserProfile, StoreError>;

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError>;

    /// Set one subtopic's completion flag on the user's current plan and
    /// return the recomputed progress.
    async fn set_subtopic_checked(
        &self,
        user_id: &str,
        at: SubtopicRef,
        completed: bool,
    ) -> Result<ProgressSummary, StoreError>;

    /// Checked subtopic keys on the user's current plan (empty without a plan).
    async fn progress_for_user(&self, user_id: &str)
    -> Result<BTreeMap<String, bool>, StoreError>;
}
