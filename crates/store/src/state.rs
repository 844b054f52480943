//! The document set shared by every backend.
//!
//! Backends wrap a [`StoreState`] in a lock and call one method per trait
//! operation while holding the write guard, so each operation is applied
//! as a whole or not at all.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use prepwise_core::error::StoreError;
use prepwise_core::plan::{PlanRequest, PlanStatus, RequestStatus, StudyPlan, UserProfile};
use prepwise_core::progress::{checked_keys, ProgressSummary, SubtopicRef};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreState {
    #[serde(default)]
    pub requests: BTreeMap<String, PlanRequest>,
    #[serde(default)]
    pub plans: BTreeMap<String, StudyPlan>,
    #[serde(default)]
    pub users: BTreeMap<String, UserProfile>,
}

impl StoreState {
    pub fn create_request(&mut self, request: PlanRequest) -> Result<PlanRequest, StoreError> {
        if let Some(open) = self.open_request_for_user(&request.user_id) {
            return Err(StoreError::Conflict(format!(
                "user {} already has a {} plan request ({})",
                request.user_id, open.status, open.id
            )));
        }
        self.requests.insert(request.id.clone(), request.clone());
        Ok(request)
    }

    pub fn list_requests(&self) -> Vec<PlanRequest> {
        let mut requests: Vec<PlanRequest> = self.requests.values().cloned().collect();
        requests.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        requests
    }

    pub fn open_request_for_user(&self, user_id: &str) -> Option<&PlanRequest> {
        self.requests
            .values()
            .filter(|r| r.user_id == user_id && r.status.is_open())
            .max_by_key(|r| r.created_at)
    }

    pub fn update_request_status(
        &mut self,
        id: &str,
        status: RequestStatus,
        actor: Option<&str>,
    ) -> Result<PlanRequest, StoreError> {
        let request = self
            .requests
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("plan request", id))?;
        request.set_status(status, actor);
        Ok(request.clone())
    }

    pub fn create_plan(&mut self, plan: StudyPlan) -> Result<StudyPlan, StoreError> {
        let request = self
            .requests
            .get_mut(&plan.request_id)
            .ok_or_else(|| StoreError::not_found("plan request", &plan.request_id))?;
        if request.user_id != plan.user_id {
            return Err(StoreError::InvalidReference(format!(
                "plan request {} belongs to user {}, not {}",
                request.id, request.user_id, plan.user_id
            )));
        }

        let actor = (!plan.created_by.is_empty()).then_some(plan.created_by.as_str());
        request.set_status(RequestStatus::Approved, actor);
        request.plan_id = Some(plan.id.clone());

        let progress = ProgressSummary::from_days(&plan.days);
        let user = self
            .users
            .entry(plan.user_id.clone())
            .or_insert_with(|| UserProfile::new(plan.user_id.clone()));
        let previous = user.current_plan_id.replace(plan.id.clone());
        apply_progress(user, progress);

        // A re-upload supersedes the user's earlier plan.
        if let Some(old) = previous.and_then(|id| self.plans.get_mut(&id)) {
            old.status = PlanStatus::Archived;
        }

        self.plans.insert(plan.id.clone(), plan.clone());
        Ok(plan)
    }

    pub fn current_plan_for_user(&self, user_id: &str) -> Option<&StudyPlan> {
        let plan_id = self.users.get(user_id)?.current_plan_id.as_ref()?;
        self.plans.get(plan_id)
    }

    pub fn upsert_user(&mut self, profile: UserProfile) -> UserProfile {
        let user = self
            .users
            .entry(profile.id.clone())
            .or_insert_with(|| UserProfile::new(profile.id.clone()));
        if !profile.name.is_empty() {
            user.name = profile.name;
        }
        if !profile.email.is_empty() {
            user.email = profile.email;
        }
        user.clone()
    }

    pub fn set_subtopic_checked(
        &mut self,
        user_id: &str,
        at: SubtopicRef,
        completed: bool,
    ) -> Result<ProgressSummary, StoreError> {
        let user = self
            .users
            .get_mut(user_id)
            .ok_or_else(|| StoreError::not_found("user", user_id))?;
        let plan_id = user
            .current_plan_id
            .clone()
            .ok_or_else(|| StoreError::not_found("current plan for user", user_id))?;
        let plan = self
            .plans
            .get_mut(&plan_id)
            .ok_or_else(|| StoreError::not_found("study plan", &plan_id))?;

        let day = plan.day_mut(at.day_number).ok_or_else(|| {
            StoreError::InvalidReference(format!("day {} is not in plan {plan_id}", at.day_number))
        })?;
        let subtopic = day
            .subtopic_mut(at.subject_index, at.topic_index, at.subtopic_index)
            .ok_or_else(|| StoreError::InvalidReference(format!("no subtopic at {}", at.key())))?;
        subtopic.checked = completed;

        let progress = ProgressSummary::from_days(&plan.days);
        apply_progress(user, progress);
        Ok(progress)
    }

    pub fn progress_for_user(&self, user_id: &str) -> BTreeMap<String, bool> {
        self.current_plan_for_user(user_id)
            .map(|plan| checked_keys(&plan.days))
            .unwrap_or_default()
    }
}

fn apply_progress(user: &mut UserProfile, progress: ProgressSummary) {
    user.completed_subtopics = progress.completed;
    user.total_subtopics = progress.total;
    user.progress_percentage = progress.percentage;
}
