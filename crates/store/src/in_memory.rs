//! In-memory store: the default backend, also used by tests.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use prepwise_core::error::StoreError;
use prepwise_core::plan::{PlanRequest, RequestStatus, StudyPlan, UserProfile};
use prepwise_core::progress::{ProgressSummary, SubtopicRef};
use prepwise_core::store::PlanStore;

use crate::state::StoreState;

/// Keeps every document in process memory. Contents are lost on restart.
pub struct InMemoryStore {
    state: Arc<RwLock<StoreState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(StoreState::default())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlanStore for InMemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn create_request(&self, request: PlanRequest) -> Result<PlanRequest, StoreError> {
        self.state.write().await.create_request(request)
    }

    async fn get_request(&self, id: &str) -> Result<Option<PlanRequest>, StoreError> {
        Ok(self.state.read().await.requests.get(id).cloned())
    }

    async fn list_requests(&self) -> Result<Vec<PlanRequest>, StoreError> {
        Ok(self.state.read().await.list_requests())
    }

    async fn open_request_for_user(
        &self,
        user_id: &str,
    ) -> Result<Option<PlanRequest>, StoreError> {
        Ok(self.state.read().await.open_request_for_user(user_id).cloned())
    }

    async fn update_request_status(
        &self,
        id: &str,
        status: RequestStatus,
        actor: Option<&str>,
    ) -> Result<PlanRequest, StoreError> {
        self.state
            .write()
            .await
            .update_request_status(id, status, actor)
    }

    async fn create_plan(&self, plan: StudyPlan) -> Result<StudyPlan, StoreError> {
        self.state.write().await.create_plan(plan)
    }

    async fn get_plan(&self, id: &str) -> Result<Option<StudyPlan>, StoreError> {
        Ok(self.state.read().await.plans.get(id).cloned())
    }

    async fn current_plan_for_user(&self, user_id: &str) -> Result<Option<StudyPlan>, StoreError> {
        Ok(self.state.read().await.current_plan_for_user(user_id).cloned())
    }

    async fn upsert_user(&self, profile: UserProfile) -> Result<UserProfile, StoreError> {
        Ok(self.state.write().await.upsert_user(profile))
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn set_subtopic_checked(
        &self,
        user_id: &str,
        at: SubtopicRef,
        completed: bool,
    ) -> Result<ProgressSummary, StoreError> {
        self.state
            .write()
            .await
            .set_subtopic_checked(user_id, at, completed)
    }

    async fn progress_for_user(&self, user_id: &str) -> Result<BTreeMap<String, bool>, StoreError> {
        Ok(self.state.read().await.progress_for_user(user_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{sample_days, subtopic};
    use prepwise_core::strength::{Strength, TopicStrengths};

    async fn store_with_plan(user: &str) -> (InMemoryStore, StudyPlan) {
        let store = InMemoryStore::new();
        let request = store
            .create_request(PlanRequest::new(user, 30, TopicStrengths::new()))
            .await
            .unwrap();
        let mut plan = StudyPlan::new(&request, "Sprint", sample_days());
        plan.created_by = "admin".into();
        let plan = store.create_plan(plan).await.unwrap();
        (store, plan)
    }

    #[tokio::test]
    async fn second_open_request_conflicts() {
        let store = InMemoryStore::new();
        let strengths = TopicStrengths::new().with("os", Strength::Weak);
        store
            .create_request(PlanRequest::new("u1", 30, strengths.clone()))
            .await
            .unwrap();

        let err = store
            .create_request(PlanRequest::new("u1", 45, strengths.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // other users are unaffected
        store
            .create_request(PlanRequest::new("u2", 30, strengths))
            .await
            .unwrap();
        assert_eq!(store.list_requests().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn rejected_request_frees_the_user() {
        let store = InMemoryStore::new();
        let first = store
            .create_request(PlanRequest::new("u1", 30, TopicStrengths::new()))
            .await
            .unwrap();
        store
            .update_request_status(&first.id, RequestStatus::Rejected, Some("admin"))
            .await
            .unwrap();

        assert!(store.open_request_for_user("u1").await.unwrap().is_none());
        store
            .create_request(PlanRequest::new("u1", 60, TopicStrengths::new()))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn list_is_newest_first() {
        let store = InMemoryStore::new();
        let mut older = PlanRequest::new("u1", 30, TopicStrengths::new());
        older.created_at -= chrono::Duration::hours(1);
        let older = store.create_request(older).await.unwrap();
        let newer = store
            .create_request(PlanRequest::new("u2", 30, TopicStrengths::new()))
            .await
            .unwrap();

        let ids: Vec<String> = store
            .list_requests()
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec![newer.id, older.id]);
    }

    #[tokio::test]
    async fn update_unknown_request_is_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .update_request_status("req_missing", RequestStatus::Approved, None)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn create_plan_approves_request_and_sets_current_plan() {
        let (store, plan) = store_with_plan("u1").await;

        let request = store.get_request(&plan.request_id).await.unwrap().unwrap();
        assert_eq!(request.status, RequestStatus::Approved);
        assert_eq!(request.plan_id.as_deref(), Some(plan.id.as_str()));
        assert_eq!(request.approved_by.as_deref(), Some("admin"));

        let user = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.current_plan_id.as_deref(), Some(plan.id.as_str()));
        assert_eq!(user.total_subtopics, 3);

        let current = store.current_plan_for_user("u1").await.unwrap().unwrap();
        assert_eq!(current.id, plan.id);
    }

    #[tokio::test]
    async fn reupload_archives_previous_plan() {
        let (store, first) = store_with_plan("u1").await;
        let request = store.get_request(&first.request_id).await.unwrap().unwrap();

        let second = store
            .create_plan(StudyPlan::new(&request, "Sprint v2", sample_days()))
            .await
            .unwrap();

        let old = store.get_plan(&first.id).await.unwrap().unwrap();
        assert_eq!(old.status, prepwise_core::plan::PlanStatus::Archived);
        let current = store.current_plan_for_user("u1").await.unwrap().unwrap();
        assert_eq!(current.id, second.id);
        assert_eq!(current.status, prepwise_core::plan::PlanStatus::Active);
        let request = store.get_request(&first.request_id).await.unwrap().unwrap();
        assert_eq!(request.plan_id.as_deref(), Some(second.id.as_str()));
    }

    #[tokio::test]
    async fn plan_for_unknown_request_is_not_found() {
        let store = InMemoryStore::new();
        let request = PlanRequest::new("u1", 30, TopicStrengths::new());
        let err = store
            .create_plan(StudyPlan::new(&request, "Orphan", sample_days()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn toggle_updates_progress() {
        let (store, _) = store_with_plan("u1").await;

        let summary = store
            .set_subtopic_checked("u1", subtopic(1, 0, 0, 1), true)
            .await
            .unwrap();
        assert_eq!(summary.completed, 1);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.percentage, 33);

        let keys = store.progress_for_user("u1").await.unwrap();
        assert_eq!(keys.len(), 1);
        assert!(keys.contains_key("day_1_subject_0_topic_0_subtopic_1"));

        let summary = store
            .set_subtopic_checked("u1", subtopic(1, 0, 0, 1), false)
            .await
            .unwrap();
        assert_eq!(summary.completed, 0);
        assert_eq!(store.get_user("u1").await.unwrap().unwrap().progress_percentage, 0);
    }

    #[tokio::test]
    async fn toggle_out_of_range_is_invalid_reference() {
        let (store, _) = store_with_plan("u1").await;

        for at in [subtopic(9, 0, 0, 0), subtopic(1, 3, 0, 0), subtopic(1, 0, 0, 7)] {
            let err = store.set_subtopic_checked("u1", at, true).await.unwrap_err();
            assert!(matches!(err, StoreError::InvalidReference(_)), "{at:?}");
        }

        let err = store
            .set_subtopic_checked("nobody", subtopic(1, 0, 0, 0), true)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_toggles_are_not_lost() {
        let (store, _) = store_with_plan("u1").await;
        let store = Arc::new(store);

        let handles: Vec<_> = [subtopic(1, 0, 0, 0), subtopic(1, 0, 0, 1), subtopic(2, 0, 0, 0)]
            .into_iter()
            .map(|at| {
                let store = Arc::clone(&store);
                tokio::spawn(async move { store.set_subtopic_checked("u1", at, true).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        let user = store.get_user("u1").await.unwrap().unwrap();
        assert_eq!(user.completed_subtopics, 3);
        assert_eq!(user.progress_percentage, 100);
        assert_eq!(store.progress_for_user("u1").await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn upsert_keeps_existing_fields_when_blank() {
        let store = InMemoryStore::new();
        let mut profile = UserProfile::new("u1");
        profile.name = "Asha".into();
        profile.email = "asha@example.com".into();
        store.upsert_user(profile).await.unwrap();

        let updated = store.upsert_user(UserProfile::new("u1")).await.unwrap();
        assert_eq!(updated.name, "Asha");
        assert_eq!(updated.email, "asha@example.com");
    }

    #[tokio::test]
    async fn progress_without_plan_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.progress_for_user("u1").await.unwrap().is_empty());
        assert!(store.current_plan_for_user("u1").await.unwrap().is_none());
    }
}
