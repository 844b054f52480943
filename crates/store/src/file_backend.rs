//! File-based store: one pretty-printed JSON snapshot.
//!
//! The whole document set is loaded on creation and rewritten after every
//! mutation. Writes go to a sibling temp file that is then renamed over the
//! snapshot, so a crash mid-write leaves the previous snapshot intact.
//!
//! Default location: `~/.prepwise/store.json`

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use prepwise_core::error::StoreError;
use prepwise_core::plan::{PlanRequest, RequestStatus, StudyPlan, UserProfile};
use prepwise_core::progress::{ProgressSummary, SubtopicRef};
use prepwise_core::store::PlanStore;

use crate::state::StoreState;

pub struct FileStore {
    path: PathBuf,
    state: Arc<RwLock<StoreState>>,
}

impl FileStore {
    /// Open the snapshot at `path`.
    ///
    /// A missing file starts empty (created on first write). An unreadable
    /// or corrupt file is logged and also starts empty; it is overwritten on
    /// the next mutation.
    pub fn new(path: PathBuf) -> Self {
        let state = Self::load_from_disk(&path);
        debug!(
            path = %path.display(),
            requests = state.requests.len(),
            plans = state.plans.len(),
            users = state.users.len(),
            "File store loaded"
        );
        Self {
            path,
            state: Arc::new(RwLock::new(state)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load_from_disk(path: &Path) -> StoreState {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(_) => return StoreState::default(),
        };
        if content.trim().is_empty() {
            return StoreState::default();
        }

        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Corrupt store snapshot, starting empty");
                StoreState::default()
            }
        }
    }

    /// Write the snapshot. Called with the write guard held.
    fn flush(&self, state: &StoreState) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                StoreError::Storage(format!("Failed to create store directory: {e}"))
            })?;
        }

        let content = serde_json::to_string_pretty(state)
            .map_err(|e| StoreError::Storage(format!("Failed to serialize store: {e}")))?;

        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .map_err(|e| StoreError::Storage(format!("Failed to write store file: {e}")))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| StoreError::Storage(format!("Failed to replace store file: {e}")))?;

        Ok(())
    }

    /// Apply `op` to a copy of the state under the write lock. The copy
    /// replaces the live state only once it is on disk, so a failed write
    /// leaves memory and the snapshot in agreement.
    async fn mutate<T, F>(&self, op: F) -> Result<T, StoreError>
    where
        F: FnOnce(&mut StoreState) -> Result<T, StoreError> + Send,
        T: Send,
    {
        let mut state = self.state.write().await;
        let mut next = state.clone();
        let out = op(&mut next)?;
        self.flush(&next)?;
        *state = next;
        Ok(out)
    }
}

#[async_trait]
impl PlanStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn create_request(&self, request: PlanRequest) -> Result<PlanRequest, StoreError> {
        self.mutate(|s| s.create_request(request)).await
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
        self.mutate(|s| s.update_request_status(id, status, actor))
            .await
    }

    async fn create_plan(&self, plan: StudyPlan) -> Result<StudyPlan, StoreError> {
        self.mutate(|s| s.create_plan(plan)).await
    }

    async fn get_plan(&self, id: &str) -> Result<Option<StudyPlan>, StoreError> {
        Ok(self.state.read().await.plans.get(id).cloned())
    }

    async fn current_plan_for_user(&self, user_id: &str) -> Result<Option<StudyPlan>, StoreError> {
        Ok(self.state.read().await.current_plan_for_user(user_id).cloned())
    }

    async fn upsert_user(&self, profile: UserProfile) -> Result<UserProfile, StoreError> {
        self.mutate(|s| Ok(s.upsert_user(profile))).await
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
        self.mutate(|s| s.set_subtopic_checked(user_id, at, completed))
            .await
    }

    async fn progress_for_user(&self, user_id: &str) -> Result<BTreeMap<String, bool>, StoreError> {
        Ok(self.state.read().await.progress_for_user(user_id))
    }
}
