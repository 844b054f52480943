//! Stored records: plan requests, study plans and user profiles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::curriculum::{DaySummary, PlanDay};
use crate::strength::TopicStrengths;

/// Lifecycle of a plan request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl RequestStatus {
    /// Pending and approved requests block a user from filing another one.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Pending | Self::Approved)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "approved" => Ok(Self::Approved),
            "rejected" => Ok(Self::Rejected),
            other => Err(format!("unknown request status: {other}")),
        }
    }
}

/// A user's request for a personalised plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRequest {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: String,
    #[serde(default)]
    pub user_email: String,
    pub days: u32,
    pub topic_strengths: TopicStrengths,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plan_id: Option<String>,
}

impl PlanRequest {
    pub fn new(user_id: impl Into<String>, days: u32, topic_strengths: TopicStrengths) -> Self {
        Self {
            id: format!("req_{}", uuid::Uuid::new_v4().simple()),
            user_id: user_id.into(),
            user_name: String::new(),
            user_email: String::new(),
            days,
            topic_strengths,
            status: RequestStatus::Pending,
            created_at: Utc::now(),
            approved_at: None,
            approved_by: None,
            plan_id: None,
        }
    }

    pub fn with_contact(mut self, name: impl Into<String>, email: impl Into<String>) -> Self {
        self.user_name = name.into();
        self.user_email = email.into();
        self
    }

    /// Apply a status transition. Approval stamps who and when.
    pub fn set_status(&mut self, status: RequestStatus, actor: Option<&str>) {
        self.status = status;
        if status == RequestStatus::Approved {
            self.approved_at = Some(Utc::now());
            self.approved_by = actor.map(str::to_string);
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanStatus {
    #[default]
    Active,
    Archived,
}

/// A curriculum accepted for a user, with per-subtopic completion flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyPlan {
    pub id: String,
    pub user_id: String,
    pub request_id: String,
    pub plan_name: String,
    pub total_days: u32,
    #[serde(default)]
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub status: PlanStatus,
    pub days: Vec<PlanDay>,
}

impl StudyPlan {
    pub fn new(request: &PlanRequest, plan_name: impl Into<String>, days: Vec<PlanDay>) -> Self {
        Self {
            id: format!("plan_{}", uuid::Uuid::new_v4().simple()),
            user_id: request.user_id.clone(),
            request_id: request.id.clone(),
            plan_name: plan_name.into(),
            total_days: request.days,
            created_by: String::new(),
            created_at: Utc::now(),
            status: PlanStatus::Active,
            days,
        }
    }

    pub fn day(&self, day_number: u32) -> Option<&PlanDay> {
        self.days.iter().find(|d| d.day_number == day_number)
    }

    pub fn day_mut(&mut self, day_number: u32) -> Option<&mut PlanDay> {
        self.days.iter_mut().find(|d| d.day_number == day_number)
    }

    pub fn summaries(&self) -> Vec<DaySummary> {
        self.days.iter().map(PlanDay::summary).collect()
    }
}

/// Minimal user record kept alongside plans.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_plan_id: Option<String>,
    #[serde(default)]
    pub progress_percentage: u32,
    #[serde(default)]
    pub completed_subtopics: usize,
    #[serde(default)]
    pub total_subtopics: usize,
}

impl UserProfile {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strength::Strength;

    #[test]
    fn new_request_is_pending_and_open() {
        let req = PlanRequest::new("u1", 30, TopicStrengths::new().with("os", Strength::Weak));
        assert_eq!(req.status, RequestStatus::Pending);
        assert!(req.status.is_open());
        assert!(req.id.starts_with("req_"));
    }

    #[test]
    fn approval_stamps_actor() {
        let mut req = PlanRequest::new("u1", 30, TopicStrengths::new());
        req.set_status(RequestStatus::Approved, Some("admin"));
        assert_eq!(req.approved_by.as_deref(), Some("admin"));
        assert!(req.approved_at.is_some());

        let mut req = PlanRequest::new("u2", 30, TopicStrengths::new());
        req.set_status(RequestStatus::Rejected, Some("admin"));
        assert!(!req.status.is_open());
        assert!(req.approved_at.is_none());
    }

    #[test]
    fn status_parses_and_serializes_snake_case() {
        assert_eq!("approved".parse::<RequestStatus>().unwrap(), RequestStatus::Approved);
        assert!("done".parse::<RequestStatus>().is_err());
        let json = serde_json::to_string(&RequestStatus::Rejected).unwrap();
        assert_eq!(json, "\"rejected\"");
    }

    #[test]
    fn plan_inherits_request_days() {
        let req = PlanRequest::new("u1", 45, TopicStrengths::new());
        let plan = StudyPlan::new(&req, "Sprint", vec![]);
        assert_eq!(plan.total_days, 45);
        assert_eq!(plan.user_id, "u1");
        assert_eq!(plan.request_id, req.id);
        assert!(plan.day(1).is_none());
    }
}
