//! Milestone classification for a single company.
//!
//! Every function here is a pure function of the milestones and the supplied
//! `now`; callers read the clock once per request and pass it in.

use super::timestamp::Timestamp;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MilestoneKind {
    RegistrationDeadline,
    PrePlacementTalk,
    OnlineAssessment,
    Interview,
}

impl MilestoneKind {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::RegistrationDeadline,
            Self::PrePlacementTalk,
            Self::OnlineAssessment,
            Self::Interview,
        ]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::RegistrationDeadline => "Registration Deadline",
            Self::PrePlacementTalk => "Pre-Placement Talk",
            Self::OnlineAssessment => "Online Assessment",
            Self::Interview => "Interview",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Milestone {
    pub kind: MilestoneKind,
    pub at: Timestamp,
}

/// Read-only view over the four scheduled events of a company. No ordering is
/// enforced between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyMilestones {
    pub registration_deadline: Option<Timestamp>,
    pub ppt_time: Option<Timestamp>,
    pub oa_time: Option<Timestamp>,
    pub interview_time: Option<Timestamp>,
}

impl CompanyMilestones {
    pub fn get(&self, kind: MilestoneKind) -> Option<Timestamp> {
        match kind {
            MilestoneKind::RegistrationDeadline => self.registration_deadline,
            MilestoneKind::PrePlacementTalk => self.ppt_time,
            MilestoneKind::OnlineAssessment => self.oa_time,
            MilestoneKind::Interview => self.interview_time,
        }
    }

    /// Set milestones in [`MilestoneKind::ordered`] order.
    pub fn scheduled(&self) -> impl Iterator<Item = Milestone> + '_ {
        MilestoneKind::ordered()
            .into_iter()
            .filter_map(|kind| self.get(kind).map(|at| Milestone { kind, at }))
    }

    pub fn is_unscheduled(&self) -> bool {
        self.scheduled().next().is_none()
    }

    pub fn registration_open(&self, now: Timestamp) -> bool {
        self.registration_deadline.is_some_and(|deadline| deadline > now)
    }

    /// Interview time if present, else online-assessment time.
    pub fn effective_completion(&self) -> Option<Timestamp> {
        self.interview_time.or(self.oa_time)
    }

    pub fn recently_completed(&self, now: Timestamp) -> bool {
        match self.interview_time {
            Some(interview) => interview <= now,
            None => self.oa_time.is_some_and(|oa| oa <= now),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub is_upcoming: bool,
    pub is_recently_completed: bool,
    pub next_upcoming_milestone: Option<Milestone>,
    pub most_recent_past_milestone: Option<Milestone>,
}

impl ClassificationResult {
    pub fn next_upcoming_at(&self) -> Option<Timestamp> {
        self.next_upcoming_milestone.map(|milestone| milestone.at)
    }

    pub fn most_recent_past_at(&self) -> Option<Timestamp> {
        self.most_recent_past_milestone.map(|milestone| milestone.at)
    }
}

pub fn classify(milestones: &CompanyMilestones, now: Timestamp) -> ClassificationResult {
    let (future, past): (Vec<Milestone>, Vec<Milestone>) =
        milestones.scheduled().partition(|milestone| milestone.at > now);

    // Equal instants: the earliest kind wins going forward, the latest kind
    // wins looking back.
    let next_upcoming_milestone = future.into_iter().min_by_key(|milestone| milestone.at);
    let most_recent_past_milestone = past.into_iter().max_by_key(|milestone| milestone.at);

    ClassificationResult {
        is_upcoming: milestones.registration_open(now),
        is_recently_completed: milestones.recently_completed(now),
        next_upcoming_milestone,
        most_recent_past_milestone,
    }
}

/// Bucket used for list filtering and badges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimelinePhase {
    Upcoming,
    Ongoing,
    Completed,
    Unscheduled,
}

impl TimelinePhase {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Upcoming,
            Self::Ongoing,
            Self::Completed,
            Self::Unscheduled,
        ]
    }

    /// Open registration outranks completion; any other scheduled milestone
    /// counts as ongoing.
    pub fn of(milestones: &CompanyMilestones, now: Timestamp) -> Self {
        if milestones.registration_open(now) {
            Self::Upcoming
        } else if milestones.recently_completed(now) {
            Self::Completed
        } else if milestones.is_unscheduled() {
            Self::Unscheduled
        } else {
            Self::Ongoing
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "upcoming" => Some(Self::Upcoming),
            "ongoing" => Some(Self::Ongoing),
            "completed" => Some(Self::Completed),
            "unscheduled" => Some(Self::Unscheduled),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Ongoing => "Ongoing",
            Self::Completed => "Completed",
            Self::Unscheduled => "Unscheduled",
        }
    }
}
