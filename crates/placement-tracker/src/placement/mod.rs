pub mod catalog;
pub mod dashboard;
pub mod domain;
mod ranking;
pub mod timeline;
pub mod timestamp;

pub use dashboard::{aggregate, Dashboard, DashboardAggregate, DashboardLimits};
pub use domain::{
    CompanyId, CompanyRecord, Difficulty, InterviewResult, MemberId, MemberRole, PlacementStatus,
    QuestionType,
};
pub use ranking::{rank_recently_completed, rank_upcoming};
pub use timeline::{
    classify, ClassificationResult, CompanyMilestones, Milestone, MilestoneKind, TimelinePhase,
};
pub use timestamp::Timestamp;
