use super::super::domain::{CompanyId, CompanyRecord, PlacementStatus};
use super::super::timeline::{MilestoneKind, TimelinePhase};
use super::super::timestamp::Timestamp;
use super::summary::DashboardAggregate;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct MilestoneView {
    pub kind: MilestoneKind,
    pub kind_label: &'static str,
    pub at: Timestamp,
}

/// Row shown in the upcoming and recently completed dashboard lists.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyTimelineEntry {
    pub id: CompanyId,
    pub name: String,
    pub roles: Vec<String>,
    pub phase: TimelinePhase,
    pub phase_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_deadline: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_milestone: Option<MilestoneView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_milestone: Option<MilestoneView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_on: Option<Timestamp>,
}

impl CompanyTimelineEntry {
    pub fn from_record(record: &CompanyRecord, now: Timestamp) -> Self {
        let classification = record.classify(now);
        let phase = record.phase(now);
        let completed_on = if classification.is_recently_completed {
            record.milestones().effective_completion()
        } else {
            None
        };

        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            roles: record.roles.clone(),
            phase,
            phase_label: phase.label(),
            registration_deadline: record.registration_deadline,
            next_milestone: classification
                .next_upcoming_milestone
                .map(|milestone| MilestoneView {
                    kind: milestone.kind,
                    kind_label: milestone.kind.label(),
                    at: milestone.at,
                }),
            last_milestone: classification
                .most_recent_past_milestone
                .map(|milestone| MilestoneView {
                    kind: milestone.kind,
                    kind_label: milestone.kind.label(),
                    at: milestone.at,
                }),
            completed_on,
        }
    }
}

/// Compact listing row used by "recently added" and the companies table.
#[derive(Debug, Clone, Serialize)]
pub struct CompanySummaryView {
    pub id: CompanyId,
    pub name: String,
    pub roles: Vec<String>,
    pub offered_ctc: Option<String>,
    pub people_selected: Option<u32>,
    pub recorded_status: PlacementStatus,
    pub phase: TimelinePhase,
    pub phase_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Timestamp>,
}

impl CompanySummaryView {
    pub fn from_record(record: &CompanyRecord, now: Timestamp) -> Self {
        let phase = record.phase(now);
        Self {
            id: record.id.clone(),
            name: record.name.clone(),
            roles: record.roles.clone(),
            offered_ctc: record.offered_ctc.clone(),
            people_selected: record.people_selected,
            recorded_status: record.status,
            phase,
            phase_label: phase.label(),
            created_at: record.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    pub generated_at: Timestamp,
    pub aggregate: DashboardAggregate,
    pub upcoming: Vec<CompanyTimelineEntry>,
    pub recently_completed: Vec<CompanyTimelineEntry>,
    pub recently_added: Vec<CompanySummaryView>,
}
