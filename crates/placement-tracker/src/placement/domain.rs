use super::timeline::{classify, ClassificationResult, CompanyMilestones, TimelinePhase};
use super::timestamp::{deserialize_lenient, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompanyId(pub String);

impl fmt::Display for CompanyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(pub String);

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lowercases and folds spaces/hyphens so "Not Selected", "not-selected" and
/// "not_selected" all compare equal.
fn fold_label(raw: &str) -> String {
    raw.trim()
        .split(|c: char| c.is_whitespace() || c == '-' || c == '_')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("_")
        .to_ascii_lowercase()
}

/// Status recorded by whoever created the company row. Informational only:
/// dashboards and filters use [`TimelinePhase`] derived from the timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum PlacementStatus {
    #[default]
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
    Unknown,
}

impl PlacementStatus {
    pub fn parse(raw: &str) -> Self {
        match fold_label(raw).as_str() {
            "upcoming" => Self::Upcoming,
            "ongoing" => Self::Ongoing,
            "completed" => Self::Completed,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Unknown,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Upcoming => "Upcoming",
            Self::Ongoing => "Ongoing",
            Self::Completed => "Completed",
            Self::Cancelled => "Cancelled",
            Self::Unknown => "Unknown",
        }
    }
}

impl From<String> for PlacementStatus {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Other,
}

impl Difficulty {
    pub fn parse(raw: &str) -> Self {
        match fold_label(raw).as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Medium => "Medium",
            Self::Hard => "Hard",
            Self::Other => "Other",
        }
    }
}

impl From<String> for Difficulty {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum InterviewResult {
    Selected,
    NotSelected,
    Pending,
    Other,
}

impl InterviewResult {
    pub fn parse(raw: &str) -> Self {
        match fold_label(raw).as_str() {
            "selected" => Self::Selected,
            "not_selected" | "rejected" => Self::NotSelected,
            "pending" => Self::Pending,
            _ => Self::Other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Selected => "Selected",
            Self::NotSelected => "Not Selected",
            Self::Pending => "Pending",
            Self::Other => "Other",
        }
    }
}

impl From<String> for InterviewResult {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum QuestionType {
    Dsa,
    SystemDesign,
    Behavioral,
    Technical,
    Hr,
    Puzzle,
    Other,
}

impl QuestionType {
    pub fn parse(raw: &str) -> Self {
        match fold_label(raw).as_str() {
            "dsa" => Self::Dsa,
            "system_design" => Self::SystemDesign,
            "behavioral" | "behavioural" => Self::Behavioral,
            "technical" => Self::Technical,
            "hr" => Self::Hr,
            "puzzle" => Self::Puzzle,
            _ => Self::Other,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Dsa => "DSA",
            Self::SystemDesign => "System Design",
            Self::Behavioral => "Behavioral",
            Self::Technical => "Technical",
            Self::Hr => "HR",
            Self::Puzzle => "Puzzle",
            Self::Other => "Other",
        }
    }
}

impl From<String> for QuestionType {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

/// Member roles. Unrecognised stored values read as `Viewer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum MemberRole {
    Admin,
    Editor,
    #[default]
    Viewer,
}

impl MemberRole {
    pub const fn ordered() -> [Self; 3] {
        [Self::Admin, Self::Editor, Self::Viewer]
    }

    /// Lenient read of a stored role; unknown values fall back to `Viewer`.
    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw).unwrap_or_default()
    }

    /// Strict parse for role changes; unknown labels are rejected.
    pub fn try_parse(raw: &str) -> Option<Self> {
        match fold_label(raw).as_str() {
            "admin" => Some(Self::Admin),
            "editor" => Some(Self::Editor),
            "viewer" => Some(Self::Viewer),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::Editor => "Editor",
            Self::Viewer => "Viewer",
        }
    }

    pub const fn can_edit(self) -> bool {
        matches!(self, Self::Admin | Self::Editor)
    }
}

impl From<String> for MemberRole {
    fn from(value: String) -> Self {
        Self::parse(&value)
    }
}

/// A company visiting campus, as stored by the data-access layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyRecord {
    pub id: CompanyId,
    pub name: String,
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub offered_ctc: Option<String>,
    #[serde(default)]
    pub ctc_distribution: Option<String>,
    #[serde(default)]
    pub job_location: Option<String>,
    #[serde(default)]
    pub eligibility_criteria: Option<String>,
    #[serde(default)]
    pub bond_details: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub website_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub visit_date: Option<Timestamp>,
    #[serde(default)]
    pub people_selected: Option<u32>,
    #[serde(default)]
    pub status: PlacementStatus,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub created_at: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub registration_deadline: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub ppt_datetime: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub oa_datetime: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub interview_datetime: Option<Timestamp>,
}

impl CompanyRecord {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: CompanyId(id.into()),
            name: name.into(),
            roles: Vec::new(),
            offered_ctc: None,
            ctc_distribution: None,
            job_location: None,
            eligibility_criteria: None,
            bond_details: None,
            description: None,
            website_url: None,
            visit_date: None,
            people_selected: None,
            status: PlacementStatus::default(),
            created_at: None,
            registration_deadline: None,
            ppt_datetime: None,
            oa_datetime: None,
            interview_datetime: None,
        }
    }

    pub fn milestones(&self) -> CompanyMilestones {
        CompanyMilestones {
            registration_deadline: self.registration_deadline,
            ppt_time: self.ppt_datetime,
            oa_time: self.oa_datetime,
            interview_time: self.interview_datetime,
        }
    }

    pub fn classify(&self, now: Timestamp) -> ClassificationResult {
        classify(&self.milestones(), now)
    }

    pub fn phase(&self, now: Timestamp) -> TimelinePhase {
        TimelinePhase::of(&self.milestones(), now)
    }

    /// Case-insensitive substring match on the name or any offered role.
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        self.name.to_lowercase().contains(&needle)
            || self
                .roles
                .iter()
                .any(|role| role.to_lowercase().contains(&needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_text_labels_fold_into_closed_enums() {
        assert_eq!(InterviewResult::parse("Not Selected"), InterviewResult::NotSelected);
        assert_eq!(InterviewResult::parse("not-selected"), InterviewResult::NotSelected);
        assert_eq!(InterviewResult::parse("ghosted"), InterviewResult::Other);
        assert_eq!(QuestionType::parse("System Design"), QuestionType::SystemDesign);
        assert_eq!(QuestionType::parse("HR"), QuestionType::Hr);
        assert_eq!(Difficulty::parse(" hard "), Difficulty::Hard);
        assert_eq!(Difficulty::parse(""), Difficulty::Other);
        assert_eq!(PlacementStatus::parse("Canceled"), PlacementStatus::Cancelled);
        assert_eq!(PlacementStatus::parse("postponed"), PlacementStatus::Unknown);
        assert_eq!(MemberRole::parse("superuser"), MemberRole::Viewer);
        assert_eq!(MemberRole::try_parse(" Editor "), Some(MemberRole::Editor));
        assert_eq!(MemberRole::try_parse("edtior"), None);
    }

    #[test]
    fn records_deserialize_with_bad_timestamps_and_labels() {
        let record: CompanyRecord = serde_json::from_str(
            r#"{
                "id": "c-1",
                "name": "Acme Systems",
                "roles": ["SDE", "Data Analyst"],
                "status": "On Hold",
                "people_selected": 4,
                "registration_deadline": "not a date",
                "oa_datetime": "2025-08-14T09:30:00Z"
            }"#,
        )
        .expect("record parses");

        assert_eq!(record.status, PlacementStatus::Unknown);
        assert!(record.registration_deadline.is_none());
        assert!(record.oa_datetime.is_some());
        assert_eq!(record.people_selected, Some(4));
    }

    #[test]
    fn search_matches_name_or_role() {
        let mut record = CompanyRecord::new("c-1", "Acme Systems");
        record.roles = vec!["Backend Engineer".to_string()];

        assert!(record.matches_search("acme"));
        assert!(record.matches_search("BACKEND"));
        assert!(record.matches_search("  "));
        assert!(!record.matches_search("frontend"));
    }

    #[test]
    fn only_admins_and_editors_can_edit() {
        assert!(MemberRole::Admin.can_edit());
        assert!(MemberRole::Editor.can_edit());
        assert!(!MemberRole::Viewer.can_edit());
    }
}
