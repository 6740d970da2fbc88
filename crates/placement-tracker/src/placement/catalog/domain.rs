use super::super::dashboard::views::CompanySummaryView;
use super::super::domain::{
    CompanyId, CompanyRecord, Difficulty, InterviewResult, MemberId, MemberRole, PlacementStatus,
    QuestionType,
};
use super::super::timeline::{ClassificationResult, TimelinePhase};
use super::super::timestamp::{deserialize_lenient, Timestamp};
use serde::{Deserialize, Serialize};

/// Request-scoped snapshot of who is asking and what they may do.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewerContext {
    pub user_id: Option<MemberId>,
    pub role: MemberRole,
}

impl ViewerContext {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn member(user_id: impl Into<String>, role: MemberRole) -> Self {
        Self {
            user_id: Some(MemberId(user_id.into())),
            role,
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.user_id.is_some()
    }

    pub fn can_edit(&self) -> bool {
        self.is_signed_in() && self.role.can_edit()
    }

    pub fn is_admin(&self) -> bool {
        self.is_signed_in() && self.role == MemberRole::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExperienceId(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QuestionId(pub String);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewExperience {
    pub id: ExperienceId,
    pub company_id: CompanyId,
    pub round_name: String,
    pub experience: String,
    pub difficulty: Option<Difficulty>,
    pub result: Option<InterviewResult>,
    pub tips: Option<String>,
    pub author: Option<MemberId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub id: QuestionId,
    pub company_id: CompanyId,
    pub question: String,
    pub answer: Option<String>,
    pub topic: Option<String>,
    pub question_type: Option<QuestionType>,
    pub author: Option<MemberId>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub user_id: MemberId,
    pub full_name: Option<String>,
    pub email: Option<String>,
    #[serde(default)]
    pub role: MemberRole,
}

impl Member {
    /// Directory entry created the first time a signed-in user is seen.
    pub fn newcomer(user_id: MemberId) -> Self {
        Self {
            user_id,
            full_name: None,
            email: None,
            role: MemberRole::Viewer,
        }
    }

    /// Name shown next to contributions: full name, else e-mail, else the id.
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(self.email.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| self.user_id.0.clone())
    }
}

/// Payload for creating or editing a company. Timestamps that fail to parse
/// are dropped; an edit replaces every field except id, status (when absent)
/// and `created_at`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompanyDraft {
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
    #[serde(default)]
    pub people_selected: Option<u32>,
    #[serde(default)]
    pub status: Option<PlacementStatus>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub visit_date: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub registration_deadline: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub ppt_datetime: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub oa_datetime: Option<Timestamp>,
    #[serde(default, deserialize_with = "deserialize_lenient")]
    pub interview_datetime: Option<Timestamp>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExperienceDraft {
    pub round_name: String,
    pub experience: String,
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
    #[serde(default)]
    pub result: Option<InterviewResult>,
    #[serde(default)]
    pub tips: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuestionDraft {
    pub question: String,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub topic: Option<String>,
    #[serde(default)]
    pub question_type: Option<QuestionType>,
}

/// Filters for the companies listing.
#[derive(Debug, Clone, Default)]
pub struct CompanyQuery {
    pub search: Option<String>,
    pub phase: Option<TimelinePhase>,
}

impl CompanyQuery {
    pub fn matches(&self, company: &CompanyRecord, now: Timestamp) -> bool {
        let matches_search = self
            .search
            .as_deref()
            .map_or(true, |needle| company.matches_search(needle));
        let matches_phase = self.phase.map_or(true, |phase| company.phase(now) == phase);
        matches_search && matches_phase
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyDetailView {
    pub company: CompanyRecord,
    pub phase: TimelinePhase,
    pub phase_label: &'static str,
    pub classification: ClassificationResult,
    pub experiences: Vec<InterviewExperience>,
    pub questions: Vec<InterviewQuestion>,
    pub selected_contributors: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyListing {
    pub total: usize,
    pub companies: Vec<CompanySummaryView>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub members: usize,
    pub companies: usize,
    pub experiences: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anonymous_viewers_cannot_edit_even_with_elevated_role() {
        let viewer = ViewerContext {
            user_id: None,
            role: MemberRole::Admin,
        };
        assert!(!viewer.can_edit());
        assert!(!viewer.is_admin());

        let editor = ViewerContext::member("u-1", MemberRole::Editor);
        assert!(editor.can_edit());
        assert!(!editor.is_admin());
    }

    #[test]
    fn display_name_falls_back_to_email_then_id() {
        let mut member = Member {
            user_id: MemberId("u-7".to_string()),
            full_name: Some("  ".to_string()),
            email: Some("priya@example.edu".to_string()),
            role: MemberRole::Viewer,
        };
        assert_eq!(member.display_name(), "priya@example.edu");

        member.email = None;
        assert_eq!(member.display_name(), "u-7");
    }
}
