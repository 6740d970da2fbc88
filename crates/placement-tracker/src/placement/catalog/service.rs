use std::cmp::Reverse;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::http::StatusCode;
use tracing::{debug, info, warn};

use super::super::dashboard::views::{CompanySummaryView, DashboardView};
use super::super::dashboard::{Dashboard, DashboardLimits};
use super::super::domain::{
    CompanyId, CompanyRecord, InterviewResult, MemberId, MemberRole, PlacementStatus,
};
use super::super::timestamp::Timestamp;
use super::domain::{
    AdminStats, CompanyDetailView, CompanyDraft, CompanyListing, CompanyQuery, ExperienceDraft,
    ExperienceId, InterviewExperience, InterviewQuestion, Member, QuestionDraft, QuestionId,
    ViewerContext,
};
use super::repository::{CompanyRepository, MemberDirectory, RepositoryError};

static COMPANY_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static EXPERIENCE_SEQUENCE: AtomicU64 = AtomicU64::new(1);
static QUESTION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_id(sequence: &AtomicU64, prefix: &str) -> String {
    let id = sequence.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{id:06}")
}

/// Draws ids until one is not already taken. Seeded snapshots may already
/// hold ids from the same sequence.
fn next_free_id<F>(
    sequence: &AtomicU64,
    prefix: &str,
    mut taken: F,
) -> Result<String, CatalogError>
where
    F: FnMut(&str) -> Result<bool, RepositoryError>,
{
    loop {
        let candidate = next_id(sequence, prefix);
        if !taken(&candidate)? {
            return Ok(candidate);
        }
        debug!(id = %candidate, "generated id already in use, drawing another");
    }
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(value: &str, field: &'static str) -> Result<String, CatalogError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(CatalogError::Validation(format!("{field} is required")));
    }
    Ok(value.to_string())
}

/// Read and contribute operations over the placement catalog. Every call
/// takes the viewer and the evaluation instant explicitly.
pub struct PlacementCatalog<C, M> {
    companies: Arc<C>,
    members: Arc<M>,
}

impl<C, M> PlacementCatalog<C, M>
where
    C: CompanyRepository + 'static,
    M: MemberDirectory + 'static,
{
    pub fn new(companies: Arc<C>, members: Arc<M>) -> Self {
        Self { companies, members }
    }

    /// Resolves the role of a caller. Signed-in users without a directory
    /// entry are treated as viewers.
    pub fn viewer(&self, user_id: Option<&str>) -> Result<ViewerContext, CatalogError> {
        let Some(user_id) = user_id.map(str::trim).filter(|id| !id.is_empty()) else {
            return Ok(ViewerContext::anonymous());
        };

        let id = MemberId(user_id.to_string());
        let role = match self.members.member(&id)? {
            Some(member) => member.role,
            None => {
                let member = self.members.ensure_member(Member::newcomer(id.clone()))?;
                info!(member = %id, "new member registered as viewer");
                member.role
            }
        };

        Ok(ViewerContext {
            user_id: Some(id),
            role,
        })
    }

    pub fn dashboard(
        &self,
        now: Timestamp,
        limits: DashboardLimits,
    ) -> Result<DashboardView, CatalogError> {
        let snapshot = self.companies.companies()?;
        debug!(companies = snapshot.len(), %now, "building placement dashboard");
        Ok(Dashboard::build(&snapshot, now, limits))
    }

    /// Newest companies first, filtered by search text and derived phase.
    pub fn companies(
        &self,
        query: &CompanyQuery,
        now: Timestamp,
    ) -> Result<CompanyListing, CatalogError> {
        let mut snapshot = self.companies.companies()?;
        snapshot.sort_by_key(|company| Reverse(company.created_at));

        let companies: Vec<CompanySummaryView> = snapshot
            .iter()
            .filter(|company| query.matches(company, now))
            .map(|company| CompanySummaryView::from_record(company, now))
            .collect();

        Ok(CompanyListing {
            total: companies.len(),
            companies,
        })
    }

    pub fn company_detail(
        &self,
        id: &CompanyId,
        now: Timestamp,
    ) -> Result<CompanyDetailView, CatalogError> {
        let company = self
            .companies
            .company(id)?
            .ok_or_else(|| CatalogError::NotFound(format!("company {id}")))?;

        let mut experiences = self.companies.experiences(id)?;
        experiences.sort_by_key(|experience| Reverse(experience.created_at));
        let mut questions = self.companies.questions(id)?;
        questions.sort_by_key(|question| Reverse(question.created_at));

        let selected_contributors = self.selected_contributors(&experiences)?;
        let phase = company.phase(now);

        Ok(CompanyDetailView {
            classification: company.classify(now),
            phase,
            phase_label: phase.label(),
            company,
            experiences,
            questions,
            selected_contributors,
        })
    }

    fn selected_contributors(
        &self,
        experiences: &[InterviewExperience],
    ) -> Result<Vec<String>, CatalogError> {
        let mut authors: Vec<&MemberId> = Vec::new();
        for author in experiences
            .iter()
            .filter(|experience| experience.result == Some(InterviewResult::Selected))
            .filter_map(|experience| experience.author.as_ref())
        {
            if !authors.contains(&author) {
                authors.push(author);
            }
        }

        let mut names = Vec::with_capacity(authors.len());
        for author in authors {
            if let Some(member) = self.members.member(author)? {
                names.push(member.display_name());
            }
        }
        Ok(names)
    }

    pub fn add_company(
        &self,
        viewer: &ViewerContext,
        draft: CompanyDraft,
        now: Timestamp,
    ) -> Result<CompanyRecord, CatalogError> {
        require_editor(viewer)?;
        let name = required(&draft.name, "name")?;
        let id = next_free_id(&COMPANY_SEQUENCE, "cmp", |candidate| {
            Ok(self
                .companies
                .company(&CompanyId(candidate.to_string()))?
                .is_some())
        })?;

        let record = company_from_draft(
            CompanyId(id),
            name,
            draft,
            PlacementStatus::Upcoming,
            Some(now),
        );
        let stored = self.companies.insert_company(record)?;
        info!(company = %stored.id, name = %stored.name, "company added");
        Ok(stored)
    }

    /// Replaces the editable fields of an existing company. `id` and
    /// `created_at` are kept; the status is kept unless the draft sets one.
    pub fn update_company(
        &self,
        viewer: &ViewerContext,
        id: &CompanyId,
        draft: CompanyDraft,
    ) -> Result<CompanyRecord, CatalogError> {
        require_editor(viewer)?;
        let name = required(&draft.name, "name")?;
        let existing = self
            .companies
            .company(id)?
            .ok_or_else(|| CatalogError::NotFound(format!("company {id}")))?;

        let record = company_from_draft(
            existing.id,
            name,
            draft,
            existing.status,
            existing.created_at,
        );
        let stored = self
            .companies
            .update_company(record)
            .map_err(|err| missing_as_not_found(err, format!("company {id}")))?;
        info!(company = %stored.id, "company updated");
        Ok(stored)
    }

    pub fn add_experience(
        &self,
        viewer: &ViewerContext,
        company_id: &CompanyId,
        draft: ExperienceDraft,
        now: Timestamp,
    ) -> Result<InterviewExperience, CatalogError> {
        let author = require_member(viewer)?;
        self.ensure_company(company_id)?;

        let id = next_free_id(&EXPERIENCE_SEQUENCE, "exp", |candidate| {
            Ok(self
                .companies
                .experience(&ExperienceId(candidate.to_string()))?
                .is_some())
        })?;

        let experience = InterviewExperience {
            id: ExperienceId(id),
            company_id: company_id.clone(),
            round_name: required(&draft.round_name, "round_name")?,
            experience: required(&draft.experience, "experience")?,
            difficulty: draft.difficulty,
            result: draft.result,
            tips: trimmed(draft.tips),
            author: Some(author),
            created_at: now,
        };

        let stored = self.companies.insert_experience(experience)?;
        info!(company = %company_id, experience = %stored.id.0, "interview experience shared");
        Ok(stored)
    }

    pub fn add_question(
        &self,
        viewer: &ViewerContext,
        company_id: &CompanyId,
        draft: QuestionDraft,
        now: Timestamp,
    ) -> Result<InterviewQuestion, CatalogError> {
        let author = require_member(viewer)?;
        self.ensure_company(company_id)?;

        let id = next_free_id(&QUESTION_SEQUENCE, "qst", |candidate| {
            Ok(self
                .companies
                .question(&QuestionId(candidate.to_string()))?
                .is_some())
        })?;

        let question = InterviewQuestion {
            id: QuestionId(id),
            company_id: company_id.clone(),
            question: required(&draft.question, "question")?,
            answer: trimmed(draft.answer),
            topic: trimmed(draft.topic),
            question_type: draft.question_type,
            author: Some(author),
            created_at: now,
        };

        let stored = self.companies.insert_question(question)?;
        info!(company = %company_id, question = %stored.id.0, "interview question shared");
        Ok(stored)
    }

    /// Rewrites an experience. Only its author may do so.
    pub fn update_experience(
        &self,
        viewer: &ViewerContext,
        id: &ExperienceId,
        draft: ExperienceDraft,
    ) -> Result<InterviewExperience, CatalogError> {
        let existing = self.owned_experience(viewer, id)?;
        let experience = InterviewExperience {
            round_name: required(&draft.round_name, "round_name")?,
            experience: required(&draft.experience, "experience")?,
            difficulty: draft.difficulty,
            result: draft.result,
            tips: trimmed(draft.tips),
            ..existing
        };

        let stored = self
            .companies
            .update_experience(experience)
            .map_err(|err| missing_as_not_found(err, format!("experience {}", id.0)))?;
        info!(experience = %id.0, "interview experience edited");
        Ok(stored)
    }

    pub fn delete_experience(
        &self,
        viewer: &ViewerContext,
        id: &ExperienceId,
    ) -> Result<(), CatalogError> {
        self.owned_experience(viewer, id)?;
        self.companies
            .delete_experience(id)
            .map_err(|err| missing_as_not_found(err, format!("experience {}", id.0)))?;
        info!(experience = %id.0, "interview experience deleted");
        Ok(())
    }

    fn owned_experience(
        &self,
        viewer: &ViewerContext,
        id: &ExperienceId,
    ) -> Result<InterviewExperience, CatalogError> {
        let caller = require_member(viewer)?;
        let experience = self
            .companies
            .experience(id)?
            .ok_or_else(|| CatalogError::NotFound(format!("experience {}", id.0)))?;
        require_author(&caller, experience.author.as_ref(), "experience")?;
        Ok(experience)
    }

    /// Rewrites a question. Only its author may do so.
    pub fn update_question(
        &self,
        viewer: &ViewerContext,
        id: &QuestionId,
        draft: QuestionDraft,
    ) -> Result<InterviewQuestion, CatalogError> {
        let existing = self.owned_question(viewer, id)?;
        let question = InterviewQuestion {
            question: required(&draft.question, "question")?,
            answer: trimmed(draft.answer),
            topic: trimmed(draft.topic),
            question_type: draft.question_type,
            ..existing
        };

        let stored = self
            .companies
            .update_question(question)
            .map_err(|err| missing_as_not_found(err, format!("question {}", id.0)))?;
        info!(question = %id.0, "interview question edited");
        Ok(stored)
    }

    pub fn delete_question(
        &self,
        viewer: &ViewerContext,
        id: &QuestionId,
    ) -> Result<(), CatalogError> {
        self.owned_question(viewer, id)?;
        self.companies
            .delete_question(id)
            .map_err(|err| missing_as_not_found(err, format!("question {}", id.0)))?;
        info!(question = %id.0, "interview question deleted");
        Ok(())
    }

    fn owned_question(
        &self,
        viewer: &ViewerContext,
        id: &QuestionId,
    ) -> Result<InterviewQuestion, CatalogError> {
        let caller = require_member(viewer)?;
        let question = self
            .companies
            .question(id)?
            .ok_or_else(|| CatalogError::NotFound(format!("question {}", id.0)))?;
        require_author(&caller, question.author.as_ref(), "question")?;
        Ok(question)
    }

    fn ensure_company(&self, id: &CompanyId) -> Result<(), CatalogError> {
        match self.companies.company(id)? {
            Some(_) => Ok(()),
            None => Err(CatalogError::NotFound(format!("company {id}"))),
        }
    }

    /// Admin view of every member, ordered by role then display name.
    pub fn members(&self, viewer: &ViewerContext) -> Result<Vec<Member>, CatalogError> {
        require_admin(viewer)?;
        let mut members = self.members.members()?;
        members.sort_by_key(|member| {
            let rank = MemberRole::ordered()
                .iter()
                .position(|role| *role == member.role)
                .unwrap_or(usize::MAX);
            (rank, member.display_name().to_lowercase())
        });
        Ok(members)
    }

    pub fn update_role(
        &self,
        viewer: &ViewerContext,
        user_id: &MemberId,
        role: MemberRole,
    ) -> Result<Member, CatalogError> {
        require_admin(viewer)?;
        let target = self
            .members
            .member(user_id)?
            .ok_or_else(|| CatalogError::NotFound(format!("member {user_id}")))?;

        if target.role == MemberRole::Admin && role != MemberRole::Admin {
            let admins = self
                .members
                .members()?
                .iter()
                .filter(|member| member.role == MemberRole::Admin)
                .count();
            if admins <= 1 {
                warn!(member = %user_id, "refusing to demote the last admin");
                return Err(CatalogError::Validation(
                    "cannot demote the last admin".to_string(),
                ));
            }
        }

        let updated = self
            .members
            .set_role(user_id, role)
            .map_err(|err| missing_as_not_found(err, format!("member {user_id}")))?;
        info!(member = %user_id, role = role.label(), "member role updated");
        Ok(updated)
    }

    pub fn admin_stats(&self, viewer: &ViewerContext) -> Result<AdminStats, CatalogError> {
        require_admin(viewer)?;
        Ok(AdminStats {
            members: self.members.members()?.len(),
            companies: self.companies.companies()?.len(),
            experiences: self.companies.experience_count()?,
        })
    }
}

fn company_from_draft(
    id: CompanyId,
    name: String,
    draft: CompanyDraft,
    default_status: PlacementStatus,
    created_at: Option<Timestamp>,
) -> CompanyRecord {
    CompanyRecord {
        id,
        name,
        roles: draft
            .roles
            .into_iter()
            .filter_map(|role| trimmed(Some(role)))
            .collect(),
        offered_ctc: trimmed(draft.offered_ctc),
        ctc_distribution: trimmed(draft.ctc_distribution),
        job_location: trimmed(draft.job_location),
        eligibility_criteria: trimmed(draft.eligibility_criteria),
        bond_details: trimmed(draft.bond_details),
        description: trimmed(draft.description),
        website_url: trimmed(draft.website_url),
        visit_date: draft.visit_date,
        people_selected: draft.people_selected,
        status: draft.status.unwrap_or(default_status),
        created_at,
        registration_deadline: draft.registration_deadline,
        ppt_datetime: draft.ppt_datetime,
        oa_datetime: draft.oa_datetime,
        interview_datetime: draft.interview_datetime,
    }
}

fn missing_as_not_found(err: RepositoryError, what: String) -> CatalogError {
    match err {
        RepositoryError::NotFound => CatalogError::NotFound(what),
        other => CatalogError::Repository(other),
    }
}

fn require_author(
    caller: &MemberId,
    author: Option<&MemberId>,
    what: &'static str,
) -> Result<(), CatalogError> {
    if author == Some(caller) {
        Ok(())
    } else {
        warn!(member = %caller, what, "change attempted by someone other than the author");
        Err(CatalogError::Forbidden("only the author may change this entry"))
    }
}

fn require_member(viewer: &ViewerContext) -> Result<MemberId, CatalogError> {
    viewer.user_id.clone().ok_or(CatalogError::Unauthenticated)
}

fn require_editor(viewer: &ViewerContext) -> Result<(), CatalogError> {
    require_member(viewer)?;
    if viewer.can_edit() {
        Ok(())
    } else {
        warn!(role = viewer.role.label(), "edit attempted without editor rights");
        Err(CatalogError::Forbidden("editor or admin role required"))
    }
}

fn require_admin(viewer: &ViewerContext) -> Result<(), CatalogError> {
    require_member(viewer)?;
    if viewer.is_admin() {
        Ok(())
    } else {
        warn!(role = viewer.role.label(), "admin operation attempted");
        Err(CatalogError::Forbidden("admin role required"))
    }
}

/// Error raised by the catalog service.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("sign in required")]
    Unauthenticated,
    #[error("forbidden: {0}")]
    Forbidden(&'static str),
    #[error("{0} not found")]
    NotFound(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl CatalogError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CatalogError::Unauthenticated => StatusCode::UNAUTHORIZED,
            CatalogError::Forbidden(_) => StatusCode::FORBIDDEN,
            CatalogError::NotFound(_) | CatalogError::Repository(RepositoryError::NotFound) => {
                StatusCode::NOT_FOUND
            }
            CatalogError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            CatalogError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
            CatalogError::Repository(RepositoryError::Unavailable(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_ids_skip_values_already_in_use() {
        let sequence = AtomicU64::new(1);
        let seeded = ["cmp-000001", "cmp-000002"];

        let id = next_free_id(&sequence, "cmp", |candidate| Ok(seeded.contains(&candidate)))
            .expect("free id found");
        assert_eq!(id, "cmp-000003");

        let next = next_free_id(&sequence, "cmp", |_| Ok(false)).expect("free id found");
        assert_eq!(next, "cmp-000004");
    }

    #[test]
    fn id_lookup_failures_propagate() {
        let sequence = AtomicU64::new(1);
        let err = next_free_id(&sequence, "exp", |_| {
            Err(RepositoryError::Unavailable("offline".to_string()))
        })
        .expect_err("lookup failure surfaces");
        assert!(matches!(
            err,
            CatalogError::Repository(RepositoryError::Unavailable(_))
        ));
    }
}
