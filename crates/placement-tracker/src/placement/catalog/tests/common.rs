use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::to_bytes;
use axum::response::Response;
use chrono::{Duration, TimeZone, Utc};
use serde_json::Value;

use crate::placement::catalog::domain::{
    ExperienceId, InterviewExperience, InterviewQuestion, Member, QuestionId,
};
use crate::placement::catalog::repository::{
    CompanyRepository, MemberDirectory, RepositoryError,
};
use crate::placement::catalog::PlacementCatalog;
use crate::placement::domain::{CompanyId, CompanyRecord, MemberId, MemberRole};
use crate::placement::timestamp::Timestamp;

pub(super) fn now() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0)
        .single()
        .expect("valid instant")
}

#[derive(Default)]
pub(super) struct MemoryCompanies {
    pub(super) companies: Mutex<Vec<CompanyRecord>>,
    pub(super) experiences: Mutex<Vec<InterviewExperience>>,
    pub(super) questions: Mutex<Vec<InterviewQuestion>>,
}

impl CompanyRepository for MemoryCompanies {
    fn companies(&self) -> Result<Vec<CompanyRecord>, RepositoryError> {
        Ok(self.companies.lock().expect("companies poisoned").clone())
    }

    fn company(&self, id: &CompanyId) -> Result<Option<CompanyRecord>, RepositoryError> {
        Ok(self
            .companies
            .lock()
            .expect("companies poisoned")
            .iter()
            .find(|company| &company.id == id)
            .cloned())
    }

    fn insert_company(&self, record: CompanyRecord) -> Result<CompanyRecord, RepositoryError> {
        let mut guard = self.companies.lock().expect("companies poisoned");
        if guard.iter().any(|company| company.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn update_company(&self, record: CompanyRecord) -> Result<CompanyRecord, RepositoryError> {
        let mut guard = self.companies.lock().expect("companies poisoned");
        let slot = guard
            .iter_mut()
            .find(|company| company.id == record.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = record.clone();
        Ok(record)
    }

    fn experiences(&self, id: &CompanyId) -> Result<Vec<InterviewExperience>, RepositoryError> {
        Ok(self
            .experiences
            .lock()
            .expect("experiences poisoned")
            .iter()
            .filter(|experience| &experience.company_id == id)
            .cloned()
            .collect())
    }

    fn experience(
        &self,
        id: &ExperienceId,
    ) -> Result<Option<InterviewExperience>, RepositoryError> {
        Ok(self
            .experiences
            .lock()
            .expect("experiences poisoned")
            .iter()
            .find(|experience| &experience.id == id)
            .cloned())
    }

    fn insert_experience(
        &self,
        experience: InterviewExperience,
    ) -> Result<InterviewExperience, RepositoryError> {
        self.experiences
            .lock()
            .expect("experiences poisoned")
            .push(experience.clone());
        Ok(experience)
    }

    fn update_experience(
        &self,
        experience: InterviewExperience,
    ) -> Result<InterviewExperience, RepositoryError> {
        let mut guard = self.experiences.lock().expect("experiences poisoned");
        let slot = guard
            .iter_mut()
            .find(|stored| stored.id == experience.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = experience.clone();
        Ok(experience)
    }

    fn delete_experience(&self, id: &ExperienceId) -> Result<(), RepositoryError> {
        let mut guard = self.experiences.lock().expect("experiences poisoned");
        let before = guard.len();
        guard.retain(|experience| &experience.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn questions(&self, id: &CompanyId) -> Result<Vec<InterviewQuestion>, RepositoryError> {
        Ok(self
            .questions
            .lock()
            .expect("questions poisoned")
            .iter()
            .filter(|question| &question.company_id == id)
            .cloned()
            .collect())
    }

    fn question(&self, id: &QuestionId) -> Result<Option<InterviewQuestion>, RepositoryError> {
        Ok(self
            .questions
            .lock()
            .expect("questions poisoned")
            .iter()
            .find(|question| &question.id == id)
            .cloned())
    }

    fn insert_question(
        &self,
        question: InterviewQuestion,
    ) -> Result<InterviewQuestion, RepositoryError> {
        self.questions
            .lock()
            .expect("questions poisoned")
            .push(question.clone());
        Ok(question)
    }

    fn update_question(
        &self,
        question: InterviewQuestion,
    ) -> Result<InterviewQuestion, RepositoryError> {
        let mut guard = self.questions.lock().expect("questions poisoned");
        let slot = guard
            .iter_mut()
            .find(|stored| stored.id == question.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = question.clone();
        Ok(question)
    }

    fn delete_question(&self, id: &QuestionId) -> Result<(), RepositoryError> {
        let mut guard = self.questions.lock().expect("questions poisoned");
        let before = guard.len();
        guard.retain(|question| &question.id != id);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn experience_count(&self) -> Result<usize, RepositoryError> {
        Ok(self.experiences.lock().expect("experiences poisoned").len())
    }
}

#[derive(Default)]
pub(super) struct MemoryMembers {
    pub(super) members: Mutex<HashMap<MemberId, Member>>,
}

impl MemberDirectory for MemoryMembers {
    fn member(&self, id: &MemberId) -> Result<Option<Member>, RepositoryError> {
        Ok(self.members.lock().expect("members poisoned").get(id).cloned())
    }

    fn members(&self) -> Result<Vec<Member>, RepositoryError> {
        Ok(self
            .members
            .lock()
            .expect("members poisoned")
            .values()
            .cloned()
            .collect())
    }

    fn ensure_member(&self, member: Member) -> Result<Member, RepositoryError> {
        let mut guard = self.members.lock().expect("members poisoned");
        Ok(guard
            .entry(member.user_id.clone())
            .or_insert(member)
            .clone())
    }

    fn set_role(&self, id: &MemberId, role: MemberRole) -> Result<Member, RepositoryError> {
        let mut guard = self.members.lock().expect("members poisoned");
        let member = guard.get_mut(id).ok_or(RepositoryError::NotFound)?;
        member.role = role;
        Ok(member.clone())
    }
}

/// Company store that is always down.
pub(super) struct UnavailableCompanies;

impl CompanyRepository for UnavailableCompanies {
    fn companies(&self) -> Result<Vec<CompanyRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn company(&self, _id: &CompanyId) -> Result<Option<CompanyRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_company(&self, _record: CompanyRecord) -> Result<CompanyRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_company(&self, _record: CompanyRecord) -> Result<CompanyRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn experience(
        &self,
        _id: &ExperienceId,
    ) -> Result<Option<InterviewExperience>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_experience(
        &self,
        _experience: InterviewExperience,
    ) -> Result<InterviewExperience, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_experience(&self, _id: &ExperienceId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn question(&self, _id: &QuestionId) -> Result<Option<InterviewQuestion>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn update_question(
        &self,
        _question: InterviewQuestion,
    ) -> Result<InterviewQuestion, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn delete_question(&self, _id: &QuestionId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn experiences(&self, _id: &CompanyId) -> Result<Vec<InterviewExperience>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_experience(
        &self,
        _experience: InterviewExperience,
    ) -> Result<InterviewExperience, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn questions(&self, _id: &CompanyId) -> Result<Vec<InterviewQuestion>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn insert_question(
        &self,
        _question: InterviewQuestion,
    ) -> Result<InterviewQuestion, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn experience_count(&self) -> Result<usize, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) fn member(id: &str, name: &str, role: MemberRole) -> Member {
    Member {
        user_id: MemberId(id.to_string()),
        full_name: Some(name.to_string()),
        email: Some(format!("{id}@campus.example.edu")),
        role,
    }
}

/// Three companies around `now()`: one with open registration, one that has
/// finished interviews, and one with no dates at all.
pub(super) fn seeded_companies() -> Vec<CompanyRecord> {
    let mut open = CompanyRecord::new("c-open", "Northwind Analytics");
    open.roles = vec!["Data Analyst".to_string()];
    open.registration_deadline = Some(now() + Duration::days(2));
    open.oa_datetime = Some(now() + Duration::days(5));
    open.created_at = Some(now() - Duration::days(1));

    let mut done = CompanyRecord::new("c-done", "Contoso Labs");
    done.roles = vec!["Backend Engineer".to_string(), "SRE".to_string()];
    done.oa_datetime = Some(now() - Duration::days(6));
    done.interview_datetime = Some(now() - Duration::days(2));
    done.people_selected = Some(6);
    done.created_at = Some(now() - Duration::days(20));

    let mut blank = CompanyRecord::new("c-blank", "Fabrikam");
    blank.created_at = Some(now() - Duration::days(3));

    vec![open, done, blank]
}

pub(super) fn build_catalog() -> (
    Arc<PlacementCatalog<MemoryCompanies, MemoryMembers>>,
    Arc<MemoryCompanies>,
    Arc<MemoryMembers>,
) {
    let companies = Arc::new(MemoryCompanies::default());
    *companies.companies.lock().expect("companies poisoned") = seeded_companies();

    let members = Arc::new(MemoryMembers::default());
    {
        let mut guard = members.members.lock().expect("members poisoned");
        for member in [
            member("u-admin", "Asha Admin", MemberRole::Admin),
            member("u-editor", "Eli Editor", MemberRole::Editor),
            member("u-viewer", "Vik Viewer", MemberRole::Viewer),
        ] {
            guard.insert(member.user_id.clone(), member);
        }
    }

    let catalog = Arc::new(PlacementCatalog::new(companies.clone(), members.clone()));
    (catalog, companies, members)
}

pub(super) async fn json_body(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("json body")
}
