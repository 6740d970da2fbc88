use metrics_exporter_prometheus::PrometheusHandle;
use placement_tracker::placement::catalog::{
    CompanyRepository, ExperienceId, InterviewExperience, InterviewQuestion, Member,
    MemberDirectory, QuestionId, RepositoryError,
};
use placement_tracker::placement::timestamp::{parse_timestamp, Timestamp};
use placement_tracker::placement::{CompanyId, CompanyRecord, MemberId, MemberRole, TimelinePhase};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Company rows kept in insertion order, keyed lookups by id.
#[derive(Default)]
struct CompanyTables {
    companies: Vec<CompanyRecord>,
    experiences: Vec<InterviewExperience>,
    questions: Vec<InterviewQuestion>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryCompanyRepository {
    tables: Arc<Mutex<CompanyTables>>,
}

impl InMemoryCompanyRepository {
    pub(crate) fn with_companies(companies: Vec<CompanyRecord>) -> Self {
        let repository = Self::default();
        repository
            .tables
            .lock()
            .expect("company tables poisoned")
            .companies = companies;
        repository
    }
}

impl CompanyRepository for InMemoryCompanyRepository {
    fn companies(&self) -> Result<Vec<CompanyRecord>, RepositoryError> {
        let guard = self.tables.lock().expect("company tables poisoned");
        Ok(guard.companies.clone())
    }

    fn company(&self, id: &CompanyId) -> Result<Option<CompanyRecord>, RepositoryError> {
        let guard = self.tables.lock().expect("company tables poisoned");
        Ok(guard
            .companies
            .iter()
            .find(|company| &company.id == id)
            .cloned())
    }

    fn insert_company(&self, record: CompanyRecord) -> Result<CompanyRecord, RepositoryError> {
        let mut guard = self.tables.lock().expect("company tables poisoned");
        if guard.companies.iter().any(|company| company.id == record.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.companies.push(record.clone());
        Ok(record)
    }

    fn update_company(&self, record: CompanyRecord) -> Result<CompanyRecord, RepositoryError> {
        let mut guard = self.tables.lock().expect("company tables poisoned");
        let slot = guard
            .companies
            .iter_mut()
            .find(|company| company.id == record.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = record.clone();
        Ok(record)
    }

    fn experiences(&self, id: &CompanyId) -> Result<Vec<InterviewExperience>, RepositoryError> {
        let guard = self.tables.lock().expect("company tables poisoned");
        Ok(guard
            .experiences
            .iter()
            .filter(|experience| &experience.company_id == id)
            .cloned()
            .collect())
    }

    fn experience(
        &self,
        id: &ExperienceId,
    ) -> Result<Option<InterviewExperience>, RepositoryError> {
        let guard = self.tables.lock().expect("company tables poisoned");
        Ok(guard
            .experiences
            .iter()
            .find(|experience| &experience.id == id)
            .cloned())
    }

    fn insert_experience(
        &self,
        experience: InterviewExperience,
    ) -> Result<InterviewExperience, RepositoryError> {
        let mut guard = self.tables.lock().expect("company tables poisoned");
        guard.experiences.push(experience.clone());
        Ok(experience)
    }

    fn update_experience(
        &self,
        experience: InterviewExperience,
    ) -> Result<InterviewExperience, RepositoryError> {
        let mut guard = self.tables.lock().expect("company tables poisoned");
        let slot = guard
            .experiences
            .iter_mut()
            .find(|stored| stored.id == experience.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = experience.clone();
        Ok(experience)
    }

    fn delete_experience(&self, id: &ExperienceId) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("company tables poisoned");
        let position = guard
            .experiences
            .iter()
            .position(|experience| &experience.id == id)
            .ok_or(RepositoryError::NotFound)?;
        guard.experiences.remove(position);
        Ok(())
    }

    fn questions(&self, id: &CompanyId) -> Result<Vec<InterviewQuestion>, RepositoryError> {
        let guard = self.tables.lock().expect("company tables poisoned");
        Ok(guard
            .questions
            .iter()
            .filter(|question| &question.company_id == id)
            .cloned()
            .collect())
    }

    fn question(&self, id: &QuestionId) -> Result<Option<InterviewQuestion>, RepositoryError> {
        let guard = self.tables.lock().expect("company tables poisoned");
        Ok(guard
            .questions
            .iter()
            .find(|question| &question.id == id)
            .cloned())
    }

    fn insert_question(
        &self,
        question: InterviewQuestion,
    ) -> Result<InterviewQuestion, RepositoryError> {
        let mut guard = self.tables.lock().expect("company tables poisoned");
        guard.questions.push(question.clone());
        Ok(question)
    }

    fn update_question(
        &self,
        question: InterviewQuestion,
    ) -> Result<InterviewQuestion, RepositoryError> {
        let mut guard = self.tables.lock().expect("company tables poisoned");
        let slot = guard
            .questions
            .iter_mut()
            .find(|stored| stored.id == question.id)
            .ok_or(RepositoryError::NotFound)?;
        *slot = question.clone();
        Ok(question)
    }

    fn delete_question(&self, id: &QuestionId) -> Result<(), RepositoryError> {
        let mut guard = self.tables.lock().expect("company tables poisoned");
        let position = guard
            .questions
            .iter()
            .position(|question| &question.id == id)
            .ok_or(RepositoryError::NotFound)?;
        guard.questions.remove(position);
        Ok(())
    }

    fn experience_count(&self) -> Result<usize, RepositoryError> {
        let guard = self.tables.lock().expect("company tables poisoned");
        Ok(guard.experiences.len())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMemberDirectory {
    members: Arc<Mutex<HashMap<MemberId, Member>>>,
}

impl InMemoryMemberDirectory {
    pub(crate) fn with_admin(user_id: &str) -> Self {
        let directory = Self::default();
        let id = MemberId(user_id.to_string());
        directory
            .members
            .lock()
            .expect("member directory poisoned")
            .insert(
                id.clone(),
                Member {
                    user_id: id,
                    full_name: None,
                    email: None,
                    role: MemberRole::Admin,
                },
            );
        directory
    }
}

impl MemberDirectory for InMemoryMemberDirectory {
    fn member(&self, id: &MemberId) -> Result<Option<Member>, RepositoryError> {
        let guard = self.members.lock().expect("member directory poisoned");
        Ok(guard.get(id).cloned())
    }

    fn members(&self) -> Result<Vec<Member>, RepositoryError> {
        let guard = self.members.lock().expect("member directory poisoned");
        let ordered: BTreeMap<&MemberId, &Member> = guard.iter().collect();
        Ok(ordered.into_values().cloned().collect())
    }

    fn ensure_member(&self, member: Member) -> Result<Member, RepositoryError> {
        let mut guard = self.members.lock().expect("member directory poisoned");
        Ok(guard
            .entry(member.user_id.clone())
            .or_insert(member)
            .clone())
    }

    fn set_role(&self, id: &MemberId, role: MemberRole) -> Result<Member, RepositoryError> {
        let mut guard = self.members.lock().expect("member directory poisoned");
        match guard.get_mut(id) {
            Some(member) => {
                member.role = role;
                Ok(member.clone())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

pub(crate) fn parse_instant(raw: &str) -> Result<Timestamp, String> {
    parse_timestamp(raw).ok_or_else(|| {
        format!("failed to parse '{raw}' as an RFC 3339 timestamp or YYYY-MM-DD[ HH:MM[:SS]]")
    })
}

pub(crate) fn parse_phase(raw: &str) -> Result<TimelinePhase, String> {
    TimelinePhase::parse(raw).ok_or_else(|| {
        format!("unknown phase '{raw}' (expected upcoming, ongoing, completed or unscheduled)")
    })
}
