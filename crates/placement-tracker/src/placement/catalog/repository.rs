use super::super::domain::{CompanyId, CompanyRecord, MemberId, MemberRole};
use super::domain::{ExperienceId, InterviewExperience, InterviewQuestion, Member, QuestionId};

/// Storage for companies and the knowledge base attached to them.
pub trait CompanyRepository: Send + Sync {
    /// Full snapshot of company rows; ordering is not guaranteed.
    fn companies(&self) -> Result<Vec<CompanyRecord>, RepositoryError>;
    fn company(&self, id: &CompanyId) -> Result<Option<CompanyRecord>, RepositoryError>;
    fn insert_company(&self, record: CompanyRecord) -> Result<CompanyRecord, RepositoryError>;
    /// Replaces the stored row with the same id; `NotFound` if there is none.
    fn update_company(&self, record: CompanyRecord) -> Result<CompanyRecord, RepositoryError>;
    fn experiences(&self, id: &CompanyId) -> Result<Vec<InterviewExperience>, RepositoryError>;
    fn experience(
        &self,
        id: &ExperienceId,
    ) -> Result<Option<InterviewExperience>, RepositoryError>;
    fn insert_experience(
        &self,
        experience: InterviewExperience,
    ) -> Result<InterviewExperience, RepositoryError>;
    fn update_experience(
        &self,
        experience: InterviewExperience,
    ) -> Result<InterviewExperience, RepositoryError>;
    fn delete_experience(&self, id: &ExperienceId) -> Result<(), RepositoryError>;
    fn questions(&self, id: &CompanyId) -> Result<Vec<InterviewQuestion>, RepositoryError>;
    fn question(&self, id: &QuestionId) -> Result<Option<InterviewQuestion>, RepositoryError>;
    fn insert_question(
        &self,
        question: InterviewQuestion,
    ) -> Result<InterviewQuestion, RepositoryError>;
    fn update_question(
        &self,
        question: InterviewQuestion,
    ) -> Result<InterviewQuestion, RepositoryError>;
    fn delete_question(&self, id: &QuestionId) -> Result<(), RepositoryError>;
    fn experience_count(&self) -> Result<usize, RepositoryError>;
}

/// Member profiles and their roles.
pub trait MemberDirectory: Send + Sync {
    fn member(&self, id: &MemberId) -> Result<Option<Member>, RepositoryError>;
    fn members(&self) -> Result<Vec<Member>, RepositoryError>;
    /// Stores `member` unless an entry with the same id exists, and returns
    /// the stored entry either way.
    fn ensure_member(&self, member: Member) -> Result<Member, RepositoryError>;
    fn set_role(&self, id: &MemberId, role: MemberRole) -> Result<Member, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
