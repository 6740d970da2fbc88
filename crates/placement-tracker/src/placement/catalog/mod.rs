//! Company catalog, interview knowledge base and member administration.
//!
//! Storage sits behind [`CompanyRepository`] and [`MemberDirectory`]; the
//! service never reads ambient session state and receives the caller as a
//! [`ViewerContext`].

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

#[cfg(test)]
mod tests;

pub use domain::{
    AdminStats, CompanyDetailView, CompanyDraft, CompanyListing, CompanyQuery, ExperienceDraft,
    ExperienceId, InterviewExperience, InterviewQuestion, Member, QuestionDraft, QuestionId,
    ViewerContext,
};
pub use repository::{CompanyRepository, MemberDirectory, RepositoryError};
pub use router::{catalog_router, CatalogState, VIEWER_HEADER};
pub use service::{CatalogError, PlacementCatalog};
