//! Company snapshots loaded from CSV exports of the placement database.

mod parser;

use crate::placement::domain::CompanyRecord;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Debug)]
pub enum CompanyImportError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for CompanyImportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompanyImportError::Io(err) => write!(f, "failed to read company export: {}", err),
            CompanyImportError::Csv(err) => write!(f, "invalid company CSV data: {}", err),
        }
    }
}

impl std::error::Error for CompanyImportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CompanyImportError::Io(err) => Some(err),
            CompanyImportError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for CompanyImportError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CompanyImportError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// Reads company rows with headers such as `id,name,roles,people_selected,
/// registration_deadline,ppt_datetime,oa_datetime,interview_datetime`.
/// Roles are `;`-separated; unparseable timestamps are dropped.
pub struct CompanyImporter;

impl CompanyImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<CompanyRecord>, CompanyImportError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let companies = Self::from_reader(file)?;
        info!(path = %path.display(), companies = companies.len(), "company export loaded");
        Ok(companies)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Vec<CompanyRecord>, CompanyImportError> {
        Ok(parser::parse_companies(reader)?)
    }
}
