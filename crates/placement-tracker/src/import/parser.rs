use crate::placement::domain::{CompanyId, CompanyRecord, PlacementStatus};
use crate::placement::timestamp::parse_timestamp;
use serde::{Deserialize, Deserializer};
use std::io::Read;

pub(crate) fn parse_companies<R: Read>(reader: R) -> Result<Vec<CompanyRecord>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut companies = Vec::new();

    for (index, record) in csv_reader.deserialize::<CompanyRow>().enumerate() {
        let row = record?;
        companies.push(row.into_record(index));
    }

    Ok(companies)
}

#[derive(Debug, Deserialize)]
struct CompanyRow {
    #[serde(default, deserialize_with = "empty_string_as_none")]
    id: Option<String>,
    name: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    roles: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    offered_ctc: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    job_location: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    people_selected: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    status: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    registration_deadline: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    ppt_datetime: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    oa_datetime: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    interview_datetime: Option<String>,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    created_at: Option<String>,
}

impl CompanyRow {
    fn into_record(self, index: usize) -> CompanyRecord {
        let id = self
            .id
            .unwrap_or_else(|| format!("row-{:04}", index + 1));

        let mut record = CompanyRecord::new(id, self.name);
        record.roles = self
            .roles
            .as_deref()
            .map(split_roles)
            .unwrap_or_default();
        record.offered_ctc = self.offered_ctc;
        record.job_location = self.job_location;
        record.people_selected = self
            .people_selected
            .as_deref()
            .and_then(|raw| raw.trim().parse::<u32>().ok());
        record.status = self
            .status
            .as_deref()
            .map(PlacementStatus::parse)
            .unwrap_or_default();
        record.registration_deadline = self.registration_deadline.as_deref().and_then(parse_timestamp);
        record.ppt_datetime = self.ppt_datetime.as_deref().and_then(parse_timestamp);
        record.oa_datetime = self.oa_datetime.as_deref().and_then(parse_timestamp);
        record.interview_datetime = self.interview_datetime.as_deref().and_then(parse_timestamp);
        record.created_at = self.created_at.as_deref().and_then(parse_timestamp);
        record
    }
}

fn split_roles(raw: &str) -> Vec<String> {
    raw.split(';')
        .map(str::trim)
        .filter(|role| !role.is_empty())
        .map(str::to_string)
        .collect()
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
