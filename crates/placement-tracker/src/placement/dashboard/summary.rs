use super::super::domain::CompanyRecord;
use super::super::ranking::{rank_recently_completed, rank_upcoming};
use super::super::timestamp::Timestamp;
use super::views::{CompanySummaryView, CompanyTimelineEntry, DashboardView};
use crate::config::DashboardConfig;
use serde::Serialize;
use std::cmp::Reverse;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardAggregate {
    pub total: usize,
    pub upcoming_count: usize,
    pub completed_count: usize,
    pub selected_count: u64,
}

pub fn aggregate(companies: &[CompanyRecord], now: Timestamp) -> DashboardAggregate {
    companies
        .iter()
        .fold(DashboardAggregate::default(), |mut totals, company| {
            let milestones = company.milestones();
            totals.total += 1;
            if milestones.registration_open(now) {
                totals.upcoming_count += 1;
            }
            if milestones.recently_completed(now) {
                totals.completed_count += 1;
            }
            totals.selected_count += u64::from(company.people_selected.unwrap_or(0));
            totals
        })
}

/// Per-list caps for the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DashboardLimits {
    pub upcoming: usize,
    pub recently_completed: usize,
    pub recently_added: usize,
}

impl DashboardLimits {
    pub const fn uniform(limit: usize) -> Self {
        Self {
            upcoming: limit,
            recently_completed: limit,
            recently_added: limit,
        }
    }
}

impl Default for DashboardLimits {
    fn default() -> Self {
        Self::uniform(DashboardConfig::DEFAULT_LIST_LIMIT)
    }
}

impl From<&DashboardConfig> for DashboardLimits {
    fn from(config: &DashboardConfig) -> Self {
        Self::uniform(config.list_limit)
    }
}

pub struct Dashboard;

impl Dashboard {
    pub fn build(
        companies: &[CompanyRecord],
        now: Timestamp,
        limits: DashboardLimits,
    ) -> DashboardView {
        let upcoming = rank_upcoming(companies, now, limits.upcoming)
            .into_iter()
            .map(|company| CompanyTimelineEntry::from_record(company, now))
            .collect();

        let recently_completed = rank_recently_completed(companies, now, limits.recently_completed)
            .into_iter()
            .map(|company| CompanyTimelineEntry::from_record(company, now))
            .collect();

        let mut newest_first: Vec<&CompanyRecord> = companies.iter().collect();
        newest_first.sort_by_key(|company| Reverse(company.created_at));
        let recently_added = newest_first
            .into_iter()
            .take(limits.recently_added)
            .map(|company| CompanySummaryView::from_record(company, now))
            .collect();

        DashboardView {
            generated_at: now,
            aggregate: aggregate(companies, now),
            upcoming,
            recently_completed,
            recently_added,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn now() -> Timestamp {
        Utc.with_ymd_and_hms(2025, 8, 1, 12, 0, 0)
            .single()
            .expect("valid instant")
    }

    #[test]
    fn empty_snapshot_yields_zeroes() {
        let view = Dashboard::build(&[], now(), DashboardLimits::default());

        assert_eq!(view.aggregate, DashboardAggregate::default());
        assert!(view.upcoming.is_empty());
        assert!(view.recently_completed.is_empty());
        assert!(view.recently_added.is_empty());
    }

    #[test]
    fn aggregate_counts_each_bucket() {
        let mut open = CompanyRecord::new("open", "Open Registration");
        open.registration_deadline = Some(now() + Duration::days(2));
        open.people_selected = Some(3);

        let mut done = CompanyRecord::new("done", "Interviewed");
        done.interview_datetime = Some(now() - Duration::days(1));
        done.people_selected = Some(7);

        let blank = CompanyRecord::new("blank", "No Dates");

        let totals = aggregate(&[open, done, blank], now());
        assert_eq!(
            totals,
            DashboardAggregate {
                total: 3,
                upcoming_count: 1,
                completed_count: 1,
                selected_count: 10,
            }
        );
    }

    #[test]
    fn recently_added_lists_newest_first() {
        let mut older = CompanyRecord::new("older", "Older");
        older.created_at = Some(now() - Duration::days(3));
        let mut newer = CompanyRecord::new("newer", "Newer");
        newer.created_at = Some(now() - Duration::hours(1));
        let undated = CompanyRecord::new("undated", "Undated");

        let view = Dashboard::build(
            &[older, undated, newer],
            now(),
            DashboardLimits {
                upcoming: 5,
                recently_completed: 5,
                recently_added: 2,
            },
        );

        let ids: Vec<&str> = view
            .recently_added
            .iter()
            .map(|entry| entry.id.0.as_str())
            .collect();
        assert_eq!(ids, vec!["newer", "older"]);
    }
}
