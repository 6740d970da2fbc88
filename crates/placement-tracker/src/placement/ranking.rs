use super::domain::CompanyRecord;
use super::timestamp::Timestamp;
use std::cmp::Reverse;
use std::collections::HashSet;

/// Companies with open registration first (soonest deadline first), then the
/// remaining companies that still have a future milestone, soonest first.
/// Each company id appears once; ties keep input order.
pub fn rank_upcoming(
    companies: &[CompanyRecord],
    now: Timestamp,
    limit: usize,
) -> Vec<&CompanyRecord> {
    let mut open_registration: Vec<(Timestamp, &CompanyRecord)> = companies
        .iter()
        .filter_map(|company| {
            company
                .registration_deadline
                .filter(|deadline| *deadline > now)
                .map(|deadline| (deadline, company))
        })
        .collect();
    open_registration.sort_by_key(|(deadline, _)| *deadline);

    let mut pending_milestone: Vec<(Timestamp, &CompanyRecord)> = companies
        .iter()
        .filter(|company| !company.milestones().registration_open(now))
        .filter_map(|company| {
            company
                .classify(now)
                .next_upcoming_at()
                .map(|next| (next, company))
        })
        .collect();
    pending_milestone.sort_by_key(|(next, _)| *next);

    let mut seen = HashSet::new();
    open_registration
        .into_iter()
        .chain(pending_milestone)
        .map(|(_, company)| company)
        .filter(|company| seen.insert(company.id.clone()))
        .take(limit)
        .collect()
}

/// Recently completed companies, latest effective completion first.
pub fn rank_recently_completed(
    companies: &[CompanyRecord],
    now: Timestamp,
    limit: usize,
) -> Vec<&CompanyRecord> {
    let mut completed: Vec<(Option<Timestamp>, &CompanyRecord)> = companies
        .iter()
        .filter(|company| company.milestones().recently_completed(now))
        .map(|company| (company.milestones().effective_completion(), company))
        .collect();

    // `None` orders below every instant, so undated entries sink to the end.
    completed.sort_by_key(|(completed_at, _)| Reverse(*completed_at));

    completed
        .into_iter()
        .map(|(_, company)| company)
        .take(limit)
        .collect()
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

    fn company(id: &str) -> CompanyRecord {
        CompanyRecord::new(id, format!("Company {id}"))
    }

    fn ids(ranked: &[&CompanyRecord]) -> Vec<String> {
        ranked.iter().map(|company| company.id.0.clone()).collect()
    }

    #[test]
    fn open_registrations_precede_other_future_milestones() {
        let mut interview_soon = company("b-interview");
        interview_soon.interview_datetime = Some(now() + Duration::hours(2));

        let mut late_deadline = company("a-late");
        late_deadline.registration_deadline = Some(now() + Duration::days(6));

        let mut early_deadline = company("a-early");
        early_deadline.registration_deadline = Some(now() + Duration::days(1));

        let mut talk = company("b-talk");
        talk.registration_deadline = Some(now() - Duration::days(1));
        talk.ppt_datetime = Some(now() + Duration::days(1));

        let companies = vec![interview_soon, late_deadline, early_deadline, talk];
        let ranked = rank_upcoming(&companies, now(), 10);

        assert_eq!(
            ids(&ranked),
            vec!["a-early", "a-late", "b-interview", "b-talk"]
        );
    }

    #[test]
    fn duplicate_ids_keep_first_appearance() {
        let mut first = company("dup");
        first.registration_deadline = Some(now() + Duration::days(2));
        let mut second = company("dup");
        second.oa_datetime = Some(now() + Duration::days(1));
        let mut third = company("dup");
        third.registration_deadline = Some(now() + Duration::days(3));

        let companies = vec![first, second, third];
        let ranked = rank_upcoming(&companies, now(), 10);

        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].registration_deadline, Some(now() + Duration::days(2)));
    }

    #[test]
    fn equal_deadlines_keep_input_order_and_limit_applies() {
        let deadline = now() + Duration::days(1);
        let companies: Vec<CompanyRecord> = ["x", "y", "z"]
            .iter()
            .map(|id| {
                let mut record = company(id);
                record.registration_deadline = Some(deadline);
                record
            })
            .collect();

        assert_eq!(ids(&rank_upcoming(&companies, now(), 2)), vec!["x", "y"]);
        assert!(rank_upcoming(&companies, now(), 0).is_empty());
    }

    #[test]
    fn completed_companies_sort_latest_first() {
        let mut via_interview = company("interview");
        via_interview.oa_datetime = Some(now() - Duration::days(10));
        via_interview.interview_datetime = Some(now() - Duration::days(3));

        let mut via_assessment = company("assessment");
        via_assessment.oa_datetime = Some(now() - Duration::hours(1));

        let mut still_pending = company("pending");
        still_pending.oa_datetime = Some(now() - Duration::days(1));
        still_pending.interview_datetime = Some(now() + Duration::days(1));

        let companies = vec![via_interview, still_pending, via_assessment];
        let ranked = rank_recently_completed(&companies, now(), 5);

        assert_eq!(ids(&ranked), vec!["assessment", "interview"]);
    }

    #[test]
    fn unscheduled_companies_are_never_ranked() {
        let companies = vec![company("blank")];

        assert!(rank_upcoming(&companies, now(), 5).is_empty());
        assert!(rank_recently_completed(&companies, now(), 5).is_empty());
    }
}
