use chrono::{Duration, TimeZone, Utc};
use placement_tracker::placement::dashboard::aggregate;
use placement_tracker::placement::{
    CompanyRecord, Dashboard, DashboardLimits, MilestoneKind, Timestamp, TimelinePhase,
};

fn now() -> Timestamp {
    Utc.with_ymd_and_hms(2025, 9, 15, 10, 0, 0)
        .single()
        .expect("valid instant")
}

fn snapshot() -> Vec<CompanyRecord> {
    let mut alpha = CompanyRecord::new("alpha", "Alpha Robotics");
    alpha.registration_deadline = Some(now() + Duration::days(3));
    alpha.ppt_datetime = Some(now() + Duration::days(1));
    alpha.people_selected = Some(2);

    let mut beta = CompanyRecord::new("beta", "Beta Finance");
    beta.registration_deadline = Some(now() - Duration::days(4));
    beta.oa_datetime = Some(now() + Duration::hours(5));

    let mut gamma = CompanyRecord::new("gamma", "Gamma Health");
    gamma.oa_datetime = Some(now() - Duration::days(8));
    gamma.interview_datetime = Some(now() - Duration::days(6));
    gamma.people_selected = Some(11);

    let mut delta = CompanyRecord::new("delta", "Delta Logistics");
    delta.oa_datetime = Some(now() - Duration::days(1));

    let epsilon = CompanyRecord::new("epsilon", "Epsilon Retail");

    vec![alpha, beta, gamma, delta, epsilon]
}

#[test]
fn aggregate_totals_match_snapshot() {
    let companies = snapshot();
    let totals = aggregate(&companies, now());

    assert_eq!(totals.total, companies.len());
    assert_eq!(totals.upcoming_count, 1);
    assert_eq!(totals.completed_count, 2);
    assert_eq!(
        totals.selected_count,
        companies
            .iter()
            .map(|company| u64::from(company.people_selected.unwrap_or(0)))
            .sum::<u64>()
    );
}

#[test]
fn dashboard_lists_are_ranked_and_labelled() {
    let view = Dashboard::build(&snapshot(), now(), DashboardLimits::default());

    let upcoming: Vec<&str> = view.upcoming.iter().map(|entry| entry.id.0.as_str()).collect();
    assert_eq!(upcoming, vec!["alpha", "beta"]);

    let alpha = &view.upcoming[0];
    assert_eq!(alpha.phase, TimelinePhase::Upcoming);
    let next = alpha.next_milestone.as_ref().expect("alpha has a next milestone");
    assert_eq!(next.kind, MilestoneKind::PrePlacementTalk);
    assert_eq!(next.kind_label, "Pre-Placement Talk");

    assert_eq!(view.upcoming[1].phase, TimelinePhase::Ongoing);

    let completed: Vec<&str> = view
        .recently_completed
        .iter()
        .map(|entry| entry.id.0.as_str())
        .collect();
    assert_eq!(completed, vec!["delta", "gamma"]);
    assert_eq!(
        view.recently_completed[1].completed_on,
        Some(now() - Duration::days(6))
    );
}

#[test]
fn dashboard_serializes_for_api_clients() {
    let view = Dashboard::build(&snapshot(), now(), DashboardLimits::uniform(1));
    let json = serde_json::to_value(&view).expect("view serializes");

    assert_eq!(json["aggregate"]["total"], 5);
    assert_eq!(json["upcoming"].as_array().map(Vec::len), Some(1));
    assert_eq!(json["upcoming"][0]["phase_label"], "Upcoming");
    assert_eq!(
        json["recently_completed"][0]["last_milestone"]["kind"],
        "online_assessment"
    );
}
