use crate::infra::{
    parse_instant, parse_phase, InMemoryCompanyRepository, InMemoryMemberDirectory,
};
use chrono::Utc;
use clap::Args;
use placement_tracker::error::AppError;
use placement_tracker::import::CompanyImporter;
use placement_tracker::placement::catalog::{CompanyListing, CompanyQuery, PlacementCatalog};
use placement_tracker::placement::dashboard::views::{CompanyTimelineEntry, DashboardView};
use placement_tracker::placement::{DashboardLimits, Timestamp, TimelinePhase};
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

type ExportCatalog = PlacementCatalog<InMemoryCompanyRepository, InMemoryMemberDirectory>;

fn load_catalog(csv: &Path) -> Result<ExportCatalog, AppError> {
    let companies = CompanyImporter::from_path(csv)?;
    Ok(PlacementCatalog::new(
        Arc::new(InMemoryCompanyRepository::with_companies(companies)),
        Arc::new(InMemoryMemberDirectory::default()),
    ))
}

#[derive(Args, Debug)]
pub(crate) struct DashboardArgs {
    /// CSV export of the companies table
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Evaluate as of this instant (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<Timestamp>,
    /// Maximum rows per ranked list
    #[arg(long, default_value_t = 5)]
    pub(crate) limit: usize,
    /// Emit the dashboard as JSON instead of text
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CompaniesArgs {
    /// CSV export of the companies table
    #[arg(long)]
    pub(crate) csv: PathBuf,
    /// Case-insensitive match on company name or role
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Restrict to one derived phase
    #[arg(long, value_parser = parse_phase)]
    pub(crate) phase: Option<TimelinePhase>,
    /// Evaluate as of this instant (defaults to now)
    #[arg(long, value_parser = parse_instant)]
    pub(crate) now: Option<Timestamp>,
}

pub(crate) fn run_dashboard(args: DashboardArgs) -> Result<(), AppError> {
    let DashboardArgs {
        csv,
        now,
        limit,
        json,
    } = args;

    let now = now.unwrap_or_else(Utc::now);
    let catalog = load_catalog(&csv)?;
    let view = catalog.dashboard(now, DashboardLimits::uniform(limit))?;

    if json {
        match serde_json::to_string_pretty(&view) {
            Ok(rendered) => println!("{rendered}"),
            Err(err) => println!("Dashboard payload unavailable: {err}"),
        }
    } else {
        render_dashboard(&view);
    }

    Ok(())
}

pub(crate) fn run_companies(args: CompaniesArgs) -> Result<(), AppError> {
    let CompaniesArgs {
        csv,
        search,
        phase,
        now,
    } = args;

    let now = now.unwrap_or_else(Utc::now);
    let catalog = load_catalog(&csv)?;
    let listing = catalog.companies(&CompanyQuery { search, phase }, now)?;

    for line in listing_lines(&listing, now) {
        println!("{line}");
    }

    Ok(())
}

fn listing_lines(listing: &CompanyListing, now: Timestamp) -> Vec<String> {
    let mut lines = vec![format!("Companies matching: {} (as of {})", listing.total, now)];
    if listing.companies.is_empty() {
        lines.push("- none match the given filters".to_string());
    }
    for company in &listing.companies {
        let roles = if company.roles.is_empty() {
            "roles not listed".to_string()
        } else {
            company.roles.join(", ")
        };
        lines.push(format!(
            "- {} [{}] | {} | CTC {} | phase {}",
            company.name,
            company.id,
            roles,
            company.offered_ctc.as_deref().unwrap_or("not disclosed"),
            company.phase_label
        ));
    }
    lines
}

fn render_dashboard(view: &DashboardView) {
    println!("Placement dashboard (evaluated {})", view.generated_at);
    println!(
        "Total companies: {} | Upcoming: {} | Completed: {} | Selected: {}",
        view.aggregate.total,
        view.aggregate.upcoming_count,
        view.aggregate.completed_count,
        view.aggregate.selected_count
    );

    if view.upcoming.is_empty() {
        println!("\nUpcoming companies: none");
    } else {
        println!("\nUpcoming companies");
        for entry in &view.upcoming {
            println!("- {}", describe_upcoming(entry));
        }
    }

    if view.recently_completed.is_empty() {
        println!("\nRecently completed: none");
    } else {
        println!("\nRecently completed");
        for entry in &view.recently_completed {
            let completed = entry
                .completed_on
                .map(|at| at.to_string())
                .unwrap_or_else(|| "date unknown".to_string());
            println!("- {} (completed {})", entry.name, completed);
        }
    }

    if view.recently_added.is_empty() {
        println!("\nRecently added: none");
    } else {
        println!("\nRecently added");
        for summary in &view.recently_added {
            println!(
                "- {} | {} | {}",
                summary.name,
                summary.offered_ctc.as_deref().unwrap_or("CTC not disclosed"),
                summary.phase_label
            );
        }
    }
}

fn describe_upcoming(entry: &CompanyTimelineEntry) -> String {
    match (&entry.registration_deadline, &entry.next_milestone) {
        (Some(deadline), _) if entry.phase == TimelinePhase::Upcoming => {
            format!("{}: registration closes {}", entry.name, deadline)
        }
        (_, Some(next)) => format!("{}: {} at {}", entry.name, next.kind_label, next.at),
        _ => entry.name.clone(),
    }
}
