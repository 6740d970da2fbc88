use crate::report::{run_companies, run_dashboard, CompaniesArgs, DashboardArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use placement_tracker::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Placement Tracker",
    about = "Serve the placement tracker API or inspect a company export from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Print dashboard totals and ranked lists for a company export
    Dashboard(DashboardArgs),
    /// List companies from an export, optionally filtered by search text or phase
    Companies(CompaniesArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Dashboard(args) => run_dashboard(args),
        Command::Companies(args) => run_companies(args),
    }
}
