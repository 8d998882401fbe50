//! Robot Store report generator - Main Entry Point
//!
//! Compiles Playwright JSON results and the known-issues ledger into
//! `TEST_REPORT.md`.

use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use storeqa_report::{ReportConfig, ReportGenerator};

mod output;

/// Exit code when `--fail-on-new-bugs` is set and an unmatched failure exists
const EXIT_NEW_BUGS: i32 = 2;

/// Generate the Robot Store Markdown test report
#[derive(Parser, Debug)]
#[command(name = "generate-report")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Playwright JSON reporter output
    #[arg(long, default_value = "test-results.json")]
    input: PathBuf,

    /// Known-issues ledger (JSON, or YAML for .yaml/.yml)
    #[arg(long, default_value = "known-issues.json")]
    known: PathBuf,

    /// Markdown report destination
    #[arg(long, default_value = "TEST_REPORT.md")]
    output: PathBuf,

    /// Also write a JSON summary to this path
    #[arg(long)]
    summary_json: Option<PathBuf>,

    /// Report heading
    #[arg(long, default_value = "Robot Store Test Report")]
    title: String,

    /// Environment shown when the results carry no baseURL
    #[arg(long, env = "APP_BASE_URL")]
    base_url: Option<String>,

    /// Print the executive summary table after generating
    #[arg(long)]
    print_summary: bool,

    /// Exit with status 2 when a failure has no known issue
    #[arg(long)]
    fail_on_new_bugs: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn report_config(&self) -> ReportConfig {
        ReportConfig {
            input: self.input.clone(),
            known_issues: self.known.clone(),
            output: self.output.clone(),
            summary_json: self.summary_json.clone(),
            title: self.title.clone(),
            fallback_base_url: self.base_url.clone(),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            output::print_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<i32> {
    let config = cli.report_config();
    debug!(?config, "resolved report configuration");
    let generator = ReportGenerator::new(config);
    let rendered = generator.render(Utc::now())?;

    for warning in &rendered.warnings {
        output::print_warning(warning);
    }
    let outcome = generator.write(rendered)?;

    output::print_success(&format!("Report written to {}", outcome.output.display()));
    if let Some(path) = &outcome.summary_json {
        output::print_success(&format!("Summary written to {}", path.display()));
    }

    if cli.print_summary {
        output::print_summary(&outcome.summary);
    }

    if cli.fail_on_new_bugs && outcome.has_new_bugs() {
        output::print_error(&format!(
            "{} failed test(s) have no known issue",
            outcome.summary.new_bugs
        ));
        return Ok(EXIT_NEW_BUGS);
    }

    Ok(0)
}
