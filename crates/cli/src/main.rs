use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;

use face_identify_core::pipeline::identify_faces_use_case::FaceOutcome;
use face_identify_core::pipeline::quickstart_use_case::{QuickstartReport, QuickstartUseCase};
use face_identify_core::pipeline::run_logger::{RunLogger, StdoutRunLogger};
use face_identify_core::recognition::domain::person_group::PersonGroupId;
use face_identify_core::recognition::infrastructure::http_face_client;
use face_identify_core::shared::clock::SystemClock;
use face_identify_core::shared::run_config::{Credentials, RunConfig};

/// Enroll sample persons into a remote person group, train it, then
/// identify and verify the faces of a group photo.
///
/// Reads the service endpoint and key from VISION_ENDPOINT and VISION_KEY.
#[derive(Parser)]
#[command(name = "face-identify")]
struct Cli {
    /// JSON run configuration (persons, images, models, timing).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Person group id to create (default: a fresh UUID).
    #[arg(long)]
    group_id: Option<String>,

    /// Give up waiting for training after this many seconds (0 = never).
    #[arg(long)]
    training_timeout: Option<u64>,

    /// Identify only; skip the verify call for each identified face.
    #[arg(long)]
    skip_verify: bool,

    /// Delete the person group when the run ends.
    #[arg(long)]
    cleanup: bool,
}

fn main() {
    env_logger::init();

    let result = run();
    println!("End of quickstart.");

    if let Err(e) = result {
        log::error!("Quickstart failed: {e}");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let mut config = RunConfig::resolve(cli.config.as_deref())?;
    if let Some(secs) = cli.training_timeout {
        config.training_timeout_secs = Some(secs);
    }
    config.validate()?;

    let credentials = Credentials::from_env()?;
    log::info!("Using endpoint {}", credentials.endpoint);
    let client = Arc::new(http_face_client::authenticate(
        &credentials.endpoint,
        &credentials.key,
    )?);

    let group_id = match cli.group_id {
        Some(id) => PersonGroupId::new(id),
        None => PersonGroupId::generate(),
    };

    let use_case = QuickstartUseCase::new(client, Arc::new(SystemClock), config)
        .with_verify(!cli.skip_verify)
        .with_cleanup(cli.cleanup);

    let mut logger = StdoutRunLogger::new();
    let result = use_case.execute(group_id, &mut logger);
    logger.summary();

    let report = result?;
    log_totals(&report);
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(id) = &cli.group_id {
        let valid = !id.is_empty()
            && id.len() <= 64
            && id
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
        if !valid {
            return Err(format!(
                "Group id must be 1-64 characters of lowercase letters, digits, '-' or '_', got '{id}'"
            )
            .into());
        }
    }
    if let Some(path) = &cli.config {
        if !path.exists() {
            return Err(format!("Config file not found: {}", path.display()).into());
        }
    }
    Ok(())
}

fn log_totals(report: &QuickstartReport) {
    let enrolled: usize = report
        .enrollment
        .persons
        .iter()
        .map(|p| p.enrolled.len())
        .sum();
    let skipped: usize = report
        .enrollment
        .persons
        .iter()
        .map(|p| p.skipped.len())
        .sum();
    let verified = report
        .identification
        .outcomes
        .iter()
        .filter(|o| {
            matches!(
                o,
                FaceOutcome::Identified {
                    verification: Some(v),
                    ..
                } if v.is_identical
            )
        })
        .count();
    log::info!(
        "Group {}: {} person(s), {enrolled} image(s) enrolled, {skipped} skipped; \
         {} face(s) identified in {}, {verified} verified",
        report.group.id,
        report.enrollment.persons.len(),
        report.identification.identified().count(),
        report.identification.image,
    );
}
