use anyhow::{Context, Result};
use chrono::Utc;
use energy_projection_engine::{config, report, runner, store, telemetry};
use config::Config;
use report::{CostDocument, ProjectionDocument, COSTS_FILE, PROJECTIONS_FILE};
use std::sync::Arc;
use store::{Calibration, ConfigStore};
use telemetry::init_tracing;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cfg = Config::load()?;
    info!(
        documents = %cfg.paths.documents_dir.display(),
        output = %cfg.paths.output_dir.display(),
        "starting energy projection run"
    );

    let documents = store::load_documents(&cfg.paths.documents_dir)
        .await
        .context("failed to read configuration documents")?;
    let store = Arc::new(
        ConfigStore::from_documents(documents, cfg.horizon())
            .context("invalid configuration documents")?,
    );

    let settings = cfg.run_settings();
    let output = {
        let store = Arc::clone(&store);
        let settings = settings.clone();
        tokio::task::spawn_blocking(move || runner::run(&store, &settings))
            .await
            .context("projection task panicked")??
    };

    if output.diagnostics.calibration() == Calibration::Degraded {
        warn!(
            diagnostics = output.diagnostics.len(),
            "run used fallback defaults, results are degraded"
        );
    }

    let precision = cfg.precision();
    let generated_at = Utc::now();
    let costs = CostDocument::build(&store, &output, &precision, generated_at);
    let projections =
        ProjectionDocument::build(&store, &output, settings.clean_buffer, &precision, generated_at);

    let out_dir = &cfg.paths.output_dir;
    futures::try_join!(
        report::write_document(out_dir, COSTS_FILE, &costs),
        report::write_document(out_dir, PROJECTIONS_FILE, &projections),
    )
    .with_context(|| format!("failed to write results to {}", out_dir.display()))?;

    info!(
        scenarios = output.scenarios.len(),
        skipped_cells = output.skipped_cells.len(),
        "projection run complete"
    );
    Ok(())
}
