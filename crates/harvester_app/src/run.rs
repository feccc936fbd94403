use std::path::Path;
use std::sync::Arc;

use harvest_logging::{harvest_error, harvest_info, harvest_warn};
use harvester_core::ListingSource;
use harvester_engine::sites::InfocasasExtractor;
use harvester_engine::{
    export_harvest, load_session, save_session, ExportSummary, HarvestError, Harvester,
    RecordExtractor, Renderer, ReqwestFetcher, StaticRenderer, TabularSink, WorkbookSink,
};

use crate::config::AppConfig;

/// What happened to each listing source of a run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub exported: Vec<ExportSummary>,
    pub failed: Vec<(String, HarvestError)>,
}

impl RunReport {
    /// No source hit a setup or sink failure.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Harvests every configured listing over HTTP into workbooks.
pub async fn run(config: &AppConfig) -> RunReport {
    let renderer: Arc<dyn Renderer> =
        Arc::new(StaticRenderer::new(ReqwestFetcher::new(config.fetch.clone())));
    run_with(
        config,
        renderer,
        Arc::new(InfocasasExtractor::new()),
        &WorkbookSink::default(),
    )
    .await
}

/// Sources are processed one after another. The session is restored before
/// the first and saved after the last, whatever happened in between.
pub async fn run_with(
    config: &AppConfig,
    renderer: Arc<dyn Renderer>,
    extractor: Arc<dyn RecordExtractor>,
    sink: &dyn TabularSink,
) -> RunReport {
    restore_session(&config.session_path, renderer.as_ref());

    let harvester = Harvester::new(renderer.clone(), extractor, config.harvest.clone());
    let mut report = RunReport::default();
    for source in &config.sources {
        match harvest_source(&harvester, source, sink, &config.output_dir).await {
            Ok(summary) => report.exported.push(summary),
            Err(err) => {
                harvest_error!("{}: {}", source.url(), err);
                report.failed.push((source.url().to_string(), err));
            }
        }
    }

    persist_session(&config.session_path, renderer.as_ref());
    report
}

async fn harvest_source(
    harvester: &Harvester,
    source: &ListingSource,
    sink: &dyn TabularSink,
    output_dir: &Path,
) -> Result<ExportSummary, HarvestError> {
    let result = harvester.run(source).await?;
    for failure in &result.failures {
        harvest_warn!("Not exported: {}", failure);
    }
    Ok(export_harvest(sink, &result, output_dir)?)
}

fn restore_session(path: &Path, renderer: &dyn Renderer) {
    match load_session(path) {
        Ok(cookies) if cookies.is_empty() => harvest_info!("No saved session at {:?}", path),
        Ok(cookies) => renderer.load_cookies(&cookies),
        Err(err) => harvest_warn!("Starting without saved session: {}", err),
    }
}

fn persist_session(path: &Path, renderer: &dyn Renderer) {
    if let Err(err) = save_session(path, &renderer.cookies()) {
        harvest_error!("Failed to save session: {}", err);
    }
}
