// tabula-core/src/application/session.rs
//
// One cleaning session: a dataset runs through a recipe, producing the
// final table, the full step history and a quality report. Persistence is
// the caller's business; nothing here touches the version store.

use serde::Serialize;
use tracing::{info, instrument};

use crate::application::executor::TransformExecutor;
use crate::application::pipeline::{Pipeline, PipelineStep};
use crate::domain::dataset::Table;
use crate::domain::quality::{QualityReport, QualityScorer};
use crate::error::TabulaError;
use crate::infrastructure::config::recipe::Recipe;

#[derive(Debug, Serialize)]
pub struct SessionOutcome {
    pub dataset_id: String,
    #[serde(skip)]
    pub table: Table,
    pub steps: Vec<PipelineStep>,
    pub quality: QualityReport,
}

/// Aggregate result of a batch run, persisted as `run_results.json`.
#[derive(Debug, Serialize, serde::Deserialize)]
pub struct RunResult {
    pub success: bool,
    pub datasets_processed: usize,
    pub errors: Vec<String>,
}

/// Apply every recipe operation in order, fail-fast. A failing step aborts
/// the session with the offending index attached; prior steps stay valid.
#[instrument(skip(initial, recipe, executor), fields(dataset = %dataset_id, ops = recipe.operations.len()))]
pub fn run_session(
    dataset_id: &str,
    initial: Table,
    recipe: &Recipe,
    executor: TransformExecutor,
) -> Result<SessionOutcome, TabulaError> {
    let mut pipeline = Pipeline::new(executor);
    let mut table = initial;

    for spec in &recipe.operations {
        let (next, result) = pipeline.append_step(&table, spec.clone())?;
        info!(
            op = %result.operation.kind,
            rows = result.table_after_shape.rows,
            columns = result.table_after_shape.columns,
            "step applied"
        );
        table = next;
    }

    let quality = QualityScorer::score(&table);
    info!(composite = quality.composite_score, "session finished");

    Ok(SessionOutcome {
        dataset_id: dataset_id.to_string(),
        table,
        steps: pipeline.history().to_vec(),
        quality,
    })
}
