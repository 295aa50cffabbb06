// tabula/src/commands/run.rs
//
// USE CASE: run a recipe against one or every dataset of the project.
// Transform work fans out with bounded concurrency; persistence (version
// records, cleaned CSVs, quality reports) happens sequentially afterwards
// so the version store never sees interleaved writes.

use std::path::{Path, PathBuf};
use std::time::Instant;

use futures::StreamExt;
use walkdir::WalkDir;

use tabula_core::application::{RunResult, SessionOutcome, TransformExecutor, run_session};
use tabula_core::domain::lineage::VersionRecord;
use tabula_core::infrastructure::adapters::JsonlVersionStore;
use tabula_core::infrastructure::adapters::csv::{read_table, table_to_csv};
use tabula_core::infrastructure::config::{load_project_config, load_recipe};
use tabula_core::infrastructure::fs::{atomic_write, write_json};
use tabula_core::ports::VersionStore;

const MAX_CONCURRENT_SESSIONS: usize = 4;

pub async fn execute(
    project_dir: PathBuf,
    input: Option<PathBuf>,
    recipe_path: Option<PathBuf>,
) -> anyhow::Result<RunResult> {
    let start = Instant::now();

    println!("⚙️  Loading configuration...");
    let config = load_project_config(&project_dir)?;
    println!("   Project: {} (v{})", config.name, config.version);

    let recipe_path = recipe_path.unwrap_or_else(|| project_dir.join("recipe.yaml"));
    let recipe = load_recipe(&recipe_path)?;
    println!(
        "🧪 Recipe '{}' ({} operations)",
        recipe.name,
        recipe.operations.len()
    );

    let inputs = match input {
        Some(path) => vec![path],
        None => discover_datasets(&project_dir.join(&config.data_path)),
    };
    if inputs.is_empty() {
        anyhow::bail!(
            "No CSV datasets found under {:?}. Use --input or fill the data directory.",
            project_dir.join(&config.data_path)
        );
    }
    println!("📦 {} dataset(s) selected", inputs.len());

    let target_dir = project_dir.join(&config.target_path);
    std::fs::create_dir_all(target_dir.join("data"))?;
    std::fs::create_dir_all(target_dir.join("quality"))?;

    // 1. EXECUTION (parallel sessions, pure compute)
    println!("🟢 Processing datasets...");
    let settings = config.transforms.clone();
    let sessions = inputs.iter().map(|path| {
        let recipe = &recipe;
        let executor = TransformExecutor::new(settings.clone());
        async move {
            let dataset_id = dataset_id_of(path);
            let outcome = read_table(path)
                .map_err(anyhow::Error::from)
                .and_then(|table| {
                    run_session(&dataset_id, table, recipe, executor).map_err(anyhow::Error::from)
                });
            (dataset_id, outcome)
        }
    });
    let mut results: Vec<(String, anyhow::Result<SessionOutcome>)> =
        futures::stream::iter(sessions)
            .buffer_unordered(MAX_CONCURRENT_SESSIONS)
            .collect()
            .await;
    results.sort_by(|a, b| a.0.cmp(&b.0));

    // 2. PERSISTENCE (sequential: versions, cleaned data, quality)
    let store = JsonlVersionStore::new(target_dir.join("versions.jsonl"));
    let mut processed = 0;
    let mut errors = Vec::new();

    for (dataset_id, outcome) in results {
        match outcome {
            Ok(outcome) => {
                for (index, step) in outcome.steps.iter().enumerate() {
                    let record = VersionRecord::from_step(&dataset_id, index + 1, &step.result);
                    store.save_version(&record).await?;
                }

                let bytes = table_to_csv(&outcome.table)?;
                atomic_write(
                    target_dir.join("data").join(format!("{}_cleaned.csv", dataset_id)),
                    bytes,
                )?;
                write_json(
                    target_dir.join("quality").join(format!("{}.json", dataset_id)),
                    &outcome.quality,
                )?;

                println!(
                    "    ✅ {}: {} rows × {} cols | composite quality {:.2}",
                    dataset_id,
                    outcome.table.row_count(),
                    outcome.table.column_count(),
                    outcome.quality.composite_score
                );
                processed += 1;
            }
            Err(e) => {
                eprintln!("    ❌ {}: {}", dataset_id, e);
                errors.push(format!("{}: {}", dataset_id, e));
            }
        }
    }

    let result = RunResult {
        success: errors.is_empty(),
        datasets_processed: processed,
        errors,
    };
    write_json(target_dir.join("run_results.json"), &result)?;

    println!(
        "✨ Done in {:.2}s. Processed {} dataset(s).",
        start.elapsed().as_secs_f64(),
        processed
    );
    Ok(result)
}

fn dataset_id_of(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string())
}

/// Every *.csv under the data directory, sorted for stable run order.
fn discover_datasets(data_dir: &Path) -> Vec<PathBuf> {
    let mut found: Vec<PathBuf> = WalkDir::new(data_dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.path().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"))
        })
        .map(|e| e.path().to_path_buf())
        .collect();
    found.sort();
    found
}
