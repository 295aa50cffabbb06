// tabula/src/commands/history.rs
//
// USE CASE: list the recorded version history of the project's datasets,
// as stored by previous `tabula run` invocations.

use comfy_table::Table as DisplayTable;
use comfy_table::presets::UTF8_FULL;
use std::path::PathBuf;

use tabula_core::domain::lineage::VersionRecord;
use tabula_core::infrastructure::adapters::JsonlVersionStore;
use tabula_core::infrastructure::config::load_project_config;
use tabula_core::ports::VersionStore;

pub async fn execute(
    project_dir: PathBuf,
    dataset: Option<String>,
    format: String,
) -> anyhow::Result<()> {
    let config = load_project_config(&project_dir)?;
    let store = JsonlVersionStore::new(
        project_dir.join(&config.target_path).join("versions.jsonl"),
    );

    let records = match &dataset {
        Some(id) => store.list_versions(id).await?,
        None => store.list_all().await?,
    };

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!(
            "ℹ️  No versions recorded{}. Run 'tabula run' first.",
            dataset.map(|d| format!(" for '{}'", d)).unwrap_or_default()
        );
        return Ok(());
    }

    println!("\n🔗 Version History ({} records)", records.len());
    let mut display = DisplayTable::new();
    display.load_preset(UTF8_FULL);
    display.set_header(vec![
        "Dataset", "Version", "Operation", "Shape", "+Cols", "-Cols", "Created At",
    ]);
    for record in &records {
        display.add_row(vec![
            record.dataset_id.clone(),
            format!("v{}", record.version_number),
            record.operation_type.clone(),
            shape_transition(record),
            record.columns_added.len().to_string(),
            record.columns_removed.len().to_string(),
            record.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
        ]);
    }
    println!("{display}");

    Ok(())
}

fn shape_transition(record: &VersionRecord) -> String {
    format!(
        "{}×{} → {}×{}",
        record.rows_before, record.columns_before, record.rows_after, record.columns_after
    )
}
