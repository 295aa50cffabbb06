// tabula/src/commands/score.rs
//
// USE CASE: quality report of a CSV dataset (completeness / uniqueness).

use comfy_table::Table as DisplayTable;
use comfy_table::presets::UTF8_FULL;
use std::path::PathBuf;

use tabula_core::domain::quality::QualityScorer;
use tabula_core::infrastructure::adapters::csv::read_table;

pub fn execute(input: PathBuf, json: bool) -> anyhow::Result<()> {
    let table = read_table(&input)?;
    let report = QualityScorer::score(&table);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("\n📊 Quality Report: {}", input.display());
    println!(
        "   Shape: {} rows × {} columns",
        table.row_count(),
        table.column_count()
    );

    let mut display = DisplayTable::new();
    display.load_preset(UTF8_FULL);
    display.set_header(vec!["Metric", "Value"]);
    display.add_row(vec![
        "Completeness".to_string(),
        format!("{:.4}", report.completeness_score),
    ]);
    display.add_row(vec![
        "Uniqueness".to_string(),
        format!("{:.4}", report.uniqueness_score),
    ]);
    display.add_row(vec![
        "Composite (0.6/0.4)".to_string(),
        format!("{:.4}", report.composite_score),
    ]);
    display.add_row(vec![
        "Missing cells".to_string(),
        format!("{} / {}", report.missing_cells, report.total_cells),
    ]);
    display.add_row(vec![
        "Duplicate rows".to_string(),
        report.duplicate_rows.to_string(),
    ]);
    println!("{display}");

    Ok(())
}
