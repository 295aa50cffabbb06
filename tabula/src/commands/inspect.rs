// tabula/src/commands/inspect.rs
//
// USE CASE: inspect a CSV dataset (inferred schema + sample rows).

use comfy_table::Table as DisplayTable;
use comfy_table::presets::UTF8_FULL;
use std::path::PathBuf;

use tabula_core::infrastructure::adapters::csv::read_table;

pub fn execute(input: PathBuf, limit: usize) -> anyhow::Result<()> {
    if !input.exists() {
        anyhow::bail!("❌ Dataset not found at: {}", input.display());
    }

    let table = read_table(&input)?;

    println!("\n🔍 Inspecting Dataset: '{}'", input.display());
    println!(
        "   Shape: {} rows × {} columns",
        table.row_count(),
        table.column_count()
    );

    let mut schema = DisplayTable::new();
    schema.load_preset(UTF8_FULL);
    schema.set_header(vec!["Column", "Type", "Missing"]);
    for column in table.columns() {
        schema.add_row(vec![
            column.name.clone(),
            column.dtype.to_string(),
            column.missing_count().to_string(),
        ]);
    }
    println!("{schema}");

    println!("   --- Rows (Limit {}) ---", limit);
    let mut rows = DisplayTable::new();
    rows.load_preset(UTF8_FULL);
    rows.set_header(table.column_names().collect::<Vec<_>>());
    for row in 0..table.row_count().min(limit) {
        rows.add_row(
            table
                .columns()
                .iter()
                .map(|c| c.values[row].render())
                .collect::<Vec<_>>(),
        );
    }
    println!("{rows}");

    Ok(())
}
