// tabula/src/commands/query.rs
//
// USE CASE: ad-hoc read-only SQL over a CSV dataset. The file is exposed
// as the view 'data'; the guard rejects anything but a single SELECT
// before the engine sees it.

use comfy_table::Table as DisplayTable;
use comfy_table::presets::UTF8_FULL;
use std::path::PathBuf;
use std::time::Instant;

use tabula_core::domain::guard::QueryGuard;
use tabula_core::infrastructure::adapters::SqlWorkbench;

pub fn execute(query: String, input: PathBuf, limit: usize) -> anyhow::Result<()> {
    if !input.exists() {
        anyhow::bail!("❌ Dataset not found at: {}", input.display());
    }

    QueryGuard::assert_read_only(&query)?;

    let start = Instant::now();
    let workbench = SqlWorkbench::in_memory()?;
    workbench.register_csv("data", &input.to_string_lossy())?;
    let (names, rows) = workbench.run_select(&query, limit)?;

    let mut display = DisplayTable::new();
    display.load_preset(UTF8_FULL);
    display.set_header(names);
    let shown = rows.len();
    for row in rows {
        display.add_row(row);
    }
    println!("{display}");
    println!(
        "   ➜ {} row(s) shown (limit {}) in {:.2?}",
        shown,
        limit,
        start.elapsed()
    );

    Ok(())
}
