// tabula/src/commands/ops.rs
//
// USE CASE: render the operation registry — every supported kind, its
// target policy and parameter schema.

use comfy_table::Table as DisplayTable;
use comfy_table::presets::UTF8_FULL;

use tabula_core::domain::ops::{OperationRegistry, ParamKind, ParameterSpec};

pub fn execute() -> anyhow::Result<()> {
    let mut display = DisplayTable::new();
    display.load_preset(UTF8_FULL);
    display.set_header(vec!["Operation", "Targets", "Parameters"]);

    for kind in OperationRegistry::kinds() {
        let schema = OperationRegistry::describe(*kind);
        let params = if schema.params.is_empty() {
            "—".to_string()
        } else {
            schema
                .params
                .iter()
                .map(describe_param)
                .collect::<Vec<_>>()
                .join("\n")
        };
        display.add_row(vec![
            schema.kind.to_string(),
            schema.target.as_str().to_string(),
            params,
        ]);
    }

    println!("📚 Supported operations ({})", OperationRegistry::kinds().len());
    println!("{display}");
    Ok(())
}

fn describe_param(param: &ParameterSpec) -> String {
    let requirement = if param.required { "required" } else { "optional" };
    let kind = match param.kind {
        ParamKind::Float { min, max } => format!(
            "float{}",
            range_suffix(min.map(|v| v.to_string()), max.map(|v| v.to_string()))
        ),
        ParamKind::Integer { min, max } => format!(
            "integer{}",
            range_suffix(min.map(|v| v.to_string()), max.map(|v| v.to_string()))
        ),
        ParamKind::Text => "string".to_string(),
        ParamKind::TextList => "list of strings".to_string(),
        ParamKind::OneOf(allowed) => format!("one of {:?}", allowed),
        ParamKind::Any => "any".to_string(),
    };
    format!("{} ({}, {})", param.name, requirement, kind)
}

fn range_suffix(min: Option<String>, max: Option<String>) -> String {
    match (min, max) {
        (Some(min), Some(max)) => format!(" in [{}, {}]", min, max),
        (Some(min), None) => format!(" >= {}", min),
        (None, Some(max)) => format!(" <= {}", max),
        (None, None) => String::new(),
    }
}
