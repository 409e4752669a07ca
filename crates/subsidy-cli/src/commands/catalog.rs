//! Catalog command implementation

use anyhow::{Context, Result};
use subsidy_core::catalog::catalogs;
use subsidy_core::ProfileField;

/// Print the option catalogs for the select fields
pub fn cmd_catalog(json: bool) -> Result<()> {
    println!("{}", render_catalog(json)?);
    Ok(())
}

pub fn render_catalog(json: bool) -> Result<String> {
    if json {
        return serde_json::to_string_pretty(&catalogs()).context("Failed to serialize catalogs");
    }

    let mut out = String::new();
    for field in ProfileField::all() {
        let Some(options) = field.catalog() else {
            continue;
        };
        out.push_str(&format!("{}:\n", field));
        for (i, option) in options.iter().enumerate() {
            let marker = if i == 0 { " (default)" } else { "" };
            out.push_str(&format!("  {:>2}. {}{}\n", i + 1, option, marker));
        }
        out.push('\n');
    }
    out.push_str("Pass either the label or its number, e.g. --industry 1");
    Ok(out)
}
