//! Rendering of solver state for the terminal

use gradus_formula::{FormulaRecord, WeightSolver};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct AverageReport {
    pub average: f64,
    pub complete: bool,
    pub record: FormulaRecord,
}

impl AverageReport {
    pub fn new(solver: &WeightSolver) -> Self {
        Self {
            average: solver.average(),
            complete: solver.is_complete(),
            record: solver.to_record(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SolveReport {
    pub entity: String,
    pub target: f64,
    pub value: f64,
}

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn print_entities(solver: &WeightSolver) {
    let rows = solver
        .entities()
        .iter()
        .map(|e| {
            vec![
                e.name().to_string(),
                e.weighting().to_string(),
                e.value().map_or_else(|| "-".to_string(), format_value),
            ]
        })
        .collect::<Vec<_>>();
    println!("{}", render_table(&["name", "weighting", "value"], &rows));
}

/// Up to four decimals, trailing zeros dropped
pub fn format_value(value: f64) -> String {
    let text = format!("{value:.4}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}

/// Render a simple aligned table; numeric columns are right-aligned.
fn render_table(headers: &[&str], rows: &[Vec<String>]) -> String {
    if rows.is_empty() {
        return String::from("(no entities)");
    }

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(index, header)| {
            rows.iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
                .max(header.len())
        })
        .collect();

    let header_line = headers
        .iter()
        .zip(&widths)
        .map(|(header, width)| format!("{header:<width$}"))
        .collect::<Vec<_>>()
        .join("  ");
    let divider = "-".repeat(header_line.len());

    let mut lines = vec![header_line.trim_end().to_string(), divider];
    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .enumerate()
            .map(|(index, (cell, width))| {
                if index == 0 {
                    format!("{cell:<width$}")
                } else {
                    format!("{cell:>width$}")
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        lines.push(line.trim_end().to_string());
    }
    lines.join("\n")
}
