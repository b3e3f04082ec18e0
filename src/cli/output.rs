/// Output formatting for listings
///
/// - Table: aligned columns for humans
/// - Json: pretty-printed array for scripts
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

pub fn write_json<T: Serialize, W: Write>(writer: &mut W, rows: &[T]) -> anyhow::Result<()> {
    writeln!(writer, "{}", serde_json::to_string_pretty(rows)?)?;
    writer.flush()?;
    Ok(())
}

/// Left-aligned columns sized to the widest cell
pub fn write_table<W: Write>(writer: &mut W, headers: &[&str], rows: &[Vec<String>]) -> anyhow::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.len()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let render = |cells: Vec<&str>| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    writeln!(writer, "{}", render(headers.to_vec()))?;
    for row in rows {
        writeln!(writer, "{}", render(row.iter().map(String::as_str).collect()))?;
    }
    writer.flush()?;
    Ok(())
}
