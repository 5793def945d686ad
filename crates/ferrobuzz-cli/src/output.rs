use std::io::{self, Write};

use ferrobuzz_core::{JsonRenderer, Renderer, TextRenderer};

use crate::cli::OutputFormat;
use crate::commands::{CommandOutput, TableData};
use crate::error::CliError;

pub fn render(output: &CommandOutput, format: OutputFormat, pretty: bool) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match output {
        CommandOutput::Reports(reports) => {
            let renderer: Box<dyn Renderer> = match format {
                OutputFormat::Table => Box::new(TextRenderer),
                OutputFormat::Json => Box::new(JsonRenderer { pretty }),
            };
            for (index, report) in reports.iter().enumerate() {
                if index > 0 && format == OutputFormat::Table {
                    writeln!(out)?;
                }
                renderer.render(report, &mut out)?;
            }
        }
        CommandOutput::Table(table) => match format {
            OutputFormat::Json => {
                let payload = if pretty {
                    serde_json::to_string_pretty(&table.json)?
                } else {
                    serde_json::to_string(&table.json)?
                };
                writeln!(out, "{payload}")?;
            }
            OutputFormat::Table => write_table(table, &mut out)?,
        },
    }

    out.flush()?;
    Ok(())
}

fn write_table(table: &TableData, out: &mut dyn Write) -> io::Result<()> {
    let widths = table
        .columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            table
                .rows
                .iter()
                .filter_map(|row| row.get(index))
                .map(|cell| cell.chars().count())
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or(0)
        })
        .collect::<Vec<_>>();

    writeln!(out, "{}", padded(table.columns.iter().copied(), &widths))?;
    for row in &table.rows {
        writeln!(out, "{}", padded(row.iter().map(String::as_str), &widths))?;
    }
    if table.rows.is_empty() {
        writeln!(out, "(no rows)")?;
    }
    Ok(())
}

fn padded<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}", width = *width))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_owned()
}
