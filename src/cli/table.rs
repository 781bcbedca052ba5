//! Table formatting utilities for CLI list commands
//!
//! Rows are built once as keyed text cells and then printed in whichever
//! format the user asked for.

use console::style;
use miette::{IntoDiagnostic, Result};
use serde_json::{Map, Value};
use tabled::{builder::Builder, settings::Style};

use crate::cli::helpers::truncate_str;
use crate::cli::OutputFormat;

/// Column definition with header label and width
#[derive(Debug, Clone)]
pub struct ColumnDef {
    pub key: &'static str,
    pub header: &'static str,
    pub width: usize,
}

impl ColumnDef {
    pub const fn new(key: &'static str, header: &'static str, width: usize) -> Self {
        Self { key, header, width }
    }
}

/// A row of cell values for table output. The first cell is the row's id.
#[derive(Debug, Clone)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<(&'static str, String)>,
}

impl TableRow {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            cells: Vec::new(),
        }
    }

    pub fn cell(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.cells.push((key, value.into()));
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.cells
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Table formatter that outputs rows in various formats
pub struct TableFormatter<'a> {
    columns: &'a [ColumnDef],
    entity_name: &'static str,
    show_summary: bool,
}

impl<'a> TableFormatter<'a> {
    pub fn new(columns: &'a [ColumnDef], entity_name: &'static str) -> Self {
        Self {
            columns,
            entity_name,
            show_summary: true,
        }
    }

    /// Hide the "N item(s) found" line
    pub fn without_summary(mut self) -> Self {
        self.show_summary = false;
        self
    }

    /// Output rows in the specified format
    pub fn output<I>(&self, rows: I, format: OutputFormat) -> Result<()>
    where
        I: IntoIterator<Item = TableRow>,
    {
        let rows: Vec<TableRow> = rows.into_iter().collect();

        match format {
            OutputFormat::Table => self.output_table(&rows),
            OutputFormat::Csv => self.output_csv(&rows)?,
            OutputFormat::Json => self.output_json(&rows)?,
            OutputFormat::Id => {
                for row in &rows {
                    println!("{}", row.id);
                }
            }
            OutputFormat::Auto => self.output_plain(&rows),
        }
        Ok(())
    }

    /// Column widths sized to content, capped at each column's width
    fn calculate_widths(&self, rows: &[TableRow]) -> Vec<usize> {
        self.columns
            .iter()
            .map(|col| {
                let max_content = rows
                    .iter()
                    .filter_map(|r| r.get(col.key))
                    .map(|v| v.chars().count())
                    .max()
                    .unwrap_or(0);
                col.header.len().max(max_content).min(col.width)
            })
            .collect()
    }

    fn output_plain(&self, rows: &[TableRow]) {
        let widths = self.calculate_widths(rows);

        let header: Vec<String> = self
            .columns
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<width$}", style(col.header).bold(), width = w))
            .collect();
        println!("{}", header.join("  "));

        let total_width: usize = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
        println!("{}", "-".repeat(total_width));

        for row in rows {
            let cells: Vec<String> = self
                .columns
                .iter()
                .zip(&widths)
                .enumerate()
                .map(|(i, (col, w))| {
                    let text = truncate_str(row.get(col.key).unwrap_or("-"), *w);
                    if i == 0 {
                        format!("{:<width$}", style(text).cyan(), width = w)
                    } else {
                        format!("{:<width$}", text, width = w)
                    }
                })
                .collect();
            println!("{}", cells.join("  ").trim_end());
        }

        if self.show_summary {
            println!();
            println!("{} {}(s) found.", style(rows.len()).cyan(), self.entity_name);
        }
    }

    fn output_table(&self, rows: &[TableRow]) {
        let mut builder = Builder::default();
        builder.push_record(self.columns.iter().map(|c| c.header));
        for row in rows {
            builder.push_record(self.columns.iter().map(|c| row.get(c.key).unwrap_or("-")));
        }
        println!("{}", builder.build().with(Style::sharp()));
    }

    fn output_csv(&self, rows: &[TableRow]) -> Result<()> {
        let mut writer = csv::Writer::from_writer(std::io::stdout());
        writer
            .write_record(self.columns.iter().map(|c| c.key))
            .into_diagnostic()?;
        for row in rows {
            writer
                .write_record(self.columns.iter().map(|c| row.get(c.key).unwrap_or("")))
                .into_diagnostic()?;
        }
        writer.flush().into_diagnostic()
    }

    fn output_json(&self, rows: &[TableRow]) -> Result<()> {
        let values: Vec<Value> = rows
            .iter()
            .map(|row| {
                let object: Map<String, Value> = self
                    .columns
                    .iter()
                    .map(|c| {
                        let value = row.get(c.key).map_or(Value::Null, |v| Value::String(v.to_string()));
                        (c.key.to_string(), value)
                    })
                    .collect();
                Value::Object(object)
            })
            .collect();
        let json = serde_json::to_string_pretty(&values).into_diagnostic()?;
        println!("{}", json);
        Ok(())
    }
}
