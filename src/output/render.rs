//! Result rendering in table, JSON and CSV formats.
//!
//! All rendered results go to stdout. The format comes from the loaded
//! configuration, which the `-o/--output-format` option may override for a
//! single invocation.

use std::io::{self, Write};

use serde::Serialize;
use serde_json::Value;

use crate::config::{Config, OutputFormat};
use crate::errors::AppError;

/// Column/row declaration for table and CSV output.
pub trait TableRow {
    fn columns() -> &'static [&'static str];
    fn row(&self) -> Vec<String>;
}

/// Render a result set to stdout in the configured format.
pub fn print_result<T>(config: &Config, items: &[T]) -> Result<(), AppError>
where
    T: Serialize + TableRow,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match config.app.output_format {
        OutputFormat::Table => write_table(&mut out, items)?,
        OutputFormat::Json => write_json(&mut out, items, config.app.legacy_json_format)?,
        OutputFormat::Csv => write_csv(&mut out, items)?,
    }
    Ok(())
}

fn write_table<W: Write, T: TableRow>(out: &mut W, items: &[T]) -> Result<(), AppError> {
    if items.is_empty() {
        writeln!(out, "No results found.")?;
        return Ok(());
    }
    let columns = T::columns();
    let rows: Vec<Vec<String>> = items.iter().map(TableRow::row).collect();

    let mut widths: Vec<usize> = columns.iter().map(|c| c.chars().count()).collect();
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            if i < widths.len() {
                widths[i] = widths[i].max(cell.chars().count());
            }
        }
    }

    write_padded_row(out, columns.iter().map(|c| c.to_string()).collect(), &widths)?;
    let separator: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    write_padded_row(out, separator, &widths)?;
    for row in rows {
        write_padded_row(out, row, &widths)?;
    }
    Ok(())
}

fn write_padded_row<W: Write>(
    out: &mut W,
    cells: Vec<String>,
    widths: &[usize],
) -> Result<(), AppError> {
    let mut line = String::new();
    for (i, cell) in cells.iter().enumerate() {
        if i > 0 {
            line.push_str("  ");
        }
        line.push_str(cell);
        // No trailing padding on the last column.
        if i + 1 < cells.len() {
            let pad = widths[i].saturating_sub(cell.chars().count());
            line.extend(std::iter::repeat(' ').take(pad));
        }
    }
    writeln!(out, "{line}")?;
    Ok(())
}

fn write_json<W: Write, T: Serialize>(
    out: &mut W,
    items: &[T],
    legacy: bool,
) -> Result<(), AppError> {
    let value = if legacy {
        // The previous CLI generation emitted a map keyed "0", "1", ...
        let mut map = serde_json::Map::new();
        for (i, item) in items.iter().enumerate() {
            let value = serde_json::to_value(item)
                .map_err(|e| AppError::Validation(format!("Unable to serialize result: {e}")))?;
            map.insert(i.to_string(), value);
        }
        Value::Object(map)
    } else {
        serde_json::to_value(items)
            .map_err(|e| AppError::Validation(format!("Unable to serialize result: {e}")))?
    };
    let text = serde_json::to_string_pretty(&value)
        .map_err(|e| AppError::Validation(format!("Unable to serialize result: {e}")))?;
    writeln!(out, "{text}")?;
    Ok(())
}

fn write_csv<W: Write, T: TableRow>(out: &mut W, items: &[T]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_writer(out);
    writer
        .write_record(T::columns())
        .map_err(|e| AppError::Validation(format!("Unable to write CSV: {e}")))?;
    for item in items {
        writer
            .write_record(item.row())
            .map_err(|e| AppError::Validation(format!("Unable to write CSV: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::Validation(format!("Unable to write CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Serialize;

    #[derive(Serialize)]
    struct Widget {
        id: String,
        name: String,
    }

    impl TableRow for Widget {
        fn columns() -> &'static [&'static str] {
            &["ID", "Name"]
        }

        fn row(&self) -> Vec<String> {
            vec![self.id.clone(), self.name.clone()]
        }
    }

    fn widgets() -> Vec<Widget> {
        vec![
            Widget {
                id: "1".into(),
                name: "frobnicator".into(),
            },
            Widget {
                id: "20".into(),
                name: "sprocket".into(),
            },
        ]
    }

    #[test]
    fn test_table_aligns_columns() {
        let mut buf = Vec::new();
        write_table(&mut buf, &widgets()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "ID  Name");
        assert_eq!(lines[1], "--  -----------");
        assert_eq!(lines[2], "1   frobnicator");
        assert_eq!(lines[3], "20  sprocket");
    }

    #[test]
    fn test_empty_table() {
        let mut buf = Vec::new();
        write_table::<_, Widget>(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "No results found.\n");
    }

    #[test]
    fn test_json_array() {
        let mut buf = Vec::new();
        write_json(&mut buf, &widgets(), false).unwrap();
        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed[0]["name"], "frobnicator");
    }

    #[test]
    fn test_legacy_json_is_keyed_map() {
        let mut buf = Vec::new();
        write_json(&mut buf, &widgets(), true).unwrap();
        let parsed: Value = serde_json::from_slice(&buf).unwrap();
        assert!(parsed.is_object());
        assert_eq!(parsed["0"]["id"], "1");
        assert_eq!(parsed["1"]["id"], "20");
    }

    #[test]
    fn test_csv_output() {
        let mut buf = Vec::new();
        write_csv(&mut buf, &widgets()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "ID,Name\n1,frobnicator\n20,sprocket\n");
    }
}
