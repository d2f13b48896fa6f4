//! `.xlsx` encoding of a [`RunReport`].
//!
//! Layout:
//! - `Test Summary`: `Metric | Value` header followed by seven metric rows.
//! - `Test Steps`: header row followed by one row per step, in execution order.

use crate::Result;
use crate::report::model::{RunReport, StepId, StepRow, StepStatus};
use crate::report::summary::{RunSummary, parse_duration};
use calamine::{Data, Range, Reader, Xlsx, open_workbook};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::borrow::Cow;
use std::collections::HashMap;
use std::path::Path;

pub const SUMMARY_SHEET: &str = "Test Summary";
pub const STEPS_SHEET: &str = "Test Steps";

pub const STEP_HEADERS: [&str; 6] = [
    "Step Number",
    "Description",
    "Status",
    "Details",
    "Timestamp",
    "Duration",
];
const STEP_WIDTHS: [f64; 6] = [15.0, 50.0, 10.0, 40.0, 20.0, 15.0];
const SUMMARY_WIDTHS: [f64; 2] = [20.0, 40.0];

/// Excel's per-cell character limit.
pub const MAX_CELL_CHARS: usize = 32_767;
/// Appended to cell text cut down to [`MAX_CELL_CHARS`].
pub const TRUNCATION_MARKER: &str = " …[truncated]";

// OOXML `_xHHHH_` escapes written for control characters and literal `_x`
static ESCAPED_CHAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"_x([0-9A-Fa-f]{4})_").expect("valid regex"));

const TEST_NAME: &str = "Test Name";
const START_TIME: &str = "Start Time";
const TOTAL_STEPS: &str = "Total Steps";
const PASSED_STEPS: &str = "Passed Steps";
const FAILED_STEPS: &str = "Failed Steps";
const TOTAL_DURATION: &str = "Total Duration";
const AVERAGE_DURATION: &str = "Average Step Duration";

/// Encode the report into an in-memory workbook.
pub fn render(report: &RunReport) -> Result<Vec<u8>> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();
    let wrap = Format::new().set_text_wrap();

    let summary_sheet = workbook.add_worksheet();
    write_summary(summary_sheet, report, &header)?;

    let steps_sheet = workbook.add_worksheet();
    write_steps(steps_sheet, &report.steps, &header, &wrap)?;

    Ok(workbook.save_to_buffer()?)
}

fn write_summary(sheet: &mut Worksheet, report: &RunReport, header: &Format) -> Result<()> {
    sheet.set_name(SUMMARY_SHEET)?;
    for (col, width) in SUMMARY_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }

    sheet.write_string_with_format(0, 0, "Metric", header)?;
    sheet.write_string_with_format(0, 1, "Value", header)?;

    let summary = &report.summary;
    sheet.write_string(1, 0, TEST_NAME)?;
    sheet.write_string(1, 1, fit_cell(&report.run_id))?;
    sheet.write_string(2, 0, START_TIME)?;
    sheet.write_string(2, 1, fit_cell(&report.started_at))?;
    sheet.write_string(3, 0, TOTAL_STEPS)?;
    sheet.write_number(3, 1, summary.total_steps as f64)?;
    sheet.write_string(4, 0, PASSED_STEPS)?;
    sheet.write_number(4, 1, summary.passed_steps as f64)?;
    sheet.write_string(5, 0, FAILED_STEPS)?;
    sheet.write_number(5, 1, summary.failed_steps as f64)?;
    sheet.write_string(6, 0, TOTAL_DURATION)?;
    sheet.write_string(6, 1, summary.total_duration())?;
    sheet.write_string(7, 0, AVERAGE_DURATION)?;
    sheet.write_string(7, 1, summary.average_step_duration())?;

    Ok(())
}

fn write_steps(
    sheet: &mut Worksheet,
    steps: &[StepRow],
    header: &Format,
    wrap: &Format,
) -> Result<()> {
    sheet.set_name(STEPS_SHEET)?;
    for (col, width) in STEP_WIDTHS.iter().enumerate() {
        sheet.set_column_width(col as u16, *width)?;
    }
    for (col, title) in STEP_HEADERS.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *title, header)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (index, step) in steps.iter().enumerate() {
        let row = index as u32 + 1;
        match &step.step {
            StepId::Number(n) => sheet.write_number(row, 0, *n)?,
            StepId::Tag(tag) => sheet.write_string(row, 0, fit_cell(tag))?,
        };
        sheet.write_string(row, 1, fit_cell(&step.description))?;
        sheet.write_string(row, 2, fit_cell(step.status.as_str()))?;
        sheet.write_string_with_format(row, 3, fit_cell(&step.details), wrap)?;
        sheet.write_string(row, 4, fit_cell(&step.timestamp))?;
        sheet.write_string(row, 5, fit_cell(&step.duration))?;
    }

    Ok(())
}

/// Cut text that would exceed Excel's cell limit, keeping a visible marker.
pub fn fit_cell(text: &str) -> Cow<'_, str> {
    if text.chars().count() <= MAX_CELL_CHARS {
        return Cow::Borrowed(text);
    }
    let keep = MAX_CELL_CHARS - TRUNCATION_MARKER.chars().count();
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str(TRUNCATION_MARKER);
    Cow::Owned(cut)
}

/// Decode `_xHHHH_` escapes left in cell text by the reader (`_x005F_` is `_`).
fn unescape_cell(text: &str) -> Cow<'_, str> {
    ESCAPED_CHAR.replace_all(text, |caps: &Captures| {
        u32::from_str_radix(&caps[1], 16)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    })
}

/// Read a report back from disk.
pub fn read(path: &Path) -> Result<RunReport> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;

    let summary_range = workbook.worksheet_range(SUMMARY_SHEET)?;
    let steps_range = workbook.worksheet_range(STEPS_SHEET)?;

    let metrics = read_metrics(&summary_range);
    let metric = |name: &str| metrics.get(name).cloned().unwrap_or_default();
    let count = |name: &str| metric(name).parse::<usize>().unwrap_or(0);
    let millis = |name: &str| parse_duration(&metric(name)).unwrap_or(0);

    Ok(RunReport {
        run_id: metric(TEST_NAME),
        started_at: metric(START_TIME),
        steps: read_steps(&steps_range),
        summary: RunSummary {
            total_steps: count(TOTAL_STEPS),
            passed_steps: count(PASSED_STEPS),
            failed_steps: count(FAILED_STEPS),
            total_duration_ms: millis(TOTAL_DURATION),
            average_step_duration_ms: millis(AVERAGE_DURATION),
        },
    })
}

fn read_metrics(range: &Range<Data>) -> HashMap<String, String> {
    range
        .rows()
        .skip(1)
        .filter_map(|row| {
            let key = cell_text(row.first());
            (!key.is_empty()).then(|| (key, cell_text(row.get(1))))
        })
        .collect()
}

fn read_steps(range: &Range<Data>) -> Vec<StepRow> {
    range
        .rows()
        .skip(1)
        .filter(|row| row.iter().any(|cell| !matches!(cell, Data::Empty)))
        .map(|row| StepRow {
            step: step_id(row.first()),
            description: cell_text(row.get(1)),
            status: StepStatus::from(cell_text(row.get(2)).as_str()),
            details: cell_text(row.get(3)),
            timestamp: cell_text(row.get(4)),
            duration: cell_text(row.get(5)),
        })
        .collect()
}

fn step_id(cell: Option<&Data>) -> StepId {
    match cell {
        Some(Data::Float(f)) if f.fract() == 0.0 && *f >= 0.0 && *f <= u32::MAX as f64 => {
            StepId::Number(*f as u32)
        }
        Some(Data::Int(i)) if u32::try_from(*i).is_ok() => StepId::Number(*i as u32),
        other => StepId::Tag(cell_text(other)),
    }
}

fn cell_text(cell: Option<&Data>) -> String {
    match cell {
        Some(Data::String(s)) => unescape_cell(s).into_owned(),
        Some(Data::Float(f)) if f.fract() == 0.0 => format!("{}", *f as i64),
        Some(Data::Float(f)) => f.to_string(),
        Some(Data::Int(i)) => i.to_string(),
        Some(Data::Bool(b)) => b.to_string(),
        Some(Data::DateTimeIso(s)) | Some(Data::DurationIso(s)) => s.clone(),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_report() -> RunReport {
        let steps = vec![
            StepRow {
                step: StepId::Number(1),
                description: "Open browser".to_string(),
                status: StepStatus::Passed,
                details: String::new(),
                timestamp: "19/10/2026, 09:00:00 am".to_string(),
                duration: "0ms".to_string(),
            },
            StepRow {
                step: StepId::Tag("SIGNIN-CLICK".to_string()),
                description: "Clicked SIGN IN button".to_string(),
                status: StepStatus::Other("Retried".to_string()),
                details: "User: bob\nAttempt: 2".to_string(),
                timestamp: "19/10/2026, 09:00:02 am".to_string(),
                duration: "2s 10ms".to_string(),
            },
        ];
        let mut report = RunReport::new("PO_Test", "19/10/2026, 09:00:00 am");
        report.summary = RunSummary::compute(&steps, 2_010);
        report.steps = steps;
        report
    }

    #[test]
    fn test_read_back_rendered_report() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("PO_Test_Report.xlsx");
        let report = sample_report();

        std::fs::write(&path, render(&report).unwrap()).unwrap();
        let loaded = read(&path).unwrap();

        assert_eq!(loaded, report);
    }

    #[test]
    fn test_read_empty_steps_table() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Empty_Report.xlsx");
        let report = RunReport::new("Empty", "19/10/2026, 09:00:00 am");

        std::fs::write(&path, render(&report).unwrap()).unwrap();
        let loaded = read(&path).unwrap();

        assert!(loaded.steps.is_empty());
        assert_eq!(loaded.summary, RunSummary::default());
        assert_eq!(loaded.run_id, "Empty");
    }

    #[test]
    fn test_control_chars_survive_rewrites() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Escapes_Report.xlsx");

        let mut report = sample_report();
        report.steps[0].details = "\u{1b}[31mTimeout\u{1b}[39m".to_string();
        report.steps[1].details = "a\r\nb".to_string();
        report.steps[1].description = "literal _x0041_ and _x005F_".to_string();
        let expected = report.steps.clone();

        // 每次都读回后再写，模拟逐步追加
        for _ in 0..4 {
            std::fs::write(&path, render(&report).unwrap()).unwrap();
            report = read(&path).unwrap();
            assert_eq!(report.steps, expected);
        }
    }

    #[test]
    fn test_unescape_cell() {
        assert_eq!(unescape_cell("_x001B_[31m"), "\u{1b}[31m");
        assert_eq!(unescape_cell("_x005F_x0041_"), "_x0041_");
        assert_eq!(unescape_cell("plain_x_text"), "plain_x_text");
        // 代理项不是合法字符，保持原样
        assert_eq!(unescape_cell("_xD800_"), "_xD800_");
    }

    #[test]
    fn test_fit_cell_truncates_with_marker() {
        let short = "short";
        assert!(matches!(fit_cell(short), Cow::Borrowed("short")));

        let long = "é".repeat(MAX_CELL_CHARS + 10);
        let cut = fit_cell(&long);
        assert_eq!(cut.chars().count(), MAX_CELL_CHARS);
        assert!(cut.ends_with(TRUNCATION_MARKER));
    }

    #[test]
    fn test_oversized_details_still_written() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("Long_Report.xlsx");

        let mut report = sample_report();
        report.steps[0].details = "x".repeat(40_000);
        std::fs::write(&path, render(&report).unwrap()).unwrap();

        let loaded = read(&path).unwrap();
        assert_eq!(loaded.steps.len(), 2);
        assert_eq!(loaded.steps[0].details.chars().count(), MAX_CELL_CHARS);
        assert!(loaded.steps[0].details.ends_with(TRUNCATION_MARKER));
        assert_eq!(loaded.steps[1], report.steps[1]);
    }

    #[test]
    fn test_read_rejects_non_workbook() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("garbage.xlsx");
        std::fs::write(&path, b"not a zip archive").unwrap();

        assert!(read(&path).is_err());
    }
}
