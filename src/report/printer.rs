use super::model::{RunReport, StepStatus};
use super::selector::ReportFile;
use super::storage::ReportStore;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, Table};

fn status_color(status: &StepStatus) -> Color {
    match status {
        StepStatus::Passed => Color::Green,
        StepStatus::Failed => Color::Red,
        StepStatus::Info => Color::Cyan,
        StepStatus::Other(_) => Color::Yellow,
    }
}

pub fn summary_table(report: &RunReport) -> Table {
    let summary = &report.summary;
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec!["Metric", "Value"]);

    table.add_row(vec![Cell::new("Test Name"), Cell::new(&report.run_id)]);
    table.add_row(vec![Cell::new("Start Time"), Cell::new(&report.started_at)]);
    table.add_row(vec![Cell::new("Total Steps"), Cell::new(summary.total_steps)]);
    table.add_row(vec![
        Cell::new("Passed Steps"),
        Cell::new(summary.passed_steps).fg(Color::Green),
    ]);
    let failed = Cell::new(summary.failed_steps);
    let failed = if summary.failed_steps > 0 {
        failed.fg(Color::Red).add_attribute(Attribute::Bold)
    } else {
        failed
    };
    table.add_row(vec![Cell::new("Failed Steps"), failed]);
    table.add_row(vec![
        Cell::new("Total Duration"),
        Cell::new(summary.total_duration()),
    ]);
    table.add_row(vec![
        Cell::new("Average Step Duration"),
        Cell::new(summary.average_step_duration()),
    ]);

    table
}

pub fn steps_table(report: &RunReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL).set_header(vec![
        "Step", "Description", "Status", "Details", "Timestamp", "Duration",
    ]);

    for step in &report.steps {
        table.add_row(vec![
            Cell::new(&step.step),
            Cell::new(&step.description),
            Cell::new(&step.status).fg(status_color(&step.status)),
            Cell::new(&step.details).add_attribute(Attribute::Dim),
            Cell::new(&step.timestamp),
            Cell::new(&step.duration),
        ]);
    }

    table
}

pub fn print_report(report: &RunReport) {
    println!("{}", summary_table(report));
    println!("{}", steps_table(report));
}

pub fn reports_table(reports: &[ReportFile]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_header(vec!["Report", "Modified", "Steps", "Passed", "Failed"]);

    for file in reports {
        let loaded = ReportStore::new_with_path(file.path.clone()).read();
        let (steps, passed, failed) = match &loaded {
            Ok(report) => (
                Cell::new(report.summary.total_steps),
                Cell::new(report.summary.passed_steps).fg(Color::Green),
                Cell::new(report.summary.failed_steps).fg(if report.summary.failed_steps > 0 {
                    Color::Red
                } else {
                    Color::Reset
                }),
            ),
            Err(_) => (
                Cell::new("?").add_attribute(Attribute::Dim),
                Cell::new("?").add_attribute(Attribute::Dim),
                Cell::new("?").add_attribute(Attribute::Dim),
            ),
        };

        table.add_row(vec![
            Cell::new(&file.name),
            Cell::new(file.modified.format("%Y-%m-%d %H:%M:%S")),
            steps,
            passed,
            failed,
        ]);
    }

    table
}
