use crate::Result;
use crate::error::ReportError;
use chrono::{DateTime, Local};
use inquire::Select;
use std::fs;
use std::path::{Path, PathBuf};

/// 报告目录中的一个报告文件
#[derive(Debug, Clone)]
pub struct ReportFile {
    pub path: PathBuf,
    /// 运行标识（文件名去掉后缀）
    pub name: String,
    pub modified: DateTime<Local>,
}

/// Selection strategy for report files
pub enum SelectionStrategy {
    Interactive,
    Latest,
}

/// List reports in `dir`, oldest first.
pub fn list_reports(dir: &Path, file_suffix: &str) -> Result<Vec<ReportFile>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let ending = format!("{}.xlsx", file_suffix);
    let mut reports = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        let Some(name) = file_name.strip_suffix(&ending) else {
            continue;
        };
        // 写入过程中的临时文件没有该后缀，会被自然跳过
        let metadata = entry.metadata()?;
        if !metadata.is_file() {
            continue;
        }
        reports.push(ReportFile {
            path: entry.path(),
            name: name.to_string(),
            modified: DateTime::<Local>::from(metadata.modified()?),
        });
    }

    reports.sort_by(|a, b| a.modified.cmp(&b.modified).then_with(|| a.name.cmp(&b.name)));
    Ok(reports)
}

/// Pick one report from `dir` based on the given strategy
pub fn select_report(
    dir: &Path,
    file_suffix: &str,
    strategy: SelectionStrategy,
) -> Result<Option<ReportFile>> {
    let mut reports = list_reports(dir, file_suffix)?;
    match strategy {
        SelectionStrategy::Latest => Ok(reports.pop()),
        SelectionStrategy::Interactive => select_interactive(reports),
    }
}

fn select_interactive(mut reports: Vec<ReportFile>) -> Result<Option<ReportFile>> {
    if reports.is_empty() {
        return Ok(None);
    }
    reports.reverse();

    #[derive(Clone)]
    struct ReportWrapper {
        index: usize,
        display: String,
    }

    impl std::fmt::Display for ReportWrapper {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            write!(f, "{}", self.display)
        }
    }

    let options: Vec<ReportWrapper> = reports
        .iter()
        .enumerate()
        .map(|(index, r)| ReportWrapper {
            index,
            display: format_report_for_display(r),
        })
        .collect();

    let selected = Select::new("Select a report:", options)
        .with_page_size(15)
        .with_help_message("Enter to open, type to filter")
        .prompt()
        .map_err(|e| ReportError::Other(format!("Interaction canceled or failed: {}", e)))?;

    Ok(Some(reports.swap_remove(selected.index)))
}

fn format_report_for_display(r: &ReportFile) -> String {
    format!("{} ({})", r.name, r.modified.format("%Y-%m-%d %H:%M:%S"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_reports_filters_by_suffix() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("PurchaseOrder_Report.xlsx"), b"x").unwrap();
        fs::write(temp_dir.path().join("Quotation_Report.xlsx"), b"x").unwrap();
        fs::write(temp_dir.path().join("notes.txt"), b"x").unwrap();
        fs::write(temp_dir.path().join(".tmpA1b2C3"), b"x").unwrap();

        let mut names: Vec<String> = list_reports(temp_dir.path(), "_Report")
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["PurchaseOrder", "Quotation"]);
    }

    #[test]
    fn test_list_reports_missing_dir() {
        let temp_dir = TempDir::new().unwrap();
        let reports = list_reports(&temp_dir.path().join("nope"), "_Report").unwrap();
        assert!(reports.is_empty());
    }

    #[test]
    fn test_select_latest() {
        let temp_dir = TempDir::new().unwrap();
        let old = temp_dir.path().join("Old_Report.xlsx");
        let new = temp_dir.path().join("New_Report.xlsx");
        fs::write(&old, b"x").unwrap();
        fs::write(&new, b"x").unwrap();

        let past = std::time::SystemTime::now() - std::time::Duration::from_secs(3600);
        fs::File::options()
            .write(true)
            .open(&old)
            .unwrap()
            .set_modified(past)
            .unwrap();

        let selected = select_report(temp_dir.path(), "_Report", SelectionStrategy::Latest)
            .unwrap()
            .unwrap();
        assert_eq!(selected.name, "New");
    }

    #[test]
    fn test_format_display() {
        let report = ReportFile {
            path: PathBuf::from("ExecutionReport/Quotation_Report.xlsx"),
            name: "Quotation".to_string(),
            modified: Local::now(),
        };
        assert!(format_report_for_display(&report).starts_with("Quotation ("));
    }
}
