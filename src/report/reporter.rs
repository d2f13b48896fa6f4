use crate::Result;
use crate::config::ReporterConfig;
use crate::error::ReportError;
use crate::report::clock::{Clock, SystemClock, elapsed_ms};
use crate::report::model::{Details, RunReport, StepId, StepRow, StepStatus};
use crate::report::naming::{run_id_from_test_file, sanitize_run_id};
use crate::report::storage::ReportStore;
use crate::report::summary::{RunSummary, format_duration};
use chrono::{DateTime, Local};
use std::fmt::{Display, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// 当前活动运行的上下文
struct ActiveRun {
    run_id: String,
    store: ReportStore,
    started_at: DateTime<Local>,
    last_event_at: DateTime<Local>,
}

/// 运行报告器
///
/// 一个实例同一时间只持有一个活动运行；`initialize` 会丢弃之前的运行状态。
///
/// `initialize` / `record_step` 是 Best-effort 操作：内部错误只记录日志，
/// 不会中断调用方的测试流程。需要显式处理错误时使用 `try_*` 版本。
pub struct RunReporter {
    config: ReporterConfig,
    clock: Arc<dyn Clock>,
    run: Option<ActiveRun>,
}

impl RunReporter {
    pub fn new(config: ReporterConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    pub fn with_clock(config: ReporterConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            run: None,
        }
    }

    /// 使用查找到的配置文件（及 RUNREPORT_DIR）创建报告器
    pub fn from_env() -> Self {
        Self::new(ReporterConfig::resolve())
    }

    pub fn config(&self) -> &ReporterConfig {
        &self.config
    }

    pub fn is_active(&self) -> bool {
        self.run.is_some()
    }

    pub fn run_id(&self) -> Option<&str> {
        self.run.as_ref().map(|r| r.run_id.as_str())
    }

    pub fn report_path(&self) -> Option<&Path> {
        self.run.as_ref().map(|r| r.store.path())
    }

    /// 开始一次新的运行，失败时记录错误日志
    pub fn initialize(&mut self, run_name: &str) {
        if let Err(e) = self.try_initialize(run_name) {
            error!("Failed to initialize report for '{}': {}", run_name, e);
        }
    }

    /// 以测试脚本路径推导运行标识并开始运行
    pub fn initialize_for_test_file(&mut self, test_file: impl AsRef<Path>) {
        let run_id = run_id_from_test_file(test_file.as_ref(), &self.config.test_file_suffix);
        self.initialize(&run_id);
    }

    /// 开始一次新的运行
    ///
    /// 创建（覆盖）报告文件：空步骤表 + 计数为零的摘要。失败时不保留任何活动运行。
    pub fn try_initialize(&mut self, run_name: &str) -> Result<()> {
        self.run = None;

        let run_id = sanitize_run_id(run_name);
        let store = ReportStore::new_with_path(self.config.report_path(&run_id));
        let started_at = self.clock.now();

        let report = RunReport::new(
            run_id.clone(),
            format_timestamp(started_at, &self.config.timestamp_format),
        );
        store.write(&report)?;

        info!("Report initialized: {}", store.path().display());

        self.run = Some(ActiveRun {
            run_id,
            store,
            started_at,
            last_event_at: started_at,
        });
        Ok(())
    }

    /// 记录一个步骤，失败时记录错误日志
    pub async fn record_step(
        &mut self,
        step: impl Into<StepId>,
        description: impl Into<String>,
        status: impl Into<StepStatus>,
        details: impl Into<Details>,
    ) {
        let step = step.into();
        if let Err(e) = self
            .try_record_step(step.clone(), description, status, details)
            .await
        {
            error!("Failed to record step {}: {}", step, e);
        }
    }

    /// 记录一个通过的步骤（无附加信息）
    pub async fn pass(&mut self, step: impl Into<StepId>, description: impl Into<String>) {
        self.record_step(step, description, StepStatus::Passed, Details::None)
            .await;
    }

    /// 记录一个失败的步骤
    pub async fn fail(
        &mut self,
        step: impl Into<StepId>,
        description: impl Into<String>,
        details: impl Into<Details>,
    ) {
        self.record_step(step, description, StepStatus::Failed, details)
            .await;
    }

    /// 记录测试整体失败（`ERROR` / `Test Failed`），附加错误信息
    pub async fn record_error(&mut self, err: impl Display) {
        self.record_step("ERROR", "Test Failed", StepStatus::Failed, err.to_string())
            .await;
    }

    /// 记录一个步骤
    ///
    /// 读取现有报告 -> 追加一行 -> 重新计算摘要 -> 原子写回（带重试）。
    /// 报告无法读取时从空步骤表开始。
    pub async fn try_record_step(
        &mut self,
        step: impl Into<StepId>,
        description: impl Into<String>,
        status: impl Into<StepStatus>,
        details: impl Into<Details>,
    ) -> Result<()> {
        let run = self.run.as_mut().ok_or(ReportError::NotInitialized)?;
        let details = details.into().format()?;

        let now = self.clock.now();
        let step_ms = elapsed_ms(run.last_event_at, now);
        run.last_event_at = now;

        let started_at = format_timestamp(run.started_at, &self.config.timestamp_format);
        let mut report = match run.store.read() {
            Ok(report) => report,
            Err(e) => {
                warn!(
                    "Could not read {}, starting a fresh report: {}",
                    run.store.path().display(),
                    e
                );
                RunReport::new(run.run_id.clone(), started_at.clone())
            }
        };
        report.run_id = run.run_id.clone();
        report.started_at = started_at;

        let step = step.into();
        debug!("Recording step {} ({})", step, format_duration(step_ms));
        report.steps.push(StepRow {
            step,
            description: description.into(),
            status: status.into(),
            details,
            timestamp: format_timestamp(now, &self.config.timestamp_format),
            duration: format_duration(step_ms),
        });
        report.summary = RunSummary::compute(&report.steps, elapsed_ms(run.started_at, now));

        run.store
            .write_with_retry(&report, self.config.retry_policy())
            .await
    }
}

impl Default for RunReporter {
    fn default() -> Self {
        Self::new(ReporterConfig::default())
    }
}

/// 按配置格式化时间；格式串无效时退回 RFC 3339
fn format_timestamp(at: DateTime<Local>, pattern: &str) -> String {
    let mut out = String::new();
    if write!(out, "{}", at.format(pattern)).is_err() {
        return at.to_rfc3339();
    }
    out
}
