use crate::Result;
use crate::error::ReportError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

/// 报告目录环境变量（优先级高于配置文件）
pub const REPORT_DIR_ENV: &str = "RUNREPORT_DIR";

/// 报告器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReporterConfig {
    /// 报告输出目录（相对于当前工作目录）
    pub report_dir: PathBuf,

    /// 报告文件名后缀，拼接在运行标识之后
    pub file_suffix: String,

    /// 测试脚本文件后缀，推导运行标识时会被去掉
    pub test_file_suffix: String,

    /// 时间戳显示格式 (chrono strftime)
    pub timestamp_format: String,

    /// 写入最大尝试次数
    pub write_attempts: u32,

    /// 两次写入尝试之间的等待时间 (毫秒)
    pub retry_backoff_ms: u64,
}

impl Default for ReporterConfig {
    fn default() -> Self {
        Self {
            report_dir: PathBuf::from("ExecutionReport"),
            file_suffix: "_Report".to_string(),
            test_file_suffix: ".spec.js".to_string(),
            timestamp_format: "%d/%m/%Y, %I:%M:%S %P".to_string(),
            write_attempts: 3,
            retry_backoff_ms: 500,
        }
    }
}

impl ReporterConfig {
    /// 查找配置文件并应用环境变量覆盖；找不到配置时使用默认值
    pub fn resolve() -> Self {
        let mut config = ConfigLoader::find_and_load().unwrap_or_default();
        config.apply_env_overrides();
        config
    }

    /// 应用 RUNREPORT_DIR 覆盖
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var(REPORT_DIR_ENV)
            && !dir.trim().is_empty()
        {
            self.report_dir = PathBuf::from(dir);
        }
    }

    /// 使用指定报告目录（测试与脚本中常用）
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = dir.into();
        self
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            attempts: self.write_attempts.max(1),
            backoff: Duration::from_millis(self.retry_backoff_ms),
        }
    }

    /// 某个运行标识对应的报告文件路径
    pub fn report_path(&self, run_id: &str) -> PathBuf {
        self.report_dir.join(format!("{}{}.xlsx", run_id, self.file_suffix))
    }
}

/// 写入重试策略
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        ReporterConfig::default().retry_policy()
    }
}

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "runreport.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<ReporterConfig> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| {
            ReportError::Config(format!(
                "Failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;

        toml::from_str(&content)
            .map_err(|e| ReportError::Config(format!("Failed to parse config file: {}", e)))
    }

    /// 查找并加载配置文件
    /// 查找顺序：
    /// 1. 当前目录及其父目录
    /// 2. 用户配置目录 ~/.config/runreport/
    pub fn find_and_load() -> Option<ReporterConfig> {
        let path = Self::find_in_current_dir().or_else(Self::find_in_user_dir)?;

        match Self::load_from_path(&path) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                None
            }
        }
    }

    fn find_in_current_dir() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            if !current.pop() {
                break;
            }
        }

        None
    }

    fn find_in_user_dir() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let config_path = home
            .join(".config")
            .join("runreport")
            .join(Self::CONFIG_FILE);

        config_path.exists().then_some(config_path)
    }

    /// 将默认配置写入指定路径（已存在时拒绝覆盖）
    pub fn write_default<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if path.exists() {
            return Err(ReportError::Config(format!(
                "{} already exists",
                path.display()
            )));
        }

        let content = toml::to_string_pretty(&ReporterConfig::default())
            .map_err(|e| ReportError::Serialization(e.to_string()))?;
        fs::write(path, content)?;
        Ok(())
    }
}
