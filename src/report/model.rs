use crate::Result;
use crate::error::ReportError;
use crate::report::summary::RunSummary;
use serde_json::{Map, Value};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// 步骤标识：顺序编号或自由文本标签（如 `ERROR`、`SIGNIN-CLICK`）
///
/// 不要求唯一，也不要求递增。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepId {
    Number(u32),
    Tag(String),
}

impl From<u32> for StepId {
    fn from(n: u32) -> Self {
        StepId::Number(n)
    }
}

impl From<&str> for StepId {
    fn from(tag: &str) -> Self {
        StepId::Tag(tag.to_string())
    }
}

impl From<String> for StepId {
    fn from(tag: String) -> Self {
        StepId::Tag(tag)
    }
}

impl fmt::Display for StepId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepId::Number(n) => write!(f, "{}", n),
            StepId::Tag(tag) => write!(f, "{}", tag),
        }
    }
}

/// 步骤状态
///
/// 实际使用中是开放集合，未知标签原样保留在 `Other` 中。
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StepStatus {
    #[default]
    Passed,
    Failed,
    Info,
    Other(String),
}

impl StepStatus {
    pub fn as_str(&self) -> &str {
        match self {
            StepStatus::Passed => "Passed",
            StepStatus::Failed => "Failed",
            StepStatus::Info => "Info",
            StepStatus::Other(label) => label,
        }
    }
}

impl FromStr for StepStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let status = match s.trim() {
            s if s.eq_ignore_ascii_case("passed") => StepStatus::Passed,
            s if s.eq_ignore_ascii_case("failed") => StepStatus::Failed,
            s if s.eq_ignore_ascii_case("info") => StepStatus::Info,
            other => StepStatus::Other(other.to_string()),
        };
        Ok(status)
    }
}

impl From<&str> for StepStatus {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(status) => status,
            Err(never) => match never {},
        }
    }
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 步骤附加信息
///
/// 纯文本原样保存；键值对按插入顺序展开为 `key: value` 行。
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Details {
    #[default]
    None,
    Text(String),
    Fields(Map<String, Value>),
}

impl Details {
    /// 空的键值对，配合 [`Details::with`] 逐项构建
    pub fn fields() -> Self {
        Details::Fields(Map::new())
    }

    /// 追加一个键值对；对非键值对的 Details 会先转换为空键值对
    pub fn with(self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = match self {
            Details::Fields(map) => map,
            _ => Map::new(),
        };
        map.insert(key.into(), value.into());
        Details::Fields(map)
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Details::None => true,
            Details::Text(text) => text.is_empty(),
            Details::Fields(map) => map.is_empty(),
        }
    }

    /// 格式化为报告中的单元格文本
    ///
    /// 值必须是标量 (string/number/bool/null)，数组和对象返回 `Serialization` 错误。
    pub fn format(&self) -> Result<String> {
        match self {
            Details::None => Ok(String::new()),
            Details::Text(text) => Ok(text.clone()),
            Details::Fields(map) => {
                let mut lines = Vec::with_capacity(map.len());
                for (key, value) in map {
                    let rendered = match value {
                        Value::String(s) => s.clone(),
                        Value::Number(n) => n.to_string(),
                        Value::Bool(b) => b.to_string(),
                        Value::Null => "null".to_string(),
                        Value::Array(_) | Value::Object(_) => {
                            return Err(ReportError::Serialization(format!(
                                "detail '{}' is not a scalar value",
                                key
                            )));
                        }
                    };
                    lines.push(format!("{}: {}", key, rendered));
                }
                Ok(lines.join("\n"))
            }
        }
    }
}

impl From<&str> for Details {
    fn from(text: &str) -> Self {
        Details::Text(text.to_string())
    }
}

impl From<String> for Details {
    fn from(text: String) -> Self {
        Details::Text(text)
    }
}

impl From<Value> for Details {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Details::None,
            Value::String(text) => Details::Text(text),
            Value::Object(map) => Details::Fields(map),
            other => Details::Text(other.to_string()),
        }
    }
}

impl<T: Into<Details>> From<Option<T>> for Details {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or_default()
    }
}

/// 报告中的一行步骤记录（已格式化的持久化形式）
#[derive(Debug, Clone, PartialEq)]
pub struct StepRow {
    pub step: StepId,
    pub description: String,
    pub status: StepStatus,
    /// 已展开的附加信息
    pub details: String,
    /// 记录时间（显示用）
    pub timestamp: String,
    /// 与上一步之间的耗时（显示用）
    pub duration: String,
}

/// 一次运行的完整报告
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// 运行标识（Test Name）
    pub run_id: String,

    /// 运行开始时间（显示用）
    pub started_at: String,

    /// 按执行顺序排列的步骤，只追加
    pub steps: Vec<StepRow>,

    pub summary: RunSummary,
}

impl RunReport {
    pub fn new(run_id: impl Into<String>, started_at: impl Into<String>) -> Self {
        Self {
            run_id: run_id.into(),
            started_at: started_at.into(),
            steps: Vec::new(),
            summary: RunSummary::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parse() {
        assert_eq!(StepStatus::from("Passed"), StepStatus::Passed);
        assert_eq!(StepStatus::from("failed"), StepStatus::Failed);
        assert_eq!(StepStatus::from(" INFO "), StepStatus::Info);
        assert_eq!(
            StepStatus::from("Skipped"),
            StepStatus::Other("Skipped".to_string())
        );
        assert_eq!(StepStatus::default(), StepStatus::Passed);
    }

    #[test]
    fn test_step_id_display() {
        assert_eq!(StepId::from(7).to_string(), "7");
        assert_eq!(StepId::from("SIGNIN-CLICK").to_string(), "SIGNIN-CLICK");
    }

    #[test]
    fn test_format_fields_keeps_insertion_order() {
        let details = Details::from(json!({"Currency": "INR", "Rate": 82.5}));
        assert_eq!(details.format().unwrap(), "Currency: INR\nRate: 82.5");

        let details = Details::fields()
            .with("Zeta", "last?")
            .with("Alpha", 1u32)
            .with("Enabled", false);
        assert_eq!(details.format().unwrap(), "Zeta: last?\nAlpha: 1\nEnabled: false");
    }

    #[test]
    fn test_format_text_and_empty() {
        assert_eq!(Details::from("boom").format().unwrap(), "boom");
        assert_eq!(Details::None.format().unwrap(), "");
        assert_eq!(Details::fields().format().unwrap(), "");
        assert_eq!(Details::from(None::<&str>).format().unwrap(), "");
        assert!(Details::fields().is_empty());
    }

    #[test]
    fn test_format_rejects_nested_values() {
        let details = Details::from(json!({"Items": [1, 2, 3]}));
        assert!(matches!(
            details.format(),
            Err(ReportError::Serialization(_))
        ));
    }
}
