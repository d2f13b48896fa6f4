use crate::report::model::{StepRow, StepStatus};

/// 运行摘要，完全由步骤列表与运行耗时推导
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub total_steps: usize,
    pub passed_steps: usize,
    pub failed_steps: usize,
    /// 自运行开始的总耗时 (毫秒)
    pub total_duration_ms: u64,
    /// 平均每步耗时 (毫秒)，没有步骤时为 0
    pub average_step_duration_ms: u64,
}

impl RunSummary {
    pub fn compute(steps: &[StepRow], elapsed_ms: u64) -> Self {
        let total_steps = steps.len();
        let passed_steps = steps
            .iter()
            .filter(|s| s.status == StepStatus::Passed)
            .count();
        let failed_steps = steps
            .iter()
            .filter(|s| s.status == StepStatus::Failed)
            .count();

        let average_step_duration_ms = if total_steps == 0 {
            0
        } else {
            elapsed_ms / total_steps as u64
        };

        Self {
            total_steps,
            passed_steps,
            failed_steps,
            total_duration_ms: elapsed_ms,
            average_step_duration_ms,
        }
    }

    pub fn total_duration(&self) -> String {
        format_duration(self.total_duration_ms)
    }

    pub fn average_step_duration(&self) -> String {
        format_duration(self.average_step_duration_ms)
    }
}

/// 将毫秒数格式化为紧凑的可读字符串
///
/// 只输出非零单位（由大到小），例如 `1h 2m 3s 4ms`、`5s`；零值输出 `0ms`。
pub fn format_duration(ms: u64) -> String {
    const UNITS: [(u64, &str); 4] = [(3_600_000, "h"), (60_000, "m"), (1_000, "s"), (1, "ms")];

    let mut remaining = ms;
    let mut parts = Vec::new();
    for (size, suffix) in UNITS {
        let value = remaining / size;
        remaining %= size;
        if value > 0 {
            parts.push(format!("{}{}", value, suffix));
        }
    }

    if parts.is_empty() {
        "0ms".to_string()
    } else {
        parts.join(" ")
    }
}

/// [`format_duration`] 的逆运算，用于读回已保存的报告
pub fn parse_duration(text: &str) -> Option<u64> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let mut total = 0u64;
    for part in text.split_whitespace() {
        let split = part.find(|c: char| !c.is_ascii_digit())?;
        let (value, unit) = part.split_at(split);
        let value: u64 = value.parse().ok()?;
        let factor = match unit {
            "h" => 3_600_000,
            "m" => 60_000,
            "s" => 1_000,
            "ms" => 1,
            _ => return None,
        };
        total += value * factor;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::model::StepId;

    fn row(status: &str) -> StepRow {
        StepRow {
            step: StepId::from(1),
            description: "step".to_string(),
            status: StepStatus::from(status),
            details: String::new(),
            timestamp: String::new(),
            duration: "0ms".to_string(),
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0ms");
        assert_eq!(format_duration(450), "450ms");
        assert_eq!(format_duration(5_000), "5s");
        assert_eq!(format_duration(65_000), "1m 5s");
        assert_eq!(format_duration(3_600_005), "1h 5ms");
        assert_eq!(format_duration(3_723_004), "1h 2m 3s 4ms");
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration("0ms"), Some(0));
        assert_eq!(parse_duration("1h 2m 3s 4ms"), Some(3_723_004));
        assert_eq!(parse_duration("5s"), Some(5_000));
        // 旧报告中初始化时写入的 "0"
        assert_eq!(parse_duration("0"), None);
        assert_eq!(parse_duration("soon"), None);
    }

    #[test]
    fn test_summary_counts() {
        let steps = vec![row("Passed"), row("Failed"), row("Info"), row("Passed")];
        let summary = RunSummary::compute(&steps, 4_000);

        assert_eq!(summary.total_steps, 4);
        assert_eq!(summary.passed_steps, 2);
        assert_eq!(summary.failed_steps, 1);
        assert_eq!(summary.total_duration(), "4s");
        assert_eq!(summary.average_step_duration(), "1s");
    }

    #[test]
    fn test_summary_empty_run() {
        let summary = RunSummary::compute(&[], 1_234);
        assert_eq!(summary.total_steps, 0);
        assert_eq!(summary.average_step_duration_ms, 0);
        assert_eq!(summary.average_step_duration(), "0ms");
    }
}
