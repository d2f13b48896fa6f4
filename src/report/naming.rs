use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

// Characters that are not allowed in file names on at least one platform
static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>:"/\\|?*\x00-\x1f]+"#).expect("valid regex"));

const FALLBACK_RUN_ID: &str = "run";

/// 将任意运行名称转换为可用于文件名的运行标识
pub fn sanitize_run_id(name: &str) -> String {
    let cleaned = UNSAFE_CHARS.replace_all(name.trim(), "_");
    let cleaned = cleaned.trim_matches(|c: char| c == '.' || c.is_whitespace());
    if cleaned.is_empty() {
        FALLBACK_RUN_ID.to_string()
    } else {
        cleaned.to_string()
    }
}

/// 由测试脚本路径推导运行标识
///
/// `tests/PurchaseOrder.spec.js` + `.spec.js` -> `PurchaseOrder`；
/// 后缀不匹配时退回到去掉扩展名的文件名。
pub fn run_id_from_test_file(path: &Path, test_file_suffix: &str) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let base = match file_name.strip_suffix(test_file_suffix) {
        Some(stem) if !test_file_suffix.is_empty() && !stem.is_empty() => stem.to_string(),
        _ => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    sanitize_run_id(&base)
}
