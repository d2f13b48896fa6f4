// 模拟一个脚本化的 UI 流程，演示报告器的典型用法
use runreport::{Details, RunReporter, StepStatus};

fn pick_currency(roll: u8) -> Result<&'static str, String> {
    match roll {
        0..=89 => Ok("INR"),
        90..=99 => Ok("USD"),
        _ => Err("No currency options found in the dropdown.".to_string()),
    }
}

async fn purchase_order_flow(reporter: &mut RunReporter, roll: u8) -> Result<(), String> {
    reporter.pass(1, "Opening Chrome browser in full screen").await;
    reporter
        .record_step(
            3,
            "Entering username",
            StepStatus::Passed,
            Details::fields().with("Username", "qa@example.com"),
        )
        .await;

    let currency = match pick_currency(roll) {
        Ok(currency) => currency,
        Err(e) => {
            reporter.fail("CURRENCY-ERROR", e.clone(), Details::None).await;
            return Err(e);
        }
    };
    reporter
        .record_step(
            "CURRENCY-CHOICE",
            format!("Selected {}", currency),
            StepStatus::Passed,
            Details::fields().with("Chosen Currency", currency),
        )
        .await;
    reporter
        .record_step(
            "DATE-DEBUG",
            "Quotation Date field value",
            StepStatus::Info,
            "19/10/2026",
        )
        .await;

    Ok(())
}

#[tokio::main]
async fn main() {
    runreport::logger::init_logger();

    let mut reporter = RunReporter::from_env();
    reporter.initialize_for_test_file("tests/PurchaseOrder.spec.js");

    let roll = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    if let Err(e) = purchase_order_flow(&mut reporter, roll).await {
        reporter.record_error(&e).await;
    }

    if let Some(path) = reporter.report_path() {
        println!("📄 报告已写入 {}", path.display());
    }
}
