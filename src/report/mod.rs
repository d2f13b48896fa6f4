pub mod clock;
pub mod model;
pub mod naming;
pub mod printer;
pub mod reporter;
pub mod selector;
pub mod storage;
pub mod summary;
pub mod workbook;

pub use clock::{Clock, ManualClock, SystemClock};
pub use model::{Details, RunReport, StepId, StepRow, StepStatus};
pub use naming::{run_id_from_test_file, sanitize_run_id};
pub use reporter::RunReporter;
pub use storage::ReportStore;
pub use summary::{RunSummary, format_duration};
