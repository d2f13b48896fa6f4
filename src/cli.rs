use std::path::PathBuf;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use colored::Colorize;
use runreport::ReporterConfig;
use runreport::config::ConfigLoader;
use runreport::report::printer;
use runreport::report::selector::{self, SelectionStrategy};
use runreport::report::storage::ReportStore;

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 报告目录（覆盖配置文件与 RUNREPORT_DIR）
    #[arg(long, global = true)]
    pub dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 显示一个报告
    Show {
        /// 报告文件路径；省略时交互选择
        path: Option<PathBuf>,

        /// 直接打开最近修改的报告
        #[arg(long, conflicts_with = "path")]
        last: bool,
    },
    /// 列出报告目录中的所有报告
    List,
    /// 在当前目录生成默认配置文件
    InitConfig,
}

pub fn run(cli: Cli) -> Result<()> {
    let mut config = ReporterConfig::resolve();
    if let Some(dir) = cli.dir {
        config.report_dir = dir;
    }

    match cli.command {
        Commands::Show { path, last } => show(&config, path, last),
        Commands::List => list(&config),
        Commands::InitConfig => init_config(),
    }
}

fn show(config: &ReporterConfig, path: Option<PathBuf>, last: bool) -> Result<()> {
    let path = match path {
        Some(path) => path,
        None => {
            let strategy = if last {
                SelectionStrategy::Latest
            } else {
                SelectionStrategy::Interactive
            };
            match selector::select_report(&config.report_dir, &config.file_suffix, strategy)? {
                Some(report) => report.path,
                None => bail!("No reports found in {}", config.report_dir.display()),
            }
        }
    };

    let report = ReportStore::new_with_path(path.clone())
        .read()
        .with_context(|| format!("Failed to open report {}", path.display()))?;

    println!("{}", path.display().to_string().bold());
    printer::print_report(&report);
    Ok(())
}

fn list(config: &ReporterConfig) -> Result<()> {
    let reports = selector::list_reports(&config.report_dir, &config.file_suffix)?;
    if reports.is_empty() {
        println!(
            "{}",
            format!("No reports in {}", config.report_dir.display()).dimmed()
        );
        return Ok(());
    }

    println!("{}", printer::reports_table(&reports));
    Ok(())
}

fn init_config() -> Result<()> {
    let path = PathBuf::from(ConfigLoader::CONFIG_FILE);
    ConfigLoader::write_default(&path)?;
    println!("{} {}", "Created".green(), path.display());
    Ok(())
}
