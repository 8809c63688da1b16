use clap::Parser;
use column_shuffle::config::cli::CliConfig;
use column_shuffle::utils::logger;
use column_shuffle::{build_run_config, EtlError, RawConfig, RunConfig};

fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("🚀 Starting column-shuffle");
    tracing::info!("📁 Loading configuration from: {}", cli.config.display());

    // 載入並驗證配置
    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };
    tracing::debug!("Run config: {:?}", config);

    if cli.dry_run {
        tracing::info!("🔍 DRY RUN MODE - No data will be read or written");
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    match column_shuffle::run(&config) {
        Ok(summary) => {
            tracing::info!("✅ Shuffle completed successfully!");
            println!(
                "✅ Wrote {} rows ({} columns) to {}",
                summary.rows_written,
                summary.columns.len(),
                summary.output_file_path.display()
            );
            Ok(())
        }
        Err(e) => fail(&e),
    }
}

fn load_config(cli: &CliConfig) -> column_shuffle::Result<RunConfig> {
    let raw = RawConfig::from_file(&cli.config)?;
    build_run_config(&raw)
}

fn fail(e: &EtlError) -> ! {
    tracing::error!("❌ Shuffle failed: {} (Category: {:?})", e, e.category());
    tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("shuffle failed: {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code());
}
