use anyhow::Context;
use clap::Parser;
use leads_etl::config::RepositoryKind;
use leads_etl::core::LeadRepository;
use leads_etl::utils::{logger, validation::Validate};
use leads_etl::{
    CliConfig, Command, HttpLeadRepository, ImportSummary, JsonFileLeadRepository, LeadEtlEngine,
    LeadType, LocalStorage, MemoryLeadRepository, TomlConfig,
};

/// 相對路徑一律以目前工作目錄為基準
const WORKING_DIR: &str = ".";

#[tokio::main]
async fn main() {
    let cli = CliConfig::parse();

    // 初始化日誌
    if cli.json_logs {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting leads-etl");
    if cli.verbose {
        tracing::debug!("CLI config: {:?}", cli);
    }

    // 驗證配置
    if let Err(e) = cli.validate() {
        tracing::error!("❌ Configuration validation failed: {}", e);
        eprintln!("❌ {}", e);
        std::process::exit(1);
    }

    match run(cli).await {
        Ok(exit_code) => {
            if exit_code != 0 {
                std::process::exit(exit_code);
            }
        }
        Err(e) => {
            tracing::error!("❌ leads-etl failed: {:#}", e);
            eprintln!("❌ {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: CliConfig) -> anyhow::Result<i32> {
    let mut config = match &cli.config {
        Some(path) => TomlConfig::from_file(path)
            .with_context(|| format!("failed to load config file {}", path))?,
        None => TomlConfig::default(),
    };

    if let Command::Export {
        delimiter, output, ..
    } = &cli.command
    {
        if let Some(delimiter) = delimiter {
            config.export.delimiter = Some(*delimiter);
        }
        if let Some(output) = output {
            config.export.output_path = Some(output.clone());
        }
    }

    config.validate().context("invalid configuration")?;

    match cli.command {
        Command::Import {
            file,
            lead_type,
            dry_run,
        } => {
            let summary = if dry_run {
                tracing::info!("🧪 Dry run: leads will not be persisted");
                import_with(MemoryLeadRepository::new(), config, &file, lead_type).await?
            } else {
                match config.repository.r#type {
                    RepositoryKind::Json => {
                        let store =
                            JsonFileLeadRepository::new(LocalStorage::new(WORKING_DIR), config.repository.store_path());
                        import_with(store, config, &file, lead_type).await?
                    }
                    RepositoryKind::Http => {
                        let api = HttpLeadRepository::new(&config.repository)?;
                        import_with(api, config, &file, lead_type).await?
                    }
                }
            };

            println!("✅ Imported {} leads", summary.imported);
            if summary.failed() > 0 {
                // 逐列錯誤已寫入日誌，這裡只顯示數量
                println!("⚠️ {} rows failed, see the log for details", summary.failed());
                return Ok(2);
            }
        }
        Command::Export { lead_type, .. } => {
            let output_path = match config.repository.r#type {
                RepositoryKind::Json => {
                    let store =
                        JsonFileLeadRepository::new(LocalStorage::new(WORKING_DIR), config.repository.store_path());
                    export_with(store, config, lead_type).await?
                }
                RepositoryKind::Http => {
                    let api = HttpLeadRepository::new(&config.repository)?;
                    export_with(api, config, lead_type).await?
                }
            };

            println!("📁 Output saved to: {}", output_path);
        }
    }

    Ok(0)
}

async fn import_with<R: LeadRepository>(
    repository: R,
    config: TomlConfig,
    file: &str,
    lead_type: Option<LeadType>,
) -> leads_etl::Result<ImportSummary> {
    LeadEtlEngine::new(LocalStorage::new(WORKING_DIR), repository, config)
        .import_file(file, lead_type)
        .await
}

async fn export_with<R: LeadRepository>(
    repository: R,
    config: TomlConfig,
    lead_type: Option<LeadType>,
) -> leads_etl::Result<String> {
    LeadEtlEngine::new(LocalStorage::new(WORKING_DIR), repository, config)
        .export_file(lead_type)
        .await
}
