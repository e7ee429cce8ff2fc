use agri_ai_common::{diagnose, CropType, DiagnosisQuery, KnowledgeStore};
use agri_ai_rust::{batch, cli, config, error, export, interactive, knowledge, recorder, report};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use knowledge::{CachedStore, JsonFileStore};
use recorder::{DiagnosisRecord, DiagnosisRecorder, HistoryFile};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool, config: &Config) {
    let default_filter = if verbose { "debug" } else { config.log_filter.as_str() };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(cli_knowledge: Option<&std::path::Path>, config: &Config) -> Result<JsonFileStore> {
    let path = config.resolve_knowledge_path(cli_knowledge)?;
    JsonFileStore::open(&path)
}

/// 記録が有効なら履歴ファイルを開く
fn open_history(config: &Config, no_record: bool) -> Result<Option<HistoryFile>> {
    if no_record || !config.record_history {
        return Ok(None);
    }
    let path = config.resolve_history_path()?;
    Ok(Some(HistoryFile::load(&path)?))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = Config::load()?;
    init_logging(cli.verbose, &config);

    let knowledge_override = cli.knowledge.as_deref();

    match cli.command {
        Commands::Diagnose { crop, symptoms, image, no_record, json } => {
            let store = open_store(knowledge_override, &config)?;
            let query = DiagnosisQuery::new(&crop, &symptoms);
            if query.crop_type == CropType::Other && !crop.trim().eq_ignore_ascii_case("other") {
                tracing::warn!(crop = %crop, "unrecognised crop type, using 'other'");
            }

            let mut history = open_history(&config, no_record)?;
            let result = diagnose(&store, &query)?;

            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                println!("🌿 agri-ai - 症状診断\n");
                report::print_result(&query, &result);
            }

            if let Some(history) = history.as_mut() {
                history.record(DiagnosisRecord::new(
                    &query,
                    &result,
                    image.as_deref(),
                    config.user_id.as_deref(),
                ))?;
                tracing::info!(path = %history.path().display(), "diagnosis recorded");
            }
        }

        Commands::Batch { input, output, jobs, no_record } => {
            println!("📋 agri-ai - 一括診断\n");

            let store = CachedStore::new(open_store(knowledge_override, &config)?);

            println!("[1/3] 入力を読み込み中...");
            let items = batch::load_batch(&input)?;
            println!("✔ {}件の問い合わせ\n", items.len());

            println!("[2/3] 診断中...");
            let jobs = jobs.unwrap_or(config.batch_jobs);
            let outcomes = batch::run_batch(&store, &items, jobs, !cli.verbose)?;
            let identified = outcomes.iter().filter(|o| o.result.is_identified()).count();
            let stats = store.stats();
            println!("✔ 診断完了: {}件中 {}件を特定", outcomes.len(), identified);
            tracing::debug!(hits = stats.hits, misses = stats.misses, "knowledge cache stats");

            println!("\n[3/3] 結果を保存中...");
            let output = output.unwrap_or_else(|| input.with_extension("results.json"));
            batch::save_outcomes(&outcomes, &output)?;
            println!("✔ 結果を保存: {}", output.display());

            if let Some(mut history) = open_history(&config, no_record)? {
                let records: Vec<DiagnosisRecord> = outcomes
                    .iter()
                    .map(|outcome| {
                        DiagnosisRecord::new(
                            &outcome.query,
                            &outcome.result,
                            outcome.image_ref.as_deref(),
                            config.user_id.as_deref(),
                        )
                    })
                    .collect();
                history.record_all(records)?;
                println!("✔ 診断履歴に{}件を保存", outcomes.len());
            }

            println!("\n✅ 一括診断完了");
        }

        Commands::Interactive { no_record } => {
            let store = CachedStore::new(open_store(knowledge_override, &config)?);
            let mut history = open_history(&config, no_record)?;

            let count = interactive::run_interactive(
                &store,
                history.as_mut(),
                config.user_id.as_deref(),
            )?;
            println!("\n✅ {}件の診断を終了しました", count);
        }

        Commands::Knowledge { crop, validate } => {
            let store = open_store(knowledge_override, &config)?;
            let base = store.load()?;
            println!("📚 ナレッジベース: {} ({}件)\n", store.path().display(), base.len());

            let crops: Vec<CropType> = match crop.as_deref() {
                Some(value) => vec![CropType::parse_or_other(value)],
                None => base.counts_by_crop().into_iter().map(|(c, _)| c).collect(),
            };

            for crop_type in crops {
                let records = store.fetch_disease_records(crop_type)?;
                println!("{} ({}件)", crop_type, records.len());
                for record in &records {
                    println!("  - {}: {}", record.disease_name, record.symptoms.join(", "));
                }
            }

            if validate {
                let issues = base.validate();
                println!();
                if issues.is_empty() {
                    println!("✔ 不備は見つかりませんでした");
                } else {
                    println!("⚠ {}件の不備:", issues.len());
                    for issue in &issues {
                        println!("  {}", issue);
                    }
                }
            }
        }

        Commands::History { crop, limit } => {
            let path = config.resolve_history_path()?;
            let history = HistoryFile::load(&path)?;

            if history.is_empty() {
                println!("診断履歴がありません: {}", path.display());
                return Ok(());
            }

            let records: Vec<&DiagnosisRecord> = match crop.as_deref() {
                Some(value) => {
                    let crop_type = CropType::parse_or_other(value);
                    history.for_crop(crop_type).into_iter().rev().take(limit).collect()
                }
                None => history.latest(limit),
            };

            println!("診断履歴 ({}件中 {}件):", history.len(), records.len());
            for record in records {
                report::print_record_line(record);
            }
        }

        Commands::Export { format, output, title } => {
            println!("📄 agri-ai - エクスポート\n");

            let path = config.resolve_history_path()?;
            let history = HistoryFile::load(&path)?;
            let output_dir = output.unwrap_or_else(|| PathBuf::from("."));

            println!("- {}件を書き出し中...", history.len());
            let written = export::export_history(history.entries(), format, &output_dir, &title)?;
            println!("✔ 出力: {}", written.display());

            println!("\n✅ エクスポート完了");
        }

        Commands::Config { set_knowledge, set_user, show } => {
            let mut config = config;

            if let Some(path) = set_knowledge {
                config.set_knowledge_path(path)?;
                println!("✔ ナレッジベースを設定しました");
            }

            if let Some(user) = set_user {
                config.set_user_id(user)?;
                println!("✔ ユーザーIDを設定しました");
            }

            if show {
                println!("設定:");
                println!(
                    "  ナレッジベース: {}",
                    config
                        .knowledge_path
                        .as_ref()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| "未設定".into())
                );
                match config.resolve_history_path() {
                    Ok(path) => println!("  診断履歴: {}", path.display()),
                    Err(e) => println!("  診断履歴: {}", e),
                }
                println!("  履歴の記録: {}", if config.record_history { "有効" } else { "無効" });
                println!("  ユーザーID: {}", config.user_id.as_deref().unwrap_or("未設定"));
                println!("  並列数: {}", if config.batch_jobs == 0 { "自動".to_string() } else { config.batch_jobs.to_string() });
                println!("  ログ: {}", config.log_filter);
            }
        }
    }

    Ok(())
}
