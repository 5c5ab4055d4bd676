use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::info;

use biblioscope::analysis::{self, frequency, keywords, Bucket};
use biblioscope::config::ReportConfig;
use biblioscope::entities::{download, EntityCleaner, EntityExtractor, EntityModel, OnnxEntityRecognizer};
use biblioscope::normalize::normalize_works;
use biblioscope::openalex::client::OpenAlexClient;
use biblioscope::openalex::record::TextField;
use biblioscope::output::{export, terminal};
use biblioscope::pipeline;
use biblioscope::translate::{GoogleTranslator, Translator};

/// Config file picked up from the working directory when --config is absent.
const DEFAULT_CONFIG_FILE: &str = "biblioscope.toml";

/// Biblioscope: bibliographic retrieval and entity analysis over OpenAlex.
///
/// Fetches works matching a search, normalizes their text, tags place names
/// with a local NER model, and compares search hits against an unfiltered
/// baseline.
#[derive(Parser)]
#[command(name = "biblioscope", version, about)]
struct Cli {
    /// Report configuration (TOML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Stop after this many works (overrides result_cap)
    #[arg(long, global = true)]
    max_results: Option<usize>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch, normalize and annotate works, then export them as JSON
    Works {
        /// Skip entity recognition
        #[arg(long)]
        no_entities: bool,

        /// Works to print in the terminal (default: 20)
        #[arg(long, default_value = "20")]
        show: usize,
    },

    /// Share of search hits per group against the unfiltered baseline
    Proportions,

    /// Entity frequencies per year or decade
    Entities {
        /// Column to count entities in
        #[arg(long, default_value = "abstract")]
        field: TextField,

        /// Time bucket: year or decade
        #[arg(long, default_value = "year")]
        bucket: Bucket,

        /// Entities to show per bucket (default: 10)
        #[arg(long, default_value = "10")]
        top: usize,
    },

    /// Count works mentioning each configured gazetteer term
    Gazetteer {
        /// Column to search
        #[arg(long, default_value = "abstract")]
        field: TextField,

        /// Terms to show (default: all matched)
        #[arg(long)]
        top: Option<usize>,
    },

    /// Per-year share of works without an abstract
    Coverage,

    /// TF-IDF ranked keywords in a column
    Keywords {
        #[arg(long, default_value = "abstract")]
        field: TextField,

        /// Keywords to show (default: 30)
        #[arg(long, default_value = "30")]
        top: usize,
    },

    /// Download an ONNX entity model from HuggingFace
    DownloadModel {
        /// small (~110 MB) or large (~335 MB); defaults to the configured model
        #[arg(long)]
        model: Option<EntityModel>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if missing)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("biblioscope=info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_deref())?;
    if cli.max_results.is_some() {
        config.result_cap = cli.max_results;
    }

    match cli.command {
        Commands::Works { no_entities, show } => {
            let client = OpenAlexClient::new(config.client_config())?;
            let extractor = if no_entities {
                None
            } else {
                Some(build_extractor(&config)?)
            };
            let translator = build_translator(&config);

            let works =
                pipeline::run_works(&client, &config, extractor.as_ref(), translator.as_deref()).await?;

            terminal::display_works(&works, show);
            let path = export::export_works(&works, &config.output_dir, "works")?;
            println!("Exported {} works to {}", works.len(), path.display());
        }

        Commands::Proportions => {
            let client = OpenAlexClient::new(config.client_config())?;
            let rows =
                analysis::run_proportions(&client, &config.grouped_query(), config.page_size).await?;

            terminal::display_proportions(&rows, &config.group_by);
            let path = export::export_json(&rows, &config.output_dir, "proportions")?;
            println!("Exported {} rows to {}", rows.len(), path.display());
        }

        Commands::Entities { field, bucket, top } => {
            if !config.entity_columns.contains(&field) {
                config.entity_columns.push(field);
            }
            let client = OpenAlexClient::new(config.client_config())?;
            let extractor = build_extractor(&config)?;
            let translator = build_translator(&config);

            let works =
                pipeline::run_works(&client, &config, Some(&extractor), translator.as_deref()).await?;

            let table = analysis::entity_frequencies(&works, field, bucket);
            let per_bucket = frequency::top_per_bucket(&table, top);
            terminal::display_frequencies(&per_bucket, field, &bucket.to_string());
            terminal::display_top_entities(&analysis::top_entities(&works, field, top), field);

            let path = export::export_json(&table, &config.output_dir, &format!("entities-{field}-{bucket}"))?;
            println!("Exported frequency table to {}", path.display());
        }

        Commands::Gazetteer { field, top } => {
            if config.gazetteer.is_empty() {
                anyhow::bail!(
                    "No gazetteer terms configured\n\
                     Add `gazetteer = [\"...\"]` to the report config."
                );
            }
            let client = OpenAlexClient::new(config.client_config())?;
            let mut works = pipeline::fetch_works(&client, &config).await?;
            if let Some(translator) = build_translator(&config) {
                pipeline::translate_works(&mut works, &[field], translator.as_ref()).await;
            }
            let works = normalize_works(&works, &[field], &config.normalize_pipeline);

            let mut ranked = analysis::count_matches(&works, field, &config.gazetteer);
            if let Some(top) = top {
                ranked.truncate(top);
            }

            terminal::display_gazetteer(&ranked, field, works.len());
            let path = export::export_json(&ranked, &config.output_dir, &format!("gazetteer-{field}"))?;
            println!("Exported gazetteer counts to {}", path.display());
        }

        Commands::Coverage => {
            let client = OpenAlexClient::new(config.client_config())?;
            let works = pipeline::fetch_works(&client, &config).await?;
            let rows = analysis::abstract_coverage(&works);

            terminal::display_coverage(&rows);
            let path = export::export_json(&rows, &config.output_dir, "coverage")?;
            println!("Exported coverage to {}", path.display());
        }

        Commands::Keywords { field, top } => {
            let client = OpenAlexClient::new(config.client_config())?;
            let works = pipeline::fetch_works(&client, &config).await?;
            let works = normalize_works(&works, &[field], &config.normalize_pipeline);

            let texts: Vec<String> = works
                .iter()
                .filter_map(|w| w.field(field).map(str::to_string))
                .collect();
            info!(field = %field, documents = texts.len(), "Ranking keywords");

            let ranked = keywords::rank_keywords_excluding(&texts, top, &config.query);
            terminal::display_keywords(&ranked, field);
        }

        Commands::DownloadModel { model } => {
            let model = model.unwrap_or(config.entity_model);
            let base = config.model_base_dir();

            println!("Downloading ONNX entity model...");
            println!("  Destination: {}", model.dir(&base).display());

            download::download_model(&base, model).await?;

            println!("\n{}", "Model downloaded successfully.".bold());
            println!("You can now run `biblioscope works` or `biblioscope entities`.");
        }
    }

    Ok(())
}

/// Load the given config file, or `biblioscope.toml` if present, or defaults.
fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    match path {
        Some(path) => ReportConfig::load(path),
        None if Path::new(DEFAULT_CONFIG_FILE).exists() => ReportConfig::load(Path::new(DEFAULT_CONFIG_FILE)),
        None => {
            info!("No config file, using defaults");
            let mut config = ReportConfig::default();
            config.apply_overrides(|key| std::env::var(key).ok());
            config.validate()?;
            Ok(config)
        }
    }
}

fn build_extractor(config: &ReportConfig) -> Result<EntityExtractor> {
    config.require_entity_model()?;
    let dir = config.entity_model.dir(&config.model_base_dir());
    let recognizer = OnnxEntityRecognizer::new(&dir, config.workers);

    Ok(EntityExtractor::new(Arc::new(recognizer))
        .with_types(&config.entity_types)
        .with_cleaner(EntityCleaner::new(config.entity_stop_words)))
}

fn build_translator(config: &ReportConfig) -> Option<Box<dyn Translator>> {
    config
        .translate
        .then(|| Box::new(GoogleTranslator::new()) as Box<dyn Translator>)
}
