//! Discourse Dataset CLI
//!
//! Command-line interface over the merged post dataset:
//! - Build the merged list from converter output
//! - Query posts by field predicates and keywords
//! - List distinct field values
//! - Generate a config file

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use discourse_dataset::config::{generate_default_config, Config, DatasetConfig, LoggingConfig};
use discourse_dataset::query::{PostDataset, PostFilter};
use discourse_dataset::records::{Field, FieldValue};
use discourse_dataset::store::{DatasetSources, MergedStore};
use std::collections::BTreeSet;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "discourse-dataset")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Merge and query Discourse forum activity")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search standard locations)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Dataset root directory, overriding the config
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Output format (table, json, csv)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load sources, merge them and persist the merged list
    Build {
        /// Rebuild even if the merged list already exists
        #[arg(long)]
        overwrite: bool,
    },

    /// Query posts
    Query {
        #[command(flatten)]
        predicates: PredicateArgs,
        /// Keyword to look for in text or topic (repeatable, any may match)
        #[arg(short, long)]
        search: Vec<String>,
        /// Show at most this many posts
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// List the distinct values of a field
    Distinct {
        /// Field name (e.g. category, username, member_status)
        field: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Filter predicates; dates accept `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` or RFC 3339
#[derive(Args, Debug, Default)]
pub struct PredicateArgs {
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    full_name: Option<String>,
    #[arg(long)]
    member_status: Option<String>,
    #[arg(long)]
    topic: Option<String>,
    #[arg(long)]
    topic_link: Option<String>,
    #[arg(long)]
    text: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// Match placeholder rows (true) or real posts (false)
    #[arg(long)]
    empty: Option<String>,
    #[arg(long)]
    join_before: Option<String>,
    #[arg(long)]
    join_after: Option<String>,
    #[arg(long)]
    last_post_before: Option<String>,
    #[arg(long)]
    last_post_after: Option<String>,
    #[arg(long)]
    post_before: Option<String>,
    #[arg(long)]
    post_after: Option<String>,
}

impl PredicateArgs {
    fn to_filter(&self) -> anyhow::Result<PostFilter> {
        let named = [
            ("username", &self.username),
            ("full_name", &self.full_name),
            ("member_status", &self.member_status),
            ("topic", &self.topic),
            ("topic_link", &self.topic_link),
            ("text", &self.text),
            ("category", &self.category),
            ("empty", &self.empty),
            ("join_before", &self.join_before),
            ("join_after", &self.join_after),
            ("last_post_before", &self.last_post_before),
            ("last_post_after", &self.last_post_after),
            ("post_before", &self.post_before),
            ("post_after", &self.post_after),
        ];

        let mut filter = PostFilter::new();
        for (key, value) in named {
            if let Some(value) = value {
                filter = filter
                    .set(key, value)
                    .with_context(|| format!("--{} {}", key.replace('_', "-"), value))?;
            }
        }
        Ok(filter)
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default()?,
    };
    if let Some(data_dir) = &cli.data_dir {
        config.dataset.data_dir = data_dir.clone();
    }

    init_logging(&config.logging);
    tracing::debug!(data_dir = ?config.dataset.data_root(), "Configuration loaded");

    match cli.command {
        Commands::Build { overwrite } => {
            let overwrite = overwrite || config.dataset.overwrite;
            let dataset = open_dataset(&config.dataset, overwrite)?;

            println!("Merged list: {:?}", config.dataset.merged_path());
            println!("  Records:       {}", dataset.len());
            println!("  Members:       {}", dataset.distinct(Field::Username).len());
            println!("  Without posts: {}", dataset.placeholder_count());
        }

        Commands::Query {
            predicates,
            search,
            limit,
        } => {
            let dataset = open_dataset(&config.dataset, config.dataset.overwrite)?;

            let filter = predicates.to_filter()?;
            let mut result = dataset.filter(&filter)?;
            if !search.is_empty() {
                result = result.search(&search)?;
            }
            if let Some(limit) = limit {
                result = result.iter().take(limit).cloned().collect();
            }

            match cli.format.as_str() {
                "json" => {
                    println!("{}", serde_json::to_string_pretty(&result.rendered())?);
                }
                "csv" => {
                    result
                        .write_csv(std::io::stdout().lock())
                        .context("Failed to write CSV")?;
                }
                _ => {
                    print!("{}", result);
                }
            }
        }

        Commands::Distinct { field } => {
            let dataset = open_dataset(&config.dataset, config.dataset.overwrite)?;
            let values = dataset.distinct_by_name(&field)?;
            print_values(&field, &values, &cli.format)?;
        }

        Commands::Config { output } => {
            let config = generate_default_config();

            match output {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, &config)
                        .with_context(|| format!("Failed to write {:?}", path))?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", config);
                }
            }
        }
    }

    Ok(())
}

/// Install the tracing subscriber, writing to stderr
fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("discourse_dataset={}", logging.level))
    });
    let registry = tracing_subscriber::registry().with(filter);

    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

/// Load the merged list, building it from source files when needed
fn open_dataset(dataset: &DatasetConfig, overwrite: bool) -> anyhow::Result<PostDataset> {
    let store = MergedStore::open(dataset.merged_path());

    if !overwrite && store.exists() {
        let posts = store
            .load()
            .with_context(|| format!("Failed to read merged list {:?}", store.path()))?;
        return Ok(PostDataset::from_records(posts));
    }

    let sources = DatasetSources::discover(&dataset.profiles_path(), &dataset.post_histories_path())
        .context("Failed to locate dataset sources")?;
    PostDataset::from_sources(&sources, &store, overwrite).context("Failed to build merged list")
}

fn print_values(field: &str, values: &BTreeSet<FieldValue>, format: &str) -> anyhow::Result<()> {
    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(values)?);
        }
        "csv" => {
            let mut writer = csv::Writer::from_writer(std::io::stdout().lock());
            writer.write_record([field])?;
            for value in values {
                writer.write_record([value.to_string()])?;
            }
            writer.flush()?;
        }
        _ => {
            if values.is_empty() {
                println!("No values for {}", field);
                return Ok(());
            }
            println!("{}", field);
            println!("{}", "-".repeat(field.len().max(12)));
            for value in values {
                println!("{}", value);
            }
            println!();
            println!("{} distinct value(s)", values.len());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_search_help_says_any_term_matches() {
        let cli = Cli::command();
        let query = cli.find_subcommand("query").unwrap();
        let search = query
            .get_arguments()
            .find(|arg| arg.get_id() == "search")
            .unwrap();

        let help = search.get_help().unwrap().to_string();
        assert!(help.contains("any may match"), "{}", help);
    }

    #[test]
    fn test_search_is_repeatable() {
        let cli = Cli::try_parse_from(["discourse-dataset", "query", "-s", "rust", "-s", "go"]).unwrap();
        match cli.command {
            Commands::Query { search, .. } => assert_eq!(search, vec!["rust", "go"]),
            _ => panic!("expected query command"),
        }
    }
}
