//! ATP Match Prediction CLI
//!
//! Imports player bios and weekly rankings, trains the win classifier and
//! predicts head-to-head matchups.

use clap::{Parser, Subcommand};
use tennis::{Config, Result};

#[derive(Parser)]
#[command(name = "tennis")]
#[command(about = "ATP match outcome prediction", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new project with default config
    Init,
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Show a weekly ranking snapshot
    Rankings {
        /// Snapshot date (YYYY-MM-DD), latest if omitted
        #[arg(long)]
        date: Option<String>,
        /// Number of rows to show
        #[arg(long, default_value = "50")]
        limit: usize,
    },
    /// List players available for prediction
    Players {
        /// Highest rank to include (defaults to config)
        #[arg(long)]
        max_rank: Option<u32>,
    },
    /// Predict a match between two players (id or name)
    Predict {
        player1: String,
        player2: String,
        /// Court surface: Hard, Clay, Grass, Carpet
        #[arg(long, default_value = "Hard")]
        surface: String,
        /// Tournament level code: A, D, F, G, M, O
        #[arg(long, default_value = "A")]
        level: String,
        /// Round, 1 (first) to 6 (final)
        #[arg(long, default_value = "1")]
        round: i64,
        /// Best of 3 or 5 sets
        #[arg(long, default_value = "3")]
        best_of: i64,
        #[arg(long)]
        draw_size: Option<i64>,
        #[arg(long)]
        seed1: Option<i64>,
        #[arg(long)]
        seed2: Option<i64>,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Model management commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// Train the win classifier from a CSV of historical matches
    Train {
        /// Match CSV with feature columns and a label column
        data: String,
        /// Override number of epochs
        #[arg(long)]
        epochs: Option<usize>,
        /// Override learning rate
        #[arg(long)]
        lr: Option<f64>,
    },
}

#[derive(Subcommand)]
enum DataCommands {
    /// Import players and rankings from JSON
    Import {
        /// Players JSON file
        #[arg(long)]
        players: Option<String>,
        /// Folder of YYYY-MM-DD.json ranking files (all snapshots)
        #[arg(long)]
        rankings: Option<String>,
        /// Folder of ranking files (newest snapshot only)
        #[arg(long)]
        latest: Option<String>,
        /// Delete existing data before importing
        #[arg(long)]
        clear: bool,
    },
    /// Scrape the current ATP ranking and import it
    Scrape {
        /// Cache directory for HTML files
        #[arg(long)]
        cache: Option<String>,
        /// Use only cached files (no network requests)
        #[arg(long)]
        offline: bool,
        /// Also scrape every ranked player's profile into the players file
        #[arg(long)]
        players: bool,
    },
    /// Show database status
    Status,
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show model information
    Info,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    let result = match cli.command {
        Commands::Init => commands::init(&cli.config),
        Commands::Data { action } => match action {
            DataCommands::Import {
                players,
                rankings,
                latest,
                clear,
            } => commands::data_import(&config, players, rankings, latest, clear),
            DataCommands::Scrape {
                    cache,
                    offline,
                    players,
                } => commands::data_scrape(&config, cache, offline, players),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Rankings { date, limit } => commands::rankings(&config, date, limit),
        Commands::Players { max_rank } => commands::players(&config, max_rank),
        Commands::Predict {
            player1,
            player2,
            surface,
            level,
            round,
            best_of,
            draw_size,
            seed1,
            seed2,
            format,
        } => commands::predict(
            &config,
            &player1,
            &player2,
            commands::MatchOptions {
                surface,
                level,
                round,
                best_of,
                draw_size,
                seed1,
                seed2,
            },
            format,
        ),
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
        },
        Commands::Train { data, epochs, lr } => commands::train(&config, &data, epochs, lr),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use std::sync::Arc;

    use chrono::NaiveDate;
    use tennis::data::scrapers::profile::save_profiles;
    use tennis::data::scrapers::{AtpProfileScraper, AtpRankingsScraper, RankingScraper};
    use tennis::data::{import, Database};
    use tennis::features::FeatureSchema;
    use tennis::model::{artifact, InferenceBackend, MlpClassifier, ModelMetadata};
    use tennis::predict::{format_prediction, PredictionRequest, PredictionService, Predictor};
    use tennis::training::{MatchDataset, Trainer};
    use tennis::TennisError;

    pub struct MatchOptions {
        pub surface: String,
        pub level: String,
        pub round: i64,
        pub best_of: i64,
        pub draw_size: Option<i64>,
        pub seed1: Option<i64>,
        pub seed2: Option<i64>,
    }

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("model")?;
        std::fs::create_dir_all(&config.data.rankings_dir)?;
        println!("Created data/ and model/ directories");

        let schema_path = std::path::Path::new(&config.data.schema_path);
        if !schema_path.exists() {
            FeatureSchema::standard().save(schema_path)?;
            println!("Wrote default feature columns to {}", schema_path.display());
        }

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'tennis data import --players players.json --rankings data/rankings/ATP'");
        println!("  3. Run 'tennis train matches.csv' to train the model");
        println!("  4. Run 'tennis predict \"Player A\" \"Player B\"' to make predictions");

        Ok(())
    }

    pub fn data_import(
        config: &Config,
        players: Option<String>,
        rankings: Option<String>,
        latest: Option<String>,
        clear: bool,
    ) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;

        if clear {
            println!("Clearing old data...");
            db.clear()?;
        }

        if let Some(path) = players {
            println!("Importing players from {}...", path);
            let count = import::import_players(&db, &path)?;
            println!("Imported {} players", count);
        }

        if let Some(dir) = rankings {
            println!("Importing rankings from {}...", dir);
            let summary = import::import_rankings(&db, &dir)?;
            println!(
                "Imported {} rankings from {} files",
                summary.rankings, summary.files
            );
        }

        if let Some(dir) = latest {
            println!("Importing latest ranking from {}...", dir);
            let summary = import::import_latest_ranking(&db, &dir)?;
            println!("Imported {} rankings", summary.rankings);
        }

        Ok(())
    }

    pub fn data_scrape(
        config: &Config,
        cache: Option<String>,
        offline: bool,
        players: bool,
    ) -> Result<()> {
        let mut scraper = AtpRankingsScraper::from_config(&config.scraper)?;
        let mut profiles = AtpProfileScraper::from_config(&config.scraper)?;

        if let Some(cache_dir) = &cache {
            println!("Using cache directory: {}", cache_dir);
            scraper = scraper.with_cache(cache_dir);
            profiles = profiles.with_cache(cache_dir);
        }

        if offline {
            println!("Offline mode: using cached files only");
            scraper = scraper.offline_only(true);
            profiles = profiles.offline_only(true);
        }

        let db = Database::open(&config.data.database_path)?;

        if players {
            let links = scraper.fetch_player_links()?;
            let scraped = profiles.scrape_all(&links);
            let failed = scraped.iter().filter(|p| p.error.is_some()).count();
            save_profiles(&config.data.players_path, &scraped)?;
            println!(
                "Scraped {} profiles ({} failed) into {}",
                scraped.len(),
                failed,
                config.data.players_path
            );
            let count = import::import_players(&db, &config.data.players_path)?;
            println!("Imported {} players", count);
        }

        let snapshot = scraper.fetch_latest()?;
        let path = snapshot.save(&config.data.rankings_dir)?;
        println!(
            "Scraped {} players into {}",
            snapshot.rows.len(),
            path.display()
        );

        let summary = import::import_latest_ranking(&db, &config.data.rankings_dir)?;
        println!("Imported {} rankings", summary.rankings);

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let stats = db.get_stats()?;

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:      {}", config.data.database_path);
        println!("  Players:   {}", stats.player_count);
        println!("  Stats:     {}", stats.stats_count);
        println!("  Rankings:  {} ({} weeks)", stats.ranking_count, stats.snapshot_count);
        if let (Some(earliest), Some(latest)) = (stats.earliest_ranking, stats.latest_ranking) {
            println!("  Range:     {} to {}", earliest, latest);
        }

        Ok(())
    }

    pub fn rankings(config: &Config, date: Option<String>, limit: usize) -> Result<()> {
        let date = date
            .map(|d| {
                NaiveDate::parse_from_str(&d, "%Y-%m-%d")
                    .map_err(|_| TennisError::InvalidInput(format!("invalid date: {}", d)))
            })
            .transpose()?;

        let db = Database::open(&config.data.database_path)?;
        let rows = db.rankings_on(date, Some(limit))?;
        let Some((_, first)) = rows.first() else {
            println!("No rankings found. Run 'tennis data import' first.");
            return Ok(());
        };

        println!("ATP Rankings, week of {}", first.date);
        println!("{:>5}  {:<30} {:>7}  {:>6}  {}", "Rank", "Player", "Points", "Move", "Country");
        println!("{}", "─".repeat(64));
        for (player, ranking) in &rows {
            let entry = &ranking.entry;
            println!(
                "{:>5}  {:<30} {:>7}  {:>6}  {}",
                entry.rank.map(|r| r.to_string()).unwrap_or_else(|| "-".to_string()),
                player.name(),
                entry.points.map(|p| p.to_string()).unwrap_or_else(|| "-".to_string()),
                entry.rank_change.as_deref().unwrap_or("-"),
                entry.country.as_deref().unwrap_or("-"),
            );
        }

        Ok(())
    }

    pub fn players(config: &Config, max_rank: Option<u32>) -> Result<()> {
        let max_rank = max_rank.unwrap_or(config.predict.max_listed_rank);
        let db = Database::open(&config.data.database_path)?;
        let players = db.ranked_players(max_rank)?;

        println!("{} players ranked {} or better", players.len(), max_rank);
        for ranked in &players {
            println!(
                "  {:<6} {:<30} #{}",
                ranked.player.id,
                ranked.player.name(),
                ranked.rank
            );
        }

        Ok(())
    }

    pub fn predict(
        config: &Config,
        player1: &str,
        player2: &str,
        options: MatchOptions,
        format: OutputFormat,
    ) -> Result<()> {
        let db = Database::open(&config.data.database_path)?;
        let p1 = db.resolve_player(player1)?;
        let p2 = db.resolve_player(player2)?;

        let schema = Arc::new(FeatureSchema::load(&config.data.schema_path)?);
        let classifier = MlpClassifier::<InferenceBackend>::load(
            &config.data.model_path,
            &schema,
            Default::default(),
        )?;
        let predictor = Predictor::new(schema, Arc::new(classifier))?;
        let service = PredictionService::new(db, predictor);

        let request = PredictionRequest {
            player1_id: p1.id,
            player2_id: p2.id,
            tourney_level: options.level,
            surface: options.surface,
            round: options.round,
            best_of: options.best_of,
            draw_size: options.draw_size,
            player1_seed: options.seed1,
            player2_seed: options.seed2,
        };
        let prediction = service.predict(&request)?;

        match format {
            OutputFormat::Table => {
                let result = tennis::PredictionResult::from_p1(prediction.p1_win_probability);
                print!(
                    "{}",
                    format_prediction(&result, &prediction.p1_name, &prediction.p2_name)
                );
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            }
        }

        Ok(())
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let weights = artifact::weights_path(&config.data.model_path);
        if !weights.exists() {
            return Err(TennisError::ModelUnavailable(format!(
                "no model at {}. Run 'tennis train' first.",
                weights.display()
            )));
        }
        let metadata = ModelMetadata::load(artifact::metadata_path(&config.data.model_path))?;

        println!("Model Information");
        println!("───────────────────────────────");
        println!("  Path:           {}", weights.display());
        println!("  Features:       {}", metadata.columns.len());
        println!("  Hidden layers:  {:?}", metadata.hidden_dims);
        println!("  Dropout:        {}", metadata.dropout);
        println!("  Trained:        {}", metadata.trained_at.format("%Y-%m-%d %H:%M"));
        println!("  Epochs:         {}", metadata.epochs);
        println!("  Train samples:  {}", metadata.train_samples);
        if let Some(acc) = metadata.val_accuracy {
            println!("  Val accuracy:   {:.1}%", acc * 100.0);
        }

        match FeatureSchema::load(&config.data.schema_path) {
            Ok(schema) => match metadata.check_schema(&schema) {
                Ok(()) => println!("  Schema:         matches {}", config.data.schema_path),
                Err(e) => println!("  Schema:         {}", e),
            },
            Err(e) => println!("  Schema:         {}", e),
        }

        Ok(())
    }

    pub fn train(config: &Config, data: &str, epochs: Option<usize>, lr: Option<f64>) -> Result<()> {
        use burn::backend::Autodiff;

        type MyAutodiffBackend = Autodiff<InferenceBackend>;

        let mut training = config.training.clone();
        if let Some(e) = epochs {
            training.epochs = e;
        }
        if let Some(lr) = lr {
            training.learning_rate = lr;
        }

        println!("Initializing training...");
        let schema = Arc::new(FeatureSchema::load(&config.data.schema_path)?);
        let dataset = MatchDataset::from_csv(data, schema, &training.label_column)?;
        println!(
            "Loaded {} matches ({} reoriented to favourite-first)",
            dataset.len(),
            dataset.swapped()
        );

        let trainer =
            Trainer::<MyAutodiffBackend>::new(training, config.model.clone(), Default::default());
        let trained = trainer.fit(&dataset)?;

        let classifier = MlpClassifier::<InferenceBackend>::new(
            trained.model,
            trained.metadata.normalization.clone(),
            Default::default(),
        )?;
        classifier.save(&config.data.model_path, &trained.metadata)?;

        println!("\nTraining complete!");
        println!("  Epochs run:     {}", trained.history.epochs());
        if let Some(best) = trained.history.best_val() {
            println!("  Best epoch:     {}", trained.history.best_epoch + 1);
            println!("  Val:            {}", best);
        }
        println!("Model saved to {}", config.data.model_path);

        Ok(())
    }
}
