//! Elimination tournament CLI binary.
//!
//! # Commands
//!
//! - `run` - Run a season against live backends (or scripted ones with `--dry-run`)
//! - `levels` - Print the performance level table
//! - `init-config` - Print or write the default season configuration

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use elimination::{
    config::ProviderKind,
    levels::{PerformanceLevelTable, MAX_LEVEL, MIN_LEVEL},
    providers::{ChatClient, Generator, Judge},
    HttpGenerator, JsonFilePersister, LlmJudge, RoundOrchestrator, ScriptedGenerator,
    ScriptedJudge, SeasonConfig, SeasonDriver, SeasonReport, VERSION,
};

#[derive(Parser)]
#[command(name = "elimination")]
#[command(version = VERSION)]
#[command(about = "Elimination - multi-round LLM tournament with a token economy", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a season
    Run {
        /// Season config file (default: ~/.config/elimination/season.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the round budget
        #[arg(short, long)]
        rounds: Option<u32>,

        /// Seed for the traitor draw
        #[arg(long)]
        seed: Option<u64>,

        /// Directory for round records
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Use scripted participants and judge instead of live APIs
        #[arg(long)]
        dry_run: bool,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the performance level table
    Levels,

    /// Print the default configuration as TOML
    InitConfig {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            rounds,
            seed,
            output,
            dry_run,
            verbose,
        } => cmd_run(config, rounds, seed, output, dry_run, verbose),

        Commands::Levels => {
            cmd_levels();
            Ok(())
        },

        Commands::InitConfig { output } => cmd_init_config(output),
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<SeasonConfig> {
    let config = match path {
        Some(path) => SeasonConfig::from_file(path)?,
        None => match SeasonConfig::default_path().filter(|p| p.exists()) {
            Some(path) => {
                tracing::info!("Using config {}", path.display());
                SeasonConfig::from_file(path)?
            },
            None => SeasonConfig::default(),
        },
    };
    Ok(config.from_env_overrides())
}

fn cmd_run(
    config_path: Option<PathBuf>,
    rounds: Option<u32>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    dry_run: bool,
    verbose: bool,
) -> anyhow::Result<()> {
    // Initialize logging
    let log_level = if verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let mut config = load_config(config_path)?;
    if let Some(rounds) = rounds {
        config.season.max_rounds = rounds;
    }
    if let Some(seed) = seed {
        config.season.seed = Some(seed);
    }
    if let Some(dir) = output {
        config.season.output_dir = dir;
    }
    config.validate()?;

    let (generator, judge): (Arc<dyn Generator>, Arc<dyn Judge>) = if dry_run {
        tracing::info!("Dry run: scripted participants and judge");
        let names = config.participants.iter().map(|p| p.name.clone()).collect();
        (
            Arc::new(ScriptedGenerator::new(names)),
            Arc::new(ScriptedJudge::new()),
        )
    } else {
        let judge: Arc<dyn Judge> = if config.judge.provider == ProviderKind::Scripted {
            Arc::new(ScriptedJudge::new())
        } else {
            let chat = ChatClient::new(config.call_timeout())?;
            Arc::new(LlmJudge::new(chat, config.judge.clone()))
        };
        (Arc::new(HttpGenerator::from_config(&config)?), judge)
    };

    let stamp = chrono::Utc::now().format("%Y%m%d_%H%M%S").to_string();
    let output_dir = config.season.output_dir.join(stamp);
    tracing::info!("Writing round records to {}", output_dir.display());
    let persister = Arc::new(JsonFilePersister::new(&output_dir));

    let orchestrator = RoundOrchestrator::new(Arc::new(config), generator, judge, persister);
    let mut driver = SeasonDriver::new(orchestrator);

    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(driver.run())?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &SeasonReport) {
    println!();
    println!("Season {} - {} rounds", report.season_id, report.rounds_played);
    println!("{:-<72}", "");
    println!(
        "{:<5} {:<12} {:>8} {:>10} {:>6}  {}",
        "Rank", "Participant", "Score", "Balance", "Rep", "Status"
    );
    for entry in &report.ranking {
        let status = match entry.elimination_round {
            Some(round) => format!("eliminated (round {round})"),
            None => "alive".to_string(),
        };
        println!(
            "{:<5} {:<12} {:>8.3} {:>10} {:>6}  {}",
            entry.rank,
            entry.participant.as_str(),
            entry.score,
            entry.balance,
            entry.reputation,
            status
        );
    }
    println!("{:-<72}", "");
    match &report.traitor {
        Some(traitor) => println!("Traitor: {traitor}"),
        None => println!("Traitor: none"),
    }
    for event in report.alliance_log.events() {
        println!(
            "  round {:>2}: {:?} -> {} ({} votes)",
            event.round, event.kind, event.target, event.votes
        );
    }
    println!(
        "Generations: {} ({:.1}% failed, {} timeouts), judge fallbacks: {}",
        report.stats.generations,
        report.stats.failure_rate() * 100.0,
        report.stats.timeouts,
        report.stats.judge_fallbacks
    );
}

fn cmd_levels() {
    println!(
        "{:>5} {:>10} {:>6}  {:<40}  Cognitive load",
        "Level", "MaxTokens", "Temp", "Description"
    );
    for level in MIN_LEVEL..=MAX_LEVEL {
        let tier = PerformanceLevelTable::config_for(level);
        println!(
            "{:>+5} {:>10} {:>6.1}  {:<40}  {}",
            tier.level,
            tier.config.max_tokens,
            tier.config.temperature,
            tier.description,
            tier.cognitive_load.unwrap_or("-")
        );
    }
}

fn cmd_init_config(output: Option<PathBuf>) -> anyhow::Result<()> {
    let toml = SeasonConfig::default().to_toml()?;
    match output {
        Some(path) => {
            std::fs::write(&path, toml)?;
            eprintln!("Wrote {}", path.display());
        },
        None => print!("{toml}"),
    }
    Ok(())
}
