use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use monogatari::{
    Config,
    content::{ContentCache, ContentManager},
    frontmatter,
    markdown::{MarkdownRenderer, RenderOptions, split_segments},
    startup_checks,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Build the collection and emit its JSON index (default if no
    /// command specified)
    Build {
        /// File to write the index to; stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate every document without building anything
    Check,

    /// Render a single markdown file to HTML on stdout
    Render {
        /// Path to the markdown file
        file: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Set up logging first
    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Some(Commands::Check) => run_check(cli.config).await,
        Some(Commands::Render { file }) => run_render(file).await,
        Some(Commands::Build { output }) => run_build(cli.config, output).await,
        None => run_build(cli.config, None).await,
    }
}

fn load_config(config_path: &PathBuf) -> Result<Config, Box<dyn std::error::Error>> {
    if config_path.exists() {
        let config_content = std::fs::read_to_string(config_path)?;
        Ok(toml_edit::de::from_str::<Config>(&config_content)?)
    } else {
        info!("Config file not found at {:?}, using defaults", config_path);
        Ok(Config::default())
    }
}

async fn run_build(
    config_path: PathBuf,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;

    info!("Starting {} build", config.app.name);
    info!(
        "Content source directory: {:?}",
        config.content.source_directory
    );

    match startup_checks::perform_startup_checks(&config).await {
        Ok(()) => info!("All startup checks passed"),
        Err(errors) => {
            for error in &errors {
                tracing::error!("Startup check failed: {}", error);
            }
            if errors.iter().any(|e| e.is_critical()) {
                tracing::error!("Critical startup check failed, exiting");
                return Err("Critical startup check failed".into());
            }
            tracing::warn!("Non-critical startup checks failed, continuing");
        }
    }

    let manager = Arc::new(ContentManager::new(config.content.clone()));
    manager.refresh().await?;
    write_index(&manager, output.as_deref()).await?;

    // With a refresh interval and an output file this becomes a watch
    // loop: refresh in the background, rewrite the index on each tick.
    if let Some(interval_minutes) = config.content.refresh_interval_minutes
        && interval_minutes > 0
        && let Some(path) = output.as_deref()
    {
        info!(
            "Watching for changes, refreshing every {} minutes",
            interval_minutes
        );
        ContentManager::start_background_refresh(Arc::clone(&manager), interval_minutes);

        let mut interval = tokio::time::interval(std::time::Duration::from_secs(
            interval_minutes * 60,
        ));
        interval.tick().await; // Skip the first immediate tick
        loop {
            interval.tick().await;
            write_index(&manager, Some(path)).await?;
        }
    }

    Ok(())
}

async fn write_index(
    manager: &ContentManager,
    output: Option<&std::path::Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let posts = manager.all_posts().await;
    let index = serde_json::to_string_pretty(&posts)?;

    match output {
        Some(path) => {
            std::fs::write(path, index)?;
            info!("Wrote index of {} documents to {:?}", posts.len(), path);
        }
        None => println!("{index}"),
    }

    Ok(())
}

async fn run_check(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(&config_path)?;

    if let Err(errors) = startup_checks::perform_startup_checks(&config).await {
        for error in &errors {
            eprintln!("startup check failed: {error}");
        }
        if errors.iter().any(|e| e.is_critical()) {
            std::process::exit(1);
        }
    }

    let manager = ContentManager::new(config.content.clone());
    let issues = manager.validate();

    if issues.is_empty() {
        println!("No issues found");
        return Ok(());
    }

    for issue in &issues {
        eprintln!("{}: {}", issue.path.display(), issue.message);
    }
    eprintln!("{} issue(s) found", issues.len());
    std::process::exit(1);
}

async fn run_render(file: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let raw = tokio::fs::read_to_string(&file).await?;
    let document = frontmatter::parse(&raw)?;
    let metadata = frontmatter::fold_metadata(std::iter::empty(), &document.metadata);

    let cache = Arc::new(ContentCache::new(std::time::Duration::from_secs(60)));
    let renderer = MarkdownRenderer::new(RenderOptions::default(), cache);

    match metadata.render_mode {
        frontmatter::RenderMode::Normal => {
            println!("{}", renderer.render(document.body, Some(&file)));
        }
        frontmatter::RenderMode::Chat => {
            for segment in split_segments(document.body) {
                println!("{}", renderer.render(&segment.raw_markdown, Some(&file)));
            }
        }
    }

    Ok(())
}
