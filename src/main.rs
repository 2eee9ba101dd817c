//! CLI entry point for the exercise playground server.
//!
//! Provides commands for serving the playground API, scanning the task
//! catalogue, and resetting the overlay.

use clap::{
    Parser, Subcommand,
    builder::styling::{AnsiColor, Effects, Styles},
};
use praktika::workspace::TaskFileRef;
use praktika::{PathResolver, Settings, TaskCatalogScanner};

fn clap_cargo_style() -> Styles {
    Styles::styled()
        .header(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
        .literal(AnsiColor::Green.on_default())
        .placeholder(AnsiColor::Green.on_default())
}

#[derive(Parser)]
#[command(
    name = "praktika",
    version,
    about = "Exercise playground server with sandboxed live HTML previews",
    styles = clap_cargo_style()
)]
struct Cli {
    /// Path to a custom settings.toml file
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the playground HTTP server
    Serve {
        /// Bind address, e.g. 127.0.0.1:3000 (overrides settings)
        #[arg(long)]
        bind: Option<String>,
    },
    /// Scan the source tree and print the task catalogue as JSON
    Scan,
    /// Reset playground overlay entries back to their source content
    Reset {
        /// Reset a single file instead of the whole overlay
        #[arg(long)]
        file: Option<String>,
    },
    /// Display active settings
    Config,
}

fn load_settings(path: Option<&std::path::Path>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load_from(path),
        None => Settings::load(),
    }
    .map_err(|e| anyhow::anyhow!("failed to load settings: {e}"))?;
    Ok(settings)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "praktika=info,tower_http=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    let settings = load_settings(cli.config.as_deref())?;

    match cli.command {
        Commands::Serve { bind } => {
            praktika::server::serve(settings, bind).await?;
        }
        Commands::Scan => {
            let course_root = settings
                .workspace_root
                .clone()
                .unwrap_or_else(|| std::path::PathBuf::from("."));
            let translations = praktika::CourseConfigStore::new(&course_root)
                .get()
                .await
                .chapter_translations;
            let scanner = TaskCatalogScanner::new(&settings.catalog.task_markers);
            let catalog = scanner.scan(&settings.source_path(), &translations);
            println!("{}", serde_json::to_string_pretty(&catalog)?);
        }
        Commands::Reset { file } => {
            let resolver = PathResolver::new(&settings);
            match file {
                Some(file) => {
                    let file_ref = TaskFileRef::parse(&file)?;
                    resolver.playground().reset_one(&file_ref).await?;
                    println!("Reset {file_ref} from source");
                }
                None => {
                    resolver.playground().reset_all().await?;
                    println!("Playground reset");
                }
            }
        }
        Commands::Config => {
            println!("{}", toml::to_string_pretty(&settings)?);
        }
    }

    Ok(())
}
