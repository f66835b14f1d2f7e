use anyhow::Context;
use bookshelf_app::App;
use bookshelf_kernel::settings::Settings;
use clap::{Parser, Subcommand};

/// Book, author and genre catalog.
#[derive(Debug, Parser)]
#[command(name = "bookshelf", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve the REST API
    Serve,
    /// Apply pending migrations and exit
    Migrate,
    /// Print the resolved configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;

    match cli.command {
        Command::Config => {
            println!("{settings:#?}");
            Ok(())
        }
        Command::Migrate => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            let app = App::new(settings)?;
            app.prepare().await?;
            tracing::info!("database is up to date");
            Ok(())
        }
        Command::Serve => {
            bookshelf_telemetry::init(&settings.telemetry)?;
            tracing::info!(env = ?settings.environment, "starting bookshelf server");
            App::new(settings)?.serve().await
        }
    }
}
