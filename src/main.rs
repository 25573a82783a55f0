mod config;
mod error;
mod import;
mod logging;
mod model;
mod normalize;
mod ports;
mod reliability;
mod services;
mod spotify_rs;
mod takeout;
#[cfg(test)]
mod test_utils;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::{
    Result,
    eyre::{Context, eyre},
};

use crate::{
    config::Config,
    import::Importer,
    logging::{default_log_file, setup_logging},
    reliability::ReliableCaller,
    spotify_rs::client::SpotifyWebClient,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The config file to use
    #[arg(short, long, env = "TAKEOUT_TO_SPOTIFY_CONFIG")]
    config: Option<PathBuf>,

    /// Console log level
    #[arg(long, default_value = "debug", global = true, env = "LOG_LEVEL")]
    log_level: log::LevelFilter,

    /// File log level
    #[arg(long, default_value = "info", global = true)]
    log_file_level: log::LevelFilter,

    /// Path to log file (default: <today>.log)
    #[arg(long, env = "TAKEOUT_TO_SPOTIFY_LOG_FILE", global = true)]
    log_file: Option<PathBuf>,

    /// Only log to the console
    #[arg(long, global = true)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Commands,
}

fn is_directory(s: &str) -> Result<PathBuf, String> {
    let p: PathBuf = s.into();
    if p.is_dir() {
        Ok(p)
    } else {
        Err(format!("`{}` is not an existing directory", s))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Recreate the playlists of a Google Takeout export on Spotify
    Import {
        /// The Takeout `Playlists` directory
        #[arg(short, long, value_parser = is_directory, env = "TAKEOUT_PLAYLISTS_DIR")]
        input: Option<PathBuf>,

        /// Spotify user that will own the playlists
        #[arg(short, long, env = "SPOTIFY_USER_ID")]
        user_id: Option<String>,

        /// Spotify OAuth token with playlist modification scope
        #[arg(short = 't', long, env = "SPOTIFY_ACCESS_TOKEN", hide_env_values = true)]
        access_token: Option<String>,

        /// Only search with the exact Takeout details
        #[arg(long)]
        no_simplify: bool,

        /// Create public playlists
        #[arg(long)]
        public: bool,
    },
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Create a default config file, if it doesn't exist
    CreateDefault,
    /// Print the path to the config file
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let log_file = if args.no_log_file {
        None
    } else {
        Some(args.log_file.clone().unwrap_or_else(default_log_file))
    };
    setup_logging(args.log_level, log_file.as_deref(), args.log_file_level)?;

    log::debug!("Loading configuration");
    let config = {
        if let Some(config) = &args.config {
            Config::from_file(config)
        } else {
            Config::load()
        }
    }
    .with_context(|| "Failed to load takeout-to-spotify config")?;

    match args.command {
        Commands::Import {
            input,
            user_id,
            access_token,
            no_simplify,
            public,
        } => {
            let playlists_dir = input
                .or_else(|| config.takeout_directory())
                .ok_or(eyre!(
                    "No Takeout directory given, pass --input or set takeout_directory"
                ))?;
            let user_id = user_id
                .or_else(|| config.spotify.user_id.clone())
                .ok_or(eyre!("No Spotify user given, pass --user-id or set spotify.user_id"))?;
            let access_token = access_token
                .or_else(|| config.spotify.access_token.clone())
                .ok_or(eyre!(
                    "No Spotify access token given, pass --access-token or set spotify.access_token"
                ))?;

            let mut options = config.import_options();
            if no_simplify {
                options.simplify_search = false;
            }
            if public {
                options.public_playlists = true;
            }

            let client = SpotifyWebClient::new(
                &config.spotify.api_base_url,
                user_id,
                access_token,
                config.request_timeout()?,
            )?;
            let caller = ReliableCaller::new(config.retry_policy()?);
            log::debug!(
                "Remote calls: {} attempts, {} apart",
                caller.policy().max_attempts,
                humantime::format_duration(caller.policy().delay)
            );
            let importer = Importer::new(client, caller, options);

            let summary = match importer.run(&playlists_dir).await {
                Ok(summary) => summary,
                Err(error) => {
                    log::error!("Import aborted: {}", error);
                    return Err(error.into());
                }
            };

            summary.log();
            log::info!(
                "Import completed: {} playlists, {} tracks not found",
                summary.playlists.len(),
                summary.missing_track_count()
            );
        }
        Commands::Config(ConfigCommands::CreateDefault) => {
            let path = Config::create_default()?;
            println!("Config file: {}", path.display());
        }
        Commands::Config(ConfigCommands::Path) => {
            let path = Config::config_path().ok_or(eyre!("No config directory found"))?;
            println!("{}", path.display());
        }
    }

    Ok(())
}
