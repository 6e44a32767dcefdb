use std::path::PathBuf;

use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use playlist_curator::{cli, config, error, warning};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  author=env!("CARGO_PKG_AUTHORS"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with Spotify API
    Auth,

    /// Build playlists from Gemini proposals (interactive without --query)
    Curate(CurateOptions),

    /// List Gemini models available to the API key
    Models,

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct CurateOptions {
    /// Genre, mood, artist, track or album to curate from; runs once
    #[clap(long, short)]
    pub query: Option<String>,

    /// Energy profile passed to the model (e.g. high, low)
    #[clap(long, requires = "query")]
    pub energy: Option<String>,

    /// Existing playlist (URL, URI or id) to expand and add the tracks to
    #[clap(long, requires = "query", conflicts_with_all = ["reference", "candidates"])]
    pub extend: Option<String>,

    /// Existing playlist used as reference for a new playlist
    #[clap(long, requires = "query", conflicts_with = "candidates")]
    pub reference: Option<String>,

    /// JSON file with [{"artist": ..., "track": ...}] to resolve instead of asking Gemini
    #[clap(long, requires = "query")]
    pub candidates: Option<PathBuf>,

    /// Number of verified tracks to collect
    #[clap(long)]
    pub target: Option<usize>,

    /// Maximum number of Gemini rounds
    #[clap(long)]
    pub retries: Option<u32>,

    /// Market used for catalog searches (ISO country code)
    #[clap(long)]
    pub market: Option<String>,

    /// Gemini model id
    #[clap(long)]
    pub model: Option<String>,

    /// Accept the first search hit without the similarity check
    #[clap(long)]
    pub no_guardrail: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment file. Err: {}", e);
    }

    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    let mut settings = match config::Settings::from_env() {
        Ok(settings) => settings,
        Err(e) => error!("Cannot start. {}", e),
    };

    match cli.command {
        Command::Auth => cli::auth(&settings).await,
        Command::Curate(opt) => {
            if let Some(target) = opt.target.filter(|t| *t > 0) {
                settings.curation.target_tracks = target;
            }
            if let Some(retries) = opt.retries.filter(|r| *r > 0) {
                settings.curation.max_retries = retries;
            }
            if let Some(market) = opt.market {
                settings.market = market.to_uppercase();
            }
            if let Some(model) = opt.model {
                settings.gemini.model = model;
            }
            settings.curation.guardrail = !opt.no_guardrail;

            let options = cli::SessionOptions {
                query: opt.query,
                energy: opt.energy,
                extend: opt.extend,
                reference: opt.reference,
                candidates: opt.candidates,
            };
            cli::curate(&settings, options).await
        }
        Command::Models => cli::models(&settings).await,
        Command::Completions(_) => {}
    }
}
