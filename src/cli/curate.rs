use std::{path::PathBuf, time::Duration};

use dialoguer::{Input, Select};
use indicatif::{ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    Res,
    config::{CurationSettings, Settings},
    curation::{
        Candidate, CurationError, CurationRequest, Curator, FillLoop, FillReport, FillState,
        PastedCurator, PlaylistTarget, PlaylistWriter, fetch_all_entries, parse_candidates,
    },
    error,
    gemini::GeminiClient,
    info,
    spotify::SpotifyClient,
    success,
    types::ResolvedTrackRow,
    utils, warning,
};

const TARGET_CHOICES: [&str; 2] = ["Create a new playlist", "Add them to this playlist"];

/// Flags of the `curate` command. With a query the session runs once,
/// otherwise it prompts until the user types `exit`.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub query: Option<String>,
    pub energy: Option<String>,
    pub extend: Option<String>,
    pub reference: Option<String>,
    pub candidates: Option<PathBuf>,
}

/// Where the tracks of one session come from and where they go.
#[derive(Debug, Clone)]
pub enum Source {
    /// Gemini proposals, written to a new playlist.
    Fresh,
    /// Gemini proposals seeded by a sample of an existing playlist.
    Reference { playlist_id: String, extend: bool },
    /// A user-supplied candidate list, resolved once.
    Pasted(Vec<Candidate>),
}

#[derive(Debug, Clone)]
pub struct SessionInput {
    pub query: String,
    pub energy: String,
    pub source: Source,
}

/// Outcome of one round of interactive prompts.
#[derive(Debug)]
pub enum Prompted {
    Session(SessionInput),
    /// The answers could not be used; the user is asked again.
    Invalid(String),
    /// The user typed `exit`.
    Quit,
}

pub async fn curate(settings: &Settings, options: SessionOptions) {
    let spotify = match SpotifyClient::connect(settings).await {
        Ok(client) => client,
        Err(e) => error!("Spotify authentication failed: {}\nRun playlist-curator auth.", e),
    };
    let gemini = GeminiClient::new(settings.gemini.clone());

    if options.query.is_some() {
        match session_from_options(options).await {
            Ok(input) => {
                if let Err(e) = run_session(settings, &spotify, &gemini, input).await {
                    warning!("Session failed: {}", e);
                }
            }
            Err(e) => warning!("{}", e),
        }
        return;
    }

    session_loop(prompt_session, async |input| {
        if let Err(e) = run_session(settings, &spotify, &gemini, input).await {
            warning!("Session failed: {}", e);
        }
    })
    .await;
}

/// Prompts for sessions and runs them until the user quits.
///
/// Invalid answers prompt again. A prompt that fails (closed stdin, no
/// terminal) ends the loop.
pub async fn session_loop<P, R>(mut prompt: P, mut run: R)
where
    P: FnMut() -> Result<Prompted, dialoguer::Error>,
    R: AsyncFnMut(SessionInput),
{
    loop {
        match prompt() {
            Ok(Prompted::Session(input)) => run(input).await,
            Ok(Prompted::Invalid(reason)) => warning!("{}", reason),
            Ok(Prompted::Quit) => break,
            Err(e) => {
                warning!("Input closed, leaving: {}", e);
                break;
            }
        }
    }
}

async fn session_from_options(options: SessionOptions) -> Res<SessionInput> {
    let query = options.query.unwrap_or_default();

    let source = if let Some(path) = options.candidates {
        let content = async_fs::read_to_string(&path)
            .await
            .map_err(|e| format!("Cannot read {}: {}", path.display(), e))?;
        Source::Pasted(parse_candidates(&content)?)
    } else if let Some(link) = options.extend {
        let playlist_id = utils::parse_playlist_id(&link)
            .ok_or_else(|| format!("Not a Spotify playlist: {}", link))?;
        Source::Reference {
            playlist_id,
            extend: true,
        }
    } else if let Some(link) = options.reference {
        let playlist_id = utils::parse_playlist_id(&link)
            .ok_or_else(|| format!("Not a Spotify playlist: {}", link))?;
        Source::Reference {
            playlist_id,
            extend: false,
        }
    } else {
        Source::Fresh
    };

    Ok(SessionInput {
        query,
        energy: normalize_energy(options.energy.as_deref().unwrap_or_default()),
        source,
    })
}

fn prompt_session() -> Result<Prompted, dialoguer::Error> {
    let query: String = Input::new()
        .with_prompt(
            "\nQuery (e.g. 'Minimal Techno', 'Sanremo 2002', an artist or an album; \
             'exit' to quit)",
        )
        .interact_text()?;
    if query.trim().eq_ignore_ascii_case("exit") {
        return Ok(Prompted::Quit);
    }

    let energy: String = Input::new()
        .with_prompt("Energy (high/low, enter to skip)")
        .allow_empty(true)
        .interact_text()?;

    let source_input: String = Input::new()
        .with_prompt("Reference playlist URL or JSON track list (enter to skip)")
        .allow_empty(true)
        .interact_text()?;

    let source = match parse_source(&source_input) {
        Ok(SourceInput::Fresh) => Source::Fresh,
        Ok(SourceInput::Pasted(candidates)) => Source::Pasted(candidates),
        Ok(SourceInput::Playlist(playlist_id)) => {
            let choice = Select::new()
                .with_prompt("What should happen with the new tracks?")
                .items(&TARGET_CHOICES[..])
                .default(0)
                .interact()?;
            Source::Reference {
                playlist_id,
                extend: choice == 1,
            }
        }
        Err(e) => return Ok(Prompted::Invalid(format!("Cannot read the track list: {}", e))),
    };

    Ok(Prompted::Session(SessionInput {
        query,
        energy: normalize_energy(&energy),
        source,
    }))
}

/// What the reference prompt answer points at.
#[derive(Debug, PartialEq)]
pub enum SourceInput {
    Fresh,
    Pasted(Vec<Candidate>),
    Playlist(String),
}

/// Reads the reference prompt answer: blank, a pasted JSON track list or a
/// playlist reference. Anything else falls back to a fresh playlist.
pub fn parse_source(input: &str) -> Result<SourceInput, CurationError> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(SourceInput::Fresh);
    }

    if input.starts_with('[') || input.starts_with('{') || input.starts_with("```") {
        return parse_candidates(input).map(SourceInput::Pasted);
    }

    match utils::parse_playlist_id(input) {
        Some(playlist_id) => Ok(SourceInput::Playlist(playlist_id)),
        None => {
            warning!("Not a Spotify playlist, continuing without reference: {}", input);
            Ok(SourceInput::Fresh)
        }
    }
}

/// Blank energy means no constraint.
pub fn normalize_energy(energy: &str) -> String {
    match energy.trim() {
        "" => "neutral".to_string(),
        energy => energy.to_lowercase(),
    }
}

async fn run_session(
    settings: &Settings,
    spotify: &SpotifyClient,
    gemini: &GeminiClient,
    input: SessionInput,
) -> Res<()> {
    let mut curation = settings.curation.clone();
    let mut request = CurationRequest {
        query: input.query.clone(),
        energy: input.energy.clone(),
        reference: Vec::new(),
        proposal_size: curation.proposal_size,
        max_per_artist: curation.max_per_artist,
    };

    let report = match &input.source {
        Source::Pasted(candidates) => {
            curation.max_retries = 1;
            curation.target_tracks = curation.target_tracks.max(candidates.len());
            let curator = PastedCurator::new(candidates.clone());
            fill(&curator, spotify, &curation, &request).await
        }
        Source::Reference { playlist_id, .. } => {
            let entries = with_spinner(
                "Reading reference playlist...",
                fetch_all_entries(spotify, playlist_id),
            )
            .await?;
            let labels: Vec<String> = entries.iter().map(|entry| entry.label()).collect();
            request.reference = utils::sample_labels(&labels, curation.reference_sample);
            info!(
                "Using {} of {} reference tracks",
                request.reference.len(),
                labels.len()
            );
            fill(gemini, spotify, &curation, &request).await
        }
        Source::Fresh => fill(gemini, spotify, &curation, &request).await,
    };

    print_summary(&report, curation.target_tracks);

    let target = match input.source {
        Source::Reference {
            playlist_id,
            extend: true,
        } => PlaylistTarget::Existing(playlist_id),
        _ => PlaylistTarget::New {
            name: utils::playlist_name(&input.query),
            description: format!("Curated by AI from: {}", input.query.trim()),
        },
    };

    let written = PlaylistWriter::new(spotify)
        .write(&report.uris(), target)
        .await?;

    if written.added > 0 {
        success!(
            "Added {} tracks ({} already present, {} duplicates dropped)",
            written.added,
            written.skipped_remote,
            written.skipped_local
        );
    }
    if let Some(url) = written.url {
        success!("Playlist: {}", url);
    }
    Ok(())
}

async fn fill<C: Curator>(
    curator: &C,
    spotify: &SpotifyClient,
    settings: &CurationSettings,
    request: &CurationRequest,
) -> FillReport {
    FillLoop::new(curator, spotify, settings).run(request).await
}

fn print_summary(report: &FillReport, target: usize) {
    if !report.tracks.is_empty() {
        let rows: Vec<ResolvedTrackRow> = report
            .tracks
            .iter()
            .map(|track| ResolvedTrackRow {
                artist: track.artist.clone(),
                title: track.title.clone(),
                uri: track.uri.clone(),
            })
            .collect();
        println!("{}", Table::new(rows));
    }

    let stats = &report.stats;
    match report.state {
        FillState::Done => success!(
            "{} verified tracks after {} rounds",
            report.tracks.len(),
            report.attempts
        ),
        _ => warning!(
            "{}/{} verified tracks after {} rounds",
            report.tracks.len(),
            target,
            report.attempts
        ),
    }
    info!(
        "{} proposed, {} rejected by guardrail, {} not found, {} incomplete, {} repeats, \
         {} failed rounds",
        stats.proposed,
        stats.rejected,
        stats.not_found,
        stats.skipped,
        stats.duplicates,
        stats.failed_rounds
    );
}

async fn with_spinner<F, T>(message: &str, future: F) -> T
where
    F: std::future::Future<Output = T>,
{
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }

    let output = future.await;
    pb.finish_and_clear();
    output
}
