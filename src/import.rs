use std::collections::BTreeMap;
use std::path::Path;

use crate::error::ImportError;
use crate::model::{PlaylistImport, PlaylistOutcome};
use crate::ports::spotify::SpotifyClient;
use crate::reliability::ReliableCaller;
use crate::services::ImportOptions;
use crate::services::playlist::PlaylistBuilder;
use crate::takeout::{self, IncompleteTracks};

/// Result of a complete import run.
#[derive(Debug, Default)]
pub struct ImportSummary {
    pub playlists: Vec<PlaylistImport>,
    pub incomplete: BTreeMap<String, IncompleteTracks>,
}

impl ImportSummary {
    pub fn missing_track_count(&self) -> usize {
        self.playlists
            .iter()
            .map(|p| p.tracks.iter().filter(|t| t.is_missing()).count())
            .sum()
    }

    /// Logs one confirmation line per playlist.
    pub fn log(&self) {
        if !self.incomplete.is_empty() {
            log::warn!(
                "{} playlists had tracks without enough details to search for",
                self.incomplete.len()
            );
        }
        for playlist in &self.playlists {
            match playlist.outcome() {
                PlaylistOutcome::Skipped => {
                    log::warn!("Playlist {}: skipped, no tracks", playlist.name)
                }
                PlaylistOutcome::Complete => log::info!(
                    "Playlist {}: imported all {} tracks",
                    playlist.name,
                    playlist.tracks.len()
                ),
                PlaylistOutcome::Partial { missing } => log::warn!(
                    "Playlist {}: imported {} of {} tracks, {} not found",
                    playlist.name,
                    playlist.found_count(),
                    playlist.tracks.len(),
                    missing.len()
                ),
            }
        }
    }
}

/// Drives a whole Takeout import: reads the playlists, then recreates them
/// one after the other.
pub struct Importer<C: SpotifyClient> {
    client: C,
    caller: ReliableCaller,
    options: ImportOptions,
}

impl<C: SpotifyClient> Importer<C> {
    pub fn new(client: C, caller: ReliableCaller, options: ImportOptions) -> Self {
        Self {
            client,
            caller,
            options,
        }
    }

    pub async fn run(&self, playlists_dir: &Path) -> Result<ImportSummary, ImportError> {
        log::info!(
            "STARTING EXECUTION. Google Takeout Playlists directory: {}",
            playlists_dir.display()
        );

        let library = takeout::read_library(playlists_dir)?;

        if !library.incomplete.is_empty() {
            log::warn!(
                "Some playlists contained incomplete track information: \n{}",
                library.incomplete_report()
            );
        }

        let builder = PlaylistBuilder::new(&self.client, &self.caller, &self.options);
        let mut summary = ImportSummary {
            playlists: Vec::with_capacity(library.playlists.len()),
            incomplete: library.incomplete,
        };

        for playlist in library.playlists {
            let import = builder.build(&playlist.name, playlist.tracks).await?;
            summary.playlists.push(import);
        }

        Ok(summary)
    }
}
