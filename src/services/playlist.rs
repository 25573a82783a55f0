use crate::error::ImportError;
use crate::model::{PlaylistImport, PlaylistOutcome, ResolvedTrack, TrackRecord};
use crate::ports::spotify::SpotifyClient;
use crate::reliability::ReliableCaller;
use crate::services::ImportOptions;
use crate::services::resolver::TrackResolver;

/// Recreates one Takeout playlist on Spotify.
pub struct PlaylistBuilder<'a, C: SpotifyClient> {
    client: &'a C,
    caller: &'a ReliableCaller,
    resolver: TrackResolver<'a, C>,
    public: bool,
}

impl<'a, C: SpotifyClient> PlaylistBuilder<'a, C> {
    pub fn new(client: &'a C, caller: &'a ReliableCaller, options: &ImportOptions) -> Self {
        Self {
            client,
            caller,
            resolver: TrackResolver::new(client, caller, options.simplify_search),
            public: options.public_playlists,
        }
    }

    /// Creates the playlist, then resolves and appends the tracks in order.
    ///
    /// A track that can't be resolved is recorded as missing and the next
    /// one is processed. An empty track list creates nothing.
    pub async fn build(
        &self,
        name: &str,
        tracks: Vec<TrackRecord>,
    ) -> Result<PlaylistImport, ImportError> {
        let mut import = PlaylistImport::new(name);

        if tracks.is_empty() {
            log::warn!("No track information found, skipping playlist {}", name);
            return Ok(import);
        }

        log::info!("Creating playlist {}", name);
        let client = self.client;
        let public = self.public;
        let playlist_id = self
            .caller
            .execute("create playlist", || async move {
                client.create_playlist(name, public).await
            })
            .await?;
        import.destination_id = Some(playlist_id.clone());

        let playlist_id = playlist_id.as_str();
        for mut record in tracks {
            log::debug!("{}", record);
            let uri = self.resolver.resolve(&mut record).await?;

            if let Some(uri) = uri.as_deref() {
                log::debug!("     Found {}", uri);
                self.caller
                    .execute("add track", || async move {
                        client.add_track(playlist_id, uri).await
                    })
                    .await?;
            }

            import.tracks.push(ResolvedTrack { record, uri });
        }

        log_outcome(&import);
        Ok(import)
    }
}

fn log_outcome(import: &PlaylistImport) {
    match import.outcome() {
        PlaylistOutcome::Skipped => {}
        PlaylistOutcome::Complete => log::info!("All tracks were found!"),
        PlaylistOutcome::Partial { missing } => {
            log::error!(
                "Unable to find the following tracks for playlist {}",
                import.name
            );
            for track in missing {
                log::error!(
                    "{}",
                    serde_json::to_string(track).unwrap_or_else(|_| track.record.to_string())
                );
            }
        }
    }
}
