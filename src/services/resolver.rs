use std::fmt;

use crate::error::ImportError;
use crate::model::TrackRecord;
use crate::ports::spotify::SpotifyClient;
use crate::reliability::ReliableCaller;

/// The three search shapes of the cascade, from most to least constrained.
#[derive(Debug, Clone, Copy)]
pub enum SearchQuery<'a> {
    ArtistAlbumTrack(&'a TrackRecord),
    AlbumTrack(&'a TrackRecord),
    ArtistTrack(&'a TrackRecord),
}

impl SearchQuery<'_> {
    fn operation(&self) -> &'static str {
        match self {
            SearchQuery::ArtistAlbumTrack(_) => "artist/album/track search",
            SearchQuery::AlbumTrack(_) => "album/track search",
            SearchQuery::ArtistTrack(_) => "artist/track search",
        }
    }
}

impl fmt::Display for SearchQuery<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchQuery::ArtistAlbumTrack(t) => write!(
                f,
                "artist:\"{}\" album:\"{}\" track:\"{}\"",
                t.artist, t.album, t.track
            ),
            SearchQuery::AlbumTrack(t) => write!(f, "album:\"{}\" track:\"{}\"", t.album, t.track),
            SearchQuery::ArtistTrack(t) => {
                write!(f, "artist:\"{}\" track:\"{}\"", t.artist, t.track)
            }
        }
    }
}

/// Maps a Takeout record to a Spotify track URI by searching with
/// progressively looser constraints.
pub struct TrackResolver<'a, C: SpotifyClient> {
    client: &'a C,
    caller: &'a ReliableCaller,
    simplify_search: bool,
}

impl<'a, C: SpotifyClient> TrackResolver<'a, C> {
    pub fn new(client: &'a C, caller: &'a ReliableCaller, simplify_search: bool) -> Self {
        Self {
            client,
            caller,
            simplify_search,
        }
    }

    /// Returns the first URI found by, in order: the exact artist/album/track
    /// search, the same search on simplified fields (when enabled), the
    /// album/track search and the artist/track search.
    ///
    /// Simplification rewrites `record` in place, so later searches and
    /// reports see the simplified text.
    pub async fn resolve(&self, record: &mut TrackRecord) -> Result<Option<String>, ImportError> {
        if let Some(uri) = self.search(SearchQuery::ArtistAlbumTrack(record)).await? {
            return Ok(Some(uri));
        }

        if self.simplify_search {
            record.simplify();
            log::warn!(
                "\tTrying simplified search: {}/{}/{}",
                record.artist,
                record.track,
                record.album
            );
            if let Some(uri) = self.search(SearchQuery::ArtistAlbumTrack(record)).await? {
                return Ok(Some(uri));
            }
        }

        log::warn!("\tTrying Track/Album search: {}/{}", record.track, record.album);
        if let Some(uri) = self.search(SearchQuery::AlbumTrack(record)).await? {
            return Ok(Some(uri));
        }

        log::warn!("\tTrying Track/Artist search: {}/{}", record.track, record.artist);
        self.search(SearchQuery::ArtistTrack(record)).await
    }

    async fn search(&self, query: SearchQuery<'_>) -> Result<Option<String>, ImportError> {
        let query_text = query.to_string();
        let q = query_text.as_str();
        let client = self.client;

        self.caller
            .execute(query.operation(), || async move { client.search_track(q).await })
            .await
    }
}
