use std::fmt;

use serde::Serialize;

use crate::normalize::simplify;

/// One track as exported by Takeout: free-text artist, album and title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackRecord {
    pub artist: String,
    pub album: String,
    pub track: String,
}

impl TrackRecord {
    pub fn new(
        artist: impl Into<String>,
        album: impl Into<String>,
        track: impl Into<String>,
    ) -> Self {
        Self {
            artist: artist.into(),
            album: album.into(),
            track: track.into(),
        }
    }

    /// A record can only be searched for when it has a title and at least
    /// one of artist or album.
    pub fn is_complete(&self) -> bool {
        !self.track.is_empty() && !(self.artist.is_empty() && self.album.is_empty())
    }

    /// Simplifies all three fields in place.
    pub fn simplify(&mut self) {
        self.artist = simplify(&self.artist);
        self.album = simplify(&self.album);
        self.track = simplify(&self.track);
    }
}

impl fmt::Display for TrackRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} / {} / {}", self.artist, self.album, self.track)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedTrack {
    #[serde(flatten)]
    pub record: TrackRecord,
    pub uri: Option<String>,
}

impl ResolvedTrack {
    pub fn is_missing(&self) -> bool {
        self.uri.is_none()
    }
}

/// A playlist as recreated on Spotify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistImport {
    pub name: String,
    pub tracks: Vec<ResolvedTrack>,
    /// Spotify playlist id, set once the playlist has been created.
    pub destination_id: Option<String>,
}

#[derive(Debug, PartialEq, Eq)]
pub enum PlaylistOutcome<'a> {
    /// Nothing to import, no playlist was created.
    Skipped,
    Complete,
    Partial { missing: Vec<&'a ResolvedTrack> },
}

impl PlaylistImport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            tracks: Vec::new(),
            destination_id: None,
        }
    }

    pub fn outcome(&self) -> PlaylistOutcome<'_> {
        if self.destination_id.is_none() {
            return PlaylistOutcome::Skipped;
        }

        let missing: Vec<_> = self.tracks.iter().filter(|t| t.is_missing()).collect();
        if missing.is_empty() {
            PlaylistOutcome::Complete
        } else {
            PlaylistOutcome::Partial { missing }
        }
    }

    pub fn found_count(&self) -> usize {
        self.tracks.iter().filter(|t| !t.is_missing()).count()
    }
}
