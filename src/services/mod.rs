pub mod playlist;
pub mod resolver;

/// Behaviour switches for an import run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOptions {
    /// Retry a failed exact search on simplified artist/album/title.
    pub simplify_search: bool,
    /// Visibility of the created playlists.
    pub public_playlists: bool,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            simplify_search: true,
            public_playlists: false,
        }
    }
}
