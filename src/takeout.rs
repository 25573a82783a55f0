use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::model::TrackRecord;

pub const TRACKS_DIRECTORY: &str = "Tracks";

#[derive(Debug, thiserror::Error)]
pub enum ReadError {
    #[error("Takeout playlists directory not found: {0}")]
    MissingDirectory(PathBuf),
    #[error("Failed to list {path}: {source}")]
    Walk {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    #[error("Failed to read track file {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// One Takeout CSV row. Other columns (duration, rating, play count...) are
/// ignored.
#[derive(Debug, Deserialize)]
struct TakeoutRow {
    #[serde(rename = "Artist")]
    artist: String,
    #[serde(rename = "Album")]
    album: String,
    #[serde(rename = "Title")]
    title: String,
    /// Position in the playlist. Takeout names track files after their
    /// titles, so file order says nothing about playlist order.
    #[serde(
        rename = "Playlist Index",
        default,
        deserialize_with = "csv::invalid_option"
    )]
    playlist_index: Option<u64>,
}

impl TakeoutRow {
    /// Takeout HTML-encodes these fields (`&amp;`, `&#39;`...).
    fn to_record(&self) -> TrackRecord {
        TrackRecord::new(
            html_escape::decode_html_entities(&self.artist),
            html_escape::decode_html_entities(&self.album),
            html_escape::decode_html_entities(&self.title),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TakeoutPlaylist {
    pub name: String,
    pub tracks: Vec<TrackRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncompleteTracks {
    /// Names of the files holding rows that lack a title, or both artist and album.
    pub tracks: Vec<String>,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct TakeoutLibrary {
    /// Playlists with at least one complete track, in directory name order.
    pub playlists: Vec<TakeoutPlaylist>,
    pub incomplete: BTreeMap<String, IncompleteTracks>,
}

impl TakeoutLibrary {
    /// Pretty JSON of the incomplete records, keyed by playlist name.
    pub fn incomplete_report(&self) -> String {
        serde_json::to_string_pretty(&self.incomplete)
            .unwrap_or_else(|_| format!("{:?}", self.incomplete))
    }
}

/// Reads every playlist below a Takeout `Playlists` directory.
///
/// Each directory directly inside `root` is a playlist. Its tracks are the
/// CSV files in its `Tracks` subdirectory, or in the playlist directory
/// itself when there is no `Tracks` subdirectory.
pub fn read_library(root: &Path) -> Result<TakeoutLibrary, ReadError> {
    if !root.is_dir() {
        return Err(ReadError::MissingDirectory(root.to_path_buf()));
    }

    let mut library = TakeoutLibrary::default();

    for entry in list_directory(root)? {
        let path = entry.path();
        if !entry.file_type().is_dir() {
            log::info!("Skipping file {}", path.display());
            continue;
        }
        log::info!("Reading {}", path.display());

        let name = entry.file_name().to_string_lossy().to_string();
        let tracks_dir = path.join(TRACKS_DIRECTORY);
        let tracks_dir = if tracks_dir.is_dir() {
            log::debug!("Found Tracks dir");
            tracks_dir
        } else {
            path.to_path_buf()
        };

        let (tracks, incomplete) = read_track_files(&tracks_dir)?;

        if !incomplete.is_empty() {
            library
                .incomplete
                .insert(name.clone(), IncompleteTracks { tracks: incomplete });
        }
        if !tracks.is_empty() {
            library.playlists.push(TakeoutPlaylist { name, tracks });
        }
    }

    Ok(library)
}

/// Reads all `*.csv` files of a directory.
///
/// Returns the complete records ordered by their `Playlist Index`, and the
/// file name of every incomplete row. Rows without an index come last, in
/// file name order.
pub fn read_track_files(dir: &Path) -> Result<(Vec<TrackRecord>, Vec<String>), ReadError> {
    let mut tracks: Vec<(Option<u64>, TrackRecord)> = Vec::new();
    let mut incomplete = Vec::new();

    for entry in list_directory(dir)? {
        let path = entry.path();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if !entry.file_type().is_file() || !is_csv {
            continue;
        }

        log::debug!("Reading {}", path.display());
        let file_name = entry.file_name().to_string_lossy().to_string();

        for row in read_csv(path)? {
            let record = row.to_record();
            log::debug!("{:?}", record);
            if record.is_complete() {
                tracks.push((row.playlist_index, record));
            } else {
                log::debug!("Skipping track due to missing details: {}", file_name);
                incomplete.push(file_name.clone());
            }
        }
    }

    tracks.sort_by_key(|(index, _)| index.map_or((1, 0), |index| (0, index)));

    log::info!("Found {} tracks", tracks.len());
    Ok((
        tracks.into_iter().map(|(_, record)| record).collect(),
        incomplete,
    ))
}

fn list_directory(dir: &Path) -> Result<Vec<walkdir::DirEntry>, ReadError> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .map_err(|source| ReadError::Walk {
            path: dir.to_path_buf(),
            source,
        })
}

fn read_csv(path: &Path) -> Result<Vec<TakeoutRow>, ReadError> {
    let csv_error = |source| ReadError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_error)?;

    reader
        .deserialize::<TakeoutRow>()
        .map(|row| row.map_err(csv_error))
        .collect()
}
