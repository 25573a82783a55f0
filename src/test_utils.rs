use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use futures::FutureExt;

use crate::error::ApiError;
use crate::reliability::{ReliableCaller, RetryPolicy};

/// A caller that never actually waits, along with the number of times it
/// was asked to.
pub fn instant_caller(max_attempts: usize) -> (ReliableCaller, Arc<AtomicUsize>) {
    let sleeps = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&sleeps);
    let caller = ReliableCaller::with_sleep(
        RetryPolicy {
            max_attempts,
            delay: Duration::from_secs(5),
        },
        move |_delay| {
            counter.fetch_add(1, Ordering::SeqCst);
            async {}.boxed()
        },
    );
    (caller, sleeps)
}

/// A reqwest status error, as produced by `error_for_status`.
pub fn server_error(status: u16) -> ApiError {
    let response = reqwest::Response::from(
        http::Response::builder()
            .status(status)
            .body("")
            .unwrap(),
    );
    ApiError::from(response.error_for_status().unwrap_err())
}

pub fn transient_error() -> ApiError {
    server_error(503)
}

/// Writes a Takeout style CSV file with the given (artist, album, title) rows.
pub fn write_track_csv(dir: &Path, file_name: &str, rows: &[(&str, &str, &str)]) {
    std::fs::create_dir_all(dir).unwrap();
    let mut contents = String::from("Title,Album,Artist,Duration (ms),Rating,Play Count,Removed,Playlist Index\n");
    for (index, (artist, album, title)) in rows.iter().enumerate() {
        contents.push_str(&format!(
            "\"{}\",\"{}\",\"{}\",\"180000\",\"0\",\"1\",\"\",\"{}\"\n",
            title, album, artist, index
        ));
    }
    std::fs::write(dir.join(file_name), contents).unwrap();
}
