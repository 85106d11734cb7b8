//! Artist picker support: suggestion queries, in-memory filtering of the
//! full artist list, and debouncing of incremental searches.

use std::time::Duration;

use tokio::sync::mpsc;

use crate::models::Artist;

/// Normalized autocomplete query; `None` means "no suggestions"
pub fn suggestion_query(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|q| !q.is_empty())
}

/// Case-insensitive substring match on name or phonetic key.
/// A blank filter keeps every artist.
pub fn filter_artists<'a>(artists: &'a [Artist], filter: &str) -> Vec<&'a Artist> {
    let needle = filter.trim().to_lowercase();
    if needle.is_empty() {
        return artists.iter().collect();
    }

    artists
        .iter()
        .filter(|artist| {
            artist.name.to_lowercase().contains(&needle)
                || artist.name_kana.to_lowercase().contains(&needle)
        })
        .collect()
}

/// Wait for the next settled value on `rx`.
///
/// After the first value arrives, every further value restarts the `quiet`
/// window and replaces the pending one; the latest value is returned once no
/// input has arrived for `quiet`, or when the sender side closes. Returns
/// `None` if the channel closes before anything is sent.
pub async fn next_settled<T>(rx: &mut mpsc::Receiver<T>, quiet: Duration) -> Option<T> {
    let mut latest = rx.recv().await?;

    loop {
        tokio::select! {
            biased;
            next = rx.recv() => match next {
                Some(value) => latest = value,
                None => return Some(latest),
            },
            _ = tokio::time::sleep(quiet) => return Some(latest),
        }
    }
}
