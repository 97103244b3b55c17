use crate::cache::{CachedResult, ResultCache};
use crate::clients::MetadataSearch;
use crate::error::{BridgeError, Result};
use crate::types::TrackKey;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Multi-artist separator in the secondary display line
const ARTIST_SEPARATOR: char = '/';

/// One search attempt: a pure transform of the original lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub title: String,
    pub artist: String,
}

impl SearchQuery {
    /// Query string favoring an exact track-name and artist-name match
    pub fn to_query_string(&self) -> String {
        let mut query = String::new();
        if !self.title.is_empty() {
            query.push_str("track:");
            query.push_str(&self.title);
        }
        if !self.artist.is_empty() {
            if !query.is_empty() {
                query.push(' ');
            }
            query.push_str("artist:");
            query.push_str(&self.artist);
        }
        query
    }
}

/// Ordered relaxation ladder for a lookup, strictest first
///
/// After the exact query: drop extra artists past a `/` separator, then drop
/// the artist entirely. Results of any rung are cached under the original key
/// only, so relaxed queries never seed their own entries.
pub fn relaxation_ladder(key: &TrackKey) -> Vec<SearchQuery> {
    let mut ladder = vec![SearchQuery {
        title: key.title.clone(),
        artist: key.artist.clone(),
    }];

    if let Some((first, _)) = key.artist.split_once(ARTIST_SEPARATOR) {
        ladder.push(SearchQuery {
            title: key.title.clone(),
            artist: first.trim().to_string(),
        });
    }
    if !key.artist.is_empty() {
        ladder.push(SearchQuery {
            title: key.title.clone(),
            artist: String::new(),
        });
    }
    ladder
}

/// Expiry bookkeeping for the search-service credential
///
/// Starts expired so the first lookup triggers the initial refresh.
#[derive(Debug, Default)]
struct CredentialState {
    expires_at: Option<Instant>,
}

impl CredentialState {
    fn is_expired(&self) -> bool {
        self.expires_at.map_or(true, |at| at <= Instant::now())
    }
}

/// Resolves a track to an externally shareable link, memoized
pub struct LinkResolver {
    search: Arc<dyn MetadataSearch>,
    cache: Arc<Mutex<ResultCache>>,
    credential: Arc<Mutex<CredentialState>>,
}

impl LinkResolver {
    pub fn new(search: Arc<dyn MetadataSearch>, cache_limit: usize) -> Self {
        Self {
            search,
            cache: Arc::new(Mutex::new(ResultCache::new(cache_limit))),
            credential: Arc::new(Mutex::new(CredentialState::default())),
        }
    }

    /// Resolve a link for the given track, `""` meaning "known unavailable"
    ///
    /// Walks the relaxation ladder until a candidate with a usable link turns
    /// up. Exhaustion caches the empty sentinel under the original key and
    /// fails; a later call then hits the sentinel and resolves to `""`.
    pub async fn resolve(&self, key: &TrackKey) -> Result<String> {
        let cache_key = key.cache_key();
        if cache_key.is_empty() {
            return Ok(String::new());
        }
        if let Some(hit) = self.cached(&cache_key) {
            return Ok(hit);
        }

        self.refresh_credential_if_expired();

        for query in relaxation_ladder(key) {
            // a concurrent resolution may have landed since the last rung
            if let Some(hit) = self.cached(&cache_key) {
                return Ok(hit);
            }

            tracing::debug!(query = %query.to_query_string(), "searching for track link");
            match self.search.search_tracks(&query.to_query_string()).await {
                Ok(candidates) => {
                    if let Some(url) = candidates.iter().find_map(|c| c.external_url.clone()) {
                        self.store(&cache_key, CachedResult::new(url.clone(), None));
                        return Ok(url);
                    }
                    tracing::debug!("no usable candidate, relaxing query");
                }
                Err(BridgeError::CredentialExpired) => {
                    tracing::warn!("search credential expired mid-lookup, refreshing");
                    self.spawn_credential_refresh();
                    self.store(&cache_key, CachedResult::empty());
                    return Err(BridgeError::CredentialExpired);
                }
                Err(e) => {
                    tracing::warn!("track search failed: {e}");
                }
            }
        }

        self.store(&cache_key, CachedResult::empty());
        Err(BridgeError::LinkNotFound(cache_key))
    }

    fn cached(&self, cache_key: &str) -> Option<String> {
        self.cache
            .lock()
            .unwrap()
            .get(cache_key)
            .map(|r| r.value.clone())
    }

    fn store(&self, cache_key: &str, result: CachedResult) {
        // link entries never carry deletion handles; the displaced binding
        // just drops
        let _ = self.cache.lock().unwrap().insert(cache_key, result);
    }

    /// Opportunistic refresh before a search once the held expiry has passed
    ///
    /// Fire and forget: the current lookup proceeds against the old
    /// credential and may still fail; the next one benefits.
    fn refresh_credential_if_expired(&self) {
        if self.credential.lock().unwrap().is_expired() {
            self.spawn_credential_refresh();
        }
    }

    fn spawn_credential_refresh(&self) {
        let search = Arc::clone(&self.search);
        let credential = Arc::clone(&self.credential);
        tokio::spawn(async move {
            match search.refresh_credential().await {
                Ok(cred) => {
                    credential.lock().unwrap().expires_at =
                        Some(Instant::now() + Duration::from_secs(cred.expires_in_secs));
                    tracing::debug!("search credential refreshed");
                }
                Err(e) => tracing::warn!("credential refresh failed: {e}"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(title: &str, artist: &str) -> SearchQuery {
        SearchQuery {
            title: title.into(),
            artist: artist.into(),
        }
    }

    #[test]
    fn ladder_for_multi_artist_has_three_rungs() {
        let ladder = relaxation_ladder(&TrackKey::new("Song", "A/B", ""));
        assert_eq!(
            ladder,
            vec![query("Song", "A/B"), query("Song", "A"), query("Song", "")]
        );
    }

    #[test]
    fn ladder_for_single_artist_has_two_rungs() {
        let ladder = relaxation_ladder(&TrackKey::new("Song", "A", ""));
        assert_eq!(ladder, vec![query("Song", "A"), query("Song", "")]);
    }

    #[test]
    fn ladder_without_artist_is_just_the_exact_query() {
        let ladder = relaxation_ladder(&TrackKey::new("Song", "", ""));
        assert_eq!(ladder, vec![query("Song", "")]);
    }

    #[test]
    fn multi_artist_segment_is_trimmed() {
        let ladder = relaxation_ladder(&TrackKey::new("Song", "A / B", ""));
        assert_eq!(ladder[1], query("Song", "A"));
    }

    #[test]
    fn query_string_omits_empty_fields() {
        assert_eq!(
            query("Song", "Artist").to_query_string(),
            "track:Song artist:Artist"
        );
        assert_eq!(query("Song", "").to_query_string(), "track:Song");
        assert_eq!(query("", "Artist").to_query_string(), "artist:Artist");
        assert_eq!(query("", "").to_query_string(), "");
    }
}
