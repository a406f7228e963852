use crate::{
    error::ApiError,
    spotify::SpotifyClient,
    types::{CurrentlyPlaying, Paging, PlayHistory},
};

/// Fetches the track the user is listening to right now.
///
/// Returns `Ok(None)` when nothing is playing (Spotify answers `204`) or
/// when the playing item is not a track (ads, unknown episodes).
pub async fn get_currently_playing(
    client: &SpotifyClient,
    token: &str,
) -> Result<Option<CurrentlyPlaying>, ApiError> {
    let playing: Option<CurrentlyPlaying> =
        client.get("/player/currently-playing", &[], token).await?;

    Ok(playing.filter(|p| p.item.is_some()))
}

/// Fetches the most recently played tracks, newest first.
pub async fn get_recently_played(
    client: &SpotifyClient,
    token: &str,
) -> Result<Vec<PlayHistory>, ApiError> {
    let page: Option<Paging<PlayHistory>> =
        client.get("/player/recently-played", &[], token).await?;

    Ok(page.map(Paging::into_items).unwrap_or_default())
}
