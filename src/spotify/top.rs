use crate::{
    error::ApiError,
    spotify::SpotifyClient,
    types::{Artist, Paging, Track},
};

/// Fetches the user's top artists for Spotify's default time range.
pub async fn get_top_artists(client: &SpotifyClient, token: &str) -> Result<Vec<Artist>, ApiError> {
    let page: Option<Paging<Artist>> = client.get("/top/artists", &[], token).await?;
    Ok(page.map(Paging::into_items).unwrap_or_default())
}

/// Fetches the user's top tracks for Spotify's default time range.
pub async fn get_top_tracks(client: &SpotifyClient, token: &str) -> Result<Vec<Track>, ApiError> {
    let page: Option<Paging<Track>> = client.get("/top/tracks", &[], token).await?;
    Ok(page.map(Paging::into_items).unwrap_or_default())
}
