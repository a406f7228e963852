use crate::{
    error::ApiError,
    spotify::SpotifyClient,
    types::{Artist, FollowedArtistsResponse, Paging, Playlist, SavedTrack},
};

/// Largest page size Spotify accepts for the library endpoints.
pub const PAGE_LIMIT: u64 = 50;
/// How many saved tracks the saved-songs view shows.
pub const SAVED_TRACKS_LIMIT: u64 = 10;

/// Fetches the most recently saved ("liked") tracks.
pub async fn get_saved_tracks(
    client: &SpotifyClient,
    token: &str,
    limit: u64,
) -> Result<Vec<SavedTrack>, ApiError> {
    let page: Option<Paging<SavedTrack>> = client
        .get("/tracks", &[("limit", limit.to_string())], token)
        .await?;

    Ok(page.map(Paging::into_items).unwrap_or_default())
}

/// Retrieves every playlist the user owns or follows.
///
/// Walks the offset-paginated `/me/playlists` endpoint in pages of
/// [`PAGE_LIMIT`] until the reported `total` is reached or a page comes
/// back empty.
///
/// # Example
///
/// ```ignore
/// let playlists = get_playlists(&client, &token).await?;
/// println!("{} playlists", playlists.len());
/// ```
pub async fn get_playlists(client: &SpotifyClient, token: &str) -> Result<Vec<Playlist>, ApiError> {
    let mut playlists: Vec<Playlist> = Vec::new();
    let mut offset: u64 = 0;

    loop {
        let query = [
            ("limit", PAGE_LIMIT.to_string()),
            ("offset", offset.to_string()),
        ];
        let Some(page) = client
            .get::<Paging<Playlist>>("/playlists", &query, token)
            .await?
        else {
            break;
        };

        let total = page.total.unwrap_or(0);
        // null items still take up a slot in the offset
        let fetched = page.items.len() as u64;
        if fetched == 0 {
            break;
        }

        playlists.extend(page.into_items());
        offset += fetched;

        if offset >= total {
            break;
        }
    }

    Ok(playlists)
}

/// Retrieves every artist the user follows.
///
/// `/me/following` is cursor paginated: each page names the id after which
/// the next page starts. When Spotify leaves the cursor out, the id of the
/// last artist on the page is used instead. Stops once `total` artists are
/// collected, the cursor runs out or stops moving, or a page is empty.
pub async fn get_followed_artists(
    client: &SpotifyClient,
    token: &str,
) -> Result<Vec<Artist>, ApiError> {
    let mut artists: Vec<Artist> = Vec::new();
    let mut after: Option<String> = None;

    loop {
        let mut query = vec![
            ("type", "artist".to_string()),
            ("limit", PAGE_LIMIT.to_string()),
        ];
        if let Some(cursor) = &after {
            query.push(("after", cursor.clone()));
        }

        let Some(res) = client
            .get::<FollowedArtistsResponse>("/following", &query, token)
            .await?
        else {
            break;
        };

        let page = res.artists;
        let total = page.total.unwrap_or(0);
        let cursor = page.cursors.and_then(|c| c.after);
        let items: Vec<Artist> = page.items.into_iter().flatten().collect();

        if items.is_empty() {
            break;
        }

        let next_after = cursor.or_else(|| items.last().and_then(|a| a.id.clone()));

        // a cursor that did not move hands back the page already collected
        if after.is_some() && next_after == after {
            break;
        }
        artists.extend(items);

        if artists.len() as u64 >= total {
            break;
        }

        match next_after {
            Some(next) => after = Some(next),
            None => break,
        }
    }

    Ok(artists)
}
