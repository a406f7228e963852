use std::collections::HashMap;

use chrono::NaiveDateTime;
use rand::{Rng, distr::Alphanumeric};

use crate::types::{
    Artist, ArtistCredit, CurrentSong, CurrentlyPlaying, FollowedArtist, Image, PlayHistory,
    Playlist, PlaylistInfo, SavedSong, SavedTrack, TopArtist, Track, TrackInfo, UserInfo,
    UserProfile,
};

/// Number of genres reported next to the top artists.
pub const TOP_GENRES_LIMIT: usize = 10;

fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}

/// Random value for the OAuth `state` parameter.
pub fn generate_state() -> String {
    random_alphanumeric(32)
}

/// Random key under which a linked Spotify account is stored.
///
/// Only ever kept in server-side session data, never in a cookie.
pub fn generate_account_key() -> String {
    random_alphanumeric(48)
}

fn first_image(images: &[Image]) -> Option<String> {
    images.first().and_then(|i| i.url.clone())
}

/// Spotify lists images largest first, so the last one is the smallest.
fn last_image(images: &[Image]) -> Option<String> {
    images.last().and_then(|i| i.url.clone())
}

pub fn get_all_artists(track: &Track) -> Vec<ArtistCredit> {
    track
        .artists
        .iter()
        .map(|a| ArtistCredit {
            name: a.name.clone().unwrap_or_default(),
            profile_url: a.external_urls.spotify.clone(),
        })
        .collect()
}

pub fn track_info(track: &Track) -> TrackInfo {
    TrackInfo {
        name: track.name.clone().unwrap_or_default(),
        artists: get_all_artists(track),
        album: track.album.name.clone(),
        thumbnail: first_image(&track.album.images),
        song_url: track.external_urls.spotify.clone(),
    }
}

pub fn current_song(playing: &CurrentlyPlaying) -> Option<CurrentSong> {
    playing.item.as_ref().map(|track| CurrentSong {
        track: track_info(track),
        is_playing: playing.is_playing,
    })
}

pub fn songs_history(history: &[PlayHistory]) -> Vec<TrackInfo> {
    history
        .iter()
        .filter_map(|h| h.track.as_ref())
        .map(track_info)
        .collect()
}

pub fn top_tracks(tracks: &[Track]) -> Vec<TrackInfo> {
    tracks.iter().map(track_info).collect()
}

pub fn top_artist(artist: &Artist) -> TopArtist {
    TopArtist {
        name: artist.name.clone().unwrap_or_default(),
        artist_url: artist.external_urls.spotify.clone(),
        genres: artist.genres.clone(),
        thumbnail: first_image(&artist.images),
        followers: artist.followers.total.unwrap_or(0),
        popularity: artist.popularity.unwrap_or(0),
    }
}

pub fn top_artists(artists: &[Artist]) -> Vec<TopArtist> {
    artists.iter().map(top_artist).collect()
}

/// Most frequent genres across `artists`, at most [`TOP_GENRES_LIMIT`].
///
/// Genres with the same count keep the order in which they first appeared.
pub fn top_genres(artists: &[Artist]) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut votes: HashMap<&str, usize> = HashMap::new();

    for genre in artists.iter().flat_map(|a| a.genres.iter()) {
        let count = votes.entry(genre.as_str()).or_insert(0);
        if *count == 0 {
            order.push(genre.as_str());
        }
        *count += 1;
    }

    // stable sort keeps first-seen order on ties
    order.sort_by(|a, b| votes[b].cmp(&votes[a]));
    order
        .into_iter()
        .take(TOP_GENRES_LIMIT)
        .map(String::from)
        .collect()
}

pub fn user_info(profile: &UserProfile) -> UserInfo {
    UserInfo {
        username: profile.display_name.clone(),
        profile_url: profile.external_urls.spotify.clone(),
        thumbnail: last_image(&profile.images),
        followers: profile.followers.total.unwrap_or(0),
    }
}

/// Turns Spotify's `2024-03-01T10:00:00Z` into `01-03-2024`.
///
/// Values in any other shape are handed back unchanged.
pub fn get_formatted_date(date: &str) -> String {
    match NaiveDateTime::parse_from_str(date, "%Y-%m-%dT%H:%M:%SZ") {
        Ok(parsed) => parsed.format("%d-%m-%Y").to_string(),
        Err(_) => date.to_string(),
    }
}

pub fn saved_songs(saved: &[SavedTrack]) -> Vec<SavedSong> {
    saved
        .iter()
        .filter_map(|s| {
            s.track.as_ref().map(|track| SavedSong {
                name: track.name.clone().unwrap_or_default(),
                added_at: s.added_at.as_deref().map(get_formatted_date),
                artists: get_all_artists(track),
                song_url: track.external_urls.spotify.clone(),
            })
        })
        .collect()
}

pub fn get_playlist_list(playlists: &[Playlist]) -> Vec<PlaylistInfo> {
    playlists
        .iter()
        .map(|p| PlaylistInfo {
            name: p.name.clone().unwrap_or_default(),
            total_songs: p.tracks.total.unwrap_or(0),
            playlist_url: p.external_urls.spotify.clone(),
            owner: p.owner.display_name.clone(),
            owner_url: p.owner.external_urls.spotify.clone(),
            is_public: p.public,
            thumbnail: first_image(&p.images),
        })
        .collect()
}

/// Drops unnamed playlists and sorts by number of songs, largest first.
pub fn sort_playlists(playlists: &mut Vec<PlaylistInfo>) {
    playlists.retain(|p| !p.name.is_empty());
    playlists.sort_by(|a, b| b.total_songs.cmp(&a.total_songs));
}

pub fn get_followed_artists(artists: &[Artist]) -> Vec<FollowedArtist> {
    artists
        .iter()
        .map(|a| FollowedArtist {
            name: a.name.clone().unwrap_or_default(),
            artist_url: a.external_urls.spotify.clone(),
            followers: a.followers.total.unwrap_or(0),
            rank: a.popularity.unwrap_or(0),
            thumbnail: first_image(&a.images),
        })
        .collect()
}

pub fn sort_followed_artists(artists: &mut [FollowedArtist]) {
    artists.sort_by(|a, b| b.rank.cmp(&a.rank));
}
