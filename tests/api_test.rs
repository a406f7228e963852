use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{bearer_token, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spotiview::{
    config::Config,
    management::TokenStore,
    server::{AppState, SESSION_COOKIE_NAME, router},
};

const FRONTEND: &str = "http://frontend.test/";

// Helper function to build the app against a mocked Spotify
async fn setup() -> (MockServer, Router) {
    let server = MockServer::start().await;
    let mut config = Config::new("client-id", "client-secret", "http://localhost/redirect")
        .with_spotify_base_url(&server.uri());
    config.frontend_url = FRONTEND.to_string();

    let state = AppState::new(config, TokenStore::in_memory()).unwrap();
    (server, router(Arc::new(state)))
}

async fn mount_code_exchange(server: &MockServer) {
    mount_code_exchange_expiring(server, 3600).await;
}

async fn mount_code_exchange_expiring(server: &MockServer, expires_in: i64) {
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("code=the-code"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-1",
            "token_type": "Bearer",
            "expires_in": expires_in,
            "refresh_token": "refresh-1",
            "scope": "user-top-read"
        })))
        .mount(server)
        .await;
}

async fn get(app: &Router, uri: &str, cookie: Option<&str>) -> axum::response::Response {
    let mut request = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        request = request.header(header::COOKIE, cookie);
    }
    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn session_cookie(response: &axum::response::Response) -> String {
    let raw = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("session cookie")
        .to_str()
        .unwrap();
    let pair = raw.split(';').next().unwrap().to_string();
    assert!(pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
    pair
}

/// Starts the flow and returns the session cookie and the OAuth state.
async fn start_login(app: &Router) -> (String, String) {
    let response = get(app, "/get-auth-url", None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);

    let body = json_body(response).await;
    assert_eq!(body["status"], 200);
    let url = reqwest::Url::parse(body["url"].as_str().unwrap()).unwrap();
    let state = url
        .query_pairs()
        .find(|(k, _)| k == "state")
        .map(|(_, v)| v.into_owned())
        .unwrap();

    (cookie, state)
}

/// Finishes a started login and returns the cookie of the linked session.
async fn finish_login(app: &Router, cookie: &str, state: &str) -> String {
    let uri = format!("/redirect?code=the-code&state={state}");
    let response = get(app, &uri, Some(cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], FRONTEND);

    // the session id changes once an account is linked
    let linked = session_cookie(&response);
    assert_ne!(linked, cookie);
    linked
}

/// Runs the full login and returns the linked session cookie.
async fn login(server: &MockServer, app: &Router) -> String {
    mount_code_exchange(server).await;
    let (cookie, state) = start_login(app).await;
    finish_login(app, &cookie, &state).await
}

async fn mount_me(server: &MockServer, route: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path(format!("/v1/me{route}")))
        .and(bearer_token("access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn track(name: &str) -> Value {
    json!({
        "name": name,
        "artists": [{"name": "Artist", "external_urls": {"spotify": "https://open.spotify.com/artist/x"}}],
        "album": {"name": "Album", "images": [{"url": "cover.jpg"}]},
        "external_urls": {"spotify": format!("https://open.spotify.com/track/{name}")}
    })
}

#[tokio::test]
async fn test_health() {
    let (server, app) = setup().await;
    let body = json_body(get(&app, "/health", None).await).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["linked_sessions"], 0);

    login(&server, &app).await;
    let body = json_body(get(&app, "/health", None).await).await;
    assert_eq!(body["linked_sessions"], 1);
}

#[tokio::test]
async fn test_auth_url_carries_client_settings() {
    let (_server, app) = setup().await;
    let response = get(&app, "/get-auth-url", None).await;
    let body = json_body(response).await;

    let url = reqwest::Url::parse(body["url"].as_str().unwrap()).unwrap();
    assert_eq!(url.path(), "/authorize");
    let pairs: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    assert!(pairs.contains(&("client_id".into(), "client-id".into())));
    assert!(pairs.contains(&("response_type".into(), "code".into())));
    assert!(pairs.contains(&("redirect_uri".into(), "http://localhost/redirect".into())));
}

#[tokio::test]
async fn test_login_flow_links_session() {
    let (server, app) = setup().await;
    let cookie = login(&server, &app).await;

    let body = json_body(get(&app, "/is-authenticated", Some(&cookie)).await).await;
    assert_eq!(body["status"], true);
    assert_eq!(body["tokens"]["token_type"], "Bearer");
    assert_eq!(body["tokens"]["expired"], false);
    // secrets never leave the server
    assert!(body["tokens"].get("access_token").is_none());
    assert!(body["tokens"].get("refresh_token").is_none());

    let all = json_body(get(&app, "/get-all-tokens", None).await).await;
    let all = all.as_array().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0]["session_key"], body["tokens"]["session_key"]);
}

#[tokio::test]
async fn test_unknown_session_is_not_authenticated() {
    let (_server, app) = setup().await;

    let body = json_body(get(&app, "/is-authenticated", None).await).await;
    assert_eq!(body, json!({"status": false, "tokens": null}));

    let response = get(&app, "/top-artists", None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"]["code"], "unauthenticated");

    let all = json_body(get(&app, "/get-all-tokens", None).await).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn test_callback_rejects_mismatched_state() {
    let (server, app) = setup().await;
    mount_code_exchange(&server).await;
    let (cookie, _state) = start_login(&app).await;

    let response = get(&app, "/redirect?code=the-code&state=forged", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"]["code"], "invalid_state");

    // without the cookie there is no stored state at all
    let response = get(&app, "/redirect?code=the-code&state=forged", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_reports_denied_authorization() {
    let (_server, app) = setup().await;
    let (cookie, state) = start_login(&app).await;

    let uri = format!("/redirect?error=access_denied&state={state}");
    let response = get(&app, &uri, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await["error"]["code"],
        "authorization_denied"
    );

    let body = json_body(get(&app, "/is-authenticated", Some(&cookie)).await).await;
    assert_eq!(body["status"], false);
}

#[tokio::test]
async fn test_callback_provider_error_is_not_stored() {
    let (server, app) = setup().await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid authorization code"
        })))
        .mount(&server)
        .await;
    let (cookie, state) = start_login(&app).await;

    let uri = format!("/redirect?code=bad&state={state}");
    let response = get(&app, &uri, Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);

    let all = json_body(get(&app, "/get-all-tokens", None).await).await;
    assert_eq!(all, json!([]));
}

#[tokio::test]
async fn test_top_artists_and_genres() {
    let (server, app) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/top/artists"))
        .and(bearer_token("access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"name": "Nina", "genres": ["jazz", "soul"], "popularity": 80,
                 "external_urls": {"spotify": "https://open.spotify.com/artist/nina"},
                 "images": [{"url": "nina.jpg"}], "followers": {"total": 10}},
                {"name": "Ella", "genres": ["jazz"], "popularity": 70,
                 "images": [], "followers": {"total": 5}}
            ],
            "total": 2,
            "next": null
        })))
        .expect(1)
        .mount(&server)
        .await;
    let cookie = login(&server, &app).await;

    let response = get(&app, "/top-artists", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["top_artists"][0]["name"], "Nina");
    assert_eq!(body["top_artists"][0]["thumbnail"], "nina.jpg");
    assert_eq!(body["top_artists"][1]["followers"], 5);
    assert_eq!(body["top_genres"], json!(["jazz", "soul"]));
}

#[tokio::test]
async fn test_current_song_is_null_when_idle() {
    let (server, app) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/player/currently-playing"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    let cookie = login(&server, &app).await;

    let body = json_body(get(&app, "/get-current-song", Some(&cookie)).await).await;
    assert_eq!(body, json!({"current_song": null}));
}

#[tokio::test]
async fn test_user_playlists_sorted() {
    let (server, app) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/playlists"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"name": "Few", "tracks": {"total": 2}},
                {"name": "", "tracks": {"total": 50}},
                {"name": "Many", "tracks": {"total": 40}}
            ],
            "total": 3,
            "next": null
        })))
        .mount(&server)
        .await;
    let cookie = login(&server, &app).await;

    let body = json_body(get(&app, "/user-playlists", Some(&cookie)).await).await;
    let names: Vec<&str> = body["user_playlists"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Many", "Few"]);
}

#[tokio::test]
async fn test_spotify_rejecting_token_maps_to_401() {
    let (server, app) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": {"status": 401, "message": "The access token expired"}
        })))
        .mount(&server)
        .await;
    let cookie = login(&server, &app).await;

    let response = get(&app, "/current-user-info", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        json_body(response).await["error"]["code"],
        "spotify_unauthorized"
    );
}

#[tokio::test]
async fn test_listed_session_key_does_not_authenticate() {
    let (server, app) = setup().await;
    mount_me(&server, "", json!({"display_name": "owner"})).await;
    mount_code_exchange(&server).await;
    let (pre_login, state) = start_login(&app).await;
    let cookie = finish_login(&app, &pre_login, &state).await;

    let all = json_body(get(&app, "/get-all-tokens", None).await).await;
    let listed = all[0]["session_key"].as_str().unwrap().to_string();
    assert_eq!(listed.len(), 8);

    let forged = format!("{SESSION_COOKIE_NAME}={listed}");
    let response = get(&app, "/current-user-info", Some(&forged)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // the cookie from before the login was rotated away
    let response = get(&app, "/current-user-info", Some(&pre_login)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get(&app, "/current-user-info", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_current_user_info() {
    let (server, app) = setup().await;
    mount_me(
        &server,
        "",
        json!({
            "display_name": "listener",
            "external_urls": {"spotify": "https://open.spotify.com/user/listener"},
            "images": [{"url": "large.jpg"}, {"url": "small.jpg"}],
            "followers": {"total": 3}
        }),
    )
    .await;
    let cookie = login(&server, &app).await;

    let body = json_body(get(&app, "/current-user-info", Some(&cookie)).await).await;
    assert_eq!(
        body,
        json!({"user_info": {
            "username": "listener",
            "profile_url": "https://open.spotify.com/user/listener",
            "thumbnail": "small.jpg",
            "followers": 3
        }})
    );
}

#[tokio::test]
async fn test_songs_history() {
    let (server, app) = setup().await;
    mount_me(
        &server,
        "/player/recently-played",
        json!({"items": [{"track": track("First")}, {"track": track("Second")}]}),
    )
    .await;
    let cookie = login(&server, &app).await;

    let body = json_body(get(&app, "/get-songs-history", Some(&cookie)).await).await;
    let songs = body["last_played_songs"].as_array().unwrap();
    assert_eq!(songs.len(), 2);
    assert_eq!(songs[0]["name"], "First");
    assert_eq!(songs[0]["album"], "Album");
    assert_eq!(songs[0]["thumbnail"], "cover.jpg");
    assert_eq!(songs[1]["artists"][0]["name"], "Artist");
}

#[tokio::test]
async fn test_top_tracks() {
    let (server, app) = setup().await;
    mount_me(&server, "/top/tracks", json!({"items": [track("Hit")]})).await;
    let cookie = login(&server, &app).await;

    let body = json_body(get(&app, "/top-tracks", Some(&cookie)).await).await;
    assert_eq!(body["top_tracks"][0]["name"], "Hit");
    assert_eq!(
        body["top_tracks"][0]["song_url"],
        "https://open.spotify.com/track/Hit"
    );
}

#[tokio::test]
async fn test_last_saved_songs() {
    let (server, app) = setup().await;
    Mock::given(method("GET"))
        .and(path("/v1/me/tracks"))
        .and(query_param("limit", "10"))
        .and(bearer_token("access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"added_at": "2023-10-17T08:30:00Z", "track": track("Liked")}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    let cookie = login(&server, &app).await;

    let body = json_body(get(&app, "/last-saved-songs", Some(&cookie)).await).await;
    assert_eq!(body["saved_songs"][0]["name"], "Liked");
    assert_eq!(body["saved_songs"][0]["added_at"], "17-10-2023");
}

#[tokio::test]
async fn test_followed_artists_sorted_by_rank() {
    let (server, app) = setup().await;
    mount_me(
        &server,
        "/following",
        json!({"artists": {
            "items": [
                {"id": "q", "name": "Quiet", "popularity": 20, "images": []},
                {"id": "l", "name": "Loud", "popularity": 90, "images": [{"url": "loud.jpg"}]}
            ],
            "total": 2,
            "cursors": {"after": null}
        }}),
    )
    .await;
    let cookie = login(&server, &app).await;

    let body = json_body(get(&app, "/followed-artists", Some(&cookie)).await).await;
    let followed = body["followed_artists"].as_array().unwrap();
    assert_eq!(followed[0]["name"], "Loud");
    assert_eq!(followed[0]["rank"], 90);
    assert_eq!(followed[0]["thumbnail"], "loud.jpg");
    assert!(followed[1].get("thumbnail").is_none());
}

#[tokio::test]
async fn test_stale_token_is_refreshed_before_data_request() {
    let (server, app) = setup().await;
    // already inside the refresh leeway when stored
    mount_code_exchange_expiring(&server, 30).await;
    Mock::given(method("POST"))
        .and(path("/api/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "access-2",
            "token_type": "Bearer",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/me/top/tracks"))
        .and(bearer_token("access-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": [track("Fresh")]})))
        .expect(2)
        .mount(&server)
        .await;

    let (cookie, state) = start_login(&app).await;
    let cookie = finish_login(&app, &cookie, &state).await;

    let body = json_body(get(&app, "/top-tracks", Some(&cookie)).await).await;
    assert_eq!(body["top_tracks"][0]["name"], "Fresh");

    // the refreshed token is stored and reused
    let body = json_body(get(&app, "/top-tracks", Some(&cookie)).await).await;
    assert_eq!(body["top_tracks"][0]["name"], "Fresh");

    let body = json_body(get(&app, "/is-authenticated", Some(&cookie)).await).await;
    assert_eq!(body["tokens"]["expired"], false);
}
