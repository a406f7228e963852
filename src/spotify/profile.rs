use crate::{error::ApiError, spotify::SpotifyClient, types::UserProfile};

/// Fetches the profile of the user owning `token`.
pub async fn get_current_user(
    client: &SpotifyClient,
    token: &str,
) -> Result<UserProfile, ApiError> {
    let profile: Option<UserProfile> = client.get("", &[], token).await?;
    Ok(profile.unwrap_or_default())
}
