//! Upstream endpoints and fixed protocol values.

use std::time::Duration;

pub const SKLAND_BASE_URL: &str = "https://zonai.skland.com/api/v1";
pub const HYPERGRYPH_BASE_URL: &str = "https://as.hypergryph.com";

/// Application code sent with the OAuth grant request.
pub const SKLAND_APP_CODE: &str = "4ca99fa6b56cc2ba";

pub const USER_AGENT: &str =
    "Skland/1.32.1 (com.hypergryph.skland; build:103201004; Android 33; ) Okhttp/4.11.0";

/// Timeout for the credential exchange endpoints.
pub const AUTH_TIMEOUT: Duration = Duration::from_secs(10);
/// Default timeout for signed game requests.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Application codes meaning the session is no longer accepted.
pub const CODE_TOKEN_EXPIRED: i64 = 10000;
pub const CODE_CRED_INVALID: i64 = 10002;

pub const GAME_APP_CODE: &str = "arknights";

pub fn grant_url() -> String {
    format!("{HYPERGRYPH_BASE_URL}/user/oauth2/v2/grant")
}

pub fn generate_cred_url() -> String {
    format!("{SKLAND_BASE_URL}/user/auth/generate_cred_by_code")
}

pub fn refresh_url() -> String {
    format!("{SKLAND_BASE_URL}/auth/refresh")
}

pub fn binding_url() -> String {
    format!("{SKLAND_BASE_URL}/game/player/binding")
}

pub fn player_info_url(uid: &str) -> String {
    format!("{SKLAND_BASE_URL}/game/player/info?uid={uid}")
}

pub fn attendance_url() -> String {
    format!("{SKLAND_BASE_URL}/game/attendance")
}
