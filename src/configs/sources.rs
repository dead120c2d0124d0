use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct YouTubeConfig {
    /// Client profile names tried in order, e.g. `["ANDROID", "IOS", "WEB"]`.
    #[serde(default = "default_playback_clients")]
    pub playback: Vec<String>,
    /// Profile used for the final attempts once `playback` is exhausted.
    #[serde(default = "default_fallback_client")]
    pub fallback_client: String,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: usize,
    #[serde(default = "default_quality")]
    pub default_quality: String,
}

fn default_playback_clients() -> Vec<String> {
    ["ANDROID", "IOS", "WEB", "WEB_EMBEDDED", "TV"]
        .into_iter()
        .map(str::to_string)
        .collect()
}

fn default_fallback_client() -> String {
    "WEB".to_string()
}

fn default_max_attempts() -> usize {
    4
}

fn default_quality() -> String {
    "360p".to_string()
}

impl Default for YouTubeConfig {
    fn default() -> Self {
        Self {
            playback: default_playback_clients(),
            fallback_client: default_fallback_client(),
            max_attempts: default_max_attempts(),
            default_quality: default_quality(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SearchConfig {
    /// Name of the environment variable holding the Data API key. Read on
    /// every request so a missing key is reported per call, not at boot.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,
    #[serde(default = "default_max_results_limit")]
    pub max_results_limit: usize,
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_api_key_env() -> String {
    "YOUTUBE_API_KEY".to_string()
}

fn default_max_results() -> usize {
    200
}

fn default_max_results_limit() -> usize {
    500
}

fn default_page_size() -> usize {
    50
}

fn default_base_url() -> String {
    "https://www.googleapis.com/youtube/v3".to_string()
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            default_max_results: default_max_results(),
            max_results_limit: default_max_results_limit(),
            page_size: default_page_size(),
            base_url: default_base_url(),
        }
    }
}
