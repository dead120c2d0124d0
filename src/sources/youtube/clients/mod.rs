pub mod common;

use std::{fmt, str::FromStr};

pub use common::ClientConfig;

/// Identity presented to InnerTube when opening a player session. Each one
/// hits a different endpoint/signing path upstream, so they get throttled
/// independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClientProfile {
    Web,
    Android,
    Ios,
    WebEmbedded,
    WebRemix,
    Tv,
}

impl ClientProfile {
    #[cfg(test)]
    const ALL: [ClientProfile; 6] = [
        Self::Web,
        Self::Android,
        Self::Ios,
        Self::WebEmbedded,
        Self::WebRemix,
        Self::Tv,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::Web => "Web",
            Self::Android => "Android",
            Self::Ios => "IOS",
            Self::WebEmbedded => "WebEmbedded",
            Self::WebRemix => "WebRemix",
            Self::Tv => "TV",
        }
    }

    pub fn config(&self) -> ClientConfig {
        match self {
            Self::Web => ClientConfig {
                client_name: "WEB",
                client_id: "1",
                client_version: "2.20260114.01.00",
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36",
                platform: Some("DESKTOP"),
                ..Default::default()
            },
            Self::Android => ClientConfig {
                client_name: "ANDROID",
                client_id: "3",
                client_version: "20.01.35",
                user_agent: "com.google.android.youtube/20.01.35 (Linux; U; Android 14) identity",
                device_make: Some("Google"),
                device_model: Some("Pixel 6"),
                os_name: Some("Android"),
                os_version: Some("14"),
                android_sdk_version: Some("34"),
                ..Default::default()
            },
            Self::Ios => ClientConfig {
                client_name: "IOS",
                client_id: "5",
                client_version: "21.02.1",
                user_agent: "com.google.ios.youtube/21.02.1 (iPhone16,2; U; CPU iOS 18_2 like Mac OS X;)",
                device_make: Some("Apple"),
                device_model: Some("iPhone16,2"),
                os_name: Some("iPhone"),
                os_version: Some("18.2.22C152"),
                ..Default::default()
            },
            Self::WebEmbedded => ClientConfig {
                client_name: "WEB_EMBEDDED_PLAYER",
                client_id: "56",
                client_version: "1.20250219.01.00",
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/134.0.0.0 Safari/537.36",
                platform: Some("DESKTOP"),
                embed_url: Some("https://www.youtube.com"),
                ..Default::default()
            },
            Self::WebRemix => ClientConfig {
                client_name: "WEB_REMIX",
                client_id: "67",
                client_version: "1.20260121.03.00",
                user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36",
                platform: Some("DESKTOP"),
                ..Default::default()
            },
            Self::Tv => ClientConfig {
                client_name: "TVHTML5",
                client_id: "7",
                client_version: "7.20250219.19.00",
                user_agent: "Mozilla/5.0 (SmartHub; SMART-TV; U; Linux/SmartTV; Maple2012) \
                     AppleWebKit/534.7 (KHTML, like Gecko) SmartTV Safari/534.7",
                ..Default::default()
            },
        }
    }

    /// Parses a configured list, skipping unknown names. Falls back to
    /// `[Web]` when nothing valid remains.
    pub fn parse_list(names: &[String]) -> Vec<ClientProfile> {
        let mut profiles: Vec<ClientProfile> = names
            .iter()
            .filter_map(|name| match name.parse() {
                Ok(profile) => Some(profile),
                Err(_) => {
                    tracing::warn!("Unknown YouTube client: {}", name);
                    None
                }
            })
            .collect();

        if profiles.is_empty() {
            tracing::warn!("No valid YouTube playback clients configured! Fallback to Web.");
            profiles.push(Self::Web);
        }
        profiles
    }
}

impl fmt::Display for ClientProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownProfile(pub String);

impl fmt::Display for UnknownProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown client profile '{}'", self.0)
    }
}

impl std::error::Error for UnknownProfile {}

impl FromStr for ClientProfile {
    type Err = UnknownProfile;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "WEB" => Ok(Self::Web),
            "ANDROID" => Ok(Self::Android),
            "IOS" => Ok(Self::Ios),
            "WEB_EMBEDDED" | "WEBEMBEDDED" | "WEB_EMBED" => Ok(Self::WebEmbedded),
            "WEB_REMIX" | "WEBREMIX" | "MUSIC_WEB" | "WEB_MUSIC" | "MUSIC" => Ok(Self::WebRemix),
            "TV" | "TVHTML5" => Ok(Self::Tv),
            _ => Err(UnknownProfile(s.to_string())),
        }
    }
}
