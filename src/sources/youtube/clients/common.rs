use serde_json::{Value, json};

use crate::sources::UpstreamError;

/// YouTube InnerTube API base endpoint (googleapis is more stable and avoids
/// some geo-restrictions that www.youtube.com may impose).
pub const INNERTUBE_API: &str = "https://youtubei.googleapis.com";

/// Static identity of one InnerTube client.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub client_name: &'static str,
    pub client_id: &'static str,
    pub client_version: &'static str,
    pub user_agent: &'static str,
    pub platform: Option<&'static str>,
    pub device_make: Option<&'static str>,
    pub device_model: Option<&'static str>,
    pub os_name: Option<&'static str>,
    pub os_version: Option<&'static str>,
    pub android_sdk_version: Option<&'static str>,
    pub embed_url: Option<&'static str>,
}

impl ClientConfig {
    pub fn build_context(&self, visitor_data: Option<&str>) -> Value {
        let mut client = json!({
            "clientName": self.client_name,
            "clientVersion": self.client_version,
            "userAgent": self.user_agent,
            "hl": "en",
            "gl": "US",
            "utcOffsetMinutes": 0
        });

        if let Some(obj) = client.as_object_mut() {
            let optional = [
                ("platform", self.platform),
                ("deviceMake", self.device_make),
                ("deviceModel", self.device_model),
                ("osName", self.os_name),
                ("osVersion", self.os_version),
                ("androidSdkVersion", self.android_sdk_version),
                ("visitorData", visitor_data),
            ];
            for (key, value) in optional {
                if let Some(v) = value {
                    obj.insert(key.to_string(), v.into());
                }
            }
        }

        let mut context = json!({
            "client": client,
            "user": { "lockedSafetyMode": false },
            "request": { "useSsl": true }
        });

        if let (Some(embed_url), Some(obj)) = (self.embed_url, context.as_object_mut()) {
            obj.insert("thirdParty".to_string(), json!({ "embedUrl": embed_url }));
        }

        context
    }
}

/// POSTs `/youtubei/v1/player` for `video_id` with the given identity.
///
/// Non-2xx responses become an [`UpstreamError`] carrying the status so the
/// selector can classify throttling (429) and denials (403).
pub async fn make_player_request(
    http: &reqwest::Client,
    base_url: &str,
    config: &ClientConfig,
    video_id: &str,
) -> Result<Value, UpstreamError> {
    let body = json!({
        "context": config.build_context(None),
        "videoId": video_id,
        "contentCheckOk": true,
        "racyCheckOk": true
    });

    let url = format!("{}/youtubei/v1/player?prettyPrint=false", base_url);

    tracing::debug!("{} player request: {}", config.client_name, video_id);

    let res = http
        .post(&url)
        .header("User-Agent", config.user_agent)
        .header("X-YouTube-Client-Name", config.client_id)
        .header("X-YouTube-Client-Version", config.client_version)
        .json(&body)
        .send()
        .await?;

    let status = res.status();
    if !status.is_success() {
        let text = res.text().await.unwrap_or_default();
        return Err(UpstreamError::with_status(
            status.as_u16(),
            format!(
                "{} player request returned {}: {}",
                config.client_name,
                status,
                text.chars().take(200).collect::<String>()
            ),
        ));
    }

    Ok(res.json().await?)
}
