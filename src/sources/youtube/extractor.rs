use serde_json::Value;

use crate::{
    sources::{UpstreamError, VideoDetails},
    streams::{StreamDescriptor, StreamLocator},
};

/// Rejects player responses whose `playabilityStatus` is not `OK`.
///
/// The "confirm you're not a bot" login wall is reported as a 403 so it is
/// retried with another client identity, like any other access denial.
pub fn check_playability(body: &Value) -> Result<(), UpstreamError> {
    let playability = body.get("playabilityStatus");
    let status = playability
        .and_then(|p| p.get("status"))
        .and_then(|s| s.as_str())
        .unwrap_or("UNKNOWN");

    if status == "OK" {
        return Ok(());
    }

    let reason = playability
        .and_then(|p| p.get("reason"))
        .and_then(|r| r.as_str())
        .unwrap_or("no reason given");

    let message = format!("video not playable ({}): {}", status, reason);
    if status == "LOGIN_REQUIRED" && reason.to_lowercase().contains("bot") {
        Err(UpstreamError::with_status(403, message))
    } else {
        Err(UpstreamError::new(message))
    }
}

pub fn extract_details(body: &Value) -> Option<VideoDetails> {
    let details = body.get("videoDetails")?;
    let video_id = details.get("videoId")?.as_str()?.to_string();
    let title = details.get("title")?.as_str()?.to_string();
    let author = details
        .get("author")
        .and_then(|a| a.as_str())
        .unwrap_or_default()
        .to_string();

    let length_seconds = string_number(details.get("lengthSeconds")).unwrap_or(0);
    let views = string_number(details.get("viewCount")).unwrap_or(0);

    let thumbnail_url = details
        .get("thumbnail")
        .and_then(|t| t.get("thumbnails"))
        .and_then(|arr| arr.as_array())
        .and_then(|arr| arr.last())
        .and_then(|thumb| thumb.get("url"))
        .and_then(|url| url.as_str())
        .map(|s| s.to_string());

    Some(VideoDetails {
        video_id,
        title,
        author,
        length_seconds,
        views,
        thumbnail_url,
    })
}

/// Every variant in `streamingData`, muxed `formats` first, then
/// `adaptiveFormats`, each in upstream order.
pub fn extract_streams(body: &Value) -> Vec<StreamDescriptor> {
    let Some(streaming) = body.get("streamingData") else {
        return Vec::new();
    };

    let muxed = streaming
        .get("formats")
        .and_then(|f| f.as_array())
        .into_iter()
        .flatten()
        .filter_map(|f| parse_format(f, true));

    let adaptive = streaming
        .get("adaptiveFormats")
        .and_then(|f| f.as_array())
        .into_iter()
        .flatten()
        .filter_map(|f| parse_format(f, false));

    muxed.chain(adaptive).collect()
}

fn parse_format(format: &Value, muxed: bool) -> Option<StreamDescriptor> {
    let itag = format.get("itag")?.as_u64()? as u32;
    let mime_type = format.get("mimeType")?.as_str()?.to_string();

    let locator = if let Some(url) = format.get("url").and_then(|u| u.as_str()) {
        StreamLocator::Direct(url.to_string())
    } else {
        let cipher = format
            .get("signatureCipher")
            .or_else(|| format.get("cipher"))
            .and_then(|c| c.as_str())?;
        StreamLocator::Ciphered(cipher.to_string())
    };

    let essence = mime_type.split(';').next().unwrap_or_default().trim();
    let is_audio_mime = essence.starts_with("audio/");
    let has_video = essence.starts_with("video/");
    let has_audio = is_audio_mime || muxed;

    let height = format
        .get("height")
        .and_then(|h| h.as_u64())
        .map(|h| h as u32)
        .filter(|_| has_video);

    let resolution = format
        .get("qualityLabel")
        .and_then(|q| q.as_str())
        .map(normalize_quality_label)
        .or_else(|| height.map(|h| format!("{}p", h)))
        .filter(|_| has_video);

    Some(StreamDescriptor {
        itag,
        container: container_for(essence).to_string(),
        resolution,
        height,
        fps: format
            .get("fps")
            .and_then(|f| f.as_u64())
            .map(|f| f as u32)
            .filter(|_| has_video),
        bitrate: format
            .get("averageBitrate")
            .or_else(|| format.get("bitrate"))
            .and_then(|b| b.as_u64()),
        has_audio,
        has_video,
        content_length: string_number(format.get("contentLength")),
        locator,
        mime_type,
    })
}

/// `720p60 HDR` → `720p`.
fn normalize_quality_label(label: &str) -> String {
    let digits: String = label.chars().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        label.to_string()
    } else {
        format!("{}p", digits)
    }
}

fn container_for(essence: &str) -> &'static str {
    match essence {
        "video/mp4" => "mp4",
        "audio/mp4" => "m4a",
        "video/webm" | "audio/webm" => "webm",
        "video/3gpp" => "3gp",
        _ => "bin",
    }
}

/// InnerTube encodes most numbers as strings.
fn string_number(value: Option<&Value>) -> Option<u64> {
    let value = value?;
    value
        .as_u64()
        .or_else(|| value.as_str().and_then(|s| s.parse().ok()))
}
