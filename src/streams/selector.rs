//! Variant selection over an enumerated descriptor set.
//!
//! Only muxed (progressive) video variants and audio-only variants are ever
//! eligible, so a selected stream can be relayed as-is with no mux step.

use crate::{
    common::types::MediaFormat,
    sources::{UpstreamError, UpstreamSession},
};

use super::StreamDescriptor;

/// Picks the variant to relay for `format` / `quality`.
///
/// * `Mp3`: the audio-only stream with the highest average bitrate. On equal
///   bitrates the first one enumerated wins.
/// * `Mp4`: the progressive `mp4` stream labelled exactly `quality`, else the
///   progressive `mp4` stream with the greatest height (first enumerated on
///   ties).
pub fn select<'a>(
    streams: &'a [StreamDescriptor],
    format: MediaFormat,
    quality: &str,
) -> Option<&'a StreamDescriptor> {
    match format {
        MediaFormat::Mp3 => best_audio(streams),
        MediaFormat::Mp4 => exact_video(streams, quality).or_else(|| highest_video(streams)),
    }
}

/// Enumerates the session's streams and runs [`select`]. Returns an owned
/// descriptor so the session can be dropped before relaying.
pub async fn select_from_session(
    session: &dyn UpstreamSession,
    format: MediaFormat,
    quality: &str,
) -> Result<Option<StreamDescriptor>, UpstreamError> {
    let streams = session.streams().await?;
    let chosen = select(&streams, format, quality).cloned();

    match &chosen {
        Some(d) => tracing::debug!(
            "[{}] selected itag {} ({:?}, {} bps) for {} {}",
            session.video_id(),
            d.itag,
            d.resolution,
            d.bitrate.unwrap_or(0),
            format,
            quality
        ),
        None => tracing::debug!(
            "[{}] no {} stream among {} candidates for {}",
            session.video_id(),
            format,
            streams.len(),
            quality
        ),
    }

    Ok(chosen)
}

fn best_audio(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    let mut best: Option<&StreamDescriptor> = None;
    for s in streams.iter().filter(|s| s.is_audio_only()) {
        let bitrate = s.bitrate.unwrap_or(0);
        if best.is_none_or(|b| bitrate > b.bitrate.unwrap_or(0)) {
            best = Some(s);
        }
    }
    best
}

fn muxed_mp4(streams: &[StreamDescriptor]) -> impl Iterator<Item = &StreamDescriptor> {
    streams
        .iter()
        .filter(|s| s.is_progressive() && s.container.eq_ignore_ascii_case("mp4"))
}

fn exact_video<'a>(streams: &'a [StreamDescriptor], quality: &str) -> Option<&'a StreamDescriptor> {
    muxed_mp4(streams).find(|s| {
        s.resolution
            .as_deref()
            .is_some_and(|r| r.eq_ignore_ascii_case(quality))
    })
}

fn highest_video(streams: &[StreamDescriptor]) -> Option<&StreamDescriptor> {
    let mut best: Option<(&StreamDescriptor, u32)> = None;
    for s in muxed_mp4(streams) {
        let height = height_of(s);
        if best.is_none_or(|(_, h)| height > h) {
            best = Some((s, height));
        }
    }
    best.map(|(s, _)| s)
}

fn height_of(s: &StreamDescriptor) -> u32 {
    s.height
        .or_else(|| {
            s.resolution
                .as_deref()
                .and_then(|r| r.trim_end_matches(|c: char| !c.is_ascii_digit()).parse().ok())
        })
        .unwrap_or(0)
}
