mod common;

use axum::http::{StatusCode, header};
use common::*;
use tubelink::{
    configs::Config,
    sources::youtube::search::{ApiKeySource, YouTubeDataApi},
    transport::middleware::VERSION_HEADER,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

const WATCH: &str = "https://youtu.be/dQw4w9WgXcQ";

fn media(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 256) as u8).collect()
}

#[tokio::test]
async fn index_lists_endpoints() {
    let app = app(FakeExtractor::serving(vec![]), FakeSearch::with_results(0));
    let response = get(app, "/").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key(VERSION_HEADER));
    let body = body_json(response).await;
    assert!(body["endpoints"]["download"].as_str().unwrap().contains("/download"));
    assert!(body["endpoints"]["recherche"].is_string());
}

#[tokio::test]
async fn missing_video_url_is_rejected_without_upstream_calls() {
    let extractor = FakeExtractor::serving(vec![]);

    for uri in ["/download", "/info", "/download?qualite=720p", "/info?video_url="] {
        let response = get(app(extractor.clone(), FakeSearch::with_results(0)), uri).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body_json(response).await["error"], "Paramètre 'video_url' requis");
    }

    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn foreign_url_and_bad_type_are_rejected() {
    let extractor = FakeExtractor::serving(vec![]);

    let response = get(
        app(extractor.clone(), FakeSearch::with_results(0)),
        "/info?video_url=https://vimeo.com/123",
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get(
        app(extractor.clone(), FakeSearch::with_results(0)),
        &format!("/download?video_url={WATCH}&type=avi"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("avi")
    );

    assert_eq!(extractor.calls(), 0);
}

#[tokio::test]
async fn info_lists_progressive_mp4_streams() {
    let extractor = FakeExtractor::serving(vec![
        progressive(18, 360, "https://media.test/18", Some(1_234_567)),
        progressive(22, 720, "https://media.test/22", None),
        video_only(137, 1080, "https://media.test/137"),
        audio_only(140, 128_000, "https://media.test/140"),
    ]);

    let response = get(
        app(extractor.clone(), FakeSearch::with_results(0)),
        &format!("/info?video_url={WATCH}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["title"], "Never Gonna Give You Up");
    assert_eq!(body["author"], "Rick Astley");
    assert_eq!(body["length_seconds"], 212);

    let streams = body["available_streams"].as_array().unwrap();
    assert_eq!(streams.len(), 2);
    assert_eq!(streams[0]["resolution"], "360p");
    assert_eq!(streams[0]["size_mb"], 1.18);
    assert_eq!(streams[1]["resolution"], "720p");
    assert_eq!(streams[1]["size_mb"], "inconnu");

    assert_eq!(extractor.calls(), 1);
}

#[tokio::test]
async fn throttling_everywhere_maps_to_429_with_retry_hint() {
    let extractor = FakeExtractor::failing(429);
    let mut config = Config::default();
    config.youtube.max_attempts = 3;

    let response = get(
        app_with_config(extractor.clone(), FakeSearch::with_results(0), config),
        &format!("/info?video_url={WATCH}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.headers()[header::RETRY_AFTER], "60");
    let body = body_json(response).await;
    assert_eq!(body["retry_after"], 60);
    assert_eq!(body["code"], 429);
    assert!(body["error"].is_string());

    // three playback profiles, then two fallback attempts
    assert_eq!(extractor.calls(), 5);
}

#[tokio::test]
async fn forbidden_everywhere_maps_to_500() {
    let response = get(
        app(FakeExtractor::failing(403), FakeSearch::with_results(0)),
        &format!("/download?video_url={WATCH}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body_json(response).await.get("retry_after").is_none());
}

#[tokio::test]
async fn no_progressive_stream_is_404() {
    let extractor = FakeExtractor::serving(vec![
        video_only(137, 1080, "https://media.test/137"),
        audio_only(140, 128_000, "https://media.test/140"),
    ]);

    let response = get(
        app(extractor, FakeSearch::with_results(0)),
        &format!("/download?video_url={WATCH}&qualite=720p"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_streams_the_selected_variant() {
    let server = MockServer::start().await;
    let payload = media(50_000);

    Mock::given(method("GET"))
        .and(path("/videoplayback/22"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(payload.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = FakeExtractor::serving(vec![
        progressive(18, 360, &format!("{}/videoplayback/18", server.uri()), Some(10)),
        progressive(22, 720, &format!("{}/videoplayback/22", server.uri()), Some(50_000)),
    ]);

    let response = get(
        app(extractor, FakeSearch::with_results(0)),
        &format!("/download?video_url={WATCH}&qualite=720p&type=mp4"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers[header::CONTENT_TYPE], "video/mp4");
    assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
    assert_eq!(headers["x-accel-buffering"], "no");
    assert_eq!(headers[header::CONTENT_LENGTH], "50000");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Never%20Gonna%20Give%20You%20Up_720p.mp4\""
    );

    assert_eq!(body_bytes(response).await, payload);
}

#[tokio::test]
async fn unknown_quality_falls_back_to_highest_progressive() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videoplayback/22"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"seven-twenty".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = FakeExtractor::serving(vec![
        progressive(18, 360, &format!("{}/videoplayback/18", server.uri()), None),
        progressive(22, 720, &format!("{}/videoplayback/22", server.uri()), None),
    ]);

    let response = get(
        app(extractor, FakeSearch::with_results(0)),
        &format!("/download?video_url={WATCH}&qualite=480p"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    // descriptor carried no size, so no length is announced
    assert!(response.headers().get(header::CONTENT_LENGTH).is_none());
    assert_eq!(body_bytes(response).await, b"seven-twenty");
}

#[tokio::test]
async fn mp3_download_uses_best_audio_and_audio_content_type() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/audio/251"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"opus-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let extractor = FakeExtractor::serving(vec![
        progressive(18, 360, &format!("{}/video/18", server.uri()), None),
        audio_only(140, 128_000, &format!("{}/audio/140", server.uri())),
        audio_only(251, 160_000, &format!("{}/audio/251", server.uri())),
    ]);

    let response = get(
        app(extractor, FakeSearch::with_results(0)),
        &format!("/download?video_url={WATCH}&type=mp3"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/mpeg");
    assert!(
        response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .ends_with("_360p.mp3\"")
    );
    assert_eq!(body_bytes(response).await, b"opus-bytes");
}

#[tokio::test]
async fn media_server_refusal_fails_before_headers() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videoplayback/18"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let extractor = FakeExtractor::serving(vec![progressive(
        18,
        360,
        &format!("{}/videoplayback/18", server.uri()),
        Some(100),
    )]);

    let response = get(
        app(extractor, FakeSearch::with_results(0)),
        &format!("/download?video_url={WATCH}"),
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    assert!(body_json(response).await["error"].as_str().unwrap().contains("403"));
}

#[tokio::test]
async fn search_requires_a_query() {
    let search = FakeSearch::with_results(10);
    let response = get(app(FakeExtractor::serving(vec![]), search.clone()), "/recherche").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Paramètre 'video' requis");
    assert_eq!(search.pages.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn search_paginates_up_to_max_results() {
    let search = FakeSearch::with_results(1_000);
    let response = get(
        app(FakeExtractor::serving(vec![]), search.clone()),
        "/recherche?video=rust%20lang&max_results=120",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["recherche"], "rust lang");
    assert_eq!(body["nombre_resultats"], 120);
    assert_eq!(body["max_demande"], 120);
    assert_eq!(body["videos"].as_array().unwrap().len(), 120);
    assert_eq!(body["videos"][0]["titre"], "Titre vid00000000");
    assert_eq!(search.pages.load(std::sync::atomic::Ordering::SeqCst), 3);
}

#[tokio::test]
async fn search_defaults_and_clamps_max_results() {
    let search = FakeSearch::with_results(10_000);
    let response = get(
        app(FakeExtractor::serving(vec![]), search.clone()),
        "/recherche?video=music",
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["nombre_resultats"], 200);

    let response = get(
        app(FakeExtractor::serving(vec![]), search),
        "/recherche?video=music&max_results=100000",
    )
    .await;
    let body = body_json(response).await;
    assert_eq!(body["max_demande"], 500);
    assert_eq!(body["nombre_resultats"], 500);
}

#[tokio::test]
async fn malformed_max_results_is_a_json_400() {
    let search = FakeSearch::with_results(10);

    for raw in ["abc", "-1", "2.5"] {
        let response = get(
            app(FakeExtractor::serving(vec![]), search.clone()),
            &format!("/recherche?video=rust&max_results={raw}"),
        )
        .await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{raw}");
        assert_eq!(
            body_json(response).await["error"],
            format!("Paramètre 'max_results' invalide: {raw}")
        );
    }
    assert_eq!(search.pages.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[tokio::test]
async fn missing_api_key_is_a_server_error() {
    let search = std::sync::Arc::new(YouTubeDataApi::new(
        reqwest::Client::new(),
        "http://127.0.0.1:9",
        ApiKeySource::Env("TUBELINK_ROUTES_TEST_UNSET_KEY".into()),
    ));

    let response = get(
        app(FakeExtractor::serving(vec![]), search),
        "/recherche?video=rust",
    )
    .await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("TUBELINK_ROUTES_TEST_UNSET_KEY")
    );
}
