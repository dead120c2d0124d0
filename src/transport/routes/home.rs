use axum::Json;
use serde_json::{Value, json};

/// GET /
pub async fn index() -> Json<Value> {
    Json(json!({
        "message": "API de téléchargement YouTube",
        "endpoints": {
            "download": "GET /download?video_url=URL_YOUTUBE&qualite=360p&type=mp4|mp3",
            "info": "GET /info?video_url=URL_YOUTUBE",
            "recherche": "GET /recherche?video=NOM_VIDEO&max_results=200"
        },
        "example": "/download?video_url=https://www.youtube.com/watch?v=VIDEO_ID"
    }))
}
