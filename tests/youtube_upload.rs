mod common;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Form, Json, Router};
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use shortform::config::YouTubeConfig;
use shortform::publish::{schedule, Credential, CredentialStore, PublishRequest, YouTubeUploader};
use shortform::Error;

#[derive(Default)]
struct Double {
    base: String,
    token_fails: bool,
    upload_fails: bool,
    token_calls: Mutex<Vec<HashMap<String, String>>>,
    initiations: Mutex<Vec<Initiation>>,
    uploads: Mutex<Vec<Upload>>,
}

struct Initiation {
    auth: Option<String>,
    query: HashMap<String, String>,
    content_length: Option<String>,
    metadata: Value,
}

struct Upload {
    session: String,
    auth: Option<String>,
    bytes: usize,
}

fn auth(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
}

async fn token(
    State(double): State<Arc<Double>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    double.token_calls.lock().unwrap().push(form);
    if double.token_fails {
        return (StatusCode::BAD_REQUEST, r#"{"error":"invalid_grant"}"#).into_response();
    }
    Json(json!({"access_token": "ya29.fresh", "expires_in": 3599, "token_type": "Bearer"}))
        .into_response()
}

async fn initiate(
    State(double): State<Arc<Double>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(metadata): Json<Value>,
) -> Response {
    double.initiations.lock().unwrap().push(Initiation {
        auth: auth(&headers),
        query,
        content_length: headers
            .get("x-upload-content-length")
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned),
        metadata,
    });
    (
        StatusCode::OK,
        [(header::LOCATION, format!("{}/upload/session/42", double.base))],
        "",
    )
        .into_response()
}

async fn upload(
    State(double): State<Arc<Double>>,
    Path(session): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    double.uploads.lock().unwrap().push(Upload {
        session,
        auth: auth(&headers),
        bytes: body.len(),
    });
    if double.upload_fails {
        return (
            StatusCode::FORBIDDEN,
            r#"{"error":{"code":403,"message":"quotaExceeded"}}"#,
        )
            .into_response();
    }
    Json(json!({"kind": "youtube#video", "id": "yt-abc123"})).into_response()
}

async fn channels(headers: HeaderMap) -> Response {
    if auth(&headers).is_none() {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({"items": [{"snippet": {"title": "GenITeacher"}}]})).into_response()
}

async fn start(configure: impl FnOnce(&mut Double)) -> (Arc<Double>, YouTubeConfig) {
    let (listener, base) = common::bind().await;
    let mut double = Double {
        base: base.clone(),
        ..Default::default()
    };
    configure(&mut double);
    let double = Arc::new(double);

    let router = Router::new()
        .route("/token", post(token))
        .route("/upload/youtube/v3/videos", post(initiate))
        .route("/upload/session/:id", put(upload))
        .route("/youtube/v3/channels", get(channels))
        .with_state(double.clone());
    common::spawn(listener, router);

    let config = YouTubeConfig {
        upload_url: format!("{base}/upload/youtube/v3/videos"),
        api_url: format!("{base}/youtube/v3"),
        token_url: format!("{base}/token"),
        ..Default::default()
    };
    (double, config)
}

fn credential(expired: bool) -> Credential {
    Credential {
        token: "ya29.old".to_owned(),
        refresh_token: Some("1//refresh".to_owned()),
        token_uri: None,
        client_id: Some("client-id".to_owned()),
        client_secret: Some("client-secret".to_owned()),
        scopes: vec!["https://www.googleapis.com/auth/youtube.upload".to_owned()],
        expiry: Some(if expired {
            Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap()
        } else {
            Utc.with_ymd_and_hms(2999, 1, 1, 0, 0, 0).unwrap()
        }),
    }
}

#[tokio::test]
async fn uploads_with_stored_credential() {
    let (double, config) = start(|_| {}).await;
    let dir = tempfile::tempdir().unwrap();
    let video = common::fake_video(dir.path(), "short.mp4");
    let store = CredentialStore::new(dir.path().join("token.json"));
    store.save(&credential(false)).unwrap();

    let request = PublishRequest::new(&video, "GenITeacher – Pages Into Light")
        .with_description("지식이 빛이 됩니다.")
        .with_tags(["GenITeacher", "AI교육"]);
    let uploader = YouTubeUploader::new(reqwest::Client::new(), &config);
    let result = uploader.upload_video(&store, &request).await.unwrap();

    assert_eq!(result.id, "yt-abc123");
    assert_eq!(result.url, "https://youtube.com/shorts/yt-abc123");
    assert_eq!(result.title, "GenITeacher – Pages Into Light");
    assert!(double.token_calls.lock().unwrap().is_empty());

    let initiations = double.initiations.lock().unwrap();
    assert_eq!(initiations.len(), 1);
    let init = &initiations[0];
    assert_eq!(init.auth.as_deref(), Some("Bearer ya29.old"));
    assert_eq!(init.query["uploadType"], "resumable");
    assert_eq!(init.query["part"], "snippet,status");
    assert_eq!(init.content_length.as_deref(), Some("4096"));
    assert_eq!(
        init.metadata["snippet"]["tags"],
        json!(["GenITeacher", "AI교육", "shorts"])
    );
    assert_eq!(init.metadata["snippet"]["categoryId"], "22");
    assert_eq!(init.metadata["status"]["privacyStatus"], "private");
    assert_eq!(init.metadata["status"]["selfDeclaredMadeForKids"], false);
    assert!(init.metadata["status"].get("publishAt").is_none());

    let uploads = double.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].session, "42");
    assert_eq!(uploads[0].auth.as_deref(), Some("Bearer ya29.old"));
    assert_eq!(uploads[0].bytes, 4096);
}

#[tokio::test]
async fn expired_credential_is_refreshed_and_persisted() {
    let (double, config) = start(|_| {}).await;
    let dir = tempfile::tempdir().unwrap();
    let video = common::fake_video(dir.path(), "short.mp4");
    let store = CredentialStore::new(dir.path().join("token.json"));
    store.save(&credential(true)).unwrap();

    let uploader = YouTubeUploader::new(reqwest::Client::new(), &config);
    uploader
        .upload_video(&store, &PublishRequest::new(&video, "t"))
        .await
        .unwrap();

    let token_calls = double.token_calls.lock().unwrap();
    assert_eq!(token_calls.len(), 1);
    assert_eq!(token_calls[0]["grant_type"], "refresh_token");
    assert_eq!(token_calls[0]["refresh_token"], "1//refresh");
    assert_eq!(token_calls[0]["client_id"], "client-id");

    let saved = store.load().unwrap();
    assert_eq!(saved.token, "ya29.fresh");
    assert_eq!(saved.refresh_token.as_deref(), Some("1//refresh"));
    assert!(!saved.is_expired());

    assert_eq!(
        double.initiations.lock().unwrap()[0].auth.as_deref(),
        Some("Bearer ya29.fresh")
    );
}

#[tokio::test]
async fn rejected_refresh_is_credential_invalid() {
    let (double, config) = start(|d| d.token_fails = true).await;
    let dir = tempfile::tempdir().unwrap();
    let video = common::fake_video(dir.path(), "short.mp4");
    let store = CredentialStore::new(dir.path().join("token.json"));
    store.save(&credential(true)).unwrap();

    let uploader = YouTubeUploader::new(reqwest::Client::new(), &config);
    let err = uploader
        .upload_video(&store, &PublishRequest::new(&video, "t"))
        .await
        .unwrap_err();

    match err {
        Error::CredentialInvalid(msg) => assert!(msg.contains("invalid_grant"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
    assert!(double.initiations.lock().unwrap().is_empty());
    assert_eq!(store.load().unwrap().token, "ya29.old");
}

#[tokio::test]
async fn missing_credential_fails_before_any_request() {
    let (double, config) = start(|_| {}).await;
    let dir = tempfile::tempdir().unwrap();
    let video = common::fake_video(dir.path(), "short.mp4");
    let store = CredentialStore::new(dir.path().join("absent.json"));

    let uploader = YouTubeUploader::new(reqwest::Client::new(), &config);
    let err = uploader
        .upload_video(&store, &PublishRequest::new(&video, "t"))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::CredentialMissing(_)));
    assert!(double.token_calls.lock().unwrap().is_empty());
    assert!(double.initiations.lock().unwrap().is_empty());
    assert!(double.uploads.lock().unwrap().is_empty());
}

#[tokio::test]
async fn platform_rejection_carries_payload() {
    let (_double, config) = start(|d| d.upload_fails = true).await;
    let dir = tempfile::tempdir().unwrap();
    let video = common::fake_video(dir.path(), "short.mp4");
    let store = CredentialStore::new(dir.path().join("token.json"));
    store.save(&credential(false)).unwrap();

    let uploader = YouTubeUploader::new(reqwest::Client::new(), &config);
    let err = uploader
        .upload_video(&store, &PublishRequest::new(&video, "t"))
        .await
        .unwrap_err();

    match err {
        Error::UploadFailed(msg) => assert!(msg.contains("quotaExceeded"), "{msg}"),
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn scheduled_upload_sends_utc_publish_time() {
    let (double, config) = start(|_| {}).await;
    let dir = tempfile::tempdir().unwrap();
    let video = common::fake_video(dir.path(), "short.mp4");
    let store = CredentialStore::new(dir.path().join("token.json"));
    store.save(&credential(false)).unwrap();

    let publish_at = schedule::parse_local("2025-01-01 12:00", 9).unwrap();
    let request = PublishRequest::new(&video, "later").with_publish_at(Some(publish_at));
    YouTubeUploader::new(reqwest::Client::new(), &config)
        .upload_video(&store, &request)
        .await
        .unwrap();

    let initiations = double.initiations.lock().unwrap();
    assert_eq!(
        initiations[0].metadata["status"]["publishAt"],
        "2025-01-01T03:00:00.000Z"
    );
    assert_eq!(initiations[0].metadata["status"]["privacyStatus"], "private");
}

#[tokio::test]
async fn oversized_request_is_truncated_not_rejected() {
    let (double, config) = start(|_| {}).await;
    let dir = tempfile::tempdir().unwrap();
    let video = common::fake_video(dir.path(), "short.mp4");
    let store = CredentialStore::new(dir.path().join("token.json"));
    store.save(&credential(false)).unwrap();

    let request = PublishRequest::new(&video, "가".repeat(130))
        .with_tags((0..600).map(|i| format!("t{i}")));
    let result = YouTubeUploader::new(reqwest::Client::new(), &config)
        .upload_video(&store, &request)
        .await
        .unwrap();
    assert_eq!(result.id, "yt-abc123");

    let initiations = double.initiations.lock().unwrap();
    let snippet = &initiations[0].metadata["snippet"];
    assert_eq!(snippet["title"].as_str().unwrap().chars().count(), 100);
    let tags = snippet["tags"].as_array().unwrap();
    assert_eq!(tags.len(), 500);
    assert_eq!(tags[499], "shorts");
}

#[tokio::test]
async fn channel_title_for_connection_check() {
    let (_double, config) = start(|_| {}).await;
    let dir = tempfile::tempdir().unwrap();
    let store = CredentialStore::new(dir.path().join("token.json"));
    store.save(&credential(false)).unwrap();

    let title = YouTubeUploader::new(reqwest::Client::new(), &config)
        .channel_title(&store)
        .await
        .unwrap();
    assert_eq!(title.as_deref(), Some("GenITeacher"));
}
