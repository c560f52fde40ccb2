//! YouTube Data API resumable upload.
//!
//! Two phases: a POST with the video resource opens an upload session
//! (its URI comes back in `Location`), then the file is PUT to that URI in
//! chunks. Each intermediate chunk is acknowledged with `308 Resume
//! Incomplete` and a `Range` header naming the bytes stored so far; the
//! final chunk returns the created video resource.

use std::io::SeekFrom;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_RANGE, CONTENT_TYPE, LOCATION, RANGE};
use reqwest::{Client, StatusCode};
use serde_json::json;
use tokio::io::{AsyncReadExt, AsyncSeekExt};
use tracing::{debug, info};

use crate::config::UploadConfig;
use crate::error::{UploadError, UploadResult};

/// Fraction of the file acknowledged by the service, in `[0.0, 1.0]`.
pub type ProgressCallback = Arc<dyn Fn(f64) + Send + Sync>;

/// Chunks in a row that may leave the acknowledged offset unchanged.
const MAX_STALLED_CHUNKS: u32 = 3;

const VIDEO_MIME: &str = "video/mp4";

/// A video ready to be sent, with final metadata.
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub path: PathBuf,
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Remote hosting service accepting video uploads.
#[async_trait]
pub trait VideoHost: Send + Sync {
    /// Upload a video and return its remote id.
    async fn upload_video(
        &self,
        access_token: &str,
        video: &VideoUpload,
        progress: Option<ProgressCallback>,
    ) -> UploadResult<String>;
}

/// Resumable upload client for `videos.insert`.
pub struct YouTubeClient {
    http: Client,
    upload_url: String,
    chunk_size: usize,
    category_id: String,
    language: String,
}

impl YouTubeClient {
    pub fn new(config: &UploadConfig) -> UploadResult<Self> {
        // 308 here means "resume incomplete", not a redirect.
        let http = Client::builder()
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("shortgen-upload/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            upload_url: config.upload_url.clone(),
            chunk_size: config.chunk_size,
            category_id: config.category_id.clone(),
            language: config.default_language.clone(),
        })
    }

    fn video_resource(&self, video: &VideoUpload) -> serde_json::Value {
        json!({
            "snippet": {
                "title": video.title,
                "description": video.description,
                "tags": video.tags,
                "categoryId": self.category_id,
                "defaultLanguage": self.language,
                "defaultAudioLanguage": self.language
            },
            "status": {
                "privacyStatus": "public",
                "madeForKids": false,
                "selfDeclaredMadeForKids": false
            }
        })
    }

    /// Open an upload session and return its URI.
    async fn start_session(
        &self,
        access_token: &str,
        video: &VideoUpload,
        total: u64,
    ) -> UploadResult<String> {
        let resp = self
            .http
            .post(&self.upload_url)
            .query(&[("uploadType", "resumable"), ("part", "snippet,status")])
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .header("X-Upload-Content-Type", VIDEO_MIME)
            .header("X-Upload-Content-Length", total.to_string())
            .json(&self.video_resource(video))
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let text = resp.text().await.unwrap_or_default();
            return Err(UploadError::from_http_status(status, text));
        }

        resp.headers()
            .get(LOCATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| UploadError::malformed("No Location header in upload session response"))
    }

    async fn send_chunk(
        &self,
        session_uri: &str,
        access_token: &str,
        content_range: String,
        bytes: Vec<u8>,
    ) -> UploadResult<ChunkReply> {
        let resp = self
            .http
            .put(session_uri)
            .header(AUTHORIZATION, format!("Bearer {access_token}"))
            .header(CONTENT_TYPE, VIDEO_MIME)
            .header(CONTENT_RANGE, content_range)
            .body(bytes)
            .send()
            .await?;

        match resp.status() {
            StatusCode::PERMANENT_REDIRECT => {
                let next = resp
                    .headers()
                    .get(RANGE)
                    .and_then(|v| v.to_str().ok())
                    .and_then(next_offset_from_range)
                    .unwrap_or(0);
                Ok(ChunkReply::Incomplete(next))
            }
            StatusCode::OK | StatusCode::CREATED => {
                let body: serde_json::Value = resp
                    .json()
                    .await
                    .map_err(|e| UploadError::malformed(format!("Invalid video resource: {e}")))?;
                Ok(ChunkReply::Done(body))
            }
            status => {
                let text = resp.text().await.unwrap_or_default();
                Err(UploadError::from_http_status(status.as_u16(), text))
            }
        }
    }
}

enum ChunkReply {
    /// Session still open; next byte offset to send.
    Incomplete(u64),
    /// Upload finished; the created resource.
    Done(serde_json::Value),
}

#[async_trait]
impl VideoHost for YouTubeClient {
    async fn upload_video(
        &self,
        access_token: &str,
        video: &VideoUpload,
        progress: Option<ProgressCallback>,
    ) -> UploadResult<String> {
        let mut file = tokio::fs::File::open(&video.path).await?;
        let total = file.metadata().await?.len();

        let session_uri = self.start_session(access_token, video, total).await?;
        debug!(total_bytes = total, "Upload session opened");

        let mut offset = 0u64;
        let mut stalled = 0u32;
        loop {
            let len = (total - offset).min(self.chunk_size as u64);
            let content_range = if len == 0 {
                format!("bytes */{total}")
            } else {
                format!("bytes {}-{}/{}", offset, offset + len - 1, total)
            };

            let mut buf = vec![0u8; len as usize];
            file.seek(SeekFrom::Start(offset)).await?;
            file.read_exact(&mut buf).await?;

            match self
                .send_chunk(&session_uri, access_token, content_range, buf)
                .await?
            {
                ChunkReply::Done(resource) => {
                    let id = resource
                        .get("id")
                        .and_then(|id| id.as_str())
                        .map(str::to_string)
                        .ok_or_else(|| UploadError::malformed(format!("Upload failed: {resource}")))?;
                    if let Some(cb) = &progress {
                        cb(1.0);
                    }
                    return Ok(id);
                }
                ChunkReply::Incomplete(next) => {
                    if next <= offset {
                        stalled += 1;
                        if stalled >= MAX_STALLED_CHUNKS {
                            return Err(UploadError::TransientService(
                                StatusCode::PERMANENT_REDIRECT.as_u16(),
                                format!("Upload stalled at byte {offset}"),
                            ));
                        }
                    } else {
                        stalled = 0;
                    }
                    offset = next.min(total);

                    let fraction = if total == 0 { 1.0 } else { offset as f64 / total as f64 };
                    info!("Upload progress {}%", (fraction * 100.0) as u32);
                    if let Some(cb) = &progress {
                        cb(fraction);
                    }
                }
            }
        }
    }
}

/// Parse a `Range: bytes=0-N` acknowledgement into the next offset (N+1).
fn next_offset_from_range(range: &str) -> Option<u64> {
    let (_, end) = range.trim().strip_prefix("bytes=")?.split_once('-')?;
    end.trim().parse::<u64>().ok().map(|n| n + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const CHUNK: usize = crate::config::CHUNK_GRANULARITY;

    fn client(server: &MockServer) -> YouTubeClient {
        let config = UploadConfig {
            upload_url: format!("{}/upload/youtube/v3/videos", server.uri()),
            ..UploadConfig::default()
        }
        .with_chunk_size(CHUNK);
        YouTubeClient::new(&config).unwrap()
    }

    fn video(dir: &tempfile::TempDir, bytes: usize) -> VideoUpload {
        let path = dir.path().join("short.mp4");
        std::fs::write(&path, vec![7u8; bytes]).unwrap();
        VideoUpload {
            path,
            title: "Title #Shorts".to_string(),
            description: "d".repeat(4000),
            tags: vec!["shorts".to_string()],
        }
    }

    async fn mount_session(server: &MockServer) {
        Mock::given(method("POST"))
            .and(path("/upload/youtube/v3/videos"))
            .and(query_param("uploadType", "resumable"))
            .and(query_param("part", "snippet,status"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Location", format!("{}/session/1", server.uri()).as_str()),
            )
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_next_offset_from_range() {
        assert_eq!(next_offset_from_range("bytes=0-262143"), Some(262144));
        assert_eq!(next_offset_from_range("garbage"), None);
    }

    #[tokio::test]
    async fn test_chunked_upload_reports_progress() {
        let server = MockServer::start().await;
        mount_session(&server).await;

        let total = CHUNK * 2 + 10;
        for (start, end) in [(0, CHUNK - 1), (CHUNK, 2 * CHUNK - 1)] {
            Mock::given(method("PUT"))
                .and(path("/session/1"))
                .and(header(
                    "content-range",
                    format!("bytes {start}-{end}/{total}").as_str(),
                ))
                .respond_with(
                    ResponseTemplate::new(308)
                        .insert_header("Range", format!("bytes=0-{end}").as_str()),
                )
                .expect(1)
                .mount(&server)
                .await;
        }
        Mock::given(method("PUT"))
            .and(path("/session/1"))
            .and(header(
                "content-range",
                format!("bytes {}-{}/{}", 2 * CHUNK, total - 1, total).as_str(),
            ))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({ "id": "vid123" })))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let progress: ProgressCallback = Arc::new(move |f| sink.lock().unwrap().push(f));

        let id = client(&server)
            .upload_video("tok", &video(&dir, total), Some(progress))
            .await
            .unwrap();
        assert_eq!(id, "vid123");

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 3);
        assert!(seen.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(*seen.last().unwrap(), 1.0);
    }

    #[tokio::test]
    async fn test_missing_id_is_malformed() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "kind": "youtube#video" })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = client(&server)
            .upload_video("tok", &video(&dir, 100), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_chunk_error_aborts_upload() {
        let server = MockServer::start().await;
        mount_session(&server).await;
        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(503).set_body_string("backendError"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = client(&server)
            .upload_video("tok", &video(&dir, CHUNK * 3), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::TransientService(503, _)));
    }

    #[tokio::test]
    async fn test_session_rejected_for_quota() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string(
                r#"{"error":{"errors":[{"reason":"quotaExceeded"}]}}"#,
            ))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let err = client(&server)
            .upload_video("tok", &video(&dir, 100), None)
            .await
            .unwrap_err();
        assert!(matches!(err, UploadError::QuotaExceeded(_)));
    }

    #[test]
    fn test_video_resource_fields() {
        let config = UploadConfig::default();
        let client = YouTubeClient::new(&config).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let body = client.video_resource(&video(&dir, 1));
        assert_eq!(body["snippet"]["categoryId"], "22");
        assert_eq!(body["snippet"]["defaultAudioLanguage"], "en");
        assert_eq!(body["status"]["privacyStatus"], "public");
        assert_eq!(body["status"]["madeForKids"], false);
        assert_eq!(body["status"]["selfDeclaredMadeForKids"], false);
    }
}
