//! Segment to pending short, then a detached upload batch.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use shortgen_ai::{fallback_metadata, AiConfig, CredentialPool};
use shortgen_models::text::word_count;
use shortgen_models::{
    normalize_description, Job, JobProgress, OAuthCredential, UploadStatus,
    DESCRIPTION_MAX_CHARS, DESCRIPTION_MIN_CHARS,
};
use shortgen_upload::{
    BatchUploadManager, CredentialResolver, CredentialStore, GoogleIdentityProvider,
    InMemoryStore, JobStore, UploadConfig, UploadCoordinator, YouTubeClient,
};
use shortgen_worker::{ShortPreparer, UploadDispatcher};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEGMENT: &str = "This is so funny, everyone was laughing at the joke and the crazy ending";
const ACCOUNT: &str = "creator@example.com";

fn no_keys() -> Arc<CredentialPool> {
    Arc::new(CredentialPool::new(Vec::<String>::new()))
}

#[tokio::test]
async fn test_prepare_without_keys_uses_fallback_metadata() {
    let store = Arc::new(InMemoryStore::new());
    let job = Job::new("https://youtu.be/source", "Stand-up night");
    store.insert_job(job.clone()).await.unwrap();

    let preparer = ShortPreparer::new(&AiConfig::default(), no_keys(), store.clone()).unwrap();
    let record = preparer
        .prepare(&job, SEGMENT, "/out/short-1.mp4")
        .await
        .unwrap();

    let expected = fallback_metadata(SEGMENT, &job.original_title);
    assert_eq!(record.title.as_deref(), Some(expected.title.as_str()));
    assert_eq!(record.tags, expected.tags);
    // Stored as the long-form draft; the length contract applies at upload.
    let description = record.description.as_deref().unwrap();
    assert_eq!(description, expected.description);
    assert!(word_count(description) >= 1500);
    let len = normalize_description(description).chars().count();
    assert!((DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&len));

    let shorts = store.shorts_for_job(&job.id).await.unwrap();
    assert_eq!(shorts.len(), 1);
    assert_eq!(shorts[0].upload_status, UploadStatus::Pending);

    let scored = preparer.score(SEGMENT).await;
    assert!(scored.emotions.iter().any(|e| e == "humor"));
}

#[tokio::test]
async fn test_dispatched_batch_records_failure_on_short() {
    let server = MockServer::start().await;
    // Nothing reaches the hosting service: the only short has no media file.
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    store
        .save_credential(ACCOUNT, &OAuthCredential::new("access"))
        .await
        .unwrap();
    let job = Job::new("https://youtu.be/source", "Source");
    store.insert_job(job.clone()).await.unwrap();

    let dir = tempfile::tempdir().unwrap();
    let preparer = ShortPreparer::new(&AiConfig::default(), no_keys(), store.clone()).unwrap();
    let record = preparer
        .prepare(&job, SEGMENT, dir.path().join("never-rendered.mp4"))
        .await
        .unwrap();

    let config = UploadConfig {
        upload_url: format!("{}/upload", server.uri()),
        token_url: format!("{}/token", server.uri()),
        ..UploadConfig::default()
    };
    let resolver = CredentialResolver::new(
        store.clone(),
        Arc::new(GoogleIdentityProvider::new(&config).unwrap()),
    );
    let coordinator = UploadCoordinator::new(
        store.clone(),
        resolver,
        Arc::new(YouTubeClient::new(&config).unwrap()),
    );
    let manager = Arc::new(BatchUploadManager::new(store.clone(), coordinator));

    UploadDispatcher::new(manager).submit(job.id.clone(), ACCOUNT.to_string());

    let progress = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let shorts = store.shorts_for_job(&job.id).await.unwrap();
            let progress = JobProgress::from_records(&shorts);
            if progress.is_complete() {
                return progress;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("batch did not finish");

    assert_eq!(progress.failed, 1);
    let saved = store.get_short(&record.id).await.unwrap().unwrap();
    assert!(saved
        .upload_error
        .as_deref()
        .unwrap()
        .starts_with("[media_not_found]"));
}
