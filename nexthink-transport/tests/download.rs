//! Result file downloads.

use std::time::Duration;

use nexthink_transport::{CancellationToken, DownloadError, ResultDownloader};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn test_download_without_auth_header() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/exports/e1.csv"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("a,b\n1,2\n", "text/csv"))
        .expect(1)
        .mount(&server)
        .await;

    let downloader = ResultDownloader::new(Duration::from_secs(5)).unwrap();
    let bytes = downloader
        .download(&format!("{}/exports/e1.csv", server.uri()), &CancellationToken::new())
        .await
        .unwrap();
    assert_eq!(bytes, b"a,b\n1,2\n");

    let requests = server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_non_200_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("expired"))
        .mount(&server)
        .await;

    let downloader = ResultDownloader::new(Duration::from_secs(5)).unwrap();
    let err = downloader
        .download(&format!("{}/exports/e1.csv", server.uri()), &CancellationToken::new())
        .await
        .unwrap_err();

    match err {
        DownloadError::Status { status, body } => {
            assert_eq!(status, 403);
            assert_eq!(body, "expired");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_other_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let downloader = ResultDownloader::new(Duration::from_secs(5)).unwrap();
    let err = downloader
        .download(&server.uri(), &CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, DownloadError::Status { status: 204, .. }));
}
