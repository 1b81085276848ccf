use httpmock::prelude::*;
use markdown_pdf::http::serve_on;
use markdown_pdf::utils::health::{check_health, HealthOutcome};
use markdown_pdf::{build_router, AppConfig, AppState};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

const TIMEOUT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn test_check_health_healthy() {
    let server = MockServer::start();
    let health = server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(200)
            .header("Content-Type", "application/json")
            .json_body(serde_json::json!({ "status": "ok" }));
    });

    let outcome = check_health(&server.url("/health"), TIMEOUT).await.unwrap();

    health.assert();
    assert_eq!(outcome, HealthOutcome::Healthy { status: 200 });
    assert_eq!(outcome.exit_code(), 0);
}

#[tokio::test]
async fn test_check_health_server_error_is_unhealthy() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/health");
        then.status(500);
    });

    let outcome = check_health(&server.url("/health"), TIMEOUT).await.unwrap();
    assert_eq!(outcome, HealthOutcome::Unhealthy { status: 500 });
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn test_check_health_closed_port_is_unreachable() {
    // 綁定後立即釋放，取得一個沒人監聽的埠
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let outcome = check_health(&format!("http://127.0.0.1:{}/health", port), TIMEOUT)
        .await
        .unwrap();
    assert!(matches!(outcome, HealthOutcome::Unreachable { .. }));
    assert_eq!(outcome.exit_code(), 1);
}

#[tokio::test]
async fn test_check_health_against_running_service() {
    let config = AppConfig::default();
    let app = build_router(AppState::from_config(&config), &config);
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let (stop, stopped) = oneshot::channel::<()>();
    let server = tokio::spawn(serve_on(listener, app, async move {
        let _ = stopped.await;
    }));

    let outcome = check_health(&format!("http://{}/health", addr), TIMEOUT)
        .await
        .unwrap();
    assert!(outcome.is_healthy());

    stop.send(()).unwrap();
    server.await.unwrap().unwrap();
}
