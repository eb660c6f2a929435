use std::io::Cursor;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::post;
use ed_app::annotator::client::{HttpJobClient, JobClient};
use ed_app::{Annotator, AppConfig, AppError, DroppedImage, SessionEvent};
use ed_core::{OverlayState, Point, Session};
use ed_server::config::ServerConfig;
use image::{ImageFormat, RgbaImage};
use tokio::net::TcpListener;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbaImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn client_config(backend: &str, prefix: &str) -> AppConfig {
    let page = format!(r#"{{"urlPrefix": "{}"}}"#, prefix);
    let backend = backend.to_string();
    AppConfig::from_lookup(|key| match key {
        "ED_BACKEND_URL" => Some(backend.clone()),
        "ED_PAGE_CONFIG" => Some(page.clone()),
        "ED_POLL_INTERVAL_MS" => Some("50".into()),
        _ => None,
    })
    .unwrap()
}

async fn spawn_job_server(prefix: &str) -> String {
    let config = ServerConfig {
        url_prefix: prefix.to_string(),
        ..ServerConfig::default()
    };
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { ed_server::serve(listener, &config).await.unwrap() });
    format!("http://{}", addr)
}

async fn pump_until(
    annotator: &mut Annotator,
    rx: &mut UnboundedReceiver<SessionEvent>,
    done: impl Fn(&Annotator) -> bool,
) {
    tokio::time::timeout(Duration::from_secs(10), async {
        while !done(annotator) {
            let event = rx.recv().await.expect("event channel closed");
            annotator.handle_event(event);
        }
    })
    .await
    .expect("timed out waiting for the session");
}

#[tokio::test]
async fn test_annotation_roundtrip_against_job_server() {
    let backend = spawn_job_server("/user/ana/").await;
    let config = client_config(&backend, "/user/ana/");
    let client = Arc::new(HttpJobClient::new(&config).unwrap());
    assert_eq!(client.job_url(), format!("{}/user/ana/job", backend));

    let (tx, mut rx) = unbounded_channel();
    let mut annotator = Annotator::new(Session::default(), client, config.poll_interval, tx);

    let ids = annotator.drop_files(
        vec![
            DroppedImage { name: "one.png".into(), bytes: png(120, 80) },
            DroppedImage { name: "two.png".into(), bytes: png(30, 60) },
        ],
        Point::new(400.0, 300.0),
    );
    assert_eq!(ids.len(), 2);

    pump_until(&mut annotator, &mut rx, |a| {
        ids.iter()
            .all(|id| a.session().overlay(*id).unwrap().state == OverlayState::Resolved)
    })
    .await;

    assert!(annotator.session().is_idle());
    assert!(!annotator.is_polling());

    let resolved = annotator.session().overlay(ids[0]).unwrap();
    let annotated = image::load_from_memory(&resolved.content()).unwrap();
    assert_eq!((annotated.width(), annotated.height()), (120, 80));
    assert_eq!(resolved.opacity, 1.0);

    let log: Vec<_> = annotator
        .session()
        .log()
        .entries()
        .iter()
        .map(|e| e.message.as_str())
        .collect();
    assert_eq!(log.iter().filter(|m| m.starts_with("Scheduled task for")).count(), 2);
    assert!(log.contains(&"Task for one.png finished"));
    assert!(log.contains(&"Task for two.png finished"));
}

#[tokio::test]
async fn test_backend_error_surfaces_as_failed_submission() {
    let router = Router::new().route(
        "/job",
        post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "detector offline") }),
    );
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let backend = format!("http://{}", listener.local_addr().unwrap());
    tokio::spawn(async move { axum::serve(listener, router).await.unwrap() });

    let config = client_config(&backend, "/");
    let client = HttpJobClient::new(&config).unwrap();

    let err = client
        .submit(&ed_core::JobRequest { image: String::new(), params: Default::default() })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::BackendError { status: 500, ref body } if body == "detector offline"));

    let (tx, mut rx) = unbounded_channel();
    let mut annotator = Annotator::new(Session::default(), Arc::new(client), config.poll_interval, tx);
    let id = annotator.drop_files(
        vec![DroppedImage { name: "a.png".into(), bytes: png(10, 10) }],
        Point::default(),
    )[0];

    pump_until(&mut annotator, &mut rx, |a| {
        a.session().overlay(id).unwrap().state == OverlayState::Unsubmitted
    })
    .await;

    let last = annotator.session().log().last().unwrap();
    assert!(last.message.starts_with("Failed to schedule task for a.png"));
    assert!(!annotator.is_polling());
}
