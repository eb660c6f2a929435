use std::io::Cursor;
use std::net::SocketAddr;
use std::time::Duration;

use base64::prelude::*;
use ed_core::{JobCreated, JobResults};
use ed_server::config::ServerConfig;
use image::{ImageFormat, RgbaImage};
use serde_json::json;
use tokio::net::TcpListener;

async fn spawn_server(url_prefix: &str) -> SocketAddr {
    let config = ServerConfig {
        url_prefix: url_prefix.to_string(),
        ..ServerConfig::default()
    };

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move { ed_server::serve(listener, &config).await.unwrap() });

    addr
}

fn png_base64(width: u32, height: u32) -> String {
    let mut bytes = Vec::new();
    RgbaImage::new(width, height)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    BASE64_STANDARD.encode(bytes)
}

async fn wait_for_results(client: &reqwest::Client, url: &str, count: usize) -> JobResults {
    let mut collected = JobResults::new();
    for _ in 0..200 {
        let batch: JobResults = client.get(url).send().await.unwrap().json().await.unwrap();
        collected.extend(batch);
        if collected.len() >= count {
            return collected;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("only {} of {} results arrived", collected.len(), count);
}

#[tokio::test]
async fn test_job_roundtrip_is_delivered_once() {
    let addr = spawn_server("/user/ana/").await;
    let url = format!("http://{}/user/ana/job", addr);
    let client = reqwest::Client::new();

    let created: JobCreated = client
        .post(&url)
        .json(&json!({ "image": png_base64(32, 16), "params": { "scaleFactor": 1.1, "minNeighbors": 4 } }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let results = wait_for_results(&client, &url, 1).await;
    let encoded = &results[&created.id];
    let annotated = image::load_from_memory(&BASE64_STANDARD.decode(encoded).unwrap()).unwrap();
    assert_eq!((annotated.width(), annotated.height()), (32, 16));

    let again: JobResults = client.get(&url).send().await.unwrap().json().await.unwrap();
    assert!(again.is_empty());
}

#[tokio::test]
async fn test_each_job_gets_its_own_id() {
    let addr = spawn_server("/").await;
    let url = format!("http://{}/job", addr);
    let client = reqwest::Client::new();

    let mut ids = Vec::new();
    for _ in 0..3 {
        let created: JobCreated = client
            .post(&url)
            .json(&json!({ "image": png_base64(8, 8), "params": {} }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        ids.push(created.id);
    }

    let results = wait_for_results(&client, &url, 3).await;
    for id in &ids {
        assert!(results.contains_key(id));
    }
}

#[tokio::test]
async fn test_invalid_base64_is_rejected() {
    let addr = spawn_server("/").await;
    let response = reqwest::Client::new()
        .post(format!("http://{}/job", addr))
        .json(&json!({ "image": "***", "params": {} }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::BAD_REQUEST);
}
