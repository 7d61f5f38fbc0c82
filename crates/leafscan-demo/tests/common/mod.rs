//! Shared fixtures for the demo server tests
//!
//! Provides a configurable stub classifier, encoded test images, and a
//! hand-built multipart body so requests can be sent straight into the
//! router without a listener.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use leafscan_classifiers::{ImageClassifier, SharedClassifier};
use leafscan_core::prelude::{ClassProbabilities, InferenceError, LoadError};
use leafscan_demo::config::AppConfig;
use leafscan_demo::state::{AppState, ModelStatus};
use leafscan_demo::transient::TransientMode;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

pub const BOUNDARY: &str = "leafscan-test-boundary";

/// A classifier that returns a fixed distribution
pub struct StubClassifier {
    labels: Vec<String>,
    probabilities: Vec<f32>,
    failure: Option<String>,
    call_count: AtomicU32,
}

impl StubClassifier {
    /// Fixed label table and distribution
    pub fn new(labels: &[&str], probabilities: &[f32]) -> Self {
        Self {
            labels: labels.iter().map(|s| s.to_string()).collect(),
            probabilities: probabilities.to_vec(),
            failure: None,
            call_count: AtomicU32::new(0),
        }
    }

    /// A classifier whose top-1 is `Potato_healthy` at 0.95
    pub fn healthy_potato() -> Self {
        Self::new(
            &["Potato_Early_blight", "Potato_healthy", "Potato_Late_blight"],
            &[0.03, 0.95, 0.02],
        )
    }

    /// A classifier whose top-1 is `Tomato_Late_blight`
    pub fn tomato_blight() -> Self {
        Self::new(&["Tomato_healthy", "Tomato_Late_blight"], &[0.1266, 0.8734])
    }

    /// Fail every call with a runtime error
    pub fn failing(mut self, reason: &str) -> Self {
        self.failure = Some(reason.to_string());
        self
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::SeqCst)
    }
}

impl ImageClassifier for StubClassifier {
    fn classify_file(&self, path: &Path) -> Result<ClassProbabilities, InferenceError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.failure {
            return Err(InferenceError::runtime(reason));
        }
        image::open(path).map_err(InferenceError::image)?;
        Ok(ClassProbabilities::new(
            self.probabilities.clone(),
            self.labels.clone().into(),
        ))
    }

    fn name(&self) -> &str {
        "stub"
    }

    fn labels(&self) -> &[String] {
        &self.labels
    }
}

/// Config that keeps transient files inside `dir`
pub fn config_in(dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.transient.mode = TransientMode::Unique;
    config.transient.dir = Some(dir.to_path_buf());
    config
}

pub fn ready_state(classifier: Arc<StubClassifier>, dir: &Path) -> AppState {
    AppState::new(
        config_in(dir),
        ModelStatus::Ready(classifier as SharedClassifier),
        None,
    )
}

pub fn unavailable_state(dir: &Path) -> AppState {
    let error = LoadError::NotFound {
        path: PathBuf::from("best.safetensors"),
    };
    AppState::new(config_in(dir), ModelStatus::Unavailable(Arc::new(error)), None)
}

pub fn leaf_bytes(format: ImageFormat) -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_fn(48, 32, |x, y| {
        Rgb([(x * 4) as u8, 100 + (y * 3) as u8, 50])
    }));
    let mut buf = Cursor::new(Vec::new());
    image
        .write_to(&mut buf, format)
        .expect("failed to encode test image");
    buf.into_inner()
}

pub fn gif_bytes() -> Vec<u8> {
    b"GIF89a\x01\x00\x01\x00\x80\x00\x00\x00\x00\x00\xff\xff\xff!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;".to_vec()
}

/// Build a multipart body with an optional source and image part
pub fn multipart_body(source: Option<&str>, image: Option<&[u8]>) -> Vec<u8> {
    let mut body = Vec::new();

    if let Some(source) = source {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"source\"\r\n\r\n");
        body.extend_from_slice(source.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some(image) = image {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            b"Content-Disposition: form-data; name=\"image\"; filename=\"leaf\"\r\n",
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(image);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn analyze_request(source: Option<&str>, image: Option<&[u8]>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/analyze")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(source, image)))
        .expect("failed to build request")
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("failed to build request")
}

pub async fn json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body is not JSON")
}
