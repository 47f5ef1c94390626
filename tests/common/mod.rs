// Copyright 2025 coScene
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

// In-process fake of the EMQX data export API

#![allow(dead_code)]

use axum::body::{Body, Bytes};
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::Router;
use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::{Arc, Mutex};

/// `admin:public` as sent by reqwest's basic auth
pub const BASIC_AUTH: &str = "Basic YWRtaW46cHVibGlj";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub node: Option<String>,
    pub authorization: Option<String>,
    pub body: String,
}

pub struct BrokerState {
    pub export_status: AtomicU16,
    pub export_body: Mutex<String>,
    pub node: String,
    pub filename: String,
    pub file_body: Vec<u8>,
    pub break_download: bool,
    pub requests: Mutex<Vec<RecordedRequest>>,
}

impl BrokerState {
    pub fn new(node: &str, filename: &str, file_body: Vec<u8>) -> Self {
        Self {
            export_status: AtomicU16::new(200),
            export_body: Mutex::new(format!(
                r#"{{"node":"{}","filename":"{}"}}"#,
                node, filename
            )),
            node: node.to_string(),
            filename: filename.to_string(),
            file_body,
            break_download: false,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Answer the export call with `status` and `body`
    pub fn fail_export(self, status: u16, body: &str) -> Self {
        self.export_status.store(status, Ordering::SeqCst);
        *self.export_body.lock().unwrap() = body.to_string();
        self
    }

    /// Abort the download body after the first half
    pub fn break_download(mut self) -> Self {
        self.break_download = true;
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn record(&self, method: &str, path: String, node: Option<String>, headers: &HeaderMap, body: String) {
        let authorization = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());

        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            path,
            node,
            authorization,
            body,
        });
    }
}

pub struct FakeBroker {
    pub url: String,
    pub state: Arc<BrokerState>,
}

impl FakeBroker {
    pub async fn spawn(state: BrokerState) -> Self {
        let state = Arc::new(state);
        let app = Router::new()
            .route("/api/v5/data/export", post(export))
            .route("/api/v5/data/files/:filename", get(download))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            url: format!("http://{}", addr),
            state,
        }
    }
}

async fn export(State(state): State<Arc<BrokerState>>, headers: HeaderMap, body: String) -> Response {
    state.record("POST", "/api/v5/data/export".to_string(), None, &headers, body);

    let status = StatusCode::from_u16(state.export_status.load(Ordering::SeqCst)).unwrap();
    let body = state.export_body.lock().unwrap().clone();
    (status, [(header::CONTENT_TYPE, "application/json")], body).into_response()
}

async fn download(
    State(state): State<Arc<BrokerState>>,
    Path(filename): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let node = query.get("node").cloned();
    state.record(
        "GET",
        format!("/api/v5/data/files/{}", filename),
        node.clone(),
        &headers,
        String::new(),
    );

    if filename != state.filename {
        return (StatusCode::NOT_FOUND, "Not Found").into_response();
    }
    if node.as_deref() != Some(state.node.as_str()) {
        return (
            StatusCode::BAD_REQUEST,
            [(header::CONTENT_TYPE, "application/json")],
            r#"{"code":"BAD_REQUEST","message":"unknown node"}"#,
        )
            .into_response();
    }

    if state.break_download {
        let half = Bytes::copy_from_slice(&state.file_body[..state.file_body.len() / 2]);
        let chunks: Vec<Result<Bytes, io::Error>> = vec![
            Ok(half),
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "broker went away")),
        ];
        return Response::new(Body::from_stream(futures::stream::iter(chunks)));
    }

    (StatusCode::OK, state.file_body.clone()).into_response()
}

#[derive(Debug, Clone)]
pub struct ReceivedObject {
    pub bucket: String,
    pub key: String,
    pub authorization: Option<String>,
    pub size: usize,
}

/// Path-style S3 endpoint that accepts or denies every `PutObject`
pub struct FakeS3 {
    pub endpoint: String,
    state: Arc<S3State>,
}

struct S3State {
    deny: bool,
    objects: Mutex<Vec<ReceivedObject>>,
}

const ACCESS_DENIED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<Error><Code>AccessDenied</Code><Message>Access Denied</Message><RequestId>4442587FB7D0A2F9</RequestId><HostId>fake-s3</HostId></Error>"#;

impl FakeS3 {
    pub async fn spawn(deny: bool) -> Self {
        let state = Arc::new(S3State {
            deny,
            objects: Mutex::new(Vec::new()),
        });
        let app = Router::new()
            .route("/:bucket/*key", put(put_object))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            endpoint: format!("http://{}", addr),
            state,
        }
    }

    pub fn objects(&self) -> Vec<ReceivedObject> {
        self.state.objects.lock().unwrap().clone()
    }
}

async fn put_object(
    State(state): State<Arc<S3State>>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_string());

    state.objects.lock().unwrap().push(ReceivedObject {
        bucket,
        key: key.trim_start_matches('/').to_string(),
        authorization,
        size: body.len(),
    });

    if state.deny {
        return (
            StatusCode::FORBIDDEN,
            [(header::CONTENT_TYPE, "application/xml")],
            ACCESS_DENIED,
        )
            .into_response();
    }

    (StatusCode::OK, [(header::ETAG, "\"9bb58f26192e4ba00f01e2e7b136bbd8\"")]).into_response()
}

pub fn files_in(dir: &std::path::Path) -> Vec<std::path::PathBuf> {
    std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect()
}
