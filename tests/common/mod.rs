#![allow(dead_code)]

use std::path::{Path, PathBuf};

use axum::Router;
use tokio::net::TcpListener;

/// Bind a loopback listener; returns it with its `http://` base URL.
pub async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    (listener, base)
}

/// Serve `router` on `listener` for the rest of the test.
pub fn spawn(listener: TcpListener, router: Router) {
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
}

/// A small file standing in for a finished video.
pub fn fake_video(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, vec![0x42u8; 4096]).unwrap();
    path
}
