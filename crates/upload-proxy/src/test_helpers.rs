//! # テスト用共通ヘルパー
//!
//! ストレージ・エンドポイント・ルーターのテストで共有するモックサーバー群。

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;

/// モックS3が受け取ったオブジェクト（キーは `{bucket}/{key}`）
pub type MockObjects = Arc<Mutex<HashMap<String, Vec<u8>>>>;

/// 任意のルーターでテスト用HTTPサーバーを起動し、ポートを返す。
pub async fn start_server(app: axum::Router) -> u16 {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    port
}

/// テスト用モックS3サーバーを起動する。
/// パススタイルの `PUT /{bucket}/{key}` を受け付けて内容を保存する。
pub async fn start_mock_s3() -> (u16, MockObjects) {
    let objects: MockObjects = Arc::default();

    let app = axum::Router::new()
        .route(
            "/{bucket}/{*key}",
            axum::routing::put(
                |State(objects): State<MockObjects>,
                 Path((bucket, key)): Path<(String, String)>,
                 body: Bytes| async move {
                    objects
                        .lock()
                        .unwrap()
                        .insert(format!("{bucket}/{key}"), body.to_vec());
                    (StatusCode::OK, [("ETag", "\"mock-etag\"")])
                },
            ),
        )
        .with_state(objects.clone());

    let port = start_server(app).await;
    (port, objects)
}

/// 常に認証エラー（403）を返すモックS3サーバーを起動する。
pub async fn start_rejecting_s3() -> u16 {
    let app = axum::Router::new().fallback(|| async {
        (
            StatusCode::FORBIDDEN,
            "<Error><Code>InvalidAccessKeyId</Code><Message>The access key ID you provided does not exist in our records.</Message></Error>",
        )
    });
    start_server(app).await
}
