//! # POST /upload
//!
//! `x-file-name` ヘッダーで指定されたキーに、リクエストボディをそのまま書き込む。
//!
//! 処理は一方向で、各ステップの失敗はその場でレスポンスになる。
//! 1. メソッド確認（POST以外は405）
//! 2. キー取得（ヘッダー欠落・空は400）
//! 3. ボディの有無確認（400）
//! 4. ボディ全体の読み込み（失敗は500）
//! 5. ストレージへの書き込み（失敗は500）
//! 6. 201 Created（本文なし）

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{HeaderMap, Method, StatusCode};
use tokio_util::sync::CancellationToken;

use crate::config::AppState;
use crate::error::UploadError;

/// アップロード先のキーを指定するヘッダー
pub const FILE_NAME_HEADER: &str = "x-file-name";

/// /upload — ファイルアップロード。
///
/// ルーターには全メソッドで登録し、メソッドの判定はここで行う。
pub async fn handle_upload(
    State(state): State<AppState>,
    request: Request,
) -> Result<StatusCode, UploadError> {
    let (parts, body) = request.into_parts();

    let result = process_upload(&state, &parts.method, &parts.headers, Some(body)).await;
    if let Err(e) = &result {
        tracing::error!(method = %parts.method, error = %e, "アップロードを拒否しました");
    }
    result
}

/// アップロードの本体。
///
/// `body` が `None` の場合はボディのチャネル自体が無いものとして扱う。
/// hyper経由のリクエストは常にボディを持つため、HTTP経由ではこの分岐に入らない。
pub async fn process_upload(
    state: &AppState,
    method: &Method,
    headers: &HeaderMap,
    body: Option<Body>,
) -> Result<StatusCode, UploadError> {
    if *method != Method::POST {
        return Err(UploadError::MethodNotAllowed);
    }

    // 非ASCIIのファイル名もUTF-8として受け付ける（`to_str` は可視ASCIIのみ）
    let key = headers
        .get(FILE_NAME_HEADER)
        .and_then(|value| std::str::from_utf8(value.as_bytes()).ok())
        .filter(|name| !name.is_empty())
        .ok_or(UploadError::MissingFileName)?;

    let body = body.ok_or(UploadError::MissingBody)?;

    // サイズ上限は設けない（メモリとバックエンドの上限のみ）
    let data = axum::body::to_bytes(body, usize::MAX)
        .await
        .map_err(|e| UploadError::BodyRead(e.to_string()))?;

    // クライアント切断でこのFutureが破棄されると、ガード経由で書き込みも中断される
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();

    tracing::info!(key, size = data.len(), "アップロード開始");
    state.storage.put_object(&cancel, key, data).await?;
    tracing::info!(key, "アップロード完了");

    Ok(StatusCode::CREATED)
}
