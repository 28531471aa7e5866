//! # エラー型
//!
//! 起動時の設定エラーと、アップロードリクエスト処理中のエラー。
//! アップロードエラーはHTTPステータス + プレーンテキストに変換される。

use axum::http::StatusCode;

use crate::storage::StorageError;

/// 起動時の設定エラー。
/// 発生した場合はリクエストを受け付ける前にプロセスを終了する。
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// 必須の設定値が未設定または空
    #[error("missing required setting: {0}")]
    Missing(&'static str),
    /// アカウントIDからエンドポイントのホスト名を組み立てられない
    #[error("malformed r2 account id: {0:?}")]
    MalformedAccountId(String),
    /// S3クライアント（認証情報・バケット）の構築に失敗
    #[error("failed to configure storage client: {0}")]
    Client(String),
}

/// アップロードリクエストの処理エラー。
///
/// レスポンス本文は呼び出し側（ローカル開発用フロントエンド）に
/// そのまま表示される前提の英語テキスト。
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// POST以外のメソッド
    #[error("Method not allowed")]
    MethodNotAllowed,
    /// `x-file-name` ヘッダーが無い、または空
    #[error("Missing x-file-name header")]
    MissingFileName,
    /// リクエストボディのチャネル自体が無い
    #[error("Missing request body")]
    MissingBody,
    /// ボディ読み取り中の転送エラー
    #[error("Error reading request body: {0}")]
    BodyRead(String),
    /// ストレージへの書き込み失敗
    #[error("Error uploading media: {0}")]
    Storage(#[from] StorageError),
}

impl axum::response::IntoResponse for UploadError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            UploadError::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            UploadError::MissingFileName | UploadError::MissingBody => StatusCode::BAD_REQUEST,
            UploadError::BodyRead(_) | UploadError::Storage(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, self.to_string()).into_response()
    }
}
