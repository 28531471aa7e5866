//! # オブジェクトストレージ
//!
//! アップロードハンドラから呼ばれるストレージの抽象インターフェース。
//! S3互換（Cloudflare R2）実装は `r2` サブモジュールを参照。

pub mod r2;

pub use r2::R2Storage;

use axum::body::Bytes;
use tokio_util::sync::CancellationToken;

/// ストレージ操作のエラー型。
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// バックエンドが書き込みを拒否した、または通信に失敗した
    /// （ネットワーク障害、認証拒否、バケット不在、サイズ上限など）
    #[error("{0}")]
    Backend(String),
    /// 呼び出し側がキャンセルした
    #[error("upload canceled")]
    Canceled,
}

/// オブジェクトストレージの抽象インターフェース。
///
/// 実装は起動時に一度だけ構築され、全リクエストから読み取り専用で共有される。
#[async_trait::async_trait]
pub trait ObjectStorage: Send + Sync {
    /// `key` にデータを書き込む。既存オブジェクトは上書きされる（後勝ち）。
    ///
    /// `cancel` が発火した場合は進行中のリクエストを破棄し、
    /// `StorageError::Canceled` を返す。リトライは行わない。
    async fn put_object(
        &self,
        cancel: &CancellationToken,
        key: &str,
        data: Bytes,
    ) -> Result<(), StorageError>;
}
