//! # Cloudflare R2 ストレージ実装
//!
//! S3互換APIでR2バケットにオブジェクトを書き込む。
//! エンドポイントはアカウントIDから導出する（`R2_ENDPOINT` で上書き可能）。

use axum::body::Bytes;
use tokio_util::sync::CancellationToken;

use super::{ObjectStorage, StorageError};
use crate::error::ConfigError;

/// R2はリージョンを持たないため、署名には固定値 `auto` を使う。
const R2_REGION: &str = "auto";

/// R2の接続情報。起動時に一度だけ構築される。
#[derive(Debug, Clone)]
pub struct R2Settings {
    pub account_id: String,
    pub access_key_id: String,
    pub access_key_secret: String,
    pub bucket: String,
    /// エンドポイントの上書き（MinIO等のS3互換サーバー向け）
    pub endpoint: Option<String>,
}

/// S3互換ストレージ（Cloudflare R2）への書き込み実装。
pub struct R2Storage {
    bucket: s3::Bucket,
}

impl std::fmt::Debug for R2Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // 認証情報は出力しない
        f.debug_struct("R2Storage")
            .field("bucket", &self.bucket.name())
            .field("endpoint", &self.endpoint())
            .finish()
    }
}

impl R2Storage {
    /// 接続情報からクライアントを構築する。
    ///
    /// 認証情報・バケット名が空の場合や、アカウントIDがホスト名として
    /// 使えない場合は `ConfigError` を返す。
    pub fn new(settings: R2Settings) -> Result<Self, ConfigError> {
        if settings.access_key_id.is_empty() {
            return Err(ConfigError::Missing("r2-access-key-id"));
        }
        if settings.access_key_secret.is_empty() {
            return Err(ConfigError::Missing("r2-access-key-secret"));
        }
        if settings.bucket.is_empty() {
            return Err(ConfigError::Missing("r2-bucket"));
        }

        let endpoint = match settings.endpoint.filter(|ep| !ep.is_empty()) {
            Some(endpoint) => endpoint,
            None => r2_endpoint(&settings.account_id)?,
        };

        let region = s3::Region::Custom {
            region: R2_REGION.to_string(),
            endpoint,
        };

        let credentials = s3::creds::Credentials::new(
            Some(settings.access_key_id.as_str()),
            Some(settings.access_key_secret.as_str()),
            None,
            None,
            None,
        )
        .map_err(|e| ConfigError::Client(e.to_string()))?;

        let bucket = s3::Bucket::new(&settings.bucket, region, credentials)
            .map_err(|e| ConfigError::Client(e.to_string()))?
            .with_path_style();

        Ok(Self { bucket: *bucket })
    }

    /// 書き込み先バケット名
    pub fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    /// 接続先エンドポイント
    pub fn endpoint(&self) -> String {
        self.bucket.region().endpoint()
    }
}

/// アカウントIDからR2のエンドポイントURLを組み立てる。
///
/// アカウントIDはそのままホスト名のラベルになるため、DNSラベルとして
/// 有効な文字列（英数字とハイフン、63文字以内、先頭・末尾はハイフン以外）に限る。
fn r2_endpoint(account_id: &str) -> Result<String, ConfigError> {
    if account_id.is_empty() {
        return Err(ConfigError::Missing("r2-account-id"));
    }

    let valid_label = account_id.len() <= 63
        && account_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
        && !account_id.starts_with('-')
        && !account_id.ends_with('-');
    if !valid_label {
        return Err(ConfigError::MalformedAccountId(account_id.to_string()));
    }

    Ok(format!("https://{account_id}.r2.cloudflarestorage.com"))
}

#[async_trait::async_trait]
impl ObjectStorage for R2Storage {
    async fn put_object(
        &self,
        cancel: &CancellationToken,
        key: &str,
        data: Bytes,
    ) -> Result<(), StorageError> {
        // `fail-on-err` により2xx以外のステータスはステータスと本文付きのエラーになる
        tokio::select! {
            biased;
            // キャンセル時は進行中のHTTPリクエストごと破棄する
            _ = cancel.cancelled() => return Err(StorageError::Canceled),
            result = self.bucket.put_object(key, &data) => {
                result.map_err(|e| StorageError::Backend(e.to_string()))?;
            }
        }

        Ok(())
    }
}
