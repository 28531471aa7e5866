//! # 設定・共有状態
//!
//! コマンドライン引数・環境変数からの設定読み込みと、ハンドラの共有状態の定義。

use std::sync::Arc;

use clap::Parser;

use crate::error::ConfigError;
use crate::storage::r2::R2Settings;
use crate::storage::ObjectStorage;

/// デフォルトの待ち受けアドレス
pub const DEFAULT_BIND: &str = "localhost:8789";

/// 起動設定。フラグ未指定の場合は同名の環境変数から読み込む。
#[derive(Parser, Clone)]
#[command(version, about = "Upload proxy to Cloudflare R2 for local development")]
pub struct AppConfig {
    /// Bind address
    #[arg(long, env = "BIND", default_value = DEFAULT_BIND)]
    pub bind: String,

    /// r2 account id
    #[arg(long = "r2-account-id", env = "R2_ACCOUNT_ID", default_value = "")]
    pub r2_account_id: String,

    /// r2 access key id
    #[arg(long = "r2-access-key-id", env = "R2_ACCESS_KEY_ID", default_value = "")]
    pub r2_access_key_id: String,

    /// r2 access key secret
    #[arg(
        long = "r2-access-key-secret",
        env = "R2_ACCESS_KEY_SECRET",
        default_value = "",
        hide_env_values = true
    )]
    pub r2_access_key_secret: String,

    /// r2 bucket
    #[arg(long = "r2-bucket", env = "R2_BUCKET", default_value = "")]
    pub r2_bucket: String,

    /// S3-compatible endpoint overriding the one derived from the account id
    #[arg(long = "r2-endpoint", env = "R2_ENDPOINT")]
    pub r2_endpoint: Option<String>,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("bind", &self.bind)
            .field("r2_account_id", &self.r2_account_id)
            .field("r2_access_key_id", &self.r2_access_key_id)
            .field("r2_access_key_secret", &"<redacted>")
            .field("r2_bucket", &self.r2_bucket)
            .field("r2_endpoint", &self.r2_endpoint)
            .finish()
    }
}

impl AppConfig {
    /// 必須値が空でないことを確認する。
    ///
    /// アカウントIDはエンドポイントを上書きする場合のみ省略できる。
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind.is_empty() {
            return Err(ConfigError::Missing("bind"));
        }
        if self.r2_account_id.is_empty() && self.endpoint_override().is_none() {
            return Err(ConfigError::Missing("r2-account-id"));
        }
        if self.r2_access_key_id.is_empty() {
            return Err(ConfigError::Missing("r2-access-key-id"));
        }
        if self.r2_access_key_secret.is_empty() {
            return Err(ConfigError::Missing("r2-access-key-secret"));
        }
        if self.r2_bucket.is_empty() {
            return Err(ConfigError::Missing("r2-bucket"));
        }
        Ok(())
    }

    /// ストレージクライアント用の接続情報を取り出す。
    pub fn r2_settings(&self) -> R2Settings {
        R2Settings {
            account_id: self.r2_account_id.clone(),
            access_key_id: self.r2_access_key_id.clone(),
            access_key_secret: self.r2_access_key_secret.clone(),
            bucket: self.r2_bucket.clone(),
            endpoint: self.endpoint_override().map(str::to_string),
        }
    }

    fn endpoint_override(&self) -> Option<&str> {
        self.r2_endpoint.as_deref().filter(|ep| !ep.is_empty())
    }
}

/// ハンドラの共有状態。起動時に一度だけ構築され、以後変更されない。
#[derive(Clone)]
pub struct AppState {
    /// 書き込み先ストレージ
    pub storage: Arc<dyn ObjectStorage>,
}

impl AppState {
    pub fn new(storage: Arc<dyn ObjectStorage>) -> Self {
        Self { storage }
    }
}
