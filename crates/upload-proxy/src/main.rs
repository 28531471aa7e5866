//! # R2 Upload Proxy
//!
//! ローカル開発用のアップロードプロキシ。
//! Wrangler `pages dev` のR2バインディングはリモートのバケットに書き込めないため、
//! 開発中はこのサーバーがアップロード先の代わりになる。
//!
//! ## API エンドポイント
//! - `POST /upload` — `x-file-name` ヘッダーのキーでボディをR2に保存

mod config;
mod endpoints;
mod error;
mod storage;
#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use clap::Parser;

use crate::config::{AppConfig, AppState};
use crate::error::ConfigError;
use crate::storage::R2Storage;

/// ルーターを構築する。
///
/// /upload は全メソッドで受け付け、POST以外はハンドラ側で405を返す。
fn build_router(state: AppState) -> axum::Router {
    axum::Router::new()
        .route("/upload", axum::routing::any(endpoints::handle_upload))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// 設定を検証し、R2ストレージを構築する。
///
/// 失敗した場合はサーバーを起動しない。エラーはここでログに出力する。
fn build_storage(config: &AppConfig) -> Result<R2Storage, ConfigError> {
    let storage = config
        .validate()
        .and_then(|()| R2Storage::new(config.r2_settings()))
        .inspect_err(|e| tracing::error!(error = %e, "R2ストレージの設定に失敗しました"))?;

    tracing::info!(
        bucket = %storage.bucket_name(),
        endpoint = %storage.endpoint(),
        "R2ストレージを設定"
    );
    Ok(storage)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("起動中...");

    let config = AppConfig::parse();
    let storage = build_storage(&config)?;

    let app = build_router(AppState::new(Arc::new(storage)));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .inspect_err(|e| tracing::error!(bind = %config.bind, error = %e, "待ち受けに失敗しました"))?;
    tracing::info!("{} で待ち受けを開始します", config.bind);
    axum::serve(listener, app).await?;

    Ok(())
}

// ---------------------------------------------------------------------------
// テスト
// ---------------------------------------------------------------------------
