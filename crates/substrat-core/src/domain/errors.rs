//! Errors - 実行時と構築時のエラー型
//!
//! # 分類
//! - `TaskError`: 1 単位の処理 (read, handler, write) の失敗。
//!   エンジンがログに出し、`Task::run` の外には出ない
//! - `ConfigError`: タスクや options の構築失敗。実行前に呼び出し側へ返す

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// TaskError は 1 単位の処理の失敗
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to create directory {}: {source}", path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// handler の出力数と mapped の出力先数が一致しない
    #[error("handler returned {data} output(s) for {mapped} mapped destination(s)")]
    ShapeMismatch { mapped: usize, data: usize },

    #[error("{0}")]
    Handler(String),
}

impl TaskError {
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler(message.into())
    }
}

/// ConfigError は構築時のエラー（Fail-fast）
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown task mode '{0}' (expected each, all or single)")]
    UnknownMode(String),

    #[error("invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("write_concurrency must be greater than zero")]
    ZeroConcurrency,

    #[error("template delimiters must not be empty")]
    EmptyDelimiter,

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),
}
