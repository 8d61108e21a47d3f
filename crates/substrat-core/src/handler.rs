//! Handler - Task が駆動する差し替え可能な変換
//!
//! # 学習ポイント
//! - async-trait による object-safe な非同期 trait
//! - mode ごとに trait を分け、閉じた enum (`Handler`) で束ねる
//! - 未知の mode は型として存在しえない
//!
//! 3 種類とも同じ形をとる:
//! - `wants_data`: 先にファイル内容を読むか (Each/All)
//! - `map`: 出力先。副作用だけの handler は `None`
//! - `run`: 変換本体。`Output` は `map` の結果と位置で対応する

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;

use crate::context::{AllInput, EachInput, ExecutionContext};
use crate::domain::{Mapped, Mode, Output, TaskError};

/// EachHandler は入力ファイルごとに呼ばれる
///
/// # 使用例
/// ```ignore
/// struct Upper;
///
/// #[async_trait]
/// impl EachHandler for Upper {
///     fn wants_data(&self, _ctx: &ExecutionContext<'_>) -> bool {
///         true
///     }
///
///     fn map(&self, _ctx: &ExecutionContext<'_>, file: &Path) -> Option<Mapped> {
///         Some(Mapped::from(file))
///     }
///
///     async fn run(&self, ctx: &ExecutionContext<'_, EachInput>) -> Result<Output, TaskError> {
///         let text = String::from_utf8_lossy(ctx.input.data.as_deref().unwrap_or_default());
///         Ok(Output::from(text.to_uppercase()))
///     }
/// }
/// ```
#[async_trait]
pub trait EachHandler: Send + Sync {
    fn wants_data(&self, _ctx: &ExecutionContext<'_>) -> bool {
        false
    }

    fn map(&self, ctx: &ExecutionContext<'_>, file: &Path) -> Option<Mapped>;

    async fn run(&self, ctx: &ExecutionContext<'_, EachInput>) -> Result<Output, TaskError>;
}

/// AllHandler は入力ファイル全体に対して 1 回呼ばれる
#[async_trait]
pub trait AllHandler: Send + Sync {
    fn wants_data(&self, _ctx: &ExecutionContext<'_>) -> bool {
        false
    }

    /// `file` はタスクに設定された仮想ファイル
    fn map(&self, ctx: &ExecutionContext<'_>, file: Option<&Path>) -> Option<Mapped>;

    async fn run(&self, ctx: &ExecutionContext<'_, AllInput>) -> Result<Output, TaskError>;
}

/// SingleHandler は入力ファイルなしで 1 回呼ばれる
#[async_trait]
pub trait SingleHandler: Send + Sync {
    /// `file` is the task's configured virtual file.
    ///
    /// `None` を返すと virtual は記録されない（`Mapper::record_virtual` は呼ばれない）。
    fn map(&self, ctx: &ExecutionContext<'_>, file: Option<&Path>) -> Option<Mapped>;

    async fn run(&self, ctx: &ExecutionContext<'_>) -> Result<Output, TaskError>;
}

/// Handler は Task が扱える handler の閉じた集合
#[derive(Clone)]
pub enum Handler {
    Each(Arc<dyn EachHandler>),
    All(Arc<dyn AllHandler>),
    Single(Arc<dyn SingleHandler>),
}

impl Handler {
    pub fn each(handler: impl EachHandler + 'static) -> Self {
        Handler::Each(Arc::new(handler))
    }

    pub fn all(handler: impl AllHandler + 'static) -> Self {
        Handler::All(Arc::new(handler))
    }

    pub fn single(handler: impl SingleHandler + 'static) -> Self {
        Handler::Single(Arc::new(handler))
    }

    pub fn mode(&self) -> Mode {
        match self {
            Handler::Each(_) => Mode::Each,
            Handler::All(_) => Mode::All,
            Handler::Single(_) => Mode::Single,
        }
    }

    /// Reader strategy: Single は読まない
    pub(crate) fn wants_data(&self, ctx: &ExecutionContext<'_>) -> bool {
        match self {
            Handler::Each(h) => h.wants_data(ctx),
            Handler::All(h) => h.wants_data(ctx),
            Handler::Single(_) => false,
        }
    }
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Handler").field(&self.mode()).finish()
    }
}
