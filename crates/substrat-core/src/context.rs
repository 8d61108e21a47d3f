//! ExecutionContext - 1 回の実行で read → map → run → write を通して渡す状態
//!
//! # 学習ポイント
//! - 借用だけで組み立てる context（`'a` は実行 1 回分の寿命）
//! - 型パラメータ `I` で mode ごとの入力を表す
//! - `Arc<dyn Any + Send + Sync>` と downcast による型消去ハンドル
//!
//! `Task::run` の開始時に作られ、実行終了とともに破棄される。

use std::any::Any;
use std::path::PathBuf;
use std::sync::Arc;

use crate::domain::{BuildOptions, Mapped, TaskConfig};

/// 実行を開始したオーケストレータへの不透明なハンドル
pub type SubstratHandle = Arc<dyn Any + Send + Sync>;

/// Each mode の入力（現在のファイル）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EachInput {
    /// source root からの相対パス
    pub source: PathBuf,
    /// `options.src` と `source` を連結したパス
    pub path: PathBuf,
    /// ファイル内容（handler が要求した場合のみ）
    pub data: Option<Vec<u8>>,
}

/// All mode のバッチの 1 要素
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub source: PathBuf,
    pub path: PathBuf,
    pub data: Option<Vec<u8>>,
}

/// All mode の入力（渡された順）
pub type AllInput = Vec<SourceFile>;

/// ExecutionContext は実行ごとの context
///
/// `I` は mode 固有の入力。ファイル単位の処理の外側と Single mode では `()`。
#[derive(Debug, Clone)]
pub struct ExecutionContext<'a, I = ()> {
    substrat: Option<&'a SubstratHandle>,
    pub options: &'a BuildOptions,
    pub config: &'a TaskConfig,
    pub mapped: Option<Mapped>,
    pub input: I,
}

impl<'a> ExecutionContext<'a> {
    pub fn new(
        substrat: Option<&'a SubstratHandle>,
        options: &'a BuildOptions,
        config: &'a TaskConfig,
    ) -> Self {
        Self {
            substrat,
            options,
            config,
            mapped: None,
            input: (),
        }
    }
}

impl<'a, I> ExecutionContext<'a, I> {
    /// 同じ実行のまま入力だけ差し替える
    pub fn with_input<J>(&self, mapped: Option<Mapped>, input: J) -> ExecutionContext<'a, J> {
        ExecutionContext {
            substrat: self.substrat,
            options: self.options,
            config: self.config,
            mapped,
            input,
        }
    }

    /// ハンドルが渡されていて、中身が `T` ならそれを返す
    pub fn substrat<T: Any>(&self) -> Option<&'a T> {
        self.substrat.and_then(|handle| (**handle).downcast_ref::<T>())
    }
}
