//! Concat - 全入力ファイルを設定されたファイルに連結する

use std::path::Path;

use async_trait::async_trait;

use crate::context::{AllInput, ExecutionContext};
use crate::domain::{Mapped, Output, TaskError};
use crate::handler::AllHandler;

/// Concat は全入力を渡された順に `config.file` へ書く
///
/// 区切りは `config.data.separator`（既定は空文字列）。
#[derive(Debug, Default)]
pub struct Concat;

#[async_trait]
impl AllHandler for Concat {
    fn wants_data(&self, _ctx: &ExecutionContext<'_>) -> bool {
        true
    }

    fn map(&self, _ctx: &ExecutionContext<'_>, file: Option<&Path>) -> Option<Mapped> {
        file.map(Mapped::from)
    }

    async fn run(&self, ctx: &ExecutionContext<'_, AllInput>) -> Result<Output, TaskError> {
        let separator = ctx
            .config
            .data
            .get("separator")
            .and_then(|s| s.as_str())
            .unwrap_or_default()
            .as_bytes();

        let mut joined = Vec::new();
        for (index, file) in ctx.input.iter().enumerate() {
            if index > 0 {
                joined.extend_from_slice(separator);
            }
            joined.extend_from_slice(file.data.as_deref().unwrap_or_default());
        }
        Ok(Output::One(joined))
    }
}
