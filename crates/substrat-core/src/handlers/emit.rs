//! Emit - タスクの静的データを JSON ファイルとして書き出す

use std::path::Path;

use async_trait::async_trait;

use crate::context::ExecutionContext;
use crate::domain::{Mapped, Output, TaskError};
use crate::handler::SingleHandler;

/// Emit は `config.data` を整形して `config.file` に書く
///
/// ファイル未設定なら何も書かない。
#[derive(Debug, Default)]
pub struct Emit;

#[async_trait]
impl SingleHandler for Emit {
    fn map(&self, _ctx: &ExecutionContext<'_>, file: Option<&Path>) -> Option<Mapped> {
        file.map(Mapped::from)
    }

    async fn run(&self, ctx: &ExecutionContext<'_>) -> Result<Output, TaskError> {
        let json = serde_json::to_vec_pretty(&ctx.config.data)
            .map_err(|e| TaskError::handler(format!("json encode: {e}")))?;
        Ok(Output::One(json))
    }
}
