//! Template - 入力ファイルを mustache テンプレートとして描画する
//!
//! # 学習ポイント
//! - Each mode の handler（1 ファイル = 1 出力、パスはそのまま）
//! - locals を `config.data` か関数のどちらかから得る
//! - デリミタ (`config.tags`) はタスク構築時に検証する
//!
//! 描画規則は `handlers::mustache` を参照。

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use super::mustache::{self, TemplateError};
use crate::context::{EachInput, ExecutionContext};
use crate::domain::{ConfigError, Mapped, Output, TaskConfig, TaskError};
use crate::handler::{EachHandler, Handler};
use crate::impls::GlobPattern;
use crate::task::Task;

pub const DEFAULT_TAGS: (&str, &str) = ("{{", "}}");

type LocalsFn = dyn Fn(&ExecutionContext<'_, EachInput>) -> Value + Send + Sync;

/// Template は各ファイルを同じ相対パスに描画する
#[derive(Default)]
pub struct Template {
    locals: Option<Box<LocalsFn>>,
}

impl Template {
    pub fn new() -> Self {
        Self::default()
    }

    /// `config.data` の代わりにファイルごとに locals を計算する
    pub fn with_locals<F>(locals: F) -> Self
    where
        F: Fn(&ExecutionContext<'_, EachInput>) -> Value + Send + Sync + 'static,
    {
        Self {
            locals: Some(Box::new(locals)),
        }
    }

    /// "Template" タスクを組み立てる
    ///
    /// 空のデリミタは `ConfigError::EmptyDelimiter` になる。
    ///
    /// # 使用例
    /// ```ignore
    /// let task = Template::task(Some(GlobPattern::new(["**/*.html"])?), json!({"title": "Home"}), None)?;
    /// ```
    pub fn task(
        pattern: Option<GlobPattern>,
        data: Value,
        tags: Option<(String, String)>,
    ) -> Result<Task, ConfigError> {
        let mut config = TaskConfig::new().with_data(data);
        if let Some((open, close)) = tags {
            config = config.with_tags(open, close)?;
        }
        let task = Task::new("Template", Handler::each(Template::new()), config);
        Ok(match pattern {
            Some(pattern) => task.with_pattern(pattern),
            None => task,
        })
    }
}

#[async_trait]
impl EachHandler for Template {
    fn wants_data(&self, _ctx: &ExecutionContext<'_>) -> bool {
        true
    }

    fn map(&self, _ctx: &ExecutionContext<'_>, file: &Path) -> Option<Mapped> {
        Some(Mapped::from(file))
    }

    async fn run(&self, ctx: &ExecutionContext<'_, EachInput>) -> Result<Output, TaskError> {
        let source = ctx.input.source.display();
        let bytes = ctx.input.data.as_deref().unwrap_or_default();
        let text = std::str::from_utf8(bytes).map_err(|e| {
            TaskError::handler(format!("template {source} is not valid UTF-8: {e}"))
        })?;

        let computed;
        let locals = match &self.locals {
            Some(locals) => {
                computed = locals(ctx);
                &computed
            }
            None => &ctx.config.data,
        };
        let (open, close) = match &ctx.config.tags {
            Some((open, close)) => (open.as_str(), close.as_str()),
            None => DEFAULT_TAGS,
        };

        let rendered = mustache::render(text, open, close, locals)
            .map_err(|e: TemplateError| TaskError::handler(format!("template {source}: {e}")))?;
        Ok(Output::from(rendered))
    }
}
