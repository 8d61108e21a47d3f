//! Task - 設定済みの 1 単位の処理を実行するエンジン
//!
//! # 処理の流れ
//! 1. 開始ログを出し、`ExecutionContext` を作る
//! 2. reader を選ぶ（`options.src` 以下を実際に読むか、何もしないか）
//! 3. handler の形で分岐:
//!    - Each: ファイルごとに順に read → map → 記録 → run → write
//!    - All: map 1 回、全ファイルを順に read、run 1 回、write
//!    - Single: map 1 回、virtual として記録、run、write
//! 4. 戻る。返した future の完了が終了通知
//!
//! # 失敗の粒度
//! - Each: 失敗したファイルはログに出してスキップし、バッチは続行
//! - All: 最初の read 失敗をログに出して実行を終える（handler は部分バッチを見ない）
//! - handler と write の失敗はどの mode でも同じようにログに出す

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::{debug, error, info};

use crate::context::{EachInput, ExecutionContext, SourceFile, SubstratHandle};
use crate::domain::{BuildOptions, Mode, Output, TaskConfig, TaskError};
use crate::handler::{AllHandler, EachHandler, Handler, SingleHandler};
use crate::ports::{FilePattern, Mapper};
use crate::{io, iter};

/// Task は名前, pattern（任意）, handler, 設定を束ねる
///
/// ビルド設定ごとに 1 回作り、何度でも実行できる。実行が Task を変更することはない。
pub struct Task {
    name: String,
    pattern: Option<Box<dyn FilePattern>>,
    handler: Handler,
    config: TaskConfig,
}

impl Task {
    pub fn new(name: impl Into<String>, handler: Handler, config: TaskConfig) -> Self {
        Self {
            name: name.into(),
            pattern: None,
            handler,
            config,
        }
    }

    pub fn with_pattern(mut self, pattern: impl FilePattern + 'static) -> Self {
        self.pattern = Some(Box::new(pattern));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> Mode {
        self.handler.mode()
    }

    pub fn config(&self) -> &TaskConfig {
        &self.config
    }

    /// `files` にこのタスクを適用するか。pattern がなければ常に true
    pub fn matches(&self, files: &[PathBuf]) -> bool {
        self.pattern.as_ref().is_none_or(|p| p.matches(files))
    }

    /// Runs the task over `files` once.
    ///
    /// Failures are logged (unless `silent`) and never returned: callers can
    /// only learn that the run finished, not whether every file succeeded.
    /// `files` is not filtered again here; Single mode ignores it.
    pub async fn run(
        &self,
        substrat: Option<&SubstratHandle>,
        mapper: &dyn Mapper,
        options: &BuildOptions,
        files: &[PathBuf],
        silent: bool,
    ) {
        let log = RunLog {
            task: &self.name,
            silent,
        };
        match self.mode() {
            Mode::Single => log.info("Started"),
            _ => log.info(&format!("Started for {} file(s)...", files.len())),
        }

        let ctx = ExecutionContext::new(substrat, options, &self.config);
        let reader = Reader {
            root: self.handler.wants_data(&ctx).then_some(options.src.as_path()),
        };

        match &self.handler {
            Handler::Each(handler) => {
                self.run_each(handler.as_ref(), &ctx, &reader, mapper, files, &log)
                    .await
            }
            Handler::All(handler) => {
                self.run_all(handler.as_ref(), &ctx, &reader, mapper, files, &log)
                    .await
            }
            Handler::Single(handler) => self.run_single(handler.as_ref(), &ctx, mapper, &log).await,
        }

        log.debug("Done");
    }

    async fn run_each(
        &self,
        handler: &dyn EachHandler,
        ctx: &ExecutionContext<'_>,
        reader: &Reader<'_>,
        mapper: &dyn Mapper,
        files: &[PathBuf],
        log: &RunLog<'_>,
    ) {
        // エラーはファイル単位で処理するので、イテレーション自体は失敗しない
        let Ok(_) = iter::sequential(files, move |file| async move {
            match reader.read(file).await {
                Err(err) => log.error(&err),
                Ok(data) => {
                    let mapped = handler.map(ctx, file);
                    if let Some(mapped) = &mapped {
                        mapper.update(file, mapped);
                    }
                    let input = EachInput {
                        source: file.clone(),
                        path: ctx.options.source_path(file),
                        data,
                    };
                    let ctx = ctx.with_input(mapped, input);
                    invoke(&ctx, handler.run(&ctx).await, log).await;
                }
            }
            Ok::<(), std::convert::Infallible>(())
        })
        .await;
    }

    async fn run_all(
        &self,
        handler: &dyn AllHandler,
        ctx: &ExecutionContext<'_>,
        reader: &Reader<'_>,
        mapper: &dyn Mapper,
        files: &[PathBuf],
        log: &RunLog<'_>,
    ) {
        let mapped = handler.map(ctx, self.config.file.as_deref());
        let recorded = mapped.as_ref();

        let read = iter::sequential(files, move |file| async move {
            let data = reader.read(file).await?;
            if let Some(mapped) = recorded {
                mapper.update(file, mapped);
            }
            Ok::<_, TaskError>(SourceFile {
                source: file.clone(),
                path: ctx.options.source_path(file),
                data,
            })
        })
        .await;

        let all = match read {
            Ok(all) => all,
            Err(err) => {
                log.error(&err);
                return;
            }
        };

        let ctx = ctx.with_input(mapped, all);
        invoke(&ctx, handler.run(&ctx).await, log).await;
    }

    async fn run_single(
        &self,
        handler: &dyn SingleHandler,
        ctx: &ExecutionContext<'_>,
        mapper: &dyn Mapper,
        log: &RunLog<'_>,
    ) {
        let mapped = handler.map(ctx, self.config.file.as_deref());
        if let Some(mapped) = &mapped {
            mapper.record_virtual(mapped);
        }

        let ctx = ctx.with_input(mapped, ());
        invoke(&ctx, handler.run(&ctx).await, log).await;
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field("mode", &self.mode())
            .field("has_pattern", &self.pattern.is_some())
            .field("config", &self.config)
            .finish()
    }
}

/// handler の結果を書き出し、失敗した段階をログに出す
async fn invoke<I: Sync>(
    ctx: &ExecutionContext<'_, I>,
    result: Result<Output, TaskError>,
    log: &RunLog<'_>,
) {
    let outcome = match result {
        Ok(output) => persist(ctx, output).await,
        Err(err) => Err(err),
    };
    if let Err(err) = outcome {
        log.error(&err);
    }
}

/// Writes a handler's output to the context's mapped destinations.
///
/// 出力先がなければ副作用だけの handler なので何も書かない。
async fn persist<I>(ctx: &ExecutionContext<'_, I>, output: Output) -> Result<(), TaskError> {
    match &ctx.mapped {
        Some(mapped) => {
            io::writes(
                &ctx.options.dest,
                mapped.clone(),
                output,
                ctx.options.write_concurrency,
            )
            .await
        }
        None => {
            if !output.is_empty() {
                debug!(outputs = output.len(), "no mapped destination, output dropped");
            }
            Ok(())
        }
    }
}

/// Reads below `root`, or yields no data at all when `root` is unset.
struct Reader<'a> {
    root: Option<&'a Path>,
}

impl Reader<'_> {
    async fn read(&self, file: &Path) -> Result<Option<Vec<u8>>, TaskError> {
        match self.root {
            Some(root) => io::read(root, file).await.map(Some),
            None => Ok(None),
        }
    }
}

/// Log lines of one run, tagged with the task name.
struct RunLog<'a> {
    task: &'a str,
    silent: bool,
}

impl RunLog<'_> {
    fn info(&self, message: &str) {
        if !self.silent {
            info!(task = %self.task, "{message}");
        }
    }

    fn debug(&self, message: &str) {
        if !self.silent {
            debug!(task = %self.task, "{message}");
        }
    }

    fn error(&self, err: &TaskError) {
        if !self.silent {
            error!(task = %self.task, "[Error] {err}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Mapped;
    use crate::impls::{GlobPattern, MemoryMapper};
    use async_trait::async_trait;

    struct Noop;

    #[async_trait]
    impl SingleHandler for Noop {
        fn map(&self, _ctx: &ExecutionContext<'_>, file: Option<&Path>) -> Option<Mapped> {
            file.map(Mapped::from)
        }

        async fn run(&self, _ctx: &ExecutionContext<'_>) -> Result<Output, TaskError> {
            Ok(Output::None)
        }
    }

    #[test]
    fn matches_without_pattern_is_always_true() {
        let task = Task::new("noop", Handler::single(Noop), TaskConfig::new());
        assert!(task.matches(&[]));
        assert!(task.matches(&[PathBuf::from("anything.bin")]));
    }

    #[test]
    fn matches_delegates_to_the_pattern() {
        let task = Task::new("noop", Handler::single(Noop), TaskConfig::new())
            .with_pattern(GlobPattern::new(["*.md"]).unwrap());
        assert!(task.matches(&[PathBuf::from("README.md")]));
        assert!(!task.matches(&[PathBuf::from("main.rs")]));
        assert!(!task.matches(&[]));
    }

    #[test]
    fn mode_comes_from_the_handler() {
        let task = Task::new("noop", Handler::single(Noop), TaskConfig::new());
        assert_eq!(task.mode(), Mode::Single);
        assert_eq!(task.name(), "noop");
    }

    #[tokio::test]
    async fn side_effect_only_single_run_writes_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let options = BuildOptions::new(dir.path().join("src"), dir.path().join("dest"));
        let mapper = MemoryMapper::new();
        let task = Task::new("noop", Handler::single(Noop), TaskConfig::new());

        task.run(None, &mapper, &options, &[], true).await;

        assert!(mapper.virtuals().is_empty());
        assert!(!dir.path().join("dest").exists());
    }
}
