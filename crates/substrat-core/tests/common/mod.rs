//! エンジンテスト共通の fixture

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use tempfile::TempDir;
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::Layer;
use tracing_subscriber::layer::{Context, SubscriberExt};

use substrat_core::BuildOptions;

/// 現在のスレッドのログイベントをレベルごとに数える
#[derive(Clone, Default)]
pub struct LogCounter {
    errors: Arc<AtomicUsize>,
    infos: Arc<AtomicUsize>,
}

impl LogCounter {
    /// Routes this thread's events into the counter until the guard drops.
    pub fn install(&self) -> DefaultGuard {
        tracing::subscriber::set_default(tracing_subscriber::registry().with(self.clone()))
    }

    pub fn errors(&self) -> usize {
        self.errors.load(Ordering::SeqCst)
    }

    pub fn infos(&self) -> usize {
        self.infos.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for LogCounter {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        match *event.metadata().level() {
            Level::ERROR => {
                self.errors.fetch_add(1, Ordering::SeqCst);
            }
            Level::INFO => {
                self.infos.fetch_add(1, Ordering::SeqCst);
            }
            _ => {}
        }
    }
}

/// `src/` と `dest/` を持つ一時ビルドツリー
pub struct Fixture {
    pub dir: TempDir,
    pub options: BuildOptions,
}

impl Fixture {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let options = BuildOptions::new(dir.path().join("src"), dir.path().join("dest"));
        std::fs::create_dir_all(&options.src).unwrap();
        Self { dir, options }
    }

    pub fn source(&self, name: &str, content: &str) -> PathBuf {
        let path = self.options.src.join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, content).unwrap();
        PathBuf::from(name)
    }

    pub fn output(&self, name: impl AsRef<Path>) -> Option<String> {
        std::fs::read_to_string(self.options.dest.join(name)).ok()
    }

    pub fn dest_exists(&self) -> bool {
        self.options.dest.exists()
    }
}

pub fn paths(names: &[&str]) -> Vec<PathBuf> {
    names.iter().map(PathBuf::from).collect()
}
