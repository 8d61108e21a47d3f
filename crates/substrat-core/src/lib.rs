//! substrat-core
//!
//! ファイルベースのビルドタスク実行エンジン。`Task` が入力ファイルを読み、
//! handler に出力先を決めさせ、変換を実行して結果を書き出す（I/O はすべて非同期）。
//!
//! # モジュール構成
//! - **domain**: mode, 出力先 (`Mapped`/`Output`), options, エラー
//! - **ports**: オーケストレータが提供する抽象 (`Mapper`, `FilePattern`)
//! - **impls**: ports の参照実装 (`MemoryMapper`, `GlobPattern`)
//! - **iter**: 逐次 / 上限付き並列の非同期イテレーション
//! - **io**: read / write / 位置合わせ付きの複数ファイル書き込み
//! - **context**: 1 回の実行ごとの `ExecutionContext`
//! - **handler**: 3 種類の handler (`EachHandler`, `AllHandler`, `SingleHandler`)
//! - **task**: エンジン本体 (`Task::run`)
//! - **handlers**: 同梱 handler (`Template`, `Concat`, `Emit`)

pub mod context;
pub mod domain;
pub mod handler;
pub mod handlers;
pub mod impls;
pub mod io;
pub mod iter;
pub mod ports;
pub mod task;

// 主要な型を再エクスポート
pub use self::context::{AllInput, EachInput, ExecutionContext, SourceFile, SubstratHandle};
pub use self::domain::{BuildOptions, ConfigError, Mapped, Mode, Output, TaskConfig, TaskError};
pub use self::handler::{AllHandler, EachHandler, Handler, SingleHandler};
pub use self::task::Task;
