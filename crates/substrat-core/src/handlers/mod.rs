//! Handlers - 同梱の handler（mode ごとに 1 つ）
//!
//! - **Template** (Each): ファイルごとに mustache で描画
//! - **Concat** (All): バッチ全体を 1 ファイルに連結
//! - **Emit** (Single): 静的データを JSON として書き出す
//!
//! `mustache` は Template が使うテンプレートエンジン本体。

pub mod concat;
pub mod emit;
pub mod mustache;
pub mod template;

pub use self::concat::Concat;
pub use self::emit::Emit;
pub use self::mustache::TemplateError;
pub use self::template::Template;
