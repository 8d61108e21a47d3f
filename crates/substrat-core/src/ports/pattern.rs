//! FilePattern port - タスクをこのビルドで実行するかの判定

use std::path::PathBuf;

/// FilePattern はタスク実行前にオーケストレータが問い合わせる
///
/// エンジン自身が個々のファイルをこれで絞り込むことはない。
pub trait FilePattern: Send + Sync {
    fn matches(&self, files: &[PathBuf]) -> bool;
}
