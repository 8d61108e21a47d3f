//! Mapper port - source と出力先の対応の記録

use std::path::Path;

use crate::domain::Mapped;

/// Mapper は各 source ファイルがどの出力先を生むかを記録する
///
/// 記録は handler 実行の前に行われる。handler が失敗すると、書かれなかった
/// 出力先の記録が残る。
pub trait Mapper: Send + Sync {
    /// `source` と出力先を対応付ける
    fn update(&self, source: &Path, mapped: &Mapped);

    /// source ファイルを持たない出力先を記録する
    fn record_virtual(&self, mapped: &Mapped);
}
