//! MemoryMapper - プロセス内の mapping 記録
//!
//! # 学習ポイント
//! - `&self` のまま記録するための Mutex による内部可変性
//! - poison されたロックからの復帰 (`PoisonError::into_inner`)
//! - BTreeMap による決定的な列挙順

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::domain::Mapped;
use crate::ports::Mapper;

#[derive(Debug, Default)]
struct MapperState {
    sources: BTreeMap<PathBuf, Mapped>,
    virtuals: Vec<Mapped>,
}

/// MemoryMapper は source → 出力先の対応を Mutex 付きの map に保持する
///
/// # 実装詳細
/// - 同じ source への `update` は後勝ち
/// - virtual は記録順に保持
#[derive(Debug, Default)]
pub struct MemoryMapper {
    state: Mutex<MapperState>,
}

impl MemoryMapper {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MapperState> {
        // 書き込みは insert / push 1 回だけなので poison 後も状態は壊れていない
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn get(&self, source: &Path) -> Option<Mapped> {
        self.lock().sources.get(source).cloned()
    }

    /// source パス順の全対応
    pub fn entries(&self) -> Vec<(PathBuf, Mapped)> {
        self.lock()
            .sources
            .iter()
            .map(|(source, mapped)| (source.clone(), mapped.clone()))
            .collect()
    }

    pub fn virtuals(&self) -> Vec<Mapped> {
        self.lock().virtuals.clone()
    }
}

impl Mapper for MemoryMapper {
    fn update(&self, source: &Path, mapped: &Mapped) {
        self.lock()
            .sources
            .insert(source.to_path_buf(), mapped.clone());
    }

    fn record_virtual(&self, mapped: &Mapped) {
        self.lock().virtuals.push(mapped.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_then_get() {
        let mapper = MemoryMapper::new();
        mapper.update(Path::new("a.tpl"), &Mapped::from("a.html"));
        assert_eq!(mapper.get(Path::new("a.tpl")), Some(Mapped::from("a.html")));
        assert_eq!(mapper.get(Path::new("missing")), None);
    }

    #[test]
    fn later_update_replaces_earlier() {
        let mapper = MemoryMapper::new();
        mapper.update(Path::new("a"), &Mapped::from("one"));
        mapper.update(Path::new("a"), &Mapped::from("two"));
        assert_eq!(mapper.entries(), vec![(PathBuf::from("a"), Mapped::from("two"))]);
    }

    #[test]
    fn virtuals_are_kept_apart_from_sources() {
        let mapper = MemoryMapper::new();
        mapper.record_virtual(&Mapped::from("sitemap.xml"));
        assert!(mapper.entries().is_empty());
        assert_eq!(mapper.virtuals(), vec![Mapped::from("sitemap.xml")]);
    }
}
