//! Impls - ports の参照実装
//!
//! - **GlobPattern**: `glob` パターンによる FilePattern
//! - **MemoryMapper**: 対応関係をメモリに保持する Mapper

pub mod glob_pattern;
pub mod memory_mapper;

pub use self::glob_pattern::GlobPattern;
pub use self::memory_mapper::MemoryMapper;
