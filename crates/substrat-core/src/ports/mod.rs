//! Ports - 抽象化レイヤー
//!
//! エンジンが利用するが所有しない協力者を trait として定義します。
//! 実装はオーケストレータが提供し、参照実装は `impls` にあります。

pub mod mapper;
pub mod pattern;

pub use self::mapper::Mapper;
pub use self::pattern::FilePattern;
