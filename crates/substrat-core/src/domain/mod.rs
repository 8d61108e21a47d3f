//! Domain - ドメインモデル（mode, 出力先, options, エラー）

pub mod errors;
pub mod mapped;
pub mod mode;
pub mod options;

pub use self::errors::{ConfigError, TaskError};
pub use self::mapped::{Mapped, Output};
pub use self::mode::Mode;
pub use self::options::{BuildOptions, DEFAULT_WRITE_CONCURRENCY, TaskConfig};
