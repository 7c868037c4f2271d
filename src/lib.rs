// 导出模块
pub mod twcommon;
pub mod twwatch;

// Re-export error types
pub use twcommon::error::{AppError, Result};
