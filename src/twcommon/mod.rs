// 导出共享模块
pub mod api;
pub mod config;
pub mod error;
pub mod logging_setup;
pub mod models;
pub mod registry;
pub mod session;

// 重新导出常用类型，方便使用
pub use api::{build_quote_provider, QuoteProvider, RetailProvider, TencentQuoteApi, WencaiRetailApi};
pub use config::{LoggingConfig, WatchConfig};
pub use error::{AppError, Result};
pub use models::{DerivedRow, Market, QuoteRecord, RetailRow, Symbol, TickSnapshot};
pub use registry::SymbolRegistry;
