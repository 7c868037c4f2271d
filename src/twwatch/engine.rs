//! 引擎装配与生命周期
//!
//! 启动函数完成注册表加载、自选股解析、状态与客户端构造，再把两条
//! 循环作为独立任务拉起并安装共享停止标志。快循环不持有慢循环的
//! 生命周期，两者只通过停止标志与共享状态关联。

use crate::twcommon::{
    build_quote_provider, QuoteProvider, RetailProvider, Result, Symbol, SymbolRegistry,
    WatchConfig, WencaiRetailApi,
};
use crate::twwatch::reporter::Reporter;
use crate::twwatch::retail_poller::RetailPoller;
use crate::twwatch::rolling::SignalParams;
use crate::twwatch::state::WatchState;
use crate::twwatch::tick_poller::TickPoller;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{error, info};

/// 盯盘引擎
pub struct WatchEngine {
    config: WatchConfig,
    registry: Arc<SymbolRegistry>,
    watchlist: Arc<Vec<Symbol>>,
    state: Arc<WatchState>,
    quote_provider: Arc<dyn QuoteProvider>,
    retail_provider: Arc<dyn RetailProvider>,
}

impl WatchEngine {
    /// 按配置装配引擎，所有启动期校验在此完成
    pub fn new(config: WatchConfig) -> Result<Self> {
        config.validate()?;

        let registry = Arc::new(SymbolRegistry::load(&config.symbol_table_path)?);
        let watchlist = Arc::new(registry.resolve(&config.watchlist)?);
        let state = Arc::new(WatchState::new(SignalParams::from(&config)));
        let quote_provider = build_quote_provider(&config.price_source)?;
        let retail_provider: Arc<dyn RetailProvider> = Arc::new(WencaiRetailApi::new());

        info!(
            "🚀 盯盘引擎装配完成，自选股 {} 个，行情后端: {}",
            watchlist.len(),
            config.price_source
        );

        Ok(Self {
            config,
            registry,
            watchlist,
            state,
            quote_provider,
            retail_provider,
        })
    }

    /// 测试注入用：替换两个上游客户端
    pub fn with_providers(
        mut self,
        quote: Arc<dyn QuoteProvider>,
        retail: Arc<dyn RetailProvider>,
    ) -> Self {
        self.quote_provider = quote;
        self.retail_provider = retail;
        self
    }

    pub fn state(&self) -> Arc<WatchState> {
        self.state.clone()
    }

    pub fn watchlist(&self) -> Arc<Vec<Symbol>> {
        self.watchlist.clone()
    }

    /// 拉起两条循环并阻塞到中断信号，随后置停止标志、等循环收尾
    pub async fn run(self) -> Result<()> {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let tick_poller = TickPoller::new(
            self.quote_provider.clone(),
            self.state.clone(),
            Arc::new(Reporter::new()),
            self.watchlist.clone(),
            self.config.tick_interval_secs,
            shutdown_rx.clone(),
        );

        let retail_poller = RetailPoller::new(
            self.retail_provider.clone(),
            self.state.clone(),
            self.registry.clone(),
            &self.watchlist,
            self.config.retail_interval_secs,
            shutdown_rx,
        );

        let tick_handle = tokio::spawn(tick_poller.run());
        let retail_handle = tokio::spawn(retail_poller.run());

        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("收到中断信号，开始退出"),
            Err(e) => error!("监听中断信号失败，直接退出: {}", e),
        }

        // 置位停止标志；在途的上游请求允许自然完成
        let _ = shutdown_tx.send(true);

        let _ = tick_handle.await;
        let _ = retail_handle.await;

        info!("两条循环均已退出，进程结束");
        Ok(())
    }
}
