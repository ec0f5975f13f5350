use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use tuneshield_backend::{
    config::Config, error::AppResult, handlers::AppState, routes::build_router,
};

const CONFIG_PATH: &str = "config.toml";

#[tokio::main]
async fn main() -> AppResult<()> {
    // 初始化日志
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tuneshield_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = if std::path::Path::new(CONFIG_PATH).exists() {
        let config = Config::from_file(CONFIG_PATH)?;
        tracing::info!("已加载配置文件: {}", CONFIG_PATH);
        config
    } else {
        tracing::warn!("未找到配置文件，使用默认配置");
        let default_config = Config::default();
        // 保存默认配置到文件
        if let Err(e) = default_config.save_to_file(CONFIG_PATH) {
            tracing::warn!("保存默认配置失败: {}", e);
        }
        let mut config = default_config;
        config.apply_env_overrides();
        config.validate()?;
        config
    };

    tracing::info!(
        strategy = config.analysis.strategy.as_str(),
        max_file_size = config.file.max_size,
        "服务器配置: {}",
        config.server_addr()
    );

    // 创建应用状态
    let app_state = AppState::from_config(config.clone())?;
    let app = build_router(app_state);

    // 启动服务器
    let listener = tokio::net::TcpListener::bind(&config.server_addr()).await?;
    tracing::info!("🚀 服务器启动成功，监听地址: {}", config.server_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("服务器已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("监听退出信号失败: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("收到退出信号，正在关闭");
}
