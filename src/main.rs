// ==========================================
// IT 资产台账系统 - HTTP 服务主入口
// ==========================================
// 环境变量:
// - IT_ASSET_DB_PATH: 数据库文件路径
// - IT_ASSET_BIND_ADDR: 监听地址（默认 127.0.0.1:8080）
// - RUST_LOG: 日志级别
// ==========================================

use it_asset_tracker::api::build_router;
use it_asset_tracker::app::{get_default_db_path, AppState};
use it_asset_tracker::logging;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

fn bind_addr() -> String {
    std::env::var("IT_ASSET_BIND_ADDR")
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 初始化日志系统
    logging::init();

    tracing::info!("==================================================");
    tracing::info!("{}", it_asset_tracker::APP_NAME);
    tracing::info!("系统版本: {}", it_asset_tracker::VERSION);
    tracing::info!("==================================================");

    // 获取数据库路径
    let db_path = get_default_db_path();
    tracing::info!("使用数据库: {}", db_path);

    let app_state = AppState::new(db_path)
        .await
        .map_err(|e| anyhow::anyhow!("无法初始化AppState: {}", e))?;

    let app = build_router(app_state);

    let addr = bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| anyhow::anyhow!("无法监听 {}: {}", addr, e))?;
    tracing::info!("HTTP 服务已启动: http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP 服务已停止");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("无法监听退出信号: {}", e);
    }
}
