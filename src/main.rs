use longbill_desk::{build_router, AppConfig, AppState, HttpRemote};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::fmt::time::ChronoLocal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 初始化日志 - 本地时间格式
    tracing_subscriber::fmt()
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S".to_string()))
        .with_target(true)
        .with_level(true)
        .init();

    // 加载配置
    let config = AppConfig::from_env()?;
    info!("Starting server with config: {:?}", config);

    // 远端业务服务客户端
    let remote = HttpRemote::new(&config.remote)?;
    info!("Remote service at {}", remote.base_url());

    let app = build_router(AppState::new(Arc::new(remote)));

    // 启动服务器
    let addr = format!("{}:{}", config.server.host, config.server.port);
    info!("Server listening on {}", addr);
    info!("API Endpoints:");
    info!("  GET  /api/plans                  - meal plans (filter: term, from, to)");
    info!("  POST /api/plans                  - upload meal plan file");
    info!("  GET  /api/plans/:plan_id/bills   - long bills of a plan");
    info!("  POST /api/selections             - pick plan items to generate a long bill");
    info!("  POST /api/sessions               - open a long bill for viewing/editing");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
