use tableside_server::{Config, Server, ServerState, init_logger, print_banner};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. 加载 .env
    dotenv::dotenv().ok();

    // 2. 加载配置
    let config = Config::from_env();

    // 3. 初始化日志 (控制台 + 按天滚动文件)
    let log_dir = config.log_dir();
    init_logger(&config.log_level, config.log_json, Some(log_dir.as_path()))?;

    print_banner();
    tracing::info!(
        environment = %config.environment,
        work_dir = %config.work_dir.display(),
        "🍽️ Tableside Server starting..."
    );

    // 4. 初始化服务器状态 (存储、审计 worker、菜单、桌台)
    let state = ServerState::initialize(&config).await?;

    // 5. 启动 HTTP 服务器
    let server = Server::with_state(config, state);
    if let Err(e) = server.run().await {
        tracing::error!("Server error: {}", e);
        return Err(e.into());
    }

    Ok(())
}
