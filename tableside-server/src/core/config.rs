use std::path::PathBuf;

/// 服务器配置
///
/// # 环境变量
///
/// 所有配置项都可以通过环境变量覆盖（启动时先加载 `.env`）：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | WORK_DIR | ./data | 工作目录（数据库、审计库、日志） |
/// | HTTP_PORT | 3000 | HTTP + WebSocket 端口 |
/// | ENVIRONMENT | development | 运行环境 |
/// | LOG_LEVEL | info | 日志级别（RUST_LOG 优先） |
/// | LOG_JSON | 生产环境 true | JSON 日志 |
/// | MENU_FILE | - | 菜单 JSON 文件，未设置时使用内置演示菜单 |
/// | SEED_TABLES | 15 | 首次启动创建的桌台数量 |
/// | AUDIT_BUFFER_SIZE | 1024 | 审计通道容量 |
/// | ROOM_CHANNEL_CAPACITY | 256 | 每个房间的广播容量 |
/// | STRICT_ITEM_TRANSITIONS | true | 菜品状态只允许前进 |
/// | CORS_ORIGINS | - | 允许的来源（逗号分隔），未设置时放开 |
///
/// # 示例
///
/// ```ignore
/// WORK_DIR=/data/tableside HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// 工作目录
    pub work_dir: PathBuf,
    pub http_port: u16,
    /// 运行环境: development | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    pub menu_file: Option<PathBuf>,
    pub seed_tables: u32,
    pub audit_buffer_size: usize,
    pub room_channel_capacity: usize,
    /// 菜品状态前进校验（NEW → IN_PROGRESS → DONE）
    pub strict_item_transitions: bool,
    pub cors_origins: Vec<String>,
}

impl Config {
    /// 从环境变量加载配置
    ///
    /// 如果环境变量未设置，使用默认值
    pub fn from_env() -> Self {
        let environment = std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into());
        let is_production = environment == "production";

        Self {
            work_dir: std::env::var("WORK_DIR")
                .unwrap_or_else(|_| "./data".into())
                .into(),
            http_port: env_parse("HTTP_PORT").unwrap_or(3000),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_parse("LOG_JSON").unwrap_or(is_production),
            environment,
            menu_file: std::env::var("MENU_FILE").ok().map(PathBuf::from),
            seed_tables: env_parse("SEED_TABLES").unwrap_or(15),
            audit_buffer_size: env_parse("AUDIT_BUFFER_SIZE").unwrap_or(1024),
            room_channel_capacity: env_parse("ROOM_CHANNEL_CAPACITY").unwrap_or(256),
            strict_item_transitions: env_parse("STRICT_ITEM_TRANSITIONS").unwrap_or(true),
            cors_origins: std::env::var("CORS_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        }
    }

    /// 测试用配置：指定工作目录，其余取默认值（不读环境变量）
    pub fn with_work_dir(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            http_port: 0,
            environment: "development".into(),
            log_level: "info".into(),
            log_json: false,
            menu_file: None,
            seed_tables: 15,
            audit_buffer_size: 1024,
            room_channel_capacity: 256,
            strict_item_transitions: true,
            cors_origins: Vec::new(),
        }
    }

    /// 订单数据库路径
    pub fn database_path(&self) -> PathBuf {
        self.work_dir.join("orders.redb")
    }

    /// 审计日志数据库路径
    pub fn audit_path(&self) -> PathBuf {
        self.work_dir.join("audit.redb")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.work_dir.join("logs")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
