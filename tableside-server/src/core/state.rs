use std::sync::Arc;

use crate::audit::{AuditService, AuditStorage, AuditWorker};
use crate::catalog::{InMemoryMenuCatalog, MenuCatalog};
use crate::core::{Config, Result, ServerError};
use crate::orders::{OrderStorage, OrdersManager};
use crate::realtime::RoomHub;
use crate::stations::StationQueue;
use crate::tables::TableOccupancy;

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求 clone 一次。
///
/// | 字段 | 说明 |
/// |------|------|
/// | config | 配置项 (不可变) |
/// | orders | 订单生命周期 + 明细 |
/// | queue | 出品站队列视图 |
/// | tables | 桌台占用视图 + 桌台管理 |
/// | catalog | 菜单查询 |
/// | rooms | 实时房间 (WebSocket) |
/// | audit | 审计日志 |
#[derive(Clone)]
pub struct ServerState {
    pub config: Config,
    pub orders: Arc<OrdersManager>,
    pub queue: Arc<StationQueue>,
    pub tables: Arc<TableOccupancy>,
    pub catalog: Arc<dyn MenuCatalog>,
    pub rooms: RoomHub,
    pub audit: Arc<AuditService>,
}

impl std::fmt::Debug for ServerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerState")
            .field("config", &self.config)
            .field("rooms", &self.rooms)
            .finish_non_exhaustive()
    }
}

impl ServerState {
    /// 初始化服务器状态
    ///
    /// 1. 创建工作目录
    /// 2. 打开订单库与审计库 (redb)
    /// 3. 启动审计 worker
    /// 4. 加载菜单
    /// 5. 首次启动时创建桌台
    ///
    /// 需要在 tokio runtime 内调用。
    pub async fn initialize(config: &Config) -> Result<Self> {
        std::fs::create_dir_all(&config.work_dir).map_err(|source| ServerError::WorkDir {
            path: config.work_dir.display().to_string(),
            source,
        })?;

        let storage = OrderStorage::open(config.database_path())?;
        let audit_storage = AuditStorage::open(config.audit_path())?;

        let (audit, audit_rx) = AuditService::new(audit_storage.clone(), config.audit_buffer_size);
        tokio::spawn(AuditWorker::new(audit_storage).run(audit_rx));

        let catalog: Arc<dyn MenuCatalog> = match &config.menu_file {
            Some(path) => {
                let catalog = InMemoryMenuCatalog::load_from_file(path)?;
                tracing::info!(path = %path.display(), items = catalog.len(), "Menu loaded from file");
                Arc::new(catalog)
            }
            None => {
                tracing::info!("MENU_FILE not set, using demo menu");
                Arc::new(InMemoryMenuCatalog::with_demo_menu())
            }
        };

        let rooms = RoomHub::new(config.room_channel_capacity);
        let orders = OrdersManager::new(
            storage.clone(),
            catalog.clone(),
            Arc::new(rooms.clone()),
            audit.clone(),
        )
        .with_strict_item_transitions(config.strict_item_transitions);
        let queue = StationQueue::new(storage.clone(), catalog.clone());
        let tables = TableOccupancy::new(storage, Arc::new(rooms.clone()), audit.clone());

        let seeded = tables.seed_tables(config.seed_tables)?;
        if seeded > 0 {
            tracing::info!(count = seeded, "First start, dining tables created");
        }

        Ok(Self {
            config: config.clone(),
            orders: Arc::new(orders),
            queue: Arc::new(queue),
            tables: Arc::new(tables),
            catalog,
            rooms,
            audit,
        })
    }
}
