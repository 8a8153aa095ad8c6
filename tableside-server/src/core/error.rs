use thiserror::Error;

use crate::audit::AuditStorageError;
use crate::catalog::CatalogError;
use crate::orders::OrderError;
use crate::orders::StorageError;

/// 启动 / 运行期错误（请求级错误走 `AppError`）
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("无法创建工作目录 {path}: {source}")]
    WorkDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("订单存储初始化失败: {0}")]
    Storage(#[from] StorageError),

    #[error("审计存储初始化失败: {0}")]
    AuditStorage(#[from] AuditStorageError),

    #[error("菜单加载失败: {0}")]
    Catalog(#[from] CatalogError),

    #[error("桌台初始化失败: {0}")]
    Seed(#[from] OrderError),

    #[error("监听失败: {0}")]
    Bind(#[source] std::io::Error),

    #[error("内部服务器错误")]
    Internal(#[from] anyhow::Error),
}

/// 服务器 Result 类型别名
pub type Result<T> = std::result::Result<T, ServerError>;
