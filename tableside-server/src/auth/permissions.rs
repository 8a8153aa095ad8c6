//! Permission Definitions
//!
//! 角色 → 操作的静态授权表，在调用核心操作之前检查。
//!
//! | 操作 | 角色 |
//! |------|------|
//! | 开单、加菜、送单、查单、关单、桌台列表 | SERVER, ADMIN |
//! | 更新菜品状态 | KITCHEN, BAR, ADMIN |
//! | 厨房队列 | KITCHEN, ADMIN |
//! | 吧台队列 | BAR, ADMIN |
//! | 桌台管理、审计日志 | ADMIN |
//! | 菜单查看 | 所有角色 |

use std::fmt;

use shared::error::AppError;
use shared::models::Station;
use thiserror::Error;

use super::{Actor, Role};

/// Operations subject to authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    OpenOrder,
    AddItem,
    SendOrder,
    GetOrder,
    CloseOrder,
    ListTables,
    UpdateItemStatus,
    ViewQueue(Station),
    ManageTables,
    ReadAudit,
    ViewMenu,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::OpenOrder => f.write_str("open_order"),
            Operation::AddItem => f.write_str("add_item"),
            Operation::SendOrder => f.write_str("send_order"),
            Operation::GetOrder => f.write_str("get_order"),
            Operation::CloseOrder => f.write_str("close_order"),
            Operation::ListTables => f.write_str("list_tables"),
            Operation::UpdateItemStatus => f.write_str("update_item_status"),
            Operation::ViewQueue(station) => write!(f, "view_queue:{}", station),
            Operation::ManageTables => f.write_str("manage_tables"),
            Operation::ReadAudit => f.write_str("read_audit"),
            Operation::ViewMenu => f.write_str("view_menu"),
        }
    }
}

/// Check whether a role may perform an operation
pub fn is_allowed(role: Role, operation: Operation) -> bool {
    use Operation::*;

    if role == Role::Admin {
        return true;
    }
    match operation {
        OpenOrder | AddItem | SendOrder | GetOrder | CloseOrder | ListTables => {
            role == Role::Server
        }
        UpdateItemStatus => matches!(role, Role::Kitchen | Role::Bar),
        ViewQueue(Station::Kitchen) => role == Role::Kitchen,
        ViewQueue(Station::Bar) => role == Role::Bar,
        ManageTables | ReadAudit => false,
        ViewMenu => true,
    }
}

/// Rejected operation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Role {role} is not allowed to {operation}")]
pub struct Forbidden {
    pub role: Role,
    pub operation: Operation,
}

impl From<Forbidden> for AppError {
    fn from(err: Forbidden) -> Self {
        AppError::permission_denied(err.to_string())
            .with_detail("role", err.role.as_str())
            .with_detail("operation", err.operation.to_string())
    }
}

/// Apply [`is_allowed`] to an actor
pub fn authorize(actor: &Actor, operation: Operation) -> Result<(), Forbidden> {
    if is_allowed(actor.role, operation) {
        Ok(())
    } else {
        crate::security_log!(
            "WARN",
            "permission_denied",
            actor_id = actor.id.as_str(),
            role = actor.role.as_str(),
            operation = operation.to_string()
        );
        Err(Forbidden {
            role: actor.role,
            operation,
        })
    }
}
