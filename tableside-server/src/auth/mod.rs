//! 请求上下文与授权
//!
//! 身份签发不在本服务范围内，调用方提供 actor 身份与角色：
//! - [`Actor`] - 当前操作者（id + role）
//! - [`Role`] - 前厅 / 厨房 / 吧台 / 管理员
//! - [`permissions::is_allowed`] - 纯函数 `(role, operation) → allowed`
//! - [`extractor`] - 从 `X-Actor-Id` / `X-Actor-Role` 头提取 [`Actor`]

pub mod extractor;
pub mod permissions;

pub use extractor::{ACTOR_ID_HEADER, ACTOR_ROLE_HEADER};
pub use permissions::{Forbidden, Operation, authorize, is_allowed};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Actor role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Front-of-house
    Server,
    Kitchen,
    Bar,
    Admin,
}

impl Role {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Role::Server => "SERVER",
            Role::Kitchen => "KITCHEN",
            Role::Bar => "BAR",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "SERVER" => Ok(Role::Server),
            "KITCHEN" => Ok(Role::Kitchen),
            "BAR" => Ok(Role::Bar),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// Authenticated caller identity, passed explicitly to every core operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            role,
        }
    }
}
