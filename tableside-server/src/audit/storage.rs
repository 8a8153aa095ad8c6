//! 审计日志 redb 存储层
//!
//! Append-only 设计，没有任何删除/更新接口。
//! SHA256 哈希链确保防篡改。

use redb::{Database, ReadableDatabase, ReadableTable, ReadableTableMetadata, TableDefinition};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

use super::types::{AuditAction, AuditChainBreak, AuditChainVerification, AuditEntry};

/// key = sequence, value = JSON-serialized AuditEntry
const AUDIT_LOG_TABLE: TableDefinition<u64, &[u8]> = TableDefinition::new("audit_log");

const GENESIS_HASH: &str = "genesis";

/// 存储错误
#[derive(Debug, Error)]
pub enum AuditStorageError {
    #[error("Database error: {0}")]
    Database(#[from] redb::DatabaseError),
    #[error("Transaction error: {0}")]
    Transaction(#[from] redb::TransactionError),
    #[error("Table error: {0}")]
    Table(#[from] redb::TableError),
    #[error("Storage error: {0}")]
    Storage(#[from] redb::StorageError),
    #[error("Commit error: {0}")]
    Commit(#[from] redb::CommitError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type AuditStorageResult<T> = Result<T, AuditStorageError>;

impl From<AuditStorageError> for shared::error::AppError {
    fn from(err: AuditStorageError) -> Self {
        shared::error::AppError::database(err.to_string())
    }
}

/// 审计日志存储 (redb)
///
/// - 仅提供 `append` 和查询方法
/// - redb 写事务串行，序列号与 prev_hash 的读改写不会竞争
#[derive(Clone)]
pub struct AuditStorage {
    db: Arc<Database>,
}

impl std::fmt::Debug for AuditStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditStorage").finish_non_exhaustive()
    }
}

impl AuditStorage {
    pub fn open(path: impl AsRef<Path>) -> AuditStorageResult<Self> {
        Self::init(Database::create(path)?)
    }

    /// Open an in-memory database (for testing)
    #[cfg(test)]
    pub fn open_in_memory() -> AuditStorageResult<Self> {
        Self::init(
            Database::builder().create_with_backend(redb::backends::InMemoryBackend::new())?,
        )
    }

    fn init(db: Database) -> AuditStorageResult<Self> {
        let txn = db.begin_write()?;
        {
            let _ = txn.open_table(AUDIT_LOG_TABLE)?;
        }
        txn.commit()?;
        Ok(Self { db: Arc::new(db) })
    }

    /// 追加一条审计日志
    ///
    /// 1. 读取最后一条的序列号和哈希
    /// 2. 计算新条目的哈希
    /// 3. 写入条目
    pub fn append(
        &self,
        action: AuditAction,
        resource_type: String,
        resource_id: String,
        operator_id: Option<String>,
        details: serde_json::Value,
    ) -> AuditStorageResult<AuditEntry> {
        let txn = self.db.begin_write()?;
        let entry = {
            let mut table = txn.open_table(AUDIT_LOG_TABLE)?;

            let (sequence, prev_hash) = match table.last()? {
                Some((key, value)) => {
                    let last: AuditEntry = serde_json::from_slice(value.value())?;
                    (key.value() + 1, last.curr_hash)
                }
                None => (1, GENESIS_HASH.to_string()),
            };

            let timestamp = shared::util::now_millis();
            let curr_hash = compute_audit_hash(
                &prev_hash,
                sequence,
                timestamp,
                &action,
                &resource_type,
                &resource_id,
                operator_id.as_deref(),
                &details,
            );

            let entry = AuditEntry {
                id: sequence,
                timestamp,
                action,
                resource_type,
                resource_id,
                operator_id,
                details,
                prev_hash,
                curr_hash,
            };
            let value = serde_json::to_vec(&entry)?;
            table.insert(sequence, value.as_slice())?;
            entry
        };
        txn.commit()?;
        Ok(entry)
    }

    /// 查询最后 N 条审计日志（倒序）及总数
    pub fn query_last(&self, count: usize) -> AuditStorageResult<(Vec<AuditEntry>, u64)> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AUDIT_LOG_TABLE)?;
        let total = table.len()?;

        let mut entries = Vec::with_capacity(count.min(total as usize));
        for result in table.iter()?.rev().take(count) {
            let (_key, value) = result?;
            entries.push(serde_json::from_slice(value.value())?);
        }
        Ok((entries, total))
    }

    /// 验证整条哈希链
    pub fn verify_chain(&self) -> AuditStorageResult<AuditChainVerification> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(AUDIT_LOG_TABLE)?;

        let mut expected_prev = GENESIS_HASH.to_string();
        let mut breaks = Vec::new();
        let mut total_entries = 0u64;

        for result in table.iter()? {
            let (_key, value) = result?;
            let entry: AuditEntry = serde_json::from_slice(value.value())?;
            total_entries += 1;

            let recomputed = compute_audit_hash(
                &entry.prev_hash,
                entry.id,
                entry.timestamp,
                &entry.action,
                &entry.resource_type,
                &entry.resource_id,
                entry.operator_id.as_deref(),
                &entry.details,
            );
            let hash_mismatch = recomputed != entry.curr_hash;

            if entry.prev_hash != expected_prev || hash_mismatch {
                breaks.push(AuditChainBreak {
                    entry_id: entry.id,
                    expected_prev_hash: expected_prev.clone(),
                    actual_prev_hash: entry.prev_hash.clone(),
                    hash_mismatch,
                });
            }
            expected_prev = entry.curr_hash;
        }

        Ok(AuditChainVerification {
            total_entries,
            chain_intact: breaks.is_empty(),
            breaks,
        })
    }

    /// 覆盖一条记录（仅测试篡改检测用）
    #[cfg(test)]
    fn overwrite(&self, entry: &AuditEntry) -> AuditStorageResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(AUDIT_LOG_TABLE)?;
            let value = serde_json::to_vec(entry)?;
            table.insert(entry.id, value.as_slice())?;
        }
        txn.commit()?;
        Ok(())
    }
}

/// 计算审计条目的 SHA256 哈希
///
/// - 变长字段间用 `\x00` 分隔，防止 `("ab","cd")` 与 `("abc","d")` 碰撞
/// - 定长字段（u64/i64）用 LE 字节序
/// - Optional 字段用 `\x00`=None / `\x01`+bytes=Some 区分
#[allow(clippy::too_many_arguments)]
fn compute_audit_hash(
    prev_hash: &str,
    id: u64,
    timestamp: i64,
    action: &AuditAction,
    resource_type: &str,
    resource_id: &str,
    operator_id: Option<&str>,
    details: &serde_json::Value,
) -> String {
    let mut hasher = Sha256::new();

    hasher.update(prev_hash.as_bytes());
    hasher.update(b"\x00");

    hasher.update(id.to_le_bytes());
    hasher.update(timestamp.to_le_bytes());

    hasher.update(action.as_str().as_bytes());
    hasher.update(b"\x00");

    hasher.update(resource_type.as_bytes());
    hasher.update(b"\x00");
    hasher.update(resource_id.as_bytes());
    hasher.update(b"\x00");

    hash_optional(&mut hasher, operator_id);

    let details_json = serde_json::to_string(details).unwrap_or_default();
    hasher.update(details_json.as_bytes());
    hasher.update(b"\x00");

    hex::encode(hasher.finalize())
}

/// Optional 字段哈希：`\x00` = None, `\x01` + bytes + `\x00` = Some
fn hash_optional(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(v) => {
            hasher.update(b"\x01");
            hasher.update(v.as_bytes());
        }
        None => {
            hasher.update(b"\x00");
        }
    }
    hasher.update(b"\x00");
}
