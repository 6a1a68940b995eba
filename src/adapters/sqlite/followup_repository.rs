//! SQLite implementation of the follow-up request repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::domain::models::{
    Comment, FacilityTransaction, FollowupRequest, HttpRequestRecord, HttpResponseRecord,
};
use crate::domain::ports::errors::DatabaseError;
use crate::domain::ports::FollowupRepository;

/// SQLite-backed follow-up request repository.
///
/// The platform-owned parts of the record (target, allocation, payload)
/// are stored as JSON documents; only `status` is mutated in place.
#[derive(Clone)]
pub struct SqliteFollowupRepository {
    pool: SqlitePool,
}

impl SqliteFollowupRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn parse_created_at(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|_| Utc::now())
    }

    fn row_to_request(row: &sqlx::sqlite::SqliteRow) -> Result<FollowupRequest, DatabaseError> {
        let id: String = row.get("id");
        let obj: String = row.get("obj");
        let allocation: String = row.get("allocation");
        let payload: String = row.get("payload");
        let status: String = row.get("status");
        let last_modified_by: String = row.get("last_modified_by");

        Ok(FollowupRequest {
            id: Uuid::parse_str(&id).unwrap_or_default(),
            obj: serde_json::from_str(&obj)?,
            allocation: serde_json::from_str(&allocation)?,
            payload: serde_json::from_str(&payload)?,
            status,
            last_modified_by: Uuid::parse_str(&last_modified_by).unwrap_or_default(),
        })
    }
}

#[async_trait]
impl FollowupRepository for SqliteFollowupRepository {
    async fn insert(&self, request: &FollowupRequest) -> Result<(), DatabaseError> {
        sqlx::query(
            r"
            INSERT INTO followup_requests (id, obj, allocation, payload, status, last_modified_by)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(request.id.to_string())
        .bind(serde_json::to_string(&request.obj)?)
        .bind(serde_json::to_string(&request.allocation)?)
        .bind(serde_json::to_string(&request.payload)?)
        .bind(&request.status)
        .bind(request.last_modified_by.to_string())
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<FollowupRequest>, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, obj, allocation, payload, status, last_modified_by
             FROM followup_requests WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(Self::row_to_request).transpose()
    }

    async fn update_status(&self, id: Uuid, status: &str) -> Result<(), DatabaseError> {
        let result = sqlx::query("UPDATE followup_requests SET status = ? WHERE id = ?")
            .bind(status)
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::RequestNotFound(id));
        }
        Ok(())
    }

    async fn record_submission(
        &self,
        request_id: Uuid,
        status: &str,
        transaction: &FacilityTransaction,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        // Transaction row first, then status; both or neither commit.
        sqlx::query(
            r"
            INSERT INTO facility_transactions
                (id, followup_request_id, initiator_id, request, response, created_at)
            VALUES (?, ?, ?, ?, ?, ?)
            ",
        )
        .bind(transaction.id.to_string())
        .bind(transaction.followup_request_id.to_string())
        .bind(transaction.initiator_id.to_string())
        .bind(serde_json::to_string(&transaction.request)?)
        .bind(serde_json::to_string(&transaction.response)?)
        .bind(transaction.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("UPDATE followup_requests SET status = ? WHERE id = ?")
            .bind(status)
            .bind(request_id.to_string())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::RequestNotFound(request_id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn last_transaction(
        &self,
        request_id: Uuid,
    ) -> Result<Option<FacilityTransaction>, DatabaseError> {
        let row = sqlx::query(
            "SELECT id, followup_request_id, initiator_id, request, response, created_at
             FROM facility_transactions
             WHERE followup_request_id = ?
             ORDER BY created_at DESC, rowid DESC
             LIMIT 1",
        )
        .bind(request_id.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else { return Ok(None) };

        let id: String = row.get("id");
        let followup_request_id: String = row.get("followup_request_id");
        let initiator_id: String = row.get("initiator_id");
        let request_json: String = row.get("request");
        let response_json: String = row.get("response");
        let created_at: String = row.get("created_at");

        let request: HttpRequestRecord = serde_json::from_str(&request_json)?;
        let response: HttpResponseRecord = serde_json::from_str(&response_json)?;

        Ok(Some(FacilityTransaction {
            id: Uuid::parse_str(&id).unwrap_or_default(),
            followup_request_id: Uuid::parse_str(&followup_request_id).unwrap_or_default(),
            initiator_id: Uuid::parse_str(&initiator_id).unwrap_or_default(),
            request,
            response,
            created_at: Self::parse_created_at(&created_at),
        }))
    }

    async fn post_results(
        &self,
        request_id: Uuid,
        status: &str,
        comments: &[Comment],
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        for comment in comments {
            sqlx::query(
                r"
                INSERT INTO comments
                    (id, obj_id, text, attachment_name, attachment_bytes, author_id, group_ids, bot)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                ",
            )
            .bind(comment.id.to_string())
            .bind(&comment.obj_id)
            .bind(&comment.text)
            .bind(&comment.attachment_name)
            .bind(&comment.attachment_bytes)
            .bind(comment.author_id.to_string())
            .bind(serde_json::to_string(&comment.group_ids)?)
            .bind(i64::from(comment.bot))
            .execute(&mut *tx)
            .await?;
        }

        let result = sqlx::query("UPDATE followup_requests SET status = ? WHERE id = ?")
            .bind(status)
            .bind(request_id.to_string())
            .execute(&mut *tx)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::RequestNotFound(request_id));
        }

        tx.commit().await?;
        Ok(())
    }

    async fn count_comments(&self, obj_id: &str) -> Result<i64, DatabaseError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM comments WHERE obj_id = ?")
            .bind(obj_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
