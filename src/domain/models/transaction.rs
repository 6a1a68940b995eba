//! Facility transaction audit records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Snapshot of one outbound HTTP request as sent to the facility.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpRequestRecord {
    pub method: String,
    pub url: String,
    /// Serialized body: the form or JSON payload actually sent.
    pub body: String,
}

/// Snapshot of the facility's HTTP response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpResponseRecord {
    pub status: u16,
    pub content: String,
}

/// Immutable audit record pairing an outbound request with its response.
///
/// Exactly one is created per ToO or XRT-job submission; never mutated
/// after insertion, and never created for data-query submissions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FacilityTransaction {
    pub id: Uuid,
    pub followup_request_id: Uuid,
    pub initiator_id: Uuid,
    pub request: HttpRequestRecord,
    pub response: HttpResponseRecord,
    pub created_at: DateTime<Utc>,
}

impl FacilityTransaction {
    /// Build a new transaction for a follow-up request.
    pub fn new(
        followup_request_id: Uuid,
        initiator_id: Uuid,
        request: HttpRequestRecord,
        response: HttpResponseRecord,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            followup_request_id,
            initiator_id,
            request,
            response,
            created_at: Utc::now(),
        }
    }
}
