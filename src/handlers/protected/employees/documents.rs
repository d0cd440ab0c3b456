use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashSet;
use uuid::Uuid;

use crate::database::models::Document;
use crate::database::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Clone, Deserialize)]
pub struct DocumentPayload {
    pub document_type: String,
    pub file_name: String,
    /// URL at the external media host; bytes are never stored here.
    pub file_url: String,
    pub provider_public_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    pub document_type: Option<String>,
}

impl DocumentPayload {
    fn validate(&self) -> Result<(), ApiError> {
        if self.document_type.trim().is_empty() {
            return Err(ApiError::field_error("document_type", "Document type is required"));
        }
        if self.file_name.trim().is_empty() {
            return Err(ApiError::field_error("file_name", "File name is required"));
        }
        if url::Url::parse(self.file_url.trim()).is_err() {
            return Err(ApiError::field_error("file_url", "File URL must be a valid URL"));
        }
        Ok(())
    }
}

/// GET /api/admin/employees/:id/documents
pub async fn list(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
) -> ApiResult<Vec<Document>> {
    auth.require("admin", "employee", "read")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let documents: Vec<Document> =
        sqlx::query_as("SELECT * FROM documents WHERE employee_id = $1 ORDER BY uploaded_at")
            .bind(employee_id)
            .fetch_all(&pool)
            .await?;

    Ok(ApiResponse::success(documents))
}

/// POST /api/admin/employees/:id/documents - one document per
/// (employee, document_type); duplicates are rejected with 400.
pub async fn create(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<DocumentPayload>,
) -> ApiResult<Document> {
    auth.require("admin", "employee", "update")?;
    payload.validate()?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let document = insert_document(&pool, employee_id, &payload).await?;
    Ok(ApiResponse::created(document))
}

/// PUT /api/admin/employees/:id/documents - replace-all
pub async fn replace_all(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Json(payload): Json<Vec<DocumentPayload>>,
) -> ApiResult<Vec<Document>> {
    auth.require("admin", "employee", "update")?;
    for document in &payload {
        document.validate()?;
    }
    reject_duplicate_types(&payload)?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let stored = replace_documents(&pool, employee_id, &payload).await?;
    Ok(ApiResponse::success(stored))
}

/// Replace-all: delete every document, then store exactly the new set.
pub(crate) async fn replace_documents(
    pool: &PgPool,
    employee_id: Uuid,
    payload: &[DocumentPayload],
) -> Result<Vec<Document>, ApiError> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM documents WHERE employee_id = $1")
        .bind(employee_id)
        .execute(&mut *tx)
        .await?;

    let mut stored = Vec::with_capacity(payload.len());
    for document in payload {
        let row: Document = sqlx::query_as(
            r#"
            INSERT INTO documents
                (employee_id, document_type, file_name, file_url, provider_public_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(employee_id)
        .bind(document.document_type.trim())
        .bind(&document.file_name)
        .bind(document.file_url.trim())
        .bind(&document.provider_public_id)
        .fetch_one(&mut *tx)
        .await?;
        stored.push(row);
    }

    tx.commit().await?;
    Ok(stored)
}

/// DELETE /api/admin/employees/:id/documents[?document_type=] - remove one
/// document type, or all documents when no type is given.
pub async fn delete(
    Extension(auth): Extension<AuthUser>,
    Path(employee_id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> ApiResult<()> {
    auth.require("admin", "employee", "update")?;

    let pool = DatabaseManager::pool().await?;
    super::ensure_employee(&pool, employee_id).await?;

    let result = match &query.document_type {
        Some(doc_type) => {
            sqlx::query("DELETE FROM documents WHERE employee_id = $1 AND document_type = $2")
                .bind(employee_id)
                .bind(doc_type)
                .execute(&pool)
                .await?
        }
        None => {
            sqlx::query("DELETE FROM documents WHERE employee_id = $1")
                .bind(employee_id)
                .execute(&pool)
                .await?
        }
    };

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("No matching documents"));
    }

    Ok(ApiResponse::success(())
        .with_message(format!("Removed {} document(s)", result.rows_affected())))
}

pub(crate) async fn insert_document(
    pool: &PgPool,
    employee_id: Uuid,
    payload: &DocumentPayload,
) -> Result<Document, ApiError> {
    let document: Document = sqlx::query_as(
        r#"
        INSERT INTO documents
            (employee_id, document_type, file_name, file_url, provider_public_id)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(employee_id)
    .bind(payload.document_type.trim())
    .bind(&payload.file_name)
    .bind(payload.file_url.trim())
    .bind(&payload.provider_public_id)
    .fetch_one(pool)
    .await
    .map_err(|e| match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => ApiError::bad_request(
            "A document of this type already exists for this employee",
        ),
        _ => e.into(),
    })?;
    Ok(document)
}

fn reject_duplicate_types(payload: &[DocumentPayload]) -> Result<(), ApiError> {
    let mut seen = HashSet::new();
    for document in payload {
        if !seen.insert(document.document_type.trim().to_string()) {
            return Err(ApiError::bad_request(
                "Duplicate document_type in submitted set",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(doc_type: &str) -> DocumentPayload {
        DocumentPayload {
            document_type: doc_type.to_string(),
            file_name: "passport.pdf".to_string(),
            file_url: "https://media.example.com/docs/abc123".to_string(),
            provider_public_id: Some("docs/abc123".to_string()),
        }
    }

    #[test]
    fn valid_payload_passes() {
        assert!(payload("passport").validate().is_ok());
    }

    #[test]
    fn file_url_must_parse() {
        let mut bad = payload("passport");
        bad.file_url = "not a url".to_string();
        assert!(bad.validate().is_err());
    }

    #[test]
    fn duplicate_types_in_set_are_rejected() {
        assert!(reject_duplicate_types(&[payload("passport"), payload("passport")]).is_err());
        assert!(reject_duplicate_types(&[payload("passport"), payload("pan_card")]).is_ok());
    }
}
