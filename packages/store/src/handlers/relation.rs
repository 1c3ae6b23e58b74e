use axum::Json;
use axum::extract::{Path, State};
use sea_orm::*;
use tracing::instrument;

use crate::entity::user_book_relation;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::AppJson;
use crate::models::relation::*;
use crate::permissions::{self, Action};
use crate::query::book::find_book;
use crate::query::relation::get_or_create;
use crate::state::AppState;

#[utoipa::path(
    patch,
    path = "/{book_id}",
    tag = "Relations",
    operation_id = "patchRelation",
    summary = "Like, bookmark or rate a book",
    description = "Updates the requester's relation to the book, creating it on first use. Only fields present in the body change; `null` resets a field. `rate` must be 1-5.",
    params(("book_id" = i32, Path, description = "Book ID")),
    request_body = RelationPatch,
    responses(
        (status = 200, description = "Relation updated", body = RelationResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Book not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, patch), fields(book_id, user_id = auth_user.user_id))]
pub async fn patch_relation(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(book_id): Path<i32>,
    AppJson(patch): AppJson<RelationPatch>,
) -> Result<Json<RelationResponse>, AppError> {
    validate_relation_patch(&patch)?;

    let txn = state.db.begin().await?;

    find_book(&txn, book_id).await?;
    let (relation, created) = get_or_create(&txn, auth_user.user_id, book_id).await?;
    if created {
        tracing::debug!("Created relation");
    }
    permissions::authorize(Some(&auth_user), Some(&relation), Action::Update)?;

    if patch == RelationPatch::default() {
        txn.commit().await?;
        return Ok(Json(relation.into()));
    }

    let mut active: user_book_relation::ActiveModel = relation.into();
    if let Some(like) = patch.like {
        active.like = Set(like);
    }
    if let Some(bookmarks) = patch.bookmarks {
        active.bookmarks = Set(bookmarks);
    }
    if let Some(rate) = patch.rate {
        active.rate = Set(rate);
    }

    let model = active.update(&txn).await?;
    txn.commit().await?;

    Ok(Json(model.into()))
}
