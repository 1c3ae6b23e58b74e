use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;

use crate::entity::{book, user_book_relation};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::request::{AppJson, AppQuery};
use crate::models::book::*;
use crate::permissions::{self, Action};
use crate::query::book::{BookListParams, annotate, find_book, list_annotated};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/",
    tag = "Books",
    operation_id = "listBooks",
    summary = "List books with reader statistics",
    description = "Returns every book annotated with `likes_count` and the average `rating`. Supports exact `price` filtering, case-insensitive `search` over name and author_name, and `ordering` by `price` or `author_name` (prefix `-` for descending; other fields are ignored). Default order is by ID. No authentication required.",
    params(BookListQuery),
    responses(
        (status = 200, description = "List of books", body = Vec<BookResponse>),
        (status = 400, description = "Invalid price filter (VALIDATION_ERROR)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_books(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<BookListQuery>,
) -> Result<Json<Vec<BookResponse>>, AppError> {
    let params = BookListParams::parse(
        query.price.as_deref(),
        query.search.as_deref(),
        query.ordering.as_deref(),
    )?;

    let rows = list_annotated(&state.db, &params).await?;
    Ok(Json(rows.into_iter().map(BookResponse::from).collect()))
}

#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Books",
    operation_id = "getBook",
    summary = "Get a book by ID",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 200, description = "Book details", body = BookResponse),
        (status = 404, description = "Book not found (NOT_FOUND)", body = ErrorBody),
    ),
)]
#[instrument(skip(state), fields(id))]
pub async fn get_book(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<BookResponse>, AppError> {
    let model = find_book(&state.db, id).await?;
    let stats = annotate(&state.db, id).await?;
    Ok(Json(BookResponse::new(model, stats)))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Books",
    operation_id = "createBook",
    summary = "Create a new book",
    description = "Creates a book owned by the requester. Any `owner` in the body is ignored.",
    request_body = BookPayload,
    responses(
        (status = 201, description = "Book created", body = BookResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = auth_user.user_id))]
pub async fn create_book(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<BookPayload>,
) -> Result<impl IntoResponse, AppError> {
    permissions::authorize::<book::Model>(Some(&auth_user), None, Action::Create)?;
    let valid = validate_book_payload(&payload)?;

    let mut new_book = book::ActiveModel {
        owner_id: Set(Some(auth_user.user_id)),
        ..Default::default()
    };
    valid.apply(&mut new_book);

    let model = new_book.insert(&state.db).await?;
    let stats = annotate(&state.db, model.id).await?;

    Ok((StatusCode::CREATED, Json(BookResponse::new(model, stats))))
}

#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Books",
    operation_id = "updateBook",
    summary = "Replace a book",
    description = "Full replace: name, price and author_name are all required. Only the owner or staff may update. The owner never changes.",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookPayload,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not owner or staff (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Book not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn update_book(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<BookPayload>,
) -> Result<Json<BookResponse>, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_book(&txn, id).await?;
    permissions::authorize(Some(&auth_user), Some(&existing), Action::Update)?;
    let valid = validate_book_payload(&payload)?;

    let mut active: book::ActiveModel = existing.into();
    valid.apply(&mut active);

    let model = active.update(&txn).await?;
    let stats = annotate(&txn, model.id).await?;
    txn.commit().await?;

    Ok(Json(BookResponse::new(model, stats)))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Books",
    operation_id = "partialUpdateBook",
    summary = "Partially update a book",
    description = "Only the fields present in the body change. Same validation and permissions as a full replace.",
    params(("id" = i32, Path, description = "Book ID")),
    request_body = BookPatchPayload,
    responses(
        (status = 200, description = "Book updated", body = BookResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not owner or staff (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Book not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id, user_id = auth_user.user_id))]
pub async fn partial_update_book(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    AppJson(payload): AppJson<BookPatchPayload>,
) -> Result<Json<BookResponse>, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_book(&txn, id).await?;
    permissions::authorize(Some(&auth_user), Some(&existing), Action::Update)?;
    let patch = validate_book_patch(&payload)?;

    let model = if patch == ValidBookPatch::default() {
        existing
    } else {
        let mut active: book::ActiveModel = existing.into();
        patch.apply(&mut active);
        active.update(&txn).await?
    };
    let stats = annotate(&txn, model.id).await?;
    txn.commit().await?;

    Ok(Json(BookResponse::new(model, stats)))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Books",
    operation_id = "deleteBook",
    summary = "Delete a book",
    description = "Deletes the book and every reader relation to it. Only the owner or staff may delete.",
    params(("id" = i32, Path, description = "Book ID")),
    responses(
        (status = 204, description = "Book deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not owner or staff (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Book not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id, user_id = auth_user.user_id))]
pub async fn delete_book(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    let txn = state.db.begin().await?;

    let existing = find_book(&txn, id).await?;
    permissions::authorize(Some(&auth_user), Some(&existing), Action::Delete)?;

    user_book_relation::Entity::delete_many()
        .filter(user_book_relation::Column::BookId.eq(id))
        .exec(&txn)
        .await?;
    book::Entity::delete_by_id(id).exec(&txn).await?;

    txn.commit().await?;
    Ok(StatusCode::NO_CONTENT)
}
