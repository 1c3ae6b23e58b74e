use rust_decimal::Decimal;
use sea_orm::ActiveValue::Set;
use serde::{Deserialize, Serialize};

use crate::entity::book::{self, AUTHOR_NAME_MAX_CHARS, NAME_MAX_CHARS};
use crate::error::AppError;
use crate::query::book::{AnnotatedBook, BookStats};

use super::shared::{cents_to_decimal, decimal_to_cents, fold_case, validate_text};

/// Request body for creating or fully replacing a book.
///
/// An `owner` key, if sent, is ignored: the owner is always the requester.
#[derive(Deserialize, utoipa::ToSchema)]
pub struct BookPayload {
    /// Title (1-1500 characters after trimming).
    #[schema(example = "The Hobbit")]
    pub name: String,
    /// Non-negative price with at most 2 decimal places, as a number or string.
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    /// Author (1-600 characters after trimming).
    #[schema(example = "J. R. R. Tolkien")]
    pub author_name: String,
}

/// A payload that passed validation, in storage units.
#[derive(Debug, PartialEq)]
pub struct ValidBook {
    pub name: String,
    pub price_cents: i64,
    pub author_name: String,
}

pub fn validate_book_payload(payload: &BookPayload) -> Result<ValidBook, AppError> {
    Ok(ValidBook {
        name: validate_text("name", &payload.name, NAME_MAX_CHARS)?,
        price_cents: validate_price(payload.price)?,
        author_name: validate_text("author_name", &payload.author_name, AUTHOR_NAME_MAX_CHARS)?,
    })
}

fn validate_price(price: Decimal) -> Result<i64, AppError> {
    if price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::invalid_field(
            "price",
            "Ensure this value is greater than or equal to 0",
        ));
    }
    decimal_to_cents("price", price)
}

impl ValidBook {
    /// Write every field, with its search copy, into `active`.
    pub fn apply(self, active: &mut book::ActiveModel) {
        active.name_folded = Set(fold_case(&self.name));
        active.name = Set(self.name);
        active.price_cents = Set(self.price_cents);
        active.author_name_folded = Set(fold_case(&self.author_name));
        active.author_name = Set(self.author_name);
    }
}

/// Request body for a partial book update. Absent fields keep their stored value.
#[derive(Deserialize, Default, utoipa::ToSchema)]
pub struct BookPatchPayload {
    #[schema(example = "The Hobbit")]
    pub name: Option<String>,
    #[schema(value_type = Option<String>, example = "120.00")]
    pub price: Option<Decimal>,
    #[schema(example = "J. R. R. Tolkien")]
    pub author_name: Option<String>,
}

#[derive(Debug, Default, PartialEq)]
pub struct ValidBookPatch {
    pub name: Option<String>,
    pub price_cents: Option<i64>,
    pub author_name: Option<String>,
}

/// Same rules as [`validate_book_payload`], applied to the fields present.
pub fn validate_book_patch(payload: &BookPatchPayload) -> Result<ValidBookPatch, AppError> {
    Ok(ValidBookPatch {
        name: payload
            .name
            .as_deref()
            .map(|name| validate_text("name", name, NAME_MAX_CHARS))
            .transpose()?,
        price_cents: payload.price.map(validate_price).transpose()?,
        author_name: payload
            .author_name
            .as_deref()
            .map(|author| validate_text("author_name", author, AUTHOR_NAME_MAX_CHARS))
            .transpose()?,
    })
}

impl ValidBookPatch {
    pub fn apply(self, active: &mut book::ActiveModel) {
        if let Some(name) = self.name {
            active.name_folded = Set(fold_case(&name));
            active.name = Set(name);
        }
        if let Some(cents) = self.price_cents {
            active.price_cents = Set(cents);
        }
        if let Some(author_name) = self.author_name {
            active.author_name_folded = Set(fold_case(&author_name));
            active.author_name = Set(author_name);
        }
    }
}

/// A book with its reader statistics.
#[derive(Serialize, Debug, PartialEq, utoipa::ToSchema)]
pub struct BookResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "The Hobbit")]
    pub name: String,
    /// Always rendered with two decimal places.
    #[schema(value_type = String, example = "100.00")]
    pub price: Decimal,
    #[schema(example = "J. R. R. Tolkien")]
    pub author_name: String,
    /// ID of the creating user; null once that user is deleted.
    #[schema(example = 42)]
    pub owner: Option<i32>,
    /// Number of readers who liked the book.
    #[schema(example = 3)]
    pub likes_count: i64,
    /// Mean rating with two decimal places; null when nobody rated the book.
    #[schema(value_type = Option<String>, example = "4.00")]
    pub rating: Option<Decimal>,
}

impl BookResponse {
    pub fn new(book: book::Model, stats: BookStats) -> Self {
        Self {
            id: book.id,
            name: book.name,
            price: cents_to_decimal(book.price_cents),
            author_name: book.author_name,
            owner: book.owner_id,
            likes_count: stats.likes_count,
            rating: stats.rating,
        }
    }
}

impl From<AnnotatedBook> for BookResponse {
    fn from(row: AnnotatedBook) -> Self {
        let rating = row.rating();
        Self {
            id: row.id,
            name: row.name,
            price: cents_to_decimal(row.price_cents),
            author_name: row.author_name,
            owner: row.owner_id,
            likes_count: row.likes_count,
            rating,
        }
    }
}

#[derive(Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookListQuery {
    /// Exact price match, e.g. `60` or `60.00`.
    pub price: Option<String>,
    /// Case-insensitive substring search over name and author_name.
    /// Whitespace- or comma-separated terms must all match.
    pub search: Option<String>,
    /// Comma-separated `price` / `author_name`, `-` prefix for descending.
    pub ordering: Option<String>,
}
