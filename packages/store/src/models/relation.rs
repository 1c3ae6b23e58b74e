use serde::{Deserialize, Serialize};

use crate::entity::user_book_relation::{self, RATE_MAX, RATE_MIN};
use crate::error::AppError;

use super::shared::double_option;

/// Partial update of the requester's relation to a book.
///
/// Each field: absent keeps the stored value, `null` resets it, a value sets it.
#[derive(Deserialize, Default, PartialEq, Debug, utoipa::ToSchema)]
pub struct RelationPatch {
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<bool>, example = true)]
    pub like: Option<Option<bool>>,
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<bool>, example = true)]
    pub bookmarks: Option<Option<bool>>,
    /// 1 (Ok) to 5 (Incredible).
    #[serde(default, deserialize_with = "double_option")]
    #[schema(value_type = Option<i32>, minimum = 1, maximum = 5, example = 4)]
    pub rate: Option<Option<i32>>,
}

pub fn validate_relation_patch(patch: &RelationPatch) -> Result<(), AppError> {
    if let Some(Some(rate)) = patch.rate
        && !(RATE_MIN..=RATE_MAX).contains(&rate)
    {
        return Err(AppError::invalid_field(
            "rate",
            format!("Ensure this value is between {RATE_MIN} and {RATE_MAX}"),
        ));
    }
    Ok(())
}

#[derive(Serialize, Debug, utoipa::ToSchema)]
pub struct RelationResponse {
    /// Book ID.
    #[schema(example = 1)]
    pub book: i32,
    pub like: Option<bool>,
    pub bookmarks: Option<bool>,
    #[schema(example = 4)]
    pub rate: Option<i32>,
}

impl From<user_book_relation::Model> for RelationResponse {
    fn from(m: user_book_relation::Model) -> Self {
        Self {
            book: m.book_id,
            like: m.like,
            bookmarks: m.bookmarks,
            rate: m.rate,
        }
    }
}
