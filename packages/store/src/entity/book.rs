use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const NAME_MAX_CHARS: usize = 1500;
pub const AUTHOR_NAME_MAX_CHARS: usize = 600;

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    pub name: String,
    /// Price in cents; the API exposes it as a two-decimal value.
    #[sea_orm(indexed)]
    pub price_cents: i64,
    pub author_name: String,

    /// Lowercased copies of `name` and `author_name`, matched by search.
    /// SQLite's `LOWER` only folds ASCII, so folding happens on write.
    pub name_folded: String,
    pub author_name_folded: String,

    /// NULL once the owning user has been deleted.
    pub owner_id: Option<i32>,
    #[sea_orm(belongs_to, from = "owner_id", to = "id", on_delete = "SetNull")]
    pub owner: HasOne<super::user::Entity>,

    #[sea_orm(has_many)]
    pub relations: HasMany<super::user_book_relation::Entity>,
}

impl ActiveModelBehavior for ActiveModel {}
