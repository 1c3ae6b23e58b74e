use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const RATE_MIN: i32 = 1;
pub const RATE_MAX: i32 = 5;

/// Per-(user, book) reader state. The composite primary key guarantees a
/// single row per pair; rows are created lazily and only updated afterwards.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user_book_relation")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub user_id: i32,
    #[sea_orm(primary_key, auto_increment = false)]
    pub book_id: i32,
    #[sea_orm(belongs_to, from = "user_id", to = "id", on_delete = "Cascade")]
    pub user: HasOne<super::user::Entity>,
    #[sea_orm(belongs_to, from = "book_id", to = "id", on_delete = "Cascade")]
    pub book: HasOne<super::book::Entity>,

    pub like: Option<bool>,
    pub bookmarks: Option<bool>,
    /// 1 (Ok) to 5 (Incredible).
    pub rate: Option<i32>,
}

impl ActiveModelBehavior for ActiveModel {}
