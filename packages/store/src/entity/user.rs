use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,

    #[sea_orm(unique)]
    pub username: String,
    pub password: String,

    /// Staff may update or delete any book.
    #[sea_orm(default_value = false)]
    pub is_staff: bool,

    #[sea_orm(has_many)]
    pub books: HasMany<super::book::Entity>,

    #[sea_orm(has_many)]
    pub book_relations: HasMany<super::user_book_relation::Entity>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
