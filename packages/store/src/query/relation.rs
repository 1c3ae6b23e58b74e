use sea_orm::sea_query::OnConflict;
use sea_orm::{ActiveValue::Set, ConnectionTrait, DbErr, EntityTrait};

use crate::entity::user_book_relation;

/// Fetch the relation between `user_id` and `book_id`, creating it with every
/// field unset if it does not exist yet.
///
/// The insert is `ON CONFLICT DO NOTHING` on the composite key, so concurrent
/// callers converge on one row. Returns the row and whether this call created it.
pub async fn get_or_create<C: ConnectionTrait>(
    db: &C,
    user_id: i32,
    book_id: i32,
) -> Result<(user_book_relation::Model, bool), DbErr> {
    let blank = user_book_relation::ActiveModel {
        user_id: Set(user_id),
        book_id: Set(book_id),
        like: Set(None),
        bookmarks: Set(None),
        rate: Set(None),
    };

    let result = user_book_relation::Entity::insert(blank)
        .on_conflict(
            OnConflict::columns([
                user_book_relation::Column::UserId,
                user_book_relation::Column::BookId,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(db)
        .await;

    let created = match result {
        Ok(rows) => rows > 0,
        Err(DbErr::RecordNotInserted) => false,
        Err(e) => return Err(e),
    };

    let relation = user_book_relation::Entity::find_by_id((user_id, book_id))
        .one(db)
        .await?
        .ok_or_else(|| {
            DbErr::RecordNotFound(format!(
                "user_book_relation ({user_id}, {book_id}) missing after insert"
            ))
        })?;

    Ok((relation, created))
}
