use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::info;

use crate::entity::user;

/// Grant staff to the configured usernames. Users that have not registered
/// yet are skipped; they are picked up on the next startup.
pub async fn promote_staff(db: &DatabaseConnection, usernames: &[String]) -> Result<(), DbErr> {
    if usernames.is_empty() {
        return Ok(());
    }

    let result = user::Entity::update_many()
        .col_expr(user::Column::IsStaff, Expr::value(true))
        .filter(user::Column::Username.is_in(usernames.iter().cloned()))
        .filter(user::Column::IsStaff.eq(false))
        .exec(db)
        .await?;

    if result.rows_affected > 0 {
        info!("Promoted {} users to staff", result.rows_affected);
    }

    Ok(())
}
