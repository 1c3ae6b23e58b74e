use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .nest("/auth", auth_routes())
        .nest("/books", book_routes())
        .nest("/relations", relation_routes())
}

fn auth_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::auth::register))
        .routes(routes!(handlers::auth::login))
        .routes(routes!(handlers::auth::me))
}

fn book_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::book::list_books,
            handlers::book::create_book
        ))
        .routes(routes!(
            handlers::book::get_book,
            handlers::book::update_book,
            handlers::book::partial_update_book,
            handlers::book::delete_book
        ))
}

fn relation_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(routes!(handlers::relation::patch_relation))
}
