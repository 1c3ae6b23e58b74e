use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::json;

use store::entity::user_book_relation;

use crate::common::{TestApp, routes};

async fn stored(app: &TestApp, user_id: i32, book_id: i32) -> Option<user_book_relation::Model> {
    user_book_relation::Entity::find_by_id((user_id, book_id))
        .one(&app.db)
        .await
        .expect("DB query failed")
}

/// A reader, the reader's user ID, and a book owned by someone else.
async fn reader_and_book(app: &TestApp) -> (String, i32, i32) {
    let owner = app.create_authenticated_user("owner").await;
    let book = app.create_book(&owner, "Test book 1", "25", "Author 1").await;
    let reader = app.create_authenticated_user("reader").await;
    let reader_id = app.user_id(&reader).await;
    (reader, reader_id, book)
}

mod patching {
    use super::*;

    #[tokio::test]
    async fn first_patch_creates_the_relation() {
        let app = TestApp::spawn().await;
        let (reader, reader_id, book) = reader_and_book(&app).await;
        assert!(stored(&app, reader_id, book).await.is_none());

        let res = app
            .patch_with_token(&routes::relation(book), &json!({"like": true}), &reader)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.body,
            json!({"book": book, "like": true, "bookmarks": null, "rate": null})
        );

        let relation = stored(&app, reader_id, book).await.unwrap();
        assert_eq!(relation.like, Some(true));
        assert_eq!(relation.bookmarks, None);
        assert_eq!(relation.rate, None);
    }

    #[tokio::test]
    async fn later_patches_leave_other_fields_untouched() {
        let app = TestApp::spawn().await;
        let (reader, reader_id, book) = reader_and_book(&app).await;

        app.relate(&reader, book, json!({"like": true})).await;
        let res = app
            .patch_with_token(&routes::relation(book), &json!({"bookmarks": true}), &reader)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["like"], true);
        assert_eq!(res.body["bookmarks"], true);

        let relation = stored(&app, reader_id, book).await.unwrap();
        assert_eq!(relation.like, Some(true));
        assert_eq!(relation.bookmarks, Some(true));
    }

    #[tokio::test]
    async fn rate_is_stored() {
        let app = TestApp::spawn().await;
        let (reader, reader_id, book) = reader_and_book(&app).await;

        let res = app
            .patch_with_token(&routes::relation(book), &json!({"rate": 3}), &reader)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["rate"], 3);
        assert_eq!(stored(&app, reader_id, book).await.unwrap().rate, Some(3));
    }

    #[tokio::test]
    async fn null_clears_a_field() {
        let app = TestApp::spawn().await;
        let (reader, reader_id, book) = reader_and_book(&app).await;
        app.relate(&reader, book, json!({"like": true, "rate": 5})).await;

        let res = app
            .patch_with_token(&routes::relation(book), &json!({"like": null}), &reader)
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["like"].is_null());
        assert_eq!(res.body["rate"], 5);
        let relation = stored(&app, reader_id, book).await.unwrap();
        assert_eq!(relation.like, None);
        assert_eq!(relation.rate, Some(5));
    }

    #[tokio::test]
    async fn empty_patch_creates_an_unset_relation() {
        let app = TestApp::spawn().await;
        let (reader, reader_id, book) = reader_and_book(&app).await;

        let res = app
            .patch_with_token(&routes::relation(book), &json!({}), &reader)
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(
            res.body,
            json!({"book": book, "like": null, "bookmarks": null, "rate": null})
        );
        assert!(stored(&app, reader_id, book).await.is_some());
    }

    #[tokio::test]
    async fn repeated_patches_keep_a_single_row() {
        let app = TestApp::spawn().await;
        let (reader, _, book) = reader_and_book(&app).await;

        for body in [
            json!({"like": true}),
            json!({"like": false}),
            json!({"rate": 2}),
            json!({}),
        ] {
            app.relate(&reader, book, body).await;
        }

        let rows = user_book_relation::Entity::find()
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(rows, 1);
    }

    #[tokio::test]
    async fn relations_are_per_reader() {
        let app = TestApp::spawn().await;
        let (reader, reader_id, book) = reader_and_book(&app).await;
        let other = app.create_authenticated_user("other").await;
        let other_id = app.user_id(&other).await;

        app.relate(&reader, book, json!({"like": true, "rate": 2})).await;
        app.relate(&other, book, json!({"like": true, "rate": 5})).await;

        assert_eq!(stored(&app, reader_id, book).await.unwrap().rate, Some(2));
        assert_eq!(stored(&app, other_id, book).await.unwrap().rate, Some(5));

        let res = app.get_without_token(&routes::book(book)).await;
        assert_eq!(res.body["likes_count"], 2);
        assert_eq!(res.body["rating"], "3.50");
    }
}

mod validation {
    use super::*;

    #[tokio::test]
    async fn out_of_range_rate_is_rejected_and_previous_value_kept() {
        let app = TestApp::spawn().await;
        let (reader, reader_id, book) = reader_and_book(&app).await;
        app.relate(&reader, book, json!({"rate": 3})).await;

        let res = app
            .patch_with_token(&routes::relation(book), &json!({"rate": 6}), &reader)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(res.body["field"], "rate");
        assert_eq!(stored(&app, reader_id, book).await.unwrap().rate, Some(3));
    }

    #[tokio::test]
    async fn invalid_first_patch_creates_nothing() {
        let app = TestApp::spawn().await;
        let (reader, reader_id, book) = reader_and_book(&app).await;

        let res = app
            .patch_with_token(&routes::relation(book), &json!({"rate": 0}), &reader)
            .await;

        assert_eq!(res.status, 400);
        assert!(stored(&app, reader_id, book).await.is_none());
    }

    #[tokio::test]
    async fn wrongly_typed_field_is_rejected() {
        let app = TestApp::spawn().await;
        let (reader, _, book) = reader_and_book(&app).await;

        let res = app
            .patch_with_token(&routes::relation(book), &json!({"like": "yes"}), &reader)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod access {
    use super::*;

    #[tokio::test]
    async fn anonymous_users_are_rejected() {
        let app = TestApp::spawn().await;
        let (_, _, book) = reader_and_book(&app).await;

        let res = app
            .patch_without_token(&routes::relation(book), &json!({"like": true}))
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
        let rows = user_book_relation::Entity::find()
            .count(&app.db)
            .await
            .unwrap();
        assert_eq!(rows, 0);
    }

    #[tokio::test]
    async fn unknown_book_is_not_found() {
        let app = TestApp::spawn().await;
        let reader = app.create_authenticated_user("reader").await;

        let res = app
            .patch_with_token(&routes::relation(999), &json!({"like": true}), &reader)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }
}
