//! Read queries over the book catalog.
//!
//! The collection is served by one grouped query: `book LEFT JOIN
//! user_book_relation GROUP BY book.id`, with the aggregates listed in
//! [`BOOK_STATS`]. Single books are annotated with filtered per-book queries
//! instead ([`annotate`]); both paths must produce the same numbers.

use std::str::FromStr;

use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, ExprTrait, JoinType, LikeExpr};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbErr, EntityName, EntityTrait, FromQueryResult,
    IdenStatic, Order, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select,
};

use crate::entity::{book, user_book_relation};
use crate::error::AppError;
use crate::models::shared::{decimal_to_cents, escape_like, fold_case};

/// Aggregate function applied to a relation column within a book group.
#[derive(Clone, Copy, Debug)]
pub enum Aggregate {
    /// Number of rows whose boolean column is true.
    CountTrue(user_book_relation::Column),
    /// Sum of the non-null values.
    Sum(user_book_relation::Column),
    /// Number of non-null values.
    Count(user_book_relation::Column),
}

impl Aggregate {
    pub fn sql(&self) -> String {
        let table = user_book_relation::Entity.table_name();
        match self {
            Aggregate::CountTrue(col) => {
                format!(r#"COUNT(CASE WHEN "{table}"."{}" THEN 1 END)"#, col.as_str())
            }
            Aggregate::Sum(col) => format!(r#"SUM("{table}"."{}")"#, col.as_str()),
            Aggregate::Count(col) => format!(r#"COUNT("{table}"."{}")"#, col.as_str()),
        }
    }
}

/// A derived, non-stored column: `aggregate AS alias`.
#[derive(Clone, Copy, Debug)]
pub struct Annotation {
    pub alias: &'static str,
    pub aggregate: Aggregate,
}

/// Grouping of relation rows by a book column, with the aggregates computed per group.
#[derive(Clone, Copy, Debug)]
pub struct GroupedQuery {
    pub group_key: book::Column,
    pub annotations: &'static [Annotation],
}

/// Per-book statistics served with every book record.
pub const BOOK_STATS: GroupedQuery = GroupedQuery {
    group_key: book::Column::Id,
    annotations: &[
        Annotation {
            alias: "likes_count",
            aggregate: Aggregate::CountTrue(user_book_relation::Column::Like),
        },
        Annotation {
            alias: "rate_sum",
            aggregate: Aggregate::Sum(user_book_relation::Column::Rate),
        },
        Annotation {
            alias: "rate_count",
            aggregate: Aggregate::Count(user_book_relation::Column::Rate),
        },
    ],
};

/// A book row plus the raw [`BOOK_STATS`] aggregates.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct AnnotatedBook {
    pub id: i32,
    pub name: String,
    pub price_cents: i64,
    pub author_name: String,
    pub owner_id: Option<i32>,
    pub likes_count: i64,
    pub rate_sum: Option<i64>,
    pub rate_count: i64,
}

impl AnnotatedBook {
    pub fn rating(&self) -> Option<Decimal> {
        average_rating(self.rate_sum.unwrap_or(0), self.rate_count)
    }
}

/// Mean of `count` ratings summing to `sum`, rounded half-to-even to two
/// places and always carrying two fractional digits. `None` without ratings.
pub fn average_rating(sum: i64, count: i64) -> Option<Decimal> {
    if count <= 0 {
        return None;
    }
    let mut avg = (Decimal::from(sum) / Decimal::from(count)).round_dp(2);
    avg.rescale(2);
    Some(avg)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderField {
    Price,
    AuthorName,
}

impl OrderField {
    fn column(self) -> book::Column {
        match self {
            OrderField::Price => book::Column::PriceCents,
            OrderField::AuthorName => book::Column::AuthorName,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ordering {
    pub field: OrderField,
    pub descending: bool,
}

/// Parsed filter, search and ordering parameters for the book list.
#[derive(Debug, Default, PartialEq)]
pub struct BookListParams {
    pub price_cents: Option<i64>,
    pub search_terms: Vec<String>,
    pub ordering: Vec<Ordering>,
}

impl BookListParams {
    pub fn parse(
        price: Option<&str>,
        search: Option<&str>,
        ordering: Option<&str>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            price_cents: price.map(parse_price_filter).transpose()?,
            search_terms: search.map(split_search_terms).unwrap_or_default(),
            ordering: ordering.map(parse_ordering).unwrap_or_default(),
        })
    }
}

fn parse_price_filter(raw: &str) -> Result<i64, AppError> {
    let value = Decimal::from_str(raw.trim())
        .map_err(|_| AppError::invalid_field("price", "Enter a number"))?;
    decimal_to_cents("price", value)
}

/// Terms are separated by whitespace and commas; every term must match.
fn split_search_terms(raw: &str) -> Vec<String> {
    raw.replace('\0', "")
        .replace(',', " ")
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Unknown fields are dropped; an ordering made only of unknown fields
/// falls back to the default id order.
fn parse_ordering(raw: &str) -> Vec<Ordering> {
    raw.split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .filter_map(|term| {
            let (descending, name) = match term.strip_prefix('-') {
                Some(name) => (true, name),
                None => (false, term),
            };
            let field = match name {
                "price" => OrderField::Price,
                "author_name" => OrderField::AuthorName,
                _ => {
                    tracing::debug!(term, "Ignoring unknown ordering field");
                    return None;
                }
            };
            Some(Ordering { field, descending })
        })
        .collect()
}

/// Build the grouped, filtered and ordered collection query.
pub fn annotated_books(params: &BookListParams) -> Select<book::Entity> {
    let mut select = book::Entity::find().select_only().columns([
        book::Column::Id,
        book::Column::Name,
        book::Column::PriceCents,
        book::Column::AuthorName,
        book::Column::OwnerId,
    ]);
    for annotation in BOOK_STATS.annotations {
        select = select.column_as(Expr::cust(annotation.aggregate.sql()), annotation.alias);
    }
    QueryTrait::query(&mut select).join(
        JoinType::LeftJoin,
        user_book_relation::Entity,
        Expr::col((user_book_relation::Entity, user_book_relation::Column::BookId))
            .equals((book::Entity, book::Column::Id)),
    );
    select = select.group_by(BOOK_STATS.group_key);

    if let Some(cents) = params.price_cents {
        select = select.filter(book::Column::PriceCents.eq(cents));
    }

    for term in &params.search_terms {
        let pattern = format!("%{}%", escape_like(&fold_case(term)));
        select = select.filter(
            Condition::any()
                .add(
                    Expr::col((book::Entity, book::Column::NameFolded))
                        .like(LikeExpr::new(pattern.clone()).escape('\\')),
                )
                .add(
                    Expr::col((book::Entity, book::Column::AuthorNameFolded))
                        .like(LikeExpr::new(pattern).escape('\\')),
                ),
        );
    }

    for ordering in &params.ordering {
        let order = if ordering.descending {
            Order::Desc
        } else {
            Order::Asc
        };
        select = select.order_by(ordering.field.column(), order);
    }
    select.order_by(book::Column::Id, Order::Asc)
}

/// Run the collection query.
pub async fn list_annotated<C: ConnectionTrait>(
    db: &C,
    params: &BookListParams,
) -> Result<Vec<AnnotatedBook>, DbErr> {
    annotated_books(params)
        .into_model::<AnnotatedBook>()
        .all(db)
        .await
}

/// Count likes for one book by filtering its relations directly.
pub async fn count_likes<C: ConnectionTrait>(db: &C, book_id: i32) -> Result<i64, DbErr> {
    let count = user_book_relation::Entity::find()
        .filter(user_book_relation::Column::BookId.eq(book_id))
        .filter(user_book_relation::Column::Like.eq(true))
        .count(db)
        .await?;
    Ok(count as i64)
}

/// Average the non-null ratings of one book by filtering its relations directly.
pub async fn rating_of<C: ConnectionTrait>(db: &C, book_id: i32) -> Result<Option<Decimal>, DbErr> {
    let rates: Vec<i32> = user_book_relation::Entity::find()
        .filter(user_book_relation::Column::BookId.eq(book_id))
        .filter(user_book_relation::Column::Rate.is_not_null())
        .select_only()
        .column(user_book_relation::Column::Rate)
        .into_tuple::<i32>()
        .all(db)
        .await?;
    let sum = rates.iter().copied().map(i64::from).sum();
    Ok(average_rating(sum, rates.len() as i64))
}

/// Statistics of a single book computed by the filtered per-book queries.
#[derive(Debug, Clone, PartialEq)]
pub struct BookStats {
    pub likes_count: i64,
    pub rating: Option<Decimal>,
}

pub async fn annotate<C: ConnectionTrait>(db: &C, book_id: i32) -> Result<BookStats, DbErr> {
    Ok(BookStats {
        likes_count: count_likes(db, book_id).await?,
        rating: rating_of(db, book_id).await?,
    })
}

/// Look up a book by ID, returning 404 if not found.
pub async fn find_book<C: ConnectionTrait>(db: &C, id: i32) -> Result<book::Model, AppError> {
    book::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound("Book not found".into()))
}
