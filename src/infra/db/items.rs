use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    application::filter::{FilterClause, ItemPredicate},
    application::pagination::{ItemPage, PageRequest},
    application::repos::{CreateItemParams, ItemsRepo, RepoError, ReplaceItemParams},
    domain::items::ItemRecord,
};

use super::{PostgresRepositories, map_sqlx_error};

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    version: i32,
}

impl From<ItemRow> for ItemRecord {
    fn from(row: ItemRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            description: row.description,
            price: row.price,
            created_at: row.created_at,
            updated_at: row.updated_at,
            version: row.version,
        }
    }
}

#[async_trait]
impl ItemsRepo for PostgresRepositories {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<ItemRecord>, RepoError> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, name, description, price, created_at, updated_at, version \
             FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(row.map(ItemRecord::from))
    }

    async fn list_items(
        &self,
        predicate: &ItemPredicate,
        page: PageRequest,
    ) -> Result<ItemPage<ItemRecord>, RepoError> {
        let mut qb = QueryBuilder::new(
            "SELECT id, name, description, price, created_at, updated_at, version \
             FROM items WHERE 1=1 ",
        );
        Self::apply_item_predicate(&mut qb, predicate);
        qb.push(" ORDER BY created_at, id LIMIT ");
        qb.push_bind(page.limit());
        qb.push(" OFFSET ");
        qb.push_bind(page.offset());

        let rows = qb
            .build_query_as::<ItemRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let mut count_qb = QueryBuilder::new("SELECT COUNT(*) FROM items WHERE 1=1 ");
        Self::apply_item_predicate(&mut count_qb, predicate);
        let count: i64 = count_qb
            .build_query_scalar()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;
        let total = Self::convert_count(count)?;

        let items = rows.into_iter().map(ItemRecord::from).collect();
        Ok(ItemPage::new(items, total, page))
    }

    async fn insert_item(&self, params: CreateItemParams) -> Result<ItemRecord, RepoError> {
        let now = OffsetDateTime::now_utc();

        let row = sqlx::query_as::<_, ItemRow>(
            "INSERT INTO items (id, name, description, price, created_at, updated_at, version) \
             VALUES ($1, $2, $3, $4, $5, $5, 1) \
             RETURNING id, name, description, price, created_at, updated_at, version",
        )
        .bind(params.id)
        .bind(params.name)
        .bind(params.description)
        .bind(params.price)
        .bind(now)
        .fetch_one(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        Ok(ItemRecord::from(row))
    }

    async fn insert_items(
        &self,
        params: Vec<CreateItemParams>,
    ) -> Result<Vec<ItemRecord>, RepoError> {
        let mut tx = self.begin().await.map_err(map_sqlx_error)?;
        let now = OffsetDateTime::now_utc();

        let mut records = Vec::with_capacity(params.len());
        for item in params {
            let row = sqlx::query_as::<_, ItemRow>(
                "INSERT INTO items (id, name, description, price, created_at, updated_at, version) \
                 VALUES ($1, $2, $3, $4, $5, $5, 1) \
                 RETURNING id, name, description, price, created_at, updated_at, version",
            )
            .bind(item.id)
            .bind(item.name)
            .bind(item.description)
            .bind(item.price)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;

            records.push(ItemRecord::from(row));
        }

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(records)
    }

    async fn replace_item(&self, params: ReplaceItemParams) -> Result<ItemRecord, RepoError> {
        let row = sqlx::query_as::<_, ItemRow>(
            "UPDATE items \
             SET name = $2, description = $3, price = $4, updated_at = $5, version = version + 1 \
             WHERE id = $1 AND version = $6 \
             RETURNING id, name, description, price, created_at, updated_at, version",
        )
        .bind(params.id)
        .bind(params.name)
        .bind(params.description)
        .bind(params.price)
        .bind(OffsetDateTime::now_utc())
        .bind(params.expected_version)
        .fetch_optional(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => Ok(ItemRecord::from(row)),
            // Zero rows means the item vanished or someone else replaced it
            // first; distinguish so callers see conflict, not absence.
            None => {
                let exists = sqlx::query_scalar::<_, i32>("SELECT version FROM items WHERE id = $1")
                    .bind(params.id)
                    .fetch_optional(self.pool())
                    .await
                    .map_err(map_sqlx_error)?;

                match exists {
                    Some(_) => Err(RepoError::Conflict {
                        expected: params.expected_version,
                    }),
                    None => Err(RepoError::NotFound),
                }
            }
        }
    }

    async fn delete_item(&self, id: Uuid) -> Result<(), RepoError> {
        sqlx::query("DELETE FROM items WHERE id = $1")
            .bind(id)
            .execute(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }
}

impl PostgresRepositories {
    fn apply_item_predicate<'q>(qb: &mut QueryBuilder<'q, Postgres>, predicate: &'q ItemPredicate) {
        for clause in predicate.clauses() {
            match clause {
                FilterClause::NameLike(pattern) => {
                    qb.push(" AND name LIKE ");
                    qb.push_bind(pattern);
                }
                FilterClause::DescriptionLike(pattern) => {
                    qb.push(" AND description LIKE ");
                    qb.push_bind(pattern);
                }
                FilterClause::PriceEq(price) => {
                    qb.push(" AND price = ");
                    qb.push_bind(*price);
                }
                FilterClause::PriceLt(bound) => {
                    qb.push(" AND price < ");
                    qb.push_bind(*bound);
                }
                FilterClause::PriceGt(bound) => {
                    qb.push(" AND price > ");
                    qb.push_bind(*bound);
                }
            }
        }
    }
}
