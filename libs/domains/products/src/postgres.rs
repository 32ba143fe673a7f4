use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{
    ConnectionTrait, DatabaseConnection, DbBackend, DbErr, FromQueryResult, Statement, Value,
};
use uuid::Uuid;

use crate::error::{ProductError, ProductResult};
use crate::models::{NewProduct, Product, ProductChanges, ProductOwner};
use crate::repository::ProductRepository;

/// Product columns plus the owner's public fields. Expects `p` and `u`
/// aliases for products and users.
const PRODUCT_SELECT: &str = r#"
    p.id, p.name, p.price::float8 AS price, p.description, p.images, p.user_id,
    p.created_at, p.updated_at, u.name AS owner_name, u.email AS owner_email
"#;

/// PostgreSQL implementation of ProductRepository
#[derive(Clone)]
pub struct PgProductRepository {
    db: DatabaseConnection,
}

impl PgProductRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[derive(Debug, FromQueryResult)]
struct ProductRow {
    id: Uuid,
    name: String,
    price: f64,
    description: Option<String>,
    images: Vec<String>,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    owner_name: String,
    owner_email: String,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: row.price,
            description: row.description,
            images: row.images,
            user_id: row.user_id,
            user: ProductOwner {
                id: row.user_id,
                name: row.owner_name,
                email: row.owner_email,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, FromQueryResult)]
struct CountRow {
    total: i64,
}

/// Escapes LIKE metacharacters so the term matches literally.
fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn insert(&self, product: NewProduct) -> ProductResult<Product> {
        let sql = format!(
            r#"
            WITH p AS (
                INSERT INTO products (id, name, price, description, images, user_id, created_at, updated_at)
                VALUES ($1, $2, $3::numeric, $4, $5, $6, $7, $7)
                RETURNING *
            )
            SELECT {PRODUCT_SELECT}
            FROM p JOIN users u ON u.id = p.user_id
            "#
        );

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [
                product.id.into(),
                product.name.into(),
                product.price.into(),
                product.description.into(),
                product.images.into(),
                product.owner.id.into(),
                product.created_at.into(),
            ],
        );

        let row = ProductRow::find_by_statement(stmt)
            .one(&self.db)
            .await?
            .ok_or(ProductError::Database(DbErr::RecordNotInserted))?;

        tracing::info!(product_id = %row.id, "Created product");
        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> ProductResult<Option<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_SELECT} FROM products p JOIN users u ON u.id = p.user_id WHERE p.id = $1"
        );
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, [id.into()]);

        let row = ProductRow::find_by_statement(stmt).one(&self.db).await?;
        Ok(row.map(Into::into))
    }

    async fn query(
        &self,
        skip: u64,
        take: u64,
        search: Option<String>,
    ) -> ProductResult<(Vec<Product>, u64)> {
        let pattern = search.map(|term| format!("%{}%", escape_like(&term)));
        let filter = if pattern.is_some() {
            r"WHERE p.name ILIKE $1 ESCAPE '\' OR p.description ILIKE $1 ESCAPE '\'"
        } else {
            ""
        };
        let filter_values: Vec<Value> = pattern.into_iter().map(Into::into).collect();

        let count_sql = format!("SELECT COUNT(*) AS total FROM products p {filter}");
        let count_stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            count_sql,
            filter_values.clone(),
        );

        let next = filter_values.len() + 1;
        let page_sql = format!(
            r#"
            SELECT {PRODUCT_SELECT}
            FROM products p JOIN users u ON u.id = p.user_id
            {filter}
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ${} OFFSET ${}
            "#,
            next,
            next + 1
        );
        let mut page_values = filter_values;
        page_values.push(i64::try_from(take).unwrap_or(i64::MAX).into());
        page_values.push(i64::try_from(skip).unwrap_or(i64::MAX).into());
        let page_stmt = Statement::from_sql_and_values(DbBackend::Postgres, page_sql, page_values);

        let (count, rows) = tokio::try_join!(
            CountRow::find_by_statement(count_stmt).one(&self.db),
            ProductRow::find_by_statement(page_stmt).all(&self.db),
        )?;

        let total = count.map(|c| c.total.max(0) as u64).unwrap_or(0);
        Ok((rows.into_iter().map(Into::into).collect(), total))
    }

    async fn update_fields(&self, id: Uuid, changes: ProductChanges) -> ProductResult<bool> {
        let mut assignments = Vec::new();
        let mut values: Vec<Value> = vec![id.into()];

        if let Some(name) = changes.name {
            values.push(name.into());
            assignments.push(format!("name = ${}", values.len()));
        }
        if let Some(price) = changes.price {
            values.push(price.into());
            assignments.push(format!("price = ${}::numeric", values.len()));
        }
        if let Some(description) = changes.description {
            values.push(description.into());
            assignments.push(format!("description = ${}", values.len()));
        }
        if let Some(images) = changes.images {
            values.push(images.into());
            assignments.push(format!("images = ${}", values.len()));
        }
        assignments.push("updated_at = NOW()".to_string());

        let sql = format!(
            "UPDATE products SET {} WHERE id = $1",
            assignments.join(", ")
        );
        let stmt = Statement::from_sql_and_values(DbBackend::Postgres, sql, values);

        let result = self.db.execute_raw(stmt).await?;
        let updated = result.rows_affected() > 0;
        if updated {
            tracing::info!(product_id = %id, "Updated product");
        }
        Ok(updated)
    }

    async fn delete_by_id(&self, id: Uuid) -> ProductResult<bool> {
        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            "DELETE FROM products WHERE id = $1",
            [id.into()],
        );

        let result = self.db.execute_raw(stmt).await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(product_id = %id, "Deleted product");
        }
        Ok(deleted)
    }
}
