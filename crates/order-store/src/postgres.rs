use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::{
    Customer, NewOrder, Order, OrderId, OrderPatch, OrderQuery, OrderStatistics, OrderStatus,
    Page, Result, ServiceId, StoreError,
    store::{OrderRepository, UpdateOptions},
};

const ORDER_COLUMNS: &str = "id, code, service_id, name, email, phone, description, due_date, \
     status, created_at, updated_at, deleted_at";

/// Name of the unique constraint on `orders.code`.
const UNIQUE_CODE_CONSTRAINT: &str = "unique_order_code";

/// PostgreSQL-backed order store.
#[derive(Clone)]
pub struct PostgresOrderRepository {
    pool: PgPool,
}

impl PostgresOrderRepository {
    /// Creates a new PostgreSQL order store.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Gets a reference to the underlying connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Runs the database migrations.
    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    fn row_to_order(row: PgRow) -> Result<Order> {
        let status: String = row.try_get("status")?;
        let status = status
            .parse::<OrderStatus>()
            .map_err(|e| StoreError::InvalidRow(e.to_string()))?;

        Ok(Order {
            id: OrderId::from_uuid(row.try_get::<Uuid, _>("id")?),
            code: row.try_get("code")?,
            service_id: ServiceId::new(row.try_get("service_id")?),
            customer: Customer {
                name: row.try_get("name")?,
                email: row.try_get("email")?,
                phone: row.try_get("phone")?,
            },
            description: row.try_get("description")?,
            due_date: row.try_get("due_date")?,
            status,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            deleted_at: row.try_get("deleted_at")?,
        })
    }

    async fn current_status(&self, id: OrderId) -> Result<Option<OrderStatus>> {
        let status: Option<String> = sqlx::query_scalar(
            "SELECT status FROM orders WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        status
            .map(|s| {
                s.parse::<OrderStatus>()
                    .map_err(|e| StoreError::InvalidRow(e.to_string()))
            })
            .transpose()
    }
}

/// Escapes LIKE wildcards and wraps the term for a substring match.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// Builds the shared WHERE clause for listing and counting.
/// Returns the clause and the number of placeholders it used.
fn search_filter(query: &OrderQuery) -> (String, usize) {
    let mut sql = String::from(" WHERE deleted_at IS NULL");
    let mut param_count = 0;

    if query.search.is_some() {
        param_count += 1;
        sql.push_str(&format!(
            " AND (code ILIKE ${p} OR name ILIKE ${p} OR email ILIKE ${p} OR phone ILIKE ${p})",
            p = param_count
        ));
    }
    if query.status.is_some() {
        param_count += 1;
        sql.push_str(&format!(" AND status = ${param_count}"));
    }
    if query.service_id.is_some() {
        param_count += 1;
        sql.push_str(&format!(" AND service_id = ${param_count}"));
    }

    (sql, param_count)
}

fn bind_filter<'q>(
    mut q: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    query: &OrderQuery,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    if let Some(ref term) = query.search {
        q = q.bind(like_pattern(term));
    }
    if let Some(status) = query.status {
        q = q.bind(status.as_str());
    }
    if let Some(service_id) = query.service_id {
        q = q.bind(service_id.as_i64());
    }
    q
}

#[async_trait]
impl OrderRepository for PostgresOrderRepository {
    #[tracing::instrument(skip(self))]
    async fn find_by_id(&self, id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    #[tracing::instrument(skip(self))]
    async fn find_by_code(&self, code: &str) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE code = $1 AND deleted_at IS NULL"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        row.map(Self::row_to_order).transpose()
    }

    async fn exists_by_code(&self, code: &str) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM orders WHERE code = $1)")
                .bind(code)
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    #[tracing::instrument(skip(self, order), fields(code = %order.code))]
    async fn create(&self, order: NewOrder) -> Result<Order> {
        let code = order.code.clone();

        let row = sqlx::query(&format!(
            r#"
            INSERT INTO orders (code, service_id, name, email, phone, description, due_date, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(&order.code)
        .bind(order.service_id.as_i64())
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(&order.customer.phone)
        .bind(&order.description)
        .bind(order.due_date)
        .bind(OrderStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Unique violation on the code column: the caller regenerates
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some(UNIQUE_CODE_CONSTRAINT)
            {
                return StoreError::DuplicateCode { code };
            }
            StoreError::Database(e)
        })?;

        Self::row_to_order(row)
    }

    #[tracing::instrument(skip(self, patch))]
    async fn update(
        &self,
        id: OrderId,
        patch: OrderPatch,
        options: UpdateOptions,
    ) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            r#"
            UPDATE orders SET
                service_id = COALESCE($2, service_id),
                name = COALESCE($3, name),
                email = COALESCE($4, email),
                phone = COALESCE($5, phone),
                description = COALESCE($6, description),
                due_date = COALESCE($7, due_date),
                status = COALESCE($8, status),
                updated_at = NOW()
            WHERE id = $1
              AND deleted_at IS NULL
              AND ($9::TEXT IS NULL OR status = $9)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(id.as_uuid())
        .bind(patch.service_id.map(|s| s.as_i64()))
        .bind(patch.name)
        .bind(patch.email)
        .bind(patch.phone)
        .bind(patch.description)
        .bind(patch.due_date)
        .bind(patch.status.map(|s| s.as_str()))
        .bind(options.expected_status.map(|s| s.as_str()))
        .fetch_optional(&self.pool)
        .await?;

        match (row, options.expected_status) {
            (Some(row), _) => Self::row_to_order(row).map(Some),
            (None, None) => Ok(None),
            // Either the order is gone or the guard did not hold
            (None, Some(expected)) => match self.current_status(id).await? {
                Some(actual) => Err(StoreError::StatusConflict {
                    order_id: id,
                    expected,
                    actual,
                }),
                None => Ok(None),
            },
        }
    }

    #[tracing::instrument(skip(self))]
    async fn soft_delete(&self, id: OrderId) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE orders SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    #[tracing::instrument(skip(self))]
    async fn search(&self, query: OrderQuery) -> Result<Page<Order>> {
        let (filter, param_count) = search_filter(&query);

        let count_sql = format!("SELECT COUNT(*) FROM orders{filter}");
        let count_row = bind_filter(sqlx::query(&count_sql), &query)
            .fetch_one(&self.pool)
            .await?;
        let total: i64 = count_row.try_get(0)?;

        let list_sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders{filter} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            param_count + 1,
            param_count + 2
        );
        let rows = bind_filter(sqlx::query(&list_sql), &query)
            .bind(query.per_page as i64)
            .bind(i64::try_from(query.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(Self::row_to_order)
            .collect::<Result<Vec<_>>>()?;

        Ok(Page::new(items, query.page, query.per_page, total as u64))
    }

    async fn statistics(&self) -> Result<OrderStatistics> {
        let rows = sqlx::query(
            r#"
            SELECT status, COUNT(*) AS count
            FROM orders
            WHERE deleted_at IS NULL
            GROUP BY status
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let counts = rows
            .into_iter()
            .map(|row| {
                let status: String = row.try_get("status")?;
                let count: i64 = row.try_get("count")?;
                let status = status
                    .parse::<OrderStatus>()
                    .map_err(|e| StoreError::InvalidRow(e.to_string()))?;
                Ok((status, count as u64))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(OrderStatistics::from_counts(counts))
    }
}
