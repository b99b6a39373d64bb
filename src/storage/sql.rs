//--------------------------------------------------------------------------------------------------
// A Postgres-backed storage adapter, matching the normative schema in the spec's external
// interfaces section: `levels`, `orders`, `trades` (the `level_orders` join table and the
// `next_id`/`prev_id` chain columns from the original source's schema are dropped — the in-memory
// book already derives level membership from `orders.side`/`orders.price`, and the intrusive
// chain those columns recorded has no analogue once the ladder is a `BTreeMap`). Unlike the
// original source's `postgres_storage.go`, which relies on database triggers to derive
// `levels.volume`/`levels.count` from row inserts, this adapter writes those aggregates explicitly
// on every mutation — the engine, not the database, is the single source of truth for them.
//--------------------------------------------------------------------------------------------------

use async_trait::async_trait;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use tracing::{error, info};

use crate::domain::models::types::{Order, Side, Trade};

use super::{LevelDto, OrderBookDto, OrderDto, Storage, StorageError, TradeDto};

pub struct SqlStorage {
    pool: PgPool,
}

impl SqlStorage {
    /// Connects and creates the schema if it does not already exist. A connect failure here is
    /// the `StorageUnavailable` case from the spec's error table: fatal at startup.
    pub async fn connect(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await
            .map_err(|e| StorageError::Unavailable(e.to_string()))?;

        let storage = Self { pool };
        storage.init_schema().await?;
        info!("connected to postgres storage");
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS levels (
                side SMALLINT NOT NULL,
                price BIGINT NOT NULL,
                volume BIGINT NOT NULL,
                count INTEGER NOT NULL,
                PRIMARY KEY (side, price)
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_write_failed)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS orders (
                id UUID PRIMARY KEY,
                side SMALLINT NOT NULL,
                size BIGINT NOT NULL,
                remaining BIGINT NOT NULL,
                price BIGINT NOT NULL,
                time TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_write_failed)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS trades (
                id UUID PRIMARY KEY,
                buy_order_id UUID NOT NULL,
                sell_order_id UUID NOT NULL,
                price BIGINT NOT NULL,
                size BIGINT NOT NULL,
                time TIMESTAMPTZ NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_write_failed)?;

        Ok(())
    }

    fn side_code(side: Side) -> i16 {
        match side {
            Side::Buy => 0,
            Side::Sell => 1,
        }
    }

    fn side_from_code(code: i16) -> Result<Side, StorageError> {
        match code {
            0 => Ok(Side::Buy),
            1 => Ok(Side::Sell),
            other => Err(StorageError::CorruptedDto(format!("unknown side code {other}"))),
        }
    }
}

fn storage_write_failed(err: sqlx::Error) -> StorageError {
    error!(%err, "postgres write failed");
    StorageError::WriteFailed(err.to_string())
}

#[async_trait]
impl Storage for SqlStorage {
    async fn insert_level(&self, level: &LevelDto) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO levels (side, price, volume, count)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (side, price) DO UPDATE SET volume = $3, count = $4
            "#,
        )
        .bind(Self::side_code(level.side))
        .bind(level.price)
        .bind(level.volume as i64)
        .bind(level.count as i32)
        .execute(&self.pool)
        .await
        .map_err(storage_write_failed)?;
        Ok(())
    }

    async fn update_level(&self, level: &LevelDto) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO levels (side, price, volume, count)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (side, price) DO UPDATE SET volume = $3, count = $4
            "#,
        )
        .bind(Self::side_code(level.side))
        .bind(level.price)
        .bind(level.volume as i64)
        .bind(level.count as i32)
        .execute(&self.pool)
        .await
        .map_err(storage_write_failed)?;
        Ok(())
    }

    async fn insert_order(&self, order: &Order) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO orders (id, side, size, remaining, price, time)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(order.id)
        .bind(Self::side_code(order.side))
        .bind(order.size as i64)
        .bind(order.remaining as i64)
        .bind(order.price)
        .bind(order.placed_at)
        .execute(&self.pool)
        .await
        .map_err(storage_write_failed)?;
        Ok(())
    }

    async fn update_order(&self, order: &Order) -> Result<(), StorageError> {
        sqlx::query(r#"UPDATE orders SET remaining = $2 WHERE id = $1"#)
            .bind(order.id)
            .bind(order.remaining as i64)
            .execute(&self.pool)
            .await
            .map_err(storage_write_failed)?;
        Ok(())
    }

    async fn delete_order(&self, order: &Order, level_emptied: bool) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(storage_write_failed)?;

        sqlx::query(r#"DELETE FROM orders WHERE id = $1"#)
            .bind(order.id)
            .execute(&mut *tx)
            .await
            .map_err(storage_write_failed)?;

        if level_emptied {
            sqlx::query(r#"DELETE FROM levels WHERE side = $1 AND price = $2"#)
                .bind(Self::side_code(order.side))
                .bind(order.price)
                .execute(&mut *tx)
                .await
                .map_err(storage_write_failed)?;
        }

        tx.commit().await.map_err(storage_write_failed)?;
        Ok(())
    }

    async fn insert_trade(&self, trade: &Trade) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            INSERT INTO trades (id, buy_order_id, sell_order_id, price, size, time)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(trade.id)
        .bind(trade.buy_order_id)
        .bind(trade.sell_order_id)
        .bind(trade.price)
        .bind(trade.size as i64)
        .bind(trade.time)
        .execute(&self.pool)
        .await
        .map_err(storage_write_failed)?;
        Ok(())
    }

    async fn reset(&self) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(storage_write_failed)?;
        sqlx::query("DELETE FROM orders").execute(&mut *tx).await.map_err(storage_write_failed)?;
        sqlx::query("DELETE FROM levels").execute(&mut *tx).await.map_err(storage_write_failed)?;
        sqlx::query("DELETE FROM trades").execute(&mut *tx).await.map_err(storage_write_failed)?;
        tx.commit().await.map_err(storage_write_failed)?;
        Ok(())
    }

    async fn restore(&self) -> Result<OrderBookDto, StorageError> {
        let level_rows = sqlx::query("SELECT side, price, volume, count FROM levels")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::RestoreFailed(e.to_string()))?;

        let mut levels = Vec::with_capacity(level_rows.len());
        for row in level_rows {
            let side: i16 = row.try_get("side").map_err(|e| StorageError::RestoreFailed(e.to_string()))?;
            levels.push(LevelDto {
                side: Self::side_from_code(side)?,
                price: row.try_get("price").map_err(|e| StorageError::RestoreFailed(e.to_string()))?,
                volume: row.try_get::<i64, _>("volume").map_err(|e| StorageError::RestoreFailed(e.to_string()))? as u64,
                count: row.try_get::<i32, _>("count").map_err(|e| StorageError::RestoreFailed(e.to_string()))? as u32,
            });
        }

        let order_rows = sqlx::query("SELECT id, side, size, remaining, price, time FROM orders")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::RestoreFailed(e.to_string()))?;

        let mut orders = Vec::with_capacity(order_rows.len());
        for row in order_rows {
            let side: i16 = row.try_get("side").map_err(|e| StorageError::RestoreFailed(e.to_string()))?;
            orders.push(OrderDto {
                id: row.try_get("id").map_err(|e| StorageError::RestoreFailed(e.to_string()))?,
                side: Self::side_from_code(side)?,
                price: row.try_get("price").map_err(|e| StorageError::RestoreFailed(e.to_string()))?,
                size: row.try_get::<i64, _>("size").map_err(|e| StorageError::RestoreFailed(e.to_string()))? as u64,
                remaining: row.try_get::<i64, _>("remaining").map_err(|e| StorageError::RestoreFailed(e.to_string()))? as u64,
                time: row.try_get("time").map_err(|e| StorageError::RestoreFailed(e.to_string()))?,
            });
        }

        let trade_rows = sqlx::query("SELECT id, buy_order_id, sell_order_id, price, size, time FROM trades ORDER BY time ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::RestoreFailed(e.to_string()))?;

        let mut trades = Vec::with_capacity(trade_rows.len());
        for row in trade_rows {
            trades.push(TradeDto {
                id: row.try_get("id").map_err(|e| StorageError::RestoreFailed(e.to_string()))?,
                buy_order_id: row.try_get("buy_order_id").map_err(|e| StorageError::RestoreFailed(e.to_string()))?,
                sell_order_id: row.try_get("sell_order_id").map_err(|e| StorageError::RestoreFailed(e.to_string()))?,
                price: row.try_get("price").map_err(|e| StorageError::RestoreFailed(e.to_string()))?,
                size: row.try_get::<i64, _>("size").map_err(|e| StorageError::RestoreFailed(e.to_string()))? as u64,
                time: row.try_get("time").map_err(|e| StorageError::RestoreFailed(e.to_string()))?,
            });
        }

        Ok(OrderBookDto { levels, orders, trades })
    }
}
