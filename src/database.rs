use crate::report::ReportType;
use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::{debug, info};

/// Where finished-job reports go. Publishing is best-effort for callers:
/// jobs log a sink failure and keep their own result.
#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn publish(&self, report_type: ReportType, chain: &str, report: Value) -> Result<()>;
}

pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Database { pool })
    }

    /// Delete reports past their retention window: everything older than
    /// `daily_days`, and within the `full_days`..`daily_days` span keep
    /// only each day's midnight report.
    pub async fn apply_retention(&self, full_days: u32, daily_days: u32) -> Result<u64> {
        debug!(full_days, daily_days, "applying report retention");

        let deleted = sqlx::query(
            r#"
            DELETE FROM raw_report
            WHERE
                (datetime < NOW() - ($1 || ' days')::interval AND extract(hour FROM datetime) != 0)
                OR
                (datetime < NOW() - ($2 || ' days')::interval)
            "#,
        )
        .bind(full_days.to_string())
        .bind(daily_days.to_string())
        .execute(&self.pool)
        .await?
        .rows_affected();

        info!(deleted, "report retention applied");
        Ok(deleted)
    }
}

#[async_trait]
impl ReportSink for Database {
    async fn publish(&self, report_type: ReportType, chain: &str, report: Value) -> Result<()> {
        debug!(chain, report_type = report_type.as_str(), "inserting report");

        let (raw_report_id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO raw_report (report_type, chain, datetime, report_content)
            VALUES ($1, $2, NOW(), $3)
            RETURNING raw_report_id
            "#,
        )
        .bind(report_type.as_str())
        .bind(chain)
        .bind(report)
        .fetch_one(&self.pool)
        .await?;

        info!(chain, raw_report_id, "report inserted");
        Ok(())
    }
}
