/*
 * Copyright © 2026, The Water Institute of the Gulf. All rights reserved.
 *
 * The “MetGet” software is licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License. You may obtain a copy
 * of the License at http://www.apache.org/licenses/LICENSE-2.0.
 *
 * Unless required by applicable law or agreed to in writing, software distributed under
 * the License is distributed on an "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND,
 * either express or implied. See the License for the specific language governing permissions
 * and limitations under the License.
 */

//! pooled Postgres access to the catalog. Every operation acquires a session
//! and commits before returning; transactions are never held across network
//! calls to the object store.

use std::collections::HashSet;
use chrono::{DateTime, Utc};
use serde_json::{Value as JsonValue, json};
use sqlx::{PgPool, Postgres, QueryBuilder, Row, postgres::PgPoolOptions};
use tracing::info;

use metget_common::config::MetgetConfig;
use metget_sources::{SourceDescriptor, descriptor_for_service};

use crate::errors::Result;
use crate::tables::{CatalogKey, FileRecord, NewFileRecord, NhcTrackRecord, NhcTrackRow, RequestRow, RequestStatus};

/// cap on uncommitted rows during batch ingestion
pub const DEFAULT_INSERT_CHUNK: usize = 100_000;

#[derive(Clone)]
pub struct CatalogStore {
    pool: PgPool,
    request_table: String,
    insert_chunk: usize,
}

impl CatalogStore {
    pub async fn connect (config: &MetgetConfig)->Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(8)
            .test_before_acquire(true)
            .connect( &config.database_url()).await?;

        Ok( CatalogStore {
            pool,
            request_table: config.request_table.clone(),
            insert_chunk: DEFAULT_INSERT_CHUNK,
        })
    }

    pub fn from_pool (pool: PgPool, request_table: impl ToString)->Self {
        CatalogStore { pool, request_table: request_table.to_string(), insert_chunk: DEFAULT_INSERT_CHUNK }
    }

    pub fn pool (&self)->&PgPool { &self.pool }

    /// create every catalog table that does not exist yet
    pub async fn create_tables (&self)->Result<()> {
        for ddl in crate::schema::all_tables_ddl( &self.request_table) {
            sqlx::query(&ddl).execute(&self.pool).await?;
        }
        Ok(())
    }

    /* #region gridded-service records ****************************************************/

    pub async fn exists (&self, service: &str, key: &CatalogKey)->Result<bool> {
        let descriptor = descriptor_for_service(service)?;
        let mut sql = format!(
            "SELECT 1 FROM {} WHERE forecastcycle = $1 AND forecasttime = $2",
            descriptor.table_name
        );
        if descriptor.kind.has_storm() {
            sql.push_str(" AND stormname = $3");
        }
        if descriptor.kind.has_ensemble_member() {
            sql.push_str( if descriptor.kind.has_storm() { " AND ensemble_member = $4" } else { " AND ensemble_member = $3" });
        }

        let mut query = sqlx::query(&sql).bind(key.forecast_cycle).bind(key.valid_time);
        if descriptor.kind.has_storm() {
            query = query.bind( key.storm_name.as_deref().unwrap_or(""));
        }
        if descriptor.kind.has_ensemble_member() {
            query = query.bind( key.ensemble_member.as_deref().unwrap_or(""));
        }

        Ok( query.fetch_optional(&self.pool).await?.is_some() )
    }

    /// the keys already present in a time window, for batch duplicate elimination
    pub async fn existing_keys (&self, service: &str, start: DateTime<Utc>, end: DateTime<Utc>)->Result<HashSet<CatalogKey>> {
        let descriptor = descriptor_for_service(service)?;

        let storm_col = if descriptor.kind.has_storm() { ", stormname" } else { "" };
        let member_col = if descriptor.kind.has_ensemble_member() { ", ensemble_member" } else { "" };
        let sql = format!(
            "SELECT forecastcycle, forecasttime{storm_col}{member_col} FROM {} \
             WHERE forecasttime >= $1 AND forecasttime <= $2",
            descriptor.table_name
        );

        let rows = sqlx::query(&sql).bind(start).bind(end).fetch_all(&self.pool).await?;

        let mut keys = HashSet::with_capacity( rows.len());
        for row in rows {
            keys.insert( CatalogKey {
                forecast_cycle: row.try_get("forecastcycle")?,
                valid_time: row.try_get("forecasttime")?,
                storm_name: if descriptor.kind.has_storm() { row.try_get("stormname").ok() } else { None },
                ensemble_member: if descriptor.kind.has_ensemble_member() { row.try_get("ensemble_member").ok() } else { None },
            });
        }
        Ok(keys)
    }

    /// chunked "insert .. on conflict do nothing" against the service's unique
    /// constraint. Returns the number of rows actually inserted; conflicts are
    /// success (the record is already present)
    pub async fn insert_batch (&self, service: &str, records: &[NewFileRecord])->Result<u64> {
        let descriptor = descriptor_for_service(service)?;
        if records.is_empty() {
            return Ok(0)
        }

        let mut columns = String::from("forecastcycle, forecasttime, tau");
        if descriptor.kind.has_storm() { columns.push_str(", stormname") }
        if descriptor.kind.has_ensemble_member() { columns.push_str(", ensemble_member") }
        columns.push_str(", filepath, url, accessed");

        let mut inserted = 0u64;
        for chunk in records.chunks(self.insert_chunk) {
            let mut tx = self.pool.begin().await?;
            sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ").execute(&mut *tx).await?;

            let mut builder: QueryBuilder<Postgres> =
                QueryBuilder::new( format!("INSERT INTO {} ({}) ", descriptor.table_name, columns));

            builder.push_values( chunk.iter(), |mut b, record| {
                b.push_bind( record.forecast_cycle)
                 .push_bind( record.valid_time)
                 .push_bind( record.tau);
                if descriptor.kind.has_storm() {
                    b.push_bind( record.storm_name.clone().unwrap_or_default());
                }
                if descriptor.kind.has_ensemble_member() {
                    b.push_bind( record.ensemble_member.clone().unwrap_or_default());
                }
                b.push_bind( record.filepath.clone())
                 .push_bind( record.url.clone())
                 .push_bind( Utc::now());
            });
            builder.push(" ON CONFLICT DO NOTHING");

            let result = builder.build().execute(&mut *tx).await?;
            inserted += result.rows_affected();
            tx.commit().await?;
        }

        info!("inserted {} of {} {} records", inserted, records.len(), service);
        Ok(inserted)
    }

    /// candidate rows for the selection engine. The policy-specific winner
    /// resolution happens in [`crate::selection`]
    pub async fn fetch_candidates (&self, descriptor: &SourceDescriptor,
                                   start: DateTime<Utc>, end: DateTime<Utc>,
                                   storm: Option<&str>, ensemble_member: Option<&str>)->Result<Vec<FileRecord>>
    {
        let mut sql = format!(
            "SELECT id, forecastcycle, forecasttime, tau, filepath, accessed FROM {} \
             WHERE forecasttime >= $1 AND forecasttime <= $2",
            descriptor.table_name
        );

        let mut bind_index = 3;
        if storm.is_some() {
            sql.push_str( &format!(" AND stormname = ${bind_index}"));
            bind_index += 1;
        }
        if ensemble_member.is_some() {
            sql.push_str( &format!(" AND ensemble_member = ${bind_index}"));
        }
        sql.push_str(" ORDER BY forecasttime, id");

        let mut query = sqlx::query_as::<_, FileRecord>(&sql).bind(start).bind(end);
        if let Some(storm) = storm {
            query = query.bind(storm);
        }
        if let Some(member) = ensemble_member {
            query = query.bind(member);
        }

        Ok( query.fetch_all(&self.pool).await? )
    }

    /* #endregion gridded-service records */

    /* #region NHC tracks *****************************************************************/

    /// NHC tables are mutable: re-ingestion of a (year, basin, storm[, advisory])
    /// replaces the previous row
    pub async fn update_or_insert_nhc (&self, record: &NhcTrackRecord)->Result<()> {
        let sql = match &record.advisory {
            Some(_) => {
                "INSERT INTO nhc_fcst \
                 (storm_year, basin, storm, advisory, advisory_start, advisory_end, advisory_duration_hr, filepath, md5, accessed, geometry_data) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11) \
                 ON CONFLICT (storm_year, basin, storm, advisory) DO UPDATE SET \
                 advisory_start = EXCLUDED.advisory_start, advisory_end = EXCLUDED.advisory_end, \
                 advisory_duration_hr = EXCLUDED.advisory_duration_hr, filepath = EXCLUDED.filepath, \
                 md5 = EXCLUDED.md5, accessed = EXCLUDED.accessed, geometry_data = EXCLUDED.geometry_data"
            }
            None => {
                "INSERT INTO nhc_btk \
                 (storm_year, basin, storm, advisory_start, advisory_end, advisory_duration_hr, filepath, md5, accessed, geometry_data) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
                 ON CONFLICT (storm_year, basin, storm) DO UPDATE SET \
                 advisory_start = EXCLUDED.advisory_start, advisory_end = EXCLUDED.advisory_end, \
                 advisory_duration_hr = EXCLUDED.advisory_duration_hr, filepath = EXCLUDED.filepath, \
                 md5 = EXCLUDED.md5, accessed = EXCLUDED.accessed, geometry_data = EXCLUDED.geometry_data"
            }
        };

        let mut query = sqlx::query(sql)
            .bind( record.storm_year)
            .bind( &record.basin)
            .bind( record.storm);
        if let Some(advisory) = &record.advisory {
            query = query.bind(advisory);
        }
        query = query
            .bind( record.advisory_start)
            .bind( record.advisory_end)
            .bind( record.advisory_duration_hr)
            .bind( &record.filepath)
            .bind( &record.md5)
            .bind( Utc::now())
            .bind( record.geojson.clone());

        query.execute(&self.pool).await?;
        Ok(())
    }

    pub async fn fetch_nhc_best_track (&self, storm_year: i32, basin: &str, storm: i32)->Result<Option<NhcTrackRow>> {
        let row = sqlx::query_as::<_, NhcTrackRow>(
            "SELECT id, storm_year, basin, storm, CAST(NULL AS TEXT) as advisory, advisory_start, advisory_end, \
             advisory_duration_hr, filepath, md5, geometry_data \
             FROM nhc_btk WHERE storm_year = $1 AND basin = $2 AND storm = $3")
            .bind(storm_year).bind(basin).bind(storm)
            .fetch_optional(&self.pool).await?;
        Ok(row)
    }

    pub async fn fetch_nhc_forecast (&self, storm_year: i32, basin: &str, storm: i32, advisory: &str)->Result<Option<NhcTrackRow>> {
        let row = sqlx::query_as::<_, NhcTrackRow>(
            "SELECT id, storm_year, basin, storm, advisory, advisory_start, advisory_end, \
             advisory_duration_hr, filepath, md5, geometry_data \
             FROM nhc_fcst WHERE storm_year = $1 AND basin = $2 AND storm = $3 AND advisory = $4")
            .bind(storm_year).bind(basin).bind(storm).bind(advisory)
            .fetch_optional(&self.pool).await?;
        Ok(row)
    }

    /* #endregion NHC tracks */

    /* #region request records ************************************************************/

    pub async fn add_request (&self, request_id: &str, status: RequestStatus, api_key: &str,
                              source_ip: &str, input_data: &JsonValue, message: &str, credit: i64)->Result<()>
    {
        let sql = format!(
            "INSERT INTO {} (request_id, try, status, start_date, last_date, api_key, source_ip, credit_usage, input_data, message) \
             VALUES ($1, 0, $2, $3, $3, $4, $5, $6, $7, $8) \
             ON CONFLICT (request_id) DO NOTHING",
            self.request_table
        );

        sqlx::query(&sql)
            .bind(request_id)
            .bind( status.to_string())
            .bind( Utc::now())
            .bind(api_key)
            .bind(source_ip)
            .bind(credit)
            .bind(input_data)
            .bind( json!({ "message": message }))
            .execute(&self.pool).await?;
        Ok(())
    }

    /// terminal and intermediate status updates; every outcome lands here
    pub async fn update_request (&self, request_id: &str, status: RequestStatus,
                                 message: &str, credit: i64, increment_try: bool)->Result<()>
    {
        let try_delta: i32 = if increment_try { 1 } else { 0 };
        let sql = format!(
            "UPDATE {} SET status = $2, last_date = $3, message = $4, credit_usage = $5, try = try + $6 \
             WHERE request_id = $1",
            self.request_table
        );

        sqlx::query(&sql)
            .bind(request_id)
            .bind( status.to_string())
            .bind( Utc::now())
            .bind( json!({ "message": message }))
            .bind(credit)
            .bind(try_delta)
            .execute(&self.pool).await?;
        Ok(())
    }

    /// claim the oldest runnable request for this worker. Restore-wait rows
    /// only become eligible again after `restore_wait` has elapsed. Uses
    /// SKIP LOCKED so concurrent workers never pick the same row
    pub async fn claim_next_request (&self, restore_wait: std::time::Duration)->Result<Option<RequestRow>> {
        let mut tx = self.pool.begin().await?;

        let select = format!(
            "SELECT id, request_id, try, status, start_date, last_date, api_key, source_ip, credit_usage, input_data, message \
             FROM {} WHERE status = $1 OR (status = $2 AND last_date < $3) \
             ORDER BY start_date LIMIT 1 FOR UPDATE SKIP LOCKED",
            self.request_table
        );

        let restore_cutoff = Utc::now() - chrono::Duration::from_std(restore_wait).unwrap_or_default();
        let row = sqlx::query_as::<_, RequestRow>(&select)
            .bind( RequestStatus::Queued.to_string())
            .bind( RequestStatus::Restore.to_string())
            .bind( restore_cutoff)
            .fetch_optional(&mut *tx).await?;

        if let Some(request) = &row {
            let update = format!( "UPDATE {} SET status = $2, last_date = $3 WHERE request_id = $1", self.request_table);
            sqlx::query(&update)
                .bind( &request.request_id)
                .bind( RequestStatus::Running.to_string())
                .bind( Utc::now())
                .execute(&mut *tx).await?;
        }

        tx.commit().await?;
        Ok(row)
    }

    /* #endregion request records */
}
