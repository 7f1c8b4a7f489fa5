//! Schema loader: drops and recreates the star schema on every run.
//!
//! Order matters: facts are dropped before the dimensions they reference,
//! dimensions are written before facts, and primary keys exist before the
//! foreign keys that point at them. A failed run leaves whatever state it
//! reached; the next run starts from DROP again.

use sqlx::postgres::{PgPoolOptions, Postgres};
use sqlx::query_builder::Separated;
use sqlx::{PgPool, QueryBuilder, Transaction};
use tokio::time::sleep;
use tracing::{info, warn};

use crate::config::Settings;
use crate::dimensions::Dimensions;
use crate::error::{EtlError, Result};
use crate::facts::FactRow;

/// Rows per INSERT statement.
const BATCH_SIZE: usize = 1000;

pub const FACT_TABLE: &str = "fakt_gesundheitskennzahlen";

/// Facts first: they hold the foreign keys.
const DROP_ORDER: &[&str] = &[
    FACT_TABLE,
    "dim_geographie",
    "dim_bevoelkerung",
    "dim_indikator",
    "dim_zeit",
];

const CREATE_TABLES: &[&str] = &[
    r#"
    CREATE TABLE dim_zeit (
        zeit_id BIGINT,
        jahr    INTEGER,
        periode TEXT
    )
    "#,
    r#"
    CREATE TABLE dim_geographie (
        geographie_id BIGINT,
        name          TEXT,
        iso_code      TEXT,
        kategorie     TEXT
    )
    "#,
    r#"
    CREATE TABLE dim_bevoelkerung (
        bevoelkerung_id BIGINT,
        geschlecht      TEXT,
        altersgruppe    TEXT,
        bildungsgruppe  TEXT
    )
    "#,
    r#"
    CREATE TABLE dim_indikator (
        indikator_id BIGINT,
        name         TEXT,
        kategorie    TEXT,
        einheit      TEXT,
        beschreibung TEXT
    )
    "#,
    r#"
    CREATE TABLE fakt_gesundheitskennzahlen (
        id              BIGINT,
        zeit_id         BIGINT,
        geographie_id   BIGINT,
        bevoelkerung_id BIGINT,
        indikator_id    BIGINT,
        wert            DOUBLE PRECISION,
        datenquelle     TEXT
    )
    "#,
];

const CONSTRAINTS: &[&str] = &[
    "ALTER TABLE dim_zeit ADD PRIMARY KEY (zeit_id)",
    "ALTER TABLE dim_geographie ADD PRIMARY KEY (geographie_id)",
    "ALTER TABLE dim_bevoelkerung ADD PRIMARY KEY (bevoelkerung_id)",
    "ALTER TABLE dim_indikator ADD PRIMARY KEY (indikator_id)",
    "ALTER TABLE fakt_gesundheitskennzahlen ADD PRIMARY KEY (id)",
    "ALTER TABLE fakt_gesundheitskennzahlen \
     ADD CONSTRAINT fk_zeit FOREIGN KEY (zeit_id) REFERENCES dim_zeit(zeit_id)",
    "ALTER TABLE fakt_gesundheitskennzahlen \
     ADD CONSTRAINT fk_geo FOREIGN KEY (geographie_id) REFERENCES dim_geographie(geographie_id)",
    "ALTER TABLE fakt_gesundheitskennzahlen \
     ADD CONSTRAINT fk_bev FOREIGN KEY (bevoelkerung_id) REFERENCES dim_bevoelkerung(bevoelkerung_id)",
    "ALTER TABLE fakt_gesundheitskennzahlen \
     ADD CONSTRAINT fk_ind FOREIGN KEY (indikator_id) REFERENCES dim_indikator(indikator_id)",
];

pub fn drop_statements() -> Vec<String> {
    DROP_ORDER
        .iter()
        .map(|table| format!("DROP TABLE IF EXISTS {table} CASCADE"))
        .collect()
}

pub fn create_statements() -> &'static [&'static str] {
    CREATE_TABLES
}

pub fn constraint_statements() -> &'static [&'static str] {
    CONSTRAINTS
}

/// Row counts written per table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadCounts {
    pub dim_zeit: usize,
    pub dim_geographie: usize,
    pub dim_bevoelkerung: usize,
    pub dim_indikator: usize,
    pub facts: usize,
}

/// Connect with a fixed delay between attempts; the database container
/// may still be starting up.
pub async fn wait_for_db(settings: &Settings) -> Result<PgPool> {
    info!(url = %settings.db_url_masked(), "connecting to database");

    let mut attempt = 1;
    loop {
        match PgPoolOptions::new()
            .max_connections(1)
            .connect(&settings.db_url)
            .await
        {
            Ok(pool) => {
                info!(attempt, "database connection established");
                return Ok(pool);
            }
            Err(source) if attempt >= settings.connect_retries => {
                return Err(EtlError::Connectivity {
                    attempts: attempt,
                    source,
                });
            }
            Err(e) => {
                warn!(
                    attempt,
                    max_attempts = settings.connect_retries,
                    delay_ms = settings.connect_delay.as_millis() as u64,
                    error = %e,
                    "database not ready, retrying"
                );
                sleep(settings.connect_delay).await;
                attempt += 1;
            }
        }
    }
}

pub async fn load_warehouse(pool: &PgPool, dims: &Dimensions, facts: &[FactRow]) -> Result<LoadCounts> {
    info!("recreating warehouse schema");
    let mut tx = pool.begin().await?;
    for statement in drop_statements() {
        execute_ddl(&mut tx, &statement).await?;
    }
    for statement in create_statements() {
        execute_ddl(&mut tx, statement).await?;
    }
    tx.commit().await?;

    info!("writing dimensions");
    let mut tx = pool.begin().await?;
    let counts = write_dimensions(&mut tx, dims).await?;
    tx.commit().await?;

    info!(rows = facts.len(), "writing fact table");
    let mut tx = pool.begin().await?;
    insert_chunked(
        &mut tx,
        "INSERT INTO fakt_gesundheitskennzahlen \
         (id, zeit_id, geographie_id, bevoelkerung_id, indikator_id, wert, datenquelle) ",
        facts,
        |mut b, f| {
            b.push_bind(f.id)
                .push_bind(f.time_id)
                .push_bind(f.geography_id)
                .push_bind(f.population_id)
                .push_bind(f.indicator_id)
                .push_bind(f.value)
                .push_bind(f.source_label.as_str());
        },
    )
    .await?;
    tx.commit().await?;

    info!("applying primary and foreign keys");
    let mut tx = pool.begin().await?;
    for statement in constraint_statements() {
        execute_ddl(&mut tx, statement).await?;
    }
    tx.commit().await?;

    Ok(LoadCounts {
        facts: facts.len(),
        ..counts
    })
}

async fn write_dimensions(tx: &mut Transaction<'_, Postgres>, dims: &Dimensions) -> Result<LoadCounts> {
    insert_chunked(
        tx,
        "INSERT INTO dim_zeit (zeit_id, jahr, periode) ",
        dims.time.rows(),
        |mut b, r| {
            b.push_bind(r.id).push_bind(r.year).push_bind(r.period.as_str());
        },
    )
    .await?;

    insert_chunked(
        tx,
        "INSERT INTO dim_geographie (geographie_id, name, iso_code, kategorie) ",
        dims.geography.rows(),
        |mut b, r| {
            b.push_bind(r.id)
                .push_bind(r.name.as_str())
                .push_bind(r.iso_code.as_deref())
                .push_bind(r.category.label());
        },
    )
    .await?;

    insert_chunked(
        tx,
        "INSERT INTO dim_bevoelkerung (bevoelkerung_id, geschlecht, altersgruppe, bildungsgruppe) ",
        dims.population.rows(),
        |mut b, r| {
            b.push_bind(r.id)
                .push_bind(r.gender.as_str())
                .push_bind(r.age_group.as_deref())
                .push_bind(r.education.as_str());
        },
    )
    .await?;

    insert_chunked(
        tx,
        "INSERT INTO dim_indikator (indikator_id, name, kategorie, einheit, beschreibung) ",
        dims.indicator.rows(),
        |mut b, r| {
            b.push_bind(r.id)
                .push_bind(r.name.as_deref())
                .push_bind(r.category.as_str())
                .push_bind(r.unit.as_deref())
                .push_bind(r.description.as_deref());
        },
    )
    .await?;

    Ok(LoadCounts {
        dim_zeit: dims.time.len(),
        dim_geographie: dims.geography.len(),
        dim_bevoelkerung: dims.population.len(),
        dim_indikator: dims.indicator.len(),
        facts: 0,
    })
}

async fn insert_chunked<'a, R>(
    tx: &mut Transaction<'_, Postgres>,
    insert_prefix: &str,
    rows: &'a [R],
    mut bind: impl FnMut(Separated<'_, 'a, Postgres, &'static str>, &'a R),
) -> Result<()> {
    for chunk in rows.chunks(BATCH_SIZE) {
        let mut builder: QueryBuilder<'a, Postgres> = QueryBuilder::new(insert_prefix);
        builder.push_values(chunk, &mut bind);
        builder.build().execute(&mut **tx).await?;
    }
    Ok(())
}

async fn execute_ddl(tx: &mut Transaction<'_, Postgres>, statement: &str) -> Result<()> {
    sqlx::query(statement)
        .execute(&mut **tx)
        .await
        .map_err(|source| EtlError::Schema {
            statement: summarize(statement),
            source,
        })?;
    Ok(())
}

/// Statement text with whitespace collapsed, for error messages.
fn summarize(statement: &str) -> String {
    statement.split_whitespace().collect::<Vec<_>>().join(" ")
}
