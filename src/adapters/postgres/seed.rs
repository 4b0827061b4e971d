//! Startup seed loader for site and truck reference data.
//!
//! Yard reference data arrives as JSON exports (`sites.json`,
//! `trucks.json`). The load runs once at startup inside a single
//! transaction: either every missing row lands or none do.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, ErrorCode};

/// One site row from `sites.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSeed {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// One truck row from `trucks.json`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TruckSeed {
    pub id: i64,
    pub site_id: i64,
    pub license: String,
}

/// Loads `sites.json` and `trucks.json` from `dir` and inserts any rows
/// not already present.
pub async fn seed_from_dir(pool: &PgPool, dir: &Path) -> Result<(), DomainError> {
    let sites: Vec<SiteSeed> = read_json(dir.join("sites.json")).await?;
    let trucks: Vec<TruckSeed> = read_json(dir.join("trucks.json")).await?;

    let mut txn = pool.begin().await.map_err(db_err)?;

    for site in &sites {
        sqlx::query(
            r#"
            INSERT INTO sites (id, name, address, description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(site.id)
        .bind(&site.name)
        .bind(&site.address)
        .bind(&site.description)
        .execute(&mut *txn)
        .await
        .map_err(db_err)?;
    }

    for truck in &trucks {
        sqlx::query(
            r#"
            INSERT INTO trucks (id, site_id, license)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(truck.id)
        .bind(truck.site_id)
        .bind(&truck.license)
        .execute(&mut *txn)
        .await
        .map_err(db_err)?;
    }

    txn.commit().await.map_err(db_err)?;

    tracing::info!(
        sites = sites.len(),
        trucks = trucks.len(),
        "seed reference data loaded"
    );
    Ok(())
}

async fn read_json<T: DeserializeOwned>(path: PathBuf) -> Result<T, DomainError> {
    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Unable to load data from JSON file {}: {}", path.display(), e),
        )
    })?;

    serde_json::from_slice(&bytes).map_err(|e| {
        DomainError::new(
            ErrorCode::InternalError,
            format!("Invalid JSON in {}: {}", path.display(), e),
        )
    })
}

fn db_err(e: sqlx::Error) -> DomainError {
    DomainError::new(
        ErrorCode::DatabaseError,
        format!("Failed to load seed data: {}", e),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) {
        let mut file = std::fs::File::create(dir.join(name)).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[tokio::test]
    async fn reads_site_seeds_with_camel_case_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "sites.json",
            r#"[{"id": 1, "name": "Cedar Yard", "address": "1 Main St", "description": "North pit"}]"#,
        );

        let sites: Vec<SiteSeed> = read_json(dir.path().join("sites.json")).await.unwrap();
        assert_eq!(sites.len(), 1);
        assert_eq!(sites[0].name, "Cedar Yard");
        assert_eq!(sites[0].address.as_deref(), Some("1 Main St"));
    }

    #[tokio::test]
    async fn reads_truck_seeds_with_camel_case_fields() {
        let dir = tempfile::tempdir().unwrap();
        write_file(
            dir.path(),
            "trucks.json",
            r#"[{"id": 7, "siteId": 1, "license": "ABC-123"}]"#,
        );

        let trucks: Vec<TruckSeed> = read_json(dir.path().join("trucks.json")).await.unwrap();
        assert_eq!(trucks[0].site_id, 1);
        assert_eq!(trucks[0].license, "ABC-123");
    }

    #[tokio::test]
    async fn missing_file_is_an_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json::<Vec<SiteSeed>>(dir.path().join("sites.json"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
    }

    #[tokio::test]
    async fn malformed_json_is_an_internal_error() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "sites.json", "not json");

        let err = read_json::<Vec<SiteSeed>>(dir.path().join("sites.json"))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InternalError);
    }
}
