//! CSV export example
//!
//! This example demonstrates:
//! - Loading kind schemas from YAML into the global registry
//! - Encoding entities to JSON with includes/excludes
//! - Exporting encoded rows as CSV and reading them back as an upload

use chrono::{TimeZone, Utc};
use entity_api::prelude::*;
use tracing_subscriber::EnvFilter;

const SCHEMAS: &str = include_str!("schemas.yaml");

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    println!("📦 Entity API CSV Export Example\n");

    let registry = SchemaRegistry::global();
    SchemaConfig::from_yaml_str(SCHEMAS)?.register_all(registry)?;
    println!("✅ Registered kinds: {:?}\n", registry.kinds());

    let employee = registry.require("Employee")?;
    let acme = Reference::new("Company", 1)?;

    let staff = vec![
        Entity::new(employee.clone())
            .with_identity(Reference::new("Employee", "ann")?)
            .with("name", "Ann")?
            .with("hired", Utc.with_ymd_and_hms(2020, 1, 1, 9, 0, 0).unwrap())?
            .with("employer", acme.clone())?
            .with("skills", vec!["rust", "sql"])?,
        Entity::new(employee.clone())
            .with_identity(Reference::new("Employee", "bob")?)
            .with("name", "Bob, Jr.")?
            .with("employer", acme.clone())?,
    ];

    // JSON, the way a list endpoint would render it
    let json = dumps(ApiValue::query(&staff), &["nickname"], &["employer"])?;
    println!("🔷 JSON:\n{}\n", json);

    // CSV export
    let fieldnames: Vec<String> = ["identity_raw_id", "name", "hired", "skills"]
        .iter()
        .map(|name| name.to_string())
        .collect();
    let mut writer = CsvWriter::new(fieldnames.clone());
    writer.write_header()?;
    for member in &staff {
        let encoded = encode(member, &EncodeOptions::default())?;
        writer.write_row(&encoded.value)?;
    }
    println!("🔷 CSV:\n{}", String::from_utf8_lossy(writer.stream_data()));

    // Upload the export again and parse it back
    let store = InMemoryBlobStore::new();
    let key = store.put("staff.csv", writer.into_inner()).await?;
    let rows = parse_csv_upload(&store, &key, &fieldnames).await?;
    println!("🔷 Parsed {} rows back from the upload:", rows.len());
    for row in &rows {
        println!("   - {} (hired: {})", row["name"], row["hired"]);
    }

    Ok(())
}
