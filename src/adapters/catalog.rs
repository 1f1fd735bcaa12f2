use crate::domain::model::{TrayCandidate, TrayType};
use crate::domain::ports::{CatalogQuery, CatalogRepository};
use crate::utils::error::{Result, SizingError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Catalog held in memory, queried in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    trays: Vec<TrayCandidate>,
}

impl InMemoryCatalog {
    pub fn new(trays: Vec<TrayCandidate>) -> Self {
        Self { trays }
    }

    pub fn insert(&mut self, tray: TrayCandidate) {
        self.trays.push(tray);
    }

    pub fn trays(&self) -> &[TrayCandidate] {
        &self.trays
    }

    pub fn len(&self) -> usize {
        self.trays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trays.is_empty()
    }

    /// Loads a catalog exported as CSV.
    pub fn from_csv_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;
        Self::from_csv_reader(reader)
    }

    pub fn from_csv_str(content: &str) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        Self::from_csv_reader(reader)
    }

    fn from_csv_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut trays = Vec::new();
        for (index, row) in reader.deserialize::<CatalogRow>().enumerate() {
            let row = row?;
            trays.push(row.into_candidate(index + 1)?);
        }
        tracing::info!("Loaded {} trays from catalog CSV", trays.len());
        Ok(Self { trays })
    }
}

#[async_trait]
impl CatalogRepository for InMemoryCatalog {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<TrayCandidate>> {
        Ok(self
            .trays
            .iter()
            .filter(|tray| query.matches(tray))
            .cloned()
            .collect())
    }
}

/// One row of a catalog spreadsheet export. Spanish headers are accepted.
#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(default, alias = "_id", alias = "codigo_interno")]
    id: Option<String>,
    #[serde(alias = "tipo")]
    r#type: String,
    #[serde(alias = "categoria", alias = "categoría")]
    category: String,
    #[serde(alias = "espesor")]
    thickness: f64,
    #[serde(alias = "ancho")]
    width: f64,
    #[serde(alias = "alto")]
    height: f64,
    #[serde(alias = "loadCapacity", alias = "carga")]
    load_capacity: f64,
    #[serde(default, alias = "activo", alias = "isActive")]
    active: Option<String>,
    #[serde(default, alias = "codigo", alias = "código")]
    code: Option<String>,
    #[serde(default, alias = "nombre")]
    name: Option<String>,
}

impl CatalogRow {
    fn into_candidate(self, row_number: usize) -> Result<TrayCandidate> {
        let tray_type = parse_tray_type(&self.r#type).ok_or_else(|| SizingError::catalog(format!(
            "row {}: unknown tray type '{}'",
            row_number, self.r#type
        )))?;

        for (field, value) in [
            ("thickness", self.thickness),
            ("width", self.width),
            ("height", self.height),
            ("load_capacity", self.load_capacity),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SizingError::catalog(format!(
                    "row {}: {} must be greater than zero (got {})",
                    row_number, field, value
                )));
            }
        }

        Ok(TrayCandidate {
            id: self
                .id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| format!("row-{}", row_number)),
            tray_type,
            category: self.category,
            thickness_mm: self.thickness,
            width_mm: self.width,
            height_mm: self.height,
            load_capacity_kg_m: self.load_capacity,
            active: self.active.as_deref().map_or(true, parse_flag),
            code: self.code.filter(|c| !c.is_empty()),
            name: self.name.filter(|n| !n.is_empty()),
        })
    }
}

pub fn parse_tray_type(value: &str) -> Option<TrayType> {
    match value.trim().to_lowercase().as_str() {
        "ladder" | "escalerilla" => Some(TrayType::Ladder),
        "channel" | "canal" => Some(TrayType::Channel),
        _ => None,
    }
}

fn parse_flag(value: &str) -> bool {
    !matches!(
        value.trim().to_lowercase().as_str(),
        "false" | "no" | "0" | "inactive" | "inactivo"
    )
}

/// Catalog served over HTTP as a JSON array of trays.
pub struct HttpCatalog {
    client: Client,
    endpoint: String,
}

impl HttpCatalog {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl CatalogRepository for HttpCatalog {
    async fn query(&self, query: &CatalogQuery) -> Result<Vec<TrayCandidate>> {
        let mut params = vec![
            ("type", query.tray_type.as_str().to_string()),
            ("minLoadCapacity", query.min_load_capacity_kg_m.to_string()),
        ];
        if let Some(width) = query.min_width_mm {
            params.push(("minWidth", width.to_string()));
        }
        if let Some(height) = query.min_height_mm {
            params.push(("minHeight", height.to_string()));
        }

        tracing::debug!("Querying catalog at {} with {:?}", self.endpoint, params);
        let response = self.client.get(&self.endpoint).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SizingError::catalog(format!(
                "catalog endpoint {} returned {}",
                self.endpoint, status
            )));
        }

        let trays: Vec<TrayCandidate> = response.json().await?;
        let total = trays.len();
        // The endpoint may ignore the filter parameters.
        let matching: Vec<TrayCandidate> = trays.into_iter().filter(|t| query.matches(t)).collect();
        tracing::debug!("Catalog returned {} trays, {} match the query", total, matching.len());
        Ok(matching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "\
id,type,category,thickness,width,height,load_capacity,active
L-100,escalerilla,Liviana,1.5,100,50,40,true
L-200,ladder,semi pesadas,2.0,200,100,90,
C-150,canal,pesada,2.0,150,50,60,false
";

    #[test]
    fn test_parse_catalog_csv() {
        let catalog = InMemoryCatalog::from_csv_str(CSV).unwrap();
        assert_eq!(catalog.len(), 3);
        let trays = catalog.trays();
        assert_eq!(trays[0].tray_type, TrayType::Ladder);
        assert_eq!(trays[1].load_capacity_kg_m, 90.0);
        assert!(trays[1].active);
        assert_eq!(trays[2].tray_type, TrayType::Channel);
        assert!(!trays[2].active);
    }

    #[test]
    fn test_spanish_headers_and_generated_ids() {
        let csv = "tipo,categoria,espesor,ancho,alto,carga\nCanal,liviana,1.2,300,75,55\n";
        let catalog = InMemoryCatalog::from_csv_str(csv).unwrap();
        assert_eq!(catalog.trays()[0].id, "row-1");
        assert_eq!(catalog.trays()[0].tray_type, TrayType::Channel);
    }

    #[test]
    fn test_rejects_unknown_type_and_bad_dimensions() {
        let csv = "type,category,thickness,width,height,load_capacity\nwire-mesh,liviana,1,100,50,40\n";
        assert!(matches!(
            InMemoryCatalog::from_csv_str(csv),
            Err(SizingError::CatalogError { .. })
        ));
        let csv = "type,category,thickness,width,height,load_capacity\ncanal,liviana,1,0,50,40\n";
        assert!(InMemoryCatalog::from_csv_str(csv).is_err());
    }

    #[tokio::test]
    async fn test_in_memory_query_skips_inactive_and_other_types() {
        let catalog = InMemoryCatalog::from_csv_str(CSV).unwrap();
        let ladders = catalog
            .query(&CatalogQuery::by_load(TrayType::Ladder, 10.0))
            .await
            .unwrap();
        assert_eq!(ladders.len(), 2);

        let channels = catalog
            .query(&CatalogQuery::by_load(TrayType::Channel, 10.0))
            .await
            .unwrap();
        assert!(channels.is_empty());

        let wide = catalog
            .query(&CatalogQuery::by_load(TrayType::Ladder, 10.0).with_dimensions(150.0, 60.0))
            .await
            .unwrap();
        assert_eq!(wide.len(), 1);
        assert_eq!(wide[0].id, "L-200");
    }
}
