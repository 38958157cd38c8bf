//! The plant metadata table (`Details.csv`).
//!
//! The file is owned by whoever curates the data, not by this service, so it is read
//! fresh for every request and never cached.

use std::io::Read;
use std::path::{Path, PathBuf};

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const UNKNOWN_PLANT: &str = "Unknown";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("cannot open plant details {}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("malformed plant details: {0}")]
    Parse(#[from] csv::Error),
}

#[derive(Debug, Error, PartialEq)]
pub enum CoordinateError {
    #[error("coordinates must be wrapped in brackets, got {0:?}")]
    MissingBrackets(String),
    #[error("expected exactly two coordinates, got {0}")]
    Arity(usize),
    #[error("{0:?} is not a finite number")]
    NotANumber(String),
}

/// One row of the metadata table. Serializes with the table's own column names,
/// which is also the shape `/predict` returns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlantRecord {
    #[serde(rename = "Plant Name", default)]
    pub name: String,
    #[serde(rename = "Biological Name", default)]
    pub biological_name: String,
    #[serde(rename = "Medicinal Uses", default)]
    pub medicinal_uses: String,
    #[serde(rename = "latitude and longitude", default)]
    pub coordinates: String,
}

impl PlantRecord {
    /// Returned when a predicted label has no row in the table.
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_PLANT.to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub long: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlantLocation {
    pub name: String,
    pub points: Vec<GeoPoint>,
}

/// Parses `"[lat,long]"`. Whitespace around the brackets and the numbers is allowed.
pub fn parse_coordinates(raw: &str) -> Result<GeoPoint, CoordinateError> {
    let inner = raw
        .trim()
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| CoordinateError::MissingBrackets(raw.to_string()))?;

    let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
    if parts.len() != 2 {
        return Err(CoordinateError::Arity(parts.len()));
    }

    let number = |s: &str| -> Result<f64, CoordinateError> {
        s.parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| CoordinateError::NotANumber(s.to_string()))
    };

    Ok(GeoPoint {
        lat: number(parts[0])?,
        long: number(parts[1])?,
    })
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<PlantRecord>,
}

impl Catalog {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        let reader = Self::builder()
            .from_path(path)
            .map_err(|source| CatalogError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::collect(reader)
    }

    pub fn from_reader<R: Read>(rdr: R) -> Result<Self, CatalogError> {
        Self::collect(Self::builder().from_reader(rdr))
    }

    fn builder() -> csv::ReaderBuilder {
        let mut builder = csv::ReaderBuilder::new();
        builder.trim(csv::Trim::Headers).flexible(true);
        builder
    }

    fn collect<R: Read>(mut reader: csv::Reader<R>) -> Result<Self, CatalogError> {
        let records = reader
            .deserialize::<PlantRecord>()
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    pub fn records(&self) -> &[PlantRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First row whose name matches exactly (case-sensitive).
    pub fn find(&self, name: &str) -> Option<&PlantRecord> {
        self.records.iter().find(|r| r.name == name)
    }

    /// Map points for every named row, in file order.
    ///
    /// Rows with a blank name are ignored. Rows whose coordinates don't parse are
    /// skipped with a warning so one bad row can't take down the whole listing.
    pub fn locations(&self) -> Vec<PlantLocation> {
        self.records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.name.trim().is_empty())
            .filter_map(|(i, r)| match parse_coordinates(&r.coordinates) {
                Ok(point) => Some(PlantLocation {
                    name: r.name.clone(),
                    points: vec![point],
                }),
                Err(e) => {
                    // +2: header line plus 1-based numbering
                    warn!("skipping plant details row {} ({:?}): {}", i + 2, r.name, e);
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DETAILS: &str = "\
Plant Name,Biological Name,Medicinal Uses,latitude and longitude
aloevera,Aloe barbadensis miller,\"Soothes burns, moisturises skin\",\"[12.5,77.3]\"
banana,Musa acuminata,Rich in potassium,\"[ 9.93 , 76.26 ]\"
,Nameless,,\"[1.0,2.0]\"
ginger,Zingiber officinale,Aids digestion,not-a-point
aloevera,Duplicate,Second row,\"[0,0]\"
";

    fn catalog() -> Catalog {
        Catalog::from_reader(DETAILS.as_bytes()).unwrap()
    }

    #[test]
    fn rows_are_read_by_column_name() {
        let catalog = catalog();
        assert_eq!(catalog.len(), 5);

        let aloe = &catalog.records()[0];
        assert_eq!(aloe.name, "aloevera");
        assert_eq!(aloe.biological_name, "Aloe barbadensis miller");
        assert_eq!(aloe.medicinal_uses, "Soothes burns, moisturises skin");
        assert_eq!(aloe.coordinates, "[12.5,77.3]");
    }

    #[test]
    fn column_order_and_extra_columns_do_not_matter() {
        let csv = "Notes,latitude and longitude,Plant Name,Medicinal Uses,Biological Name\n\
                   x,\"[1,2]\",kale,Vitamins,Brassica oleracea\n";
        let catalog = Catalog::from_reader(csv.as_bytes()).unwrap();
        let kale = catalog.find("kale").unwrap();
        assert_eq!(kale.biological_name, "Brassica oleracea");
        assert_eq!(kale.coordinates, "[1,2]");
    }

    #[test]
    fn find_returns_first_exact_match() {
        let catalog = catalog();
        assert_eq!(
            catalog.find("aloevera").unwrap().biological_name,
            "Aloe barbadensis miller"
        );
        assert!(catalog.find("Aloevera").is_none());
        assert!(catalog.find("mango").is_none());
    }

    #[test]
    fn unknown_record_only_carries_the_name() {
        let unknown = PlantRecord::unknown();
        assert_eq!(unknown.name, "Unknown");
        assert!(unknown.biological_name.is_empty());
        assert!(unknown.medicinal_uses.is_empty());
        assert!(unknown.coordinates.is_empty());
    }

    #[test]
    fn record_serializes_with_table_headers() {
        let value = serde_json::to_value(PlantRecord::unknown()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "Plant Name": "Unknown",
                "Biological Name": "",
                "Medicinal Uses": "",
                "latitude and longitude": "",
            })
        );
    }

    #[test]
    fn coordinates_parse_exactly() {
        assert_eq!(
            parse_coordinates("[12.5,77.3]"),
            Ok(GeoPoint { lat: 12.5, long: 77.3 })
        );
        assert_eq!(
            parse_coordinates("  [-33.86, 151.21] "),
            Ok(GeoPoint { lat: -33.86, long: 151.21 })
        );
    }

    #[test]
    fn malformed_coordinates_are_errors() {
        assert!(matches!(
            parse_coordinates("12.5,77.3"),
            Err(CoordinateError::MissingBrackets(_))
        ));
        assert_eq!(parse_coordinates("[12.5]"), Err(CoordinateError::Arity(1)));
        assert_eq!(parse_coordinates("[1,2,3]"), Err(CoordinateError::Arity(3)));
        assert_eq!(
            parse_coordinates("[north,77.3]"),
            Err(CoordinateError::NotANumber("north".to_string()))
        );
        assert!(parse_coordinates("[inf,0]").is_err());
        assert!(parse_coordinates("").is_err());
    }

    #[test]
    fn locations_skip_blank_names_and_bad_points() {
        let locations = catalog().locations();
        let names: Vec<&str> = locations.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, ["aloevera", "banana", "aloevera"]);

        assert_eq!(locations[0].points, vec![GeoPoint { lat: 12.5, long: 77.3 }]);
        assert_eq!(locations[1].points, vec![GeoPoint { lat: 9.93, long: 76.26 }]);
    }

    #[test]
    fn missing_file_is_an_open_error() {
        let err = Catalog::load("no/such/Details.csv").unwrap_err();
        assert!(matches!(err, CatalogError::Open { .. }));
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Details.csv");
        std::fs::write(&path, DETAILS).unwrap();

        let catalog = Catalog::load(&path).unwrap();
        assert_eq!(catalog.len(), 5);
        assert!(!catalog.is_empty());
    }
}
