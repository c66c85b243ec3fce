//! Loaders for GeoNames dumps and boundary shapes.

use anyhow::{anyhow, bail, Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, StringRecord};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

use crate::geometry::{Geometry, Point};
use crate::models::{AdminCodes, FeatureClass, Place};

/// Columns of the `allCountries.txt` / `cities*.txt` format.
const GEONAMES_COLUMNS: usize = 19;

fn open(path: &Path) -> Result<Box<dyn Read>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(reader)
}

fn tsv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    // GeoNames fields are never quoted and names may contain `"`
    ReaderBuilder::new()
        .has_headers(false)
        .delimiter(b'\t')
        .quoting(false)
        .flexible(true)
        .from_reader(reader)
}

/// Load places from a GeoNames tab-separated dump, gzipped when the path ends in `.gz`.
pub fn load_geonames(path: &Path) -> Result<Vec<Place>> {
    info!("Loading GeoNames places from {}", path.display());
    read_geonames(open(path)?)
}

/// Read GeoNames records. Malformed rows are skipped with a warning.
pub fn read_geonames<R: Read>(reader: R) -> Result<Vec<Place>> {
    let mut places = Vec::new();
    let mut skipped = 0usize;

    for (index, result) in tsv_reader(reader).records().enumerate() {
        let record = result.context("Failed to read GeoNames record")?;
        match parse_geonames_record(&record) {
            Ok(place) => places.push(place),
            Err(e) => {
                skipped += 1;
                warn!("Skipping GeoNames line {}: {}", index + 1, e);
            }
        }
    }

    info!("Loaded {} places ({} skipped)", places.len(), skipped);
    Ok(places)
}

/// Parse one 19-column GeoNames row.
pub fn parse_geonames_record(record: &StringRecord) -> Result<Place> {
    if record.len() != GEONAMES_COLUMNS {
        bail!("expected {} columns, got {}", GEONAMES_COLUMNS, record.len());
    }

    let geoname_id: u64 = record[0]
        .parse()
        .with_context(|| format!("invalid geoname id '{}'", &record[0]))?;
    let latitude: f64 = record[4]
        .parse()
        .with_context(|| format!("invalid latitude '{}'", &record[4]))?;
    let longitude: f64 = record[5]
        .parse()
        .with_context(|| format!("invalid longitude '{}'", &record[5]))?;

    let coordinate = Point::new(latitude, longitude);
    if !coordinate.is_within_bounds() {
        bail!("coordinate ({}, {}) out of range", latitude, longitude);
    }

    let feature_class: FeatureClass = record[6].parse().map_err(|e: String| anyhow!(e))?;

    let mut place = Place::new(geoname_id, &record[1], coordinate, feature_class, &record[7])
        .with_alternate_names(
            record[3]
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(String::from)
                .collect(),
        )
        .with_country_code(&record[8])
        .with_admin_codes(AdminCodes {
            admin1: non_empty(&record[10]),
            admin2: non_empty(&record[11]),
            admin3: non_empty(&record[12]),
            admin4: non_empty(&record[13]),
        })
        .with_population(optional(&record[14], "population")?.unwrap_or(0))
        .with_elevation(optional(&record[15], "elevation")?);

    if let Some(ascii_name) = non_empty(&record[2]) {
        place = place.with_ascii_name(ascii_name);
    }
    if let Some(timezone) = non_empty(&record[17]) {
        place = place.with_timezone(timezone);
    }
    if let Some(date) = non_empty(&record[18]) {
        let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
            .with_context(|| format!("invalid modification date '{}'", date))?;
        place = place.with_modification_date(date);
    }

    Ok(place)
}

fn non_empty(field: &str) -> Option<String> {
    let field = field.trim();
    (!field.is_empty()).then(|| field.to_string())
}

fn optional<T: std::str::FromStr>(field: &str, name: &str) -> Result<Option<T>> {
    match non_empty(field) {
        Some(value) => value
            .parse()
            .map(Some)
            .map_err(|_| anyhow!("invalid {} '{}'", name, value)),
        None => Ok(None),
    }
}

/// Load boundary shapes: one `geoname_id<TAB>EWKT` pair per line.
pub fn load_shapes(path: &Path) -> Result<Vec<(u64, Geometry)>> {
    info!("Loading shapes from {}", path.display());
    read_shapes(open(path)?)
}

pub fn read_shapes<R: Read>(reader: R) -> Result<Vec<(u64, Geometry)>> {
    let mut shapes = Vec::new();

    for (index, result) in tsv_reader(reader).records().enumerate() {
        let record = result.context("Failed to read shape record")?;
        if record.len() != 2 {
            warn!("Skipping shape line {}: expected 2 columns", index + 1);
            continue;
        }
        let Ok(geoname_id) = record[0].trim().parse::<u64>() else {
            warn!("Skipping shape line {}: invalid id '{}'", index + 1, &record[0]);
            continue;
        };
        match Geometry::parse(&record[1]) {
            Ok(geometry) => shapes.push((geoname_id, geometry)),
            Err(e) => warn!("Skipping shape line {}: {}", index + 1, e),
        }
    }

    info!("Loaded {} shapes", shapes.len());
    Ok(shapes)
}
