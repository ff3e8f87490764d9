use crate::types::BoundaryDataset;
use anyhow::{anyhow, Context, Result};
use geojson::GeoJson;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads and parses one region's boundary file. The raw feature collection is
/// kept as-is; only the display names are extracted up front.
pub fn load_dataset(path: &Path) -> Result<BoundaryDataset> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open GeoJSON file: {:?}", path))?;
    let reader = BufReader::new(file);

    // warning: this loads the whole file into memory.
    let geojson = GeoJson::from_reader(reader).context("Failed to parse GeoJSON")?;

    let collection = match geojson {
        GeoJson::FeatureCollection(fc) => fc,
        _ => return Err(anyhow!("GeoJSON must be a FeatureCollection")),
    };

    let names = collection
        .features
        .iter()
        .filter_map(|feature| {
            let name = feature
                .properties
                .as_ref()
                .and_then(|props| props.get("name"));
            match name {
                Some(serde_json::Value::String(s)) => Some(s.clone()),
                Some(serde_json::Value::Number(n)) => Some(n.to_string()),
                // Unnamed features stay in the collection but get no
                // checklist row.
                _ => None,
            }
        })
        .collect();

    Ok(BoundaryDataset { collection, names })
}

#[cfg(test)]
pub(crate) fn dataset_from_str(raw: &str) -> BoundaryDataset {
    let collection = match raw.parse::<GeoJson>().unwrap() {
        GeoJson::FeatureCollection(fc) => fc,
        _ => panic!("expected a FeatureCollection"),
    };
    let names = collection
        .features
        .iter()
        .filter_map(|f| {
            f.properties
                .as_ref()
                .and_then(|p| p.get("name"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        })
        .collect();
    BoundaryDataset { collection, names }
}
