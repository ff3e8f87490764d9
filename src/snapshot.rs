use crate::config::ColorConfig;
use crate::error::MapError;
use crate::store::SelectionStore;
use crate::types::BoundaryDataset;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const CONTENT_TYPE: &str = "text/html; charset=utf-8";

/// The JSON block embedded in the exported page. Re-parsing it must yield
/// exactly the datasets and selections that went in.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SnapshotData {
    pub datasets: BTreeMap<String, geojson::FeatureCollection>,
    /// Only regions with at least one selection.
    pub selections: BTreeMap<String, Vec<String>>,
    pub colors: ColorConfig,
}

/// Builds a standalone HTML page reproducing the live map: every cached
/// dataset embedded verbatim, the non-empty selections, and a Leaflet
/// routine with the same styling rules as the live renderer. Fails with
/// `NothingSelected` when no region has a selected city.
pub fn build_snapshot(
    datasets: &HashMap<String, BoundaryDataset>,
    store: &SelectionStore,
    colors: &ColorConfig,
) -> Result<Vec<u8>, MapError> {
    let selections = store.non_empty_regions();
    if selections.is_empty() {
        return Err(MapError::NothingSelected);
    }

    let data = SnapshotData {
        datasets: datasets
            .iter()
            .map(|(region, dataset)| (region.clone(), dataset.collection.clone()))
            .collect(),
        selections,
        colors: colors.clone(),
    };

    let json = serde_json::to_string(&data).map_err(|e| MapError::fetch("snapshot", e))?;
    // A literal "</script" inside a city name would end the data block early.
    let json = json.replace('<', "\\u003c");

    Ok(TEMPLATE.replace("__MAP_DATA__", &json).into_bytes())
}

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Mapa Selecionado</title>
    <link rel="stylesheet" href="https://unpkg.com/leaflet/dist/leaflet.css" />
    <style>
        body { margin: 0; font-family: 'Roboto', sans-serif; }
        #map { width: 100%; height: 100vh; }
    </style>
</head>
<body>
    <div id="map"></div>

    <script src="https://unpkg.com/leaflet/dist/leaflet.js"></script>
    <script id="map-data" type="application/json">__MAP_DATA__</script>

    <script>
        const data = JSON.parse(document.getElementById('map-data').textContent);

        const map = L.map('map').setView([-15.793889, -47.882778], 5);
        L.tileLayer('https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png', {
            maxZoom: 19,
            attribution: '© OpenStreetMap'
        }).addTo(map);

        const drawn = [];
        for (const region in data.datasets) {
            const selected = data.selections[region] || [];
            const layer = L.geoJSON(data.datasets[region], {
                style: feature => {
                    let fillColor = data.colors.unselected;
                    if (selected.includes(feature.properties.name)) {
                        fillColor = data.colors.overrides[region] || data.colors.highlight;
                    }
                    return {
                        color: 'black',
                        weight: 1,
                        dashArray: '5, 5',
                        fillOpacity: 0.6,
                        fillColor: fillColor
                    };
                },
                onEachFeature: (feature, layer) => {
                    layer.bindTooltip(`Cidade: ${feature.properties.name}`);
                }
            }).addTo(map);
            drawn.push(layer);
        }

        if (drawn.length > 0) {
            map.fitBounds(L.featureGroup(drawn).getBounds());
        }
    </script>
</body>
</html>
"#;
