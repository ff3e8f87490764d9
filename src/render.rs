use crate::config::ColorConfig;
use crate::store::SelectionStore;
use crate::types::BoundaryDataset;
use geo::BoundingRect;
use geojson::FeatureCollection;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const STROKE_COLOR: &str = "black";
pub const STROKE_WEIGHT: u32 = 1;
pub const STROKE_DASH: &str = "5, 5";
pub const FILL_OPACITY: f64 = 0.6;

/// Leaflet-compatible `[[south, west], [north, east]]` extent.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct Bounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct Stroke {
    pub color: &'static str,
    pub weight: u32,
    pub dash_array: &'static str,
    pub fill_opacity: f64,
}

/// One drawn region: the boundaries verbatim plus the fill color resolved
/// per municipality.
#[derive(Debug, Serialize, PartialEq)]
pub struct RegionLayer {
    pub region: String,
    pub boundaries: FeatureCollection,
    pub fills: BTreeMap<String, String>,
}

/// Everything the drawing surface needs: layers to draw (replacing whatever
/// was drawn before), the shared stroke style, the tooltip prefix, and the
/// extent to fit the viewport to. `bounds` is `None` when nothing was drawn,
/// in which case the viewport is left unchanged.
#[derive(Debug, Serialize)]
pub struct RenderPlan {
    pub layers: Vec<RegionLayer>,
    pub stroke: Stroke,
    pub tooltip_prefix: &'static str,
    pub bounds: Option<Bounds>,
}

impl RenderPlan {
    pub fn build(
        datasets: &HashMap<String, BoundaryDataset>,
        store: &SelectionStore,
        colors: &ColorConfig,
    ) -> RenderPlan {
        let mut regions: Vec<&String> = datasets.keys().collect();
        regions.sort();

        let mut layers = Vec::with_capacity(regions.len());
        let mut bounds: Option<Bounds> = None;

        for region in regions {
            let dataset = &datasets[region];
            let fills = dataset
                .names
                .iter()
                .map(|name| {
                    let selected = store.is_selected(region, name);
                    (name.clone(), colors.fill_for(region, selected).to_string())
                })
                .collect();

            if let Some(extent) = collection_extent(&dataset.collection) {
                bounds = Some(match bounds {
                    None => extent,
                    Some(acc) => union(acc, extent),
                });
            }

            layers.push(RegionLayer {
                region: region.clone(),
                boundaries: dataset.collection.clone(),
                fills,
            });
        }

        RenderPlan {
            layers,
            stroke: Stroke {
                color: STROKE_COLOR,
                weight: STROKE_WEIGHT,
                dash_array: STROKE_DASH,
                fill_opacity: FILL_OPACITY,
            },
            tooltip_prefix: "Cidade: ",
            bounds,
        }
    }
}

fn union(a: Bounds, b: Bounds) -> Bounds {
    Bounds {
        south: a.south.min(b.south),
        west: a.west.min(b.west),
        north: a.north.max(b.north),
        east: a.east.max(b.east),
    }
}

/// Bounding extent of every feature geometry in the collection.
fn collection_extent(collection: &FeatureCollection) -> Option<Bounds> {
    let mut extent: Option<Bounds> = None;
    for feature in &collection.features {
        let Some(geometry) = &feature.geometry else {
            continue;
        };
        let converted: Result<geo::Geometry<f64>, _> = geometry.value.clone().try_into();
        let Ok(geom) = converted else {
            continue;
        };
        let Some(rect) = geom.bounding_rect() else {
            continue;
        };
        let feature_bounds = Bounds {
            south: rect.min().y,
            west: rect.min().x,
            north: rect.max().y,
            east: rect.max().x,
        };
        extent = Some(match extent {
            None => feature_bounds,
            Some(acc) => union(acc, feature_bounds),
        });
    }
    extent
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::dataset_from_str;

    fn one_city(name: &str, x: f64, y: f64) -> BoundaryDataset {
        let raw = format!(
            r#"{{
                "type": "FeatureCollection",
                "features": [
                    {{"type": "Feature", "properties": {{"name": "{name}"}},
                      "geometry": {{"type": "Polygon", "coordinates": [[
                        [{x}, {y}], [{x2}, {y}], [{x2}, {y2}], [{x}, {y}]
                      ]]}}}}
                ]
            }}"#,
            x2 = x + 0.5,
            y2 = y + 0.5,
        );
        dataset_from_str(&raw)
    }

    fn plan_for(selected: &[(&str, &str)], datasets: Vec<(&str, BoundaryDataset)>) -> RenderPlan {
        let datasets: HashMap<String, BoundaryDataset> = datasets
            .into_iter()
            .map(|(r, d)| (r.to_string(), d))
            .collect();
        let mut store = SelectionStore::default();
        for (region, name) in selected {
            store.toggle(region, name, true);
        }
        RenderPlan::build(&datasets, &store, &ColorConfig::default())
    }

    #[test]
    fn fill_colors_follow_the_override_table() {
        let plan = plan_for(
            &[("para", "Belém"), ("tocantins", "Palmas"), ("bahia", "Salvador")],
            vec![
                ("para", one_city("Belém", -48.6, -1.5)),
                ("tocantins", one_city("Palmas", -48.4, -10.3)),
                ("bahia", one_city("Salvador", -38.6, -13.0)),
                ("ceara", one_city("Fortaleza", -38.6, -3.8)),
            ],
        );
        let fill = |region: &str, name: &str| {
            plan.layers
                .iter()
                .find(|l| l.region == region)
                .unwrap()
                .fills[name]
                .clone()
        };
        assert_eq!(fill("para", "Belém"), "#ff0000");
        assert_eq!(fill("tocantins", "Palmas"), "#ffff00");
        assert_eq!(fill("bahia", "Salvador"), "#00ff00");
        assert_eq!(fill("ceara", "Fortaleza"), "#ccccff");
    }

    #[test]
    fn bounds_cover_every_drawn_region() {
        let plan = plan_for(
            &[],
            vec![
                ("para", one_city("Belém", -48.6, -1.5)),
                ("bahia", one_city("Salvador", -38.6, -13.0)),
            ],
        );
        let bounds = plan.bounds.unwrap();
        assert_eq!(bounds.west, -48.6);
        assert_eq!(bounds.east, -38.1);
        assert_eq!(bounds.south, -13.0);
        assert_eq!(bounds.north, -1.0);
    }

    #[test]
    fn empty_datasets_leave_the_viewport_alone() {
        let plan = plan_for(&[], vec![]);
        assert!(plan.layers.is_empty());
        assert!(plan.bounds.is_none());
    }

    #[test]
    fn layers_are_ordered_by_region_code() {
        let plan = plan_for(
            &[],
            vec![
                ("tocantins", one_city("Palmas", -48.4, -10.3)),
                ("para", one_city("Belém", -48.6, -1.5)),
            ],
        );
        let order: Vec<&str> = plan.layers.iter().map(|l| l.region.as_str()).collect();
        assert_eq!(order, vec!["para", "tocantins"]);
    }
}
