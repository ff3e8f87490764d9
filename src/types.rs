use geojson::FeatureCollection;

/// One state's boundary file, parsed once and kept verbatim so exports can
/// embed exactly what was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryDataset {
    pub collection: FeatureCollection,
    /// Municipality display names in original feature order.
    pub names: Vec<String>,
}
