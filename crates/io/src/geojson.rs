// GeoJSON feature source and per-code Feature export.

use std::path::Path;

use idnb_core::{Level, RawAttrs};
use serde_json::{Map, Value};

use crate::error::IoError;

/// One raw feature from the source dataset: stable id, free-text attribute
/// map, and an opaque geometry blob carried through untouched.
#[derive(Debug, Clone)]
pub struct RawFeature {
    pub fid: String,
    pub properties: Map<String, Value>,
    pub geometry: Value,
}

impl RawFeature {
    /// Extract the raw attribute strings relevant to `level`: the level's
    /// own code/name plus the raw names and codes of every ancestor level.
    pub fn attrs(&self, level: Level) -> RawAttrs {
        let mut attrs = RawAttrs::default();
        let mut fill = |lvl: Level| {
            let (code_key, name_key) = lvl.raw_keys();
            let code = property_string(&self.properties, code_key);
            let name = property_string(&self.properties, name_key);
            match lvl {
                Level::Province => {
                    attrs.province_code = code;
                    attrs.province_name = name;
                }
                Level::Regency => {
                    attrs.regency_code = code;
                    attrs.regency_name = name;
                }
                Level::District => {
                    attrs.district_code = code;
                    attrs.district_name = name;
                }
                Level::Village => {
                    attrs.village_code = code;
                    attrs.village_name = name;
                }
            }
        };
        for ancestor in level.ancestors() {
            fill(*ancestor);
        }
        fill(level);
        attrs
    }
}

/// Attribute values come out of shapefiles as strings or numbers; normalize
/// to trimmed non-empty strings.
fn property_string(props: &Map<String, Value>, key: &str) -> Option<String> {
    match props.get(key) {
        Some(Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// An ordered, finite, restartable sequence of raw features for one level.
///
/// The engine never depends on a concrete parser; shapefile-derived inputs
/// just need to present themselves through this trait.
pub trait FeatureSource {
    fn next_feature(&mut self) -> Result<Option<RawFeature>, IoError>;
}

/// FeatureSource over a GeoJSON FeatureCollection file.
pub struct GeoJsonSource {
    features: std::vec::IntoIter<Value>,
    index: usize,
}

impl GeoJsonSource {
    pub fn open(path: &Path) -> Result<Self, IoError> {
        let data = std::fs::read_to_string(path)
            .map_err(|e| IoError::Io(format!("cannot read {}: {e}", path.display())))?;
        Self::from_str(&data)
    }

    pub fn from_str(data: &str) -> Result<Self, IoError> {
        let doc: Value =
            serde_json::from_str(data).map_err(|e| IoError::Json(e.to_string()))?;
        let features = match doc.get("features") {
            Some(Value::Array(features)) => features.clone(),
            _ => return Err(IoError::Json("not a FeatureCollection".into())),
        };
        Ok(Self { features: features.into_iter(), index: 0 })
    }
}

impl FeatureSource for GeoJsonSource {
    fn next_feature(&mut self) -> Result<Option<RawFeature>, IoError> {
        let Some(feature) = self.features.next() else {
            return Ok(None);
        };
        let index = self.index;
        self.index += 1;

        let properties = match feature.get("properties") {
            Some(Value::Object(map)) => map.clone(),
            _ => Map::new(),
        };
        let fid = property_string(&properties, "FID").ok_or(IoError::MissingField {
            index,
            field: "FID".into(),
        })?;
        let geometry = feature.get("geometry").cloned().unwrap_or(Value::Null);

        Ok(Some(RawFeature { fid, properties, geometry }))
    }
}

/// Write one exported boundary: a GeoJSON Feature named by canonical code,
/// properties restricted to the canonical identity.
pub fn write_feature(
    dir: &Path,
    code: &str,
    name: &str,
    geometry: &str,
) -> Result<std::path::PathBuf, IoError> {
    let geometry: Value =
        serde_json::from_str(geometry).map_err(|e| IoError::Json(e.to_string()))?;
    let feature = serde_json::json!({
        "type": "Feature",
        "properties": { "code": code, "name": name },
        "geometry": geometry,
    });

    std::fs::create_dir_all(dir)
        .map_err(|e| IoError::Io(format!("cannot create {}: {e}", dir.display())))?;
    let path = dir.join(format!("{code}.geojson"));
    std::fs::write(&path, feature.to_string())
        .map_err(|e| IoError::Io(format!("cannot write {}: {e}", path.display())))?;
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLLECTION: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "properties": {
                    "FID": 7,
                    "KODE_KK": "31.75",
                    "KAB_KOTA": "JAKARTA TIMUR",
                    "PROVINSI": "DKI JAKARTA",
                    "KODE_PROV": "31"
                },
                "geometry": {"type": "Polygon", "coordinates": []}
            }
        ]
    }"#;

    #[test]
    fn reads_features_and_normalizes_fid() {
        let mut source = GeoJsonSource::from_str(COLLECTION).unwrap();
        let feature = source.next_feature().unwrap().unwrap();
        assert_eq!(feature.fid, "7");
        assert_eq!(feature.geometry["type"], "Polygon");
        assert!(source.next_feature().unwrap().is_none());
    }

    #[test]
    fn attrs_cover_level_and_ancestors() {
        let mut source = GeoJsonSource::from_str(COLLECTION).unwrap();
        let feature = source.next_feature().unwrap().unwrap();
        let attrs = feature.attrs(Level::Regency);
        assert_eq!(attrs.regency_code.as_deref(), Some("31.75"));
        assert_eq!(attrs.regency_name.as_deref(), Some("JAKARTA TIMUR"));
        assert_eq!(attrs.province_name.as_deref(), Some("DKI JAKARTA"));
        assert_eq!(attrs.village_name, None);
    }

    #[test]
    fn missing_fid_is_an_error() {
        let doc = r#"{"type":"FeatureCollection","features":[{"properties":{}}]}"#;
        let mut source = GeoJsonSource::from_str(doc).unwrap();
        let err = source.next_feature().unwrap_err();
        assert!(err.to_string().contains("FID"));
    }

    #[test]
    fn non_collection_is_rejected() {
        assert!(GeoJsonSource::from_str(r#"{"type":"Feature"}"#).is_err());
    }

    #[test]
    fn write_feature_names_file_by_code() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_feature(
            dir.path(),
            "31.75",
            "Kota Jakarta Timur",
            r#"{"type":"Polygon","coordinates":[]}"#,
        )
        .unwrap();
        assert!(path.ends_with("31.75.geojson"));

        let written: Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(written["type"], "Feature");
        assert_eq!(written["properties"]["code"], "31.75");
        assert_eq!(written["geometry"]["type"], "Polygon");
    }
}
