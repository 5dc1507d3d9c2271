use anyhow::{anyhow, bail, Context, Result};
use geo::{Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon, Point, Polygon};
use serde_json::Value;
use tracing::warn;

use crate::config::DatasetOptions;
use crate::registry::CatchmentFeature;

/// Read catchment features from GeoJSON FeatureCollection bytes.
/// Features without a name are skipped; malformed coordinates fail the whole read.
pub(crate) fn read_catchments(bytes: &[u8], options: &DatasetOptions) -> Result<Vec<CatchmentFeature>> {
    let value: Value = serde_json::from_slice(bytes).context("Failed to parse catchment GeoJSON")?;
    let features = value["features"].as_array()
        .ok_or_else(|| anyhow!("Catchment GeoJSON has no \"features\" array"))?;

    let mut catchments = Vec::with_capacity(features.len());
    for (idx, feature) in features.iter().enumerate() {
        let properties = &feature["properties"];
        let Some(name) = properties[options.name_property.as_str()].as_str() else {
            warn!(idx, property = %options.name_property, "skipping catchment without a name");
            continue;
        };

        let geometry = parse_geometry(&feature["geometry"])
            .with_context(|| format!("Invalid geometry for catchment {name:?}"))?;

        // An empty suburb property counts as missing.
        let suburb = properties[options.suburb_property.as_str()].as_str()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        catchments.push(CatchmentFeature::new(name, geometry, suburb));
    }
    Ok(catchments)
}

/// Parse a GeoJSON geometry object into a geo::Geometry.
pub(crate) fn parse_geometry(value: &Value) -> Result<Geometry<f64>> {
    let kind = value["type"].as_str()
        .ok_or_else(|| anyhow!("Geometry is missing \"type\""))?;
    let coords = &value["coordinates"];

    Ok(match kind {
        "Point" => Geometry::Point(Point(parse_coord(coords)?)),
        "MultiPoint" => Geometry::MultiPoint(MultiPoint(
            parse_coords(coords)?.into_iter().map(Point).collect()
        )),
        "LineString" => Geometry::LineString(parse_line_string(coords)?),
        "MultiLineString" => Geometry::MultiLineString(MultiLineString(
            as_array(coords)?.iter().map(parse_line_string).collect::<Result<_>>()?
        )),
        "Polygon" => Geometry::Polygon(parse_polygon(coords)?),
        "MultiPolygon" => Geometry::MultiPolygon(MultiPolygon(
            as_array(coords)?.iter().map(parse_polygon).collect::<Result<_>>()?
        )),
        "GeometryCollection" => Geometry::GeometryCollection(GeometryCollection(
            as_array(&value["geometries"])?.iter().map(parse_geometry).collect::<Result<_>>()?
        )),
        other => bail!("Unknown geometry type {other:?}"),
    })
}

/// Parse LineString coordinates: [[x, y], [x, y], ...]
pub(crate) fn parse_line_string(coords: &Value) -> Result<LineString<f64>> {
    Ok(LineString(parse_coords(coords)?))
}

/// Parse Polygon coordinates: [exterior, hole, hole, ...]
/// Rings are closed by geo::Polygon::new.
fn parse_polygon(coords: &Value) -> Result<Polygon<f64>> {
    let mut rings = as_array(coords)?.iter().map(parse_line_string);
    let exterior = rings.next()
        .ok_or_else(|| anyhow!("Invalid Polygon: missing exterior ring"))??;
    let interiors = rings.collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(exterior, interiors))
}

fn parse_coords(coords: &Value) -> Result<Vec<Coord<f64>>> {
    as_array(coords)?.iter().map(parse_coord).collect()
}

/// Parse a single position: [x, y] (extra ordinates such as elevation are ignored).
pub(crate) fn parse_coord(value: &Value) -> Result<Coord<f64>> {
    let pair = as_array(value)?;
    if pair.len() < 2 { bail!("Invalid position: expected at least two ordinates") }
    let x = pair[0].as_f64()
        .ok_or_else(|| anyhow!("Invalid coordinate: x must be a number"))?;
    let y = pair[1].as_f64()
        .ok_or_else(|| anyhow!("Invalid coordinate: y must be a number"))?;
    Ok(Coord { x, y })
}

fn as_array(value: &Value) -> Result<&Vec<Value>> {
    value.as_array().ok_or_else(|| anyhow!("Expected a coordinate array, found {value}"))
}

#[cfg(test)]
mod tests {
    use geo::{Geometry, Point};
    use serde_json::json;

    use super::{parse_geometry, read_catchments};
    use crate::config::DatasetOptions;

    #[test]
    fn reads_names_suburbs_and_geometry() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": { "USE_DESC": "Lindfield PS" },
                    "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]] }
                },
                {
                    "type": "Feature",
                    "properties": { "USE_DESC": "Roseville PS", "suburb": "  " },
                    "geometry": { "type": "MultiPolygon", "coordinates": [[[[2, 2], [3, 2], [3, 3], [2, 2]]]] }
                },
                {
                    "type": "Feature",
                    "properties": { "USE_DESC": "Killara PS", "suburb": "Killara Heights" },
                    "geometry": { "type": "Point", "coordinates": [151.16, -33.77] }
                }
            ]
        });
        let features = read_catchments(doc.to_string().as_bytes(), &DatasetOptions::default()).unwrap();
        assert_eq!(features.len(), 3);
        assert_eq!(features[0].name(), "Lindfield PS");
        assert_eq!(features[0].id(), "lindfield_ps");
        assert!(matches!(features[0].geometry(), Geometry::Polygon(_)));
        assert_eq!(features[1].suburb(), None);
        assert!(matches!(features[1].geometry(), Geometry::MultiPolygon(_)));
        assert_eq!(features[2].suburb(), Some("Killara Heights"));
        assert_eq!(features[2].geometry(), &Geometry::Point(Point::new(151.16, -33.77)));
    }

    #[test]
    fn unnamed_features_are_skipped() {
        let doc = json!({
            "features": [
                { "properties": { "other": 1 }, "geometry": { "type": "Point", "coordinates": [0, 0] } },
                { "properties": null, "geometry": { "type": "Point", "coordinates": [0, 0] } }
            ]
        });
        let features = read_catchments(doc.to_string().as_bytes(), &DatasetOptions::default()).unwrap();
        assert!(features.is_empty());
    }

    #[test]
    fn custom_property_names() {
        let options = DatasetOptions {
            name_property: "school".to_string(),
            suburb_property: "locality".to_string(),
            ..DatasetOptions::default()
        };
        let doc = json!({
            "features": [{
                "properties": { "school": "Gordon West PS", "locality": "Pymble" },
                "geometry": { "type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]] }
            }]
        });
        let features = read_catchments(doc.to_string().as_bytes(), &options).unwrap();
        assert_eq!(features[0].name(), "Gordon West PS");
        assert_eq!(features[0].suburb(), Some("Pymble"));
    }

    #[test]
    fn missing_features_array_is_an_error() {
        assert!(read_catchments(br#"{ "type": "FeatureCollection" }"#, &DatasetOptions::default()).is_err());
        assert!(read_catchments(b"not json", &DatasetOptions::default()).is_err());
    }

    #[test]
    fn bad_coordinates_are_an_error() {
        assert!(parse_geometry(&json!({ "type": "Polygon", "coordinates": [[[0, "x"]]] })).is_err());
        assert!(parse_geometry(&json!({ "type": "Polygon", "coordinates": [] })).is_err());
        assert!(parse_geometry(&json!({ "type": "Curve", "coordinates": [] })).is_err());
    }
}
