//! GPS tag group to signed decimal degrees

use std::collections::BTreeMap;

use metascan_core::{GpsCoordinates, MetadataField, Rational, Section, TagValue};

use crate::error::DetectorError;

pub const GPS_GROUP_KEY: &str = "GPSInfo";

const DECIMAL_PLACES: i32 = 6;

#[derive(Clone, Copy)]
enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn value_tag(&self) -> &'static str {
        match self {
            Axis::Latitude => "GPSLatitude",
            Axis::Longitude => "GPSLongitude",
        }
    }

    fn ref_tag(&self) -> &'static str {
        match self {
            Axis::Latitude => "GPSLatitudeRef",
            Axis::Longitude => "GPSLongitudeRef",
        }
    }

    /// Returns the sign for a hemisphere reference, or `None` if it is not valid for this axis.
    fn sign(&self, hemisphere: &str) -> Option<f64> {
        match (self, hemisphere) {
            (Axis::Latitude, "N") | (Axis::Longitude, "E") => Some(1.0),
            (Axis::Latitude, "S") | (Axis::Longitude, "W") => Some(-1.0),
            _ => None,
        }
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// `degrees + minutes/60 + seconds/3600` from a DMS rational triple.
pub fn dms_to_decimal(dms: &[Rational]) -> Result<f64, DetectorError> {
    let [degrees, minutes, seconds] = dms else {
        return Err(DetectorError::Gps(format!(
            "expected 3 rational components, found {}",
            dms.len()
        )));
    };

    let component = |r: &Rational, name: &str| {
        r.to_f64()
            .ok_or_else(|| DetectorError::Gps(format!("zero denominator in {}", name)))
    };

    Ok(component(degrees, "degrees")?
        + component(minutes, "minutes")? / 60.0
        + component(seconds, "seconds")? / 3600.0)
}

fn resolve_axis(group: &BTreeMap<String, TagValue>, axis: Axis) -> Result<f64, DetectorError> {
    let dms = match group.get(axis.value_tag()) {
        Some(TagValue::Rationals(values)) => values,
        Some(_) => {
            return Err(DetectorError::Gps(format!(
                "{} is not a rational triple",
                axis.value_tag()
            )))
        }
        None => {
            return Err(DetectorError::Gps(format!("{} missing", axis.value_tag())));
        }
    };

    let decimal = dms_to_decimal(dms)
        .map_err(|e| DetectorError::Gps(format!("{}: {}", axis.value_tag(), e)))?;

    // A missing hemisphere reference is read as north/east.
    let sign = match group.get(axis.ref_tag()) {
        None => 1.0,
        Some(TagValue::Text(hemisphere)) => {
            let hemisphere = hemisphere.trim().to_uppercase();
            axis.sign(&hemisphere).ok_or_else(|| {
                DetectorError::Gps(format!(
                    "{} has invalid hemisphere {:?}",
                    axis.ref_tag(),
                    hemisphere
                ))
            })?
        }
        Some(_) => {
            return Err(DetectorError::Gps(format!(
                "{} is not text",
                axis.ref_tag()
            )))
        }
    };

    Ok(round_to(sign * decimal, DECIMAL_PLACES))
}

/// Resolve the GPS group of a metadata map.
///
/// `None` when the image carries no usable coordinates. A group that has the
/// wrong shape, or unreadable coordinates, resolves to a failed section.
pub fn resolve_gps(field: &MetadataField) -> Option<Section<GpsCoordinates>> {
    let group = match field {
        MetadataField::Missing => return None,
        MetadataField::Scalar(_) => {
            return Some(Section::failed(
                DetectorError::Gps(format!(
                    "{} is a scalar value, expected a tag group",
                    GPS_GROUP_KEY
                ))
                .to_string(),
            ))
        }
        MetadataField::Group(group) => group,
    };

    if !group.contains_key(Axis::Latitude.value_tag())
        && !group.contains_key(Axis::Longitude.value_tag())
    {
        return None;
    }

    let coordinates = resolve_axis(group, Axis::Latitude).and_then(|latitude| {
        resolve_axis(group, Axis::Longitude).map(|longitude| GpsCoordinates {
            latitude,
            longitude,
            location: None,
        })
    });

    Some(coordinates.into())
}
