use axum::Json;
use serde::Serialize;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize)]
pub struct Concept {
    pub description: &'static str,
    pub risks: &'static str,
    pub mitigation: &'static str,
    pub calculation: &'static str,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InfoResponse {
    #[schema(value_type = Object)]
    pub concepts: BTreeMap<&'static str, Concept>,
    #[schema(value_type = Object)]
    pub tools_used: BTreeMap<&'static str, &'static str>,
}

fn catalogue() -> InfoResponse {
    let concepts = BTreeMap::from([
        (
            "exif_metadata",
            Concept {
                description: "Exchangeable Image File Format data embedded in photos",
                risks: "Can reveal camera settings, timestamps, GPS location, and device information",
                mitigation: "Remove EXIF data before sharing images publicly",
                calculation: "Detected if sensitive EXIF tags are present",
            },
        ),
        (
            "gps_location",
            Concept {
                description: "Geographic coordinates embedded in image metadata",
                risks: "Reveals exact location where photo was taken",
                mitigation: "Disable GPS on camera or remove location data before sharing",
                calculation: "High privacy risk if GPS coordinates found",
            },
        ),
        (
            "steganography",
            Concept {
                description: "Hidden data concealed within image files",
                risks: "May contain secret messages or malicious payloads",
                mitigation: "Use steganography detection tools and analyze file integrity",
                calculation: "Statistical analysis of file size ratios and bit patterns",
            },
        ),
        (
            "qr_codes",
            Concept {
                description: "Quick Response codes that can contain URLs or data",
                risks: "May link to malicious websites or contain suspicious data",
                mitigation: "Scan QR codes with caution and verify destinations",
                calculation: "Grid detection and decoding over the image luma",
            },
        ),
        (
            "script_injection",
            Concept {
                description: "Embedded scripts or executable code within files",
                risks: "Could execute malicious code when file is processed",
                mitigation: "Scan files for script patterns and validate file integrity",
                calculation: "Pattern matching for suspicious code signatures",
            },
        ),
    ]);

    let tools_used = BTreeMap::from([
        ("image", "Pixel decoding and re-encoding"),
        ("kamadak-exif", "EXIF metadata extraction"),
        ("img-parts", "Container-level metadata removal"),
        ("rqrr", "QR code detection"),
        ("reqwest", "Reverse geocoding for GPS coordinates"),
        ("sha2, sha1, md-5", "File fingerprints"),
        ("axum", "HTTP interface"),
    ]);

    InfoResponse {
        concepts,
        tools_used,
    }
}

#[utoipa::path(
    get,
    path = "/api/info",
    tag = "info",
    responses(
        (status = 200, description = "Catalogue of the privacy risks MetaScan checks for", body = InfoResponse)
    )
)]
pub async fn api_info() -> Json<InfoResponse> {
    Json(catalogue())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalogue_covers_every_detector_concept() {
        let info = catalogue();
        for key in [
            "exif_metadata",
            "gps_location",
            "steganography",
            "qr_codes",
            "script_injection",
        ] {
            assert!(info.concepts.contains_key(key), "missing {}", key);
        }
    }
}
