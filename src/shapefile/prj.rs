//! ".prj" files: Well-Known Text describing the coordinate system.
//!
//! We never reproject. We read the text as-is, and we only ever write WGS84.

/// What we write to every ".prj" file.
pub const WGS84_WKT: &str = "GEOGCS[\"GCS_WGS_1984\",DATUM[\"D_WGS_1984\",SPHEROID[\"WGS_1984\",6378137.0,298.257223563]],PRIMEM[\"Greenwich\",0.0],UNIT[\"Degree\",0.0174532925199433]]";

const WGS84_MARKERS: [&str; 5] = [ "WGS_1984", "WGS 84", "WGS84", "EPSG:4326", "4326" ];

/// Guesses whether `wkt` describes WGS84 longitude/latitude.
///
/// This is a substring search, not a parse: "WGS_1984_UTM_Zone_33N" looks
/// like WGS84 too.
pub fn looks_like_wgs84(wkt: &str) -> bool {
    WGS84_MARKERS.iter().any(|marker| wkt.contains(marker))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn canonical_wkt_is_wgs84() {
        assert!(looks_like_wgs84(WGS84_WKT));
    }

    #[test]
    fn markers() {
        assert!(looks_like_wgs84("GEOGCS[\"WGS 84\",DATUM[\"WGS_1984\"]]"));
        assert!(looks_like_wgs84("EPSG:4326"));
        assert!(looks_like_wgs84("AUTHORITY[\"EPSG\",\"4326\"]"));
        assert!(!looks_like_wgs84("PROJCS[\"NAD_1983_StatePlane_New_York_Long_Island_FIPS_3104_Feet\"]"));
        assert!(!looks_like_wgs84(""));
    }
}
