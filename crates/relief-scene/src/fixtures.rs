//! Small datasets shared by the scene tests.

use geo::{polygon, MultiPolygon};
use relief_core::config::PlacementParams;
use relief_core::MapConfig;
use relief_data::census::build_dataset;
use relief_data::table::read_census_table;
use relief_data::{CensusDataset, Contour, IdTable, RegionContour};

pub const CSV: &str = "name,2002,2011\nBucuresti,1926334,1883425\nCluj,702755,691106\n";

fn square(ids: &IdTable, code: &str, name: &str, x0: f64, y0: f64, size: f64) -> RegionContour {
    RegionContour {
        region: ids.validate(code).cloned().expect("known code"),
        name: Some(name.to_string()),
        contour: Contour::new(MultiPolygon::new(vec![polygon![
            (x: x0, y: y0),
            (x: x0 + size, y: y0),
            (x: x0 + size, y: y0 + size),
            (x: x0, y: y0 + size),
        ]])),
    }
}

pub fn ids() -> IdTable {
    IdTable::from_pairs([("Bucuresti", "B"), ("Cluj", "CJ")])
}

/// "B" (Bucharest) is a 20×20 square centered on the origin, "CJ" lies to its right.
pub fn dataset() -> CensusDataset {
    let ids = ids();
    let df = read_census_table(CSV.as_bytes()).expect("csv");
    let contours = vec![
        square(&ids, "B", "Bucharest", -10.0, -10.0, 20.0),
        square(&ids, "CJ", "Cluj", 30.0, -10.0, 20.0),
    ];
    build_dataset(&df, &ids, contours).expect("dataset")
}

/// Config whose placement leaves map coordinates untouched apart from the
/// half-height offset.
pub fn flat_config() -> MapConfig {
    MapConfig {
        placement: PlacementParams {
            rotate_x: 0.0,
            rotate_z: 0.0,
            translate_x: 0.0,
            translate_y: 0.0,
        },
        ..MapConfig::default()
    }
}
