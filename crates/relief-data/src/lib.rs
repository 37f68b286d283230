pub mod census;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod loader;
pub mod projection;
pub mod table;
pub mod topology;

pub use census::{CensusDataset, RegionRecord};
pub use error::DataError;
pub use geometry::{Contour, GeometryAdapter, RegionContour};
pub use ids::{IdTable, RegionCode};
pub use loader::{load_all, load_then, FetchDescriptor, Fetcher, LoadedResources, ResourceKind};

use relief_core::MapConfig;

/// Resource keys used by the standard three-input load.
pub const TOPOLOGY_KEY: &str = "topology";
pub const IDS_KEY: &str = "ids";
pub const CENSUS_KEY: &str = "census";

/// The three fetches every viewer session starts with.
pub fn standard_sources(config: &MapConfig) -> Vec<FetchDescriptor> {
    vec![
        FetchDescriptor::new(TOPOLOGY_KEY, ResourceKind::Json, &config.sources.topology),
        FetchDescriptor::new(IDS_KEY, ResourceKind::Json, &config.sources.ids),
        FetchDescriptor::new(CENSUS_KEY, ResourceKind::Csv, &config.sources.census),
    ]
}

/// Turn the loaded resources into the validated dataset: resolve ids,
/// decode and project the boundaries, then build the census model.
pub fn assemble_dataset(
    mut resources: LoadedResources,
    config: &MapConfig,
) -> Result<CensusDataset, DataError> {
    let ids = IdTable::from_json(resources.take_json(IDS_KEY)?)?;
    let topology = topology::Topology::from_json(resources.take_json(TOPOLOGY_KEY)?)?;
    let table = resources.take_table(CENSUS_KEY)?;

    let features = topology.features(&config.sources.topology_object)?;
    let adapter = GeometryAdapter::new(&ids, &config.projection, &config.hole_corrections);
    let contours = adapter.adapt_all(&features)?;

    let dataset = census::build_dataset(&table, &ids, contours)?;
    log::info!(
        "Dataset ready: {} regions, years {:?}, max population {}",
        dataset.len(),
        dataset.years(),
        dataset.max_population()
    );
    Ok(dataset)
}
