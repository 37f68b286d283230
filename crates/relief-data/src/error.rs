use crate::census::CensusError;
use crate::geometry::GeometryError;
use crate::loader::LoadError;
use crate::topology::TopologyError;

/// Any failure between issuing the fetches and holding a validated dataset.
/// All of them are fatal to the load attempt.
#[derive(Debug, thiserror::Error)]
pub enum DataError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error("invalid id mapping: {0}")]
    IdMapping(#[from] serde_json::Error),

    #[error(transparent)]
    Topology(#[from] TopologyError),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Census(#[from] CensusError),
}
