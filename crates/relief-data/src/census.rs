//! The census model: region → year → population, joined with geometry.

use std::collections::BTreeMap;

use polars::prelude::{DataFrame, PolarsError};
use relief_core::constants::CENSUS_NAME_COLUMN;
use relief_core::{Population, VisualEncoder, VisualParams, Year};
use thiserror::Error;

use crate::geometry::{Contour, RegionContour};
use crate::ids::{IdTable, RegionCode};
use crate::table;

#[derive(Debug, Error)]
pub enum CensusError {
    #[error("census table has no 'name' column")]
    MissingNameColumn,
    #[error("census table has no rows")]
    EmptyTable,
    #[error("census column '{0}' is not a year")]
    InvalidYear(String),
    #[error("census year {0} has more than one column")]
    DuplicateYear(Year),
    #[error("census row {0} has no region name")]
    MissingName(usize),
    #[error("region name '{0}' is not in the id mapping")]
    UnknownRegion(String),
    #[error("region '{0}' appears twice in the census table")]
    DuplicateRegion(String),
    #[error("population of '{region}' in {year} is not a non-negative integer: '{value}'")]
    InvalidPopulation {
        region: String,
        year: Year,
        value: String,
    },
    #[error("boundary for region {0} has no census row")]
    MissingCensus(RegionCode),
    #[error("region {0} has no boundary")]
    MissingGeometry(RegionCode),
    #[error(transparent)]
    Table(#[from] PolarsError),
}

/// Everything known about one region.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRecord {
    id: RegionCode,
    name: String,
    contour: Contour,
    population_by_year: BTreeMap<Year, Population>,
}

impl RegionRecord {
    pub fn id(&self) -> &RegionCode {
        &self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn contour(&self) -> &Contour {
        &self.contour
    }

    pub fn population(&self, year: Year) -> Option<Population> {
        self.population_by_year.get(&year).copied()
    }
}

/// The immutable, validated dataset of one session.
///
/// Every region has a contour and a population for every year in
/// [`years`](Self::years).
#[derive(Debug, Clone, PartialEq)]
pub struct CensusDataset {
    regions: BTreeMap<RegionCode, RegionRecord>,
    years: Vec<Year>,
    max_population: Population,
}

impl CensusDataset {
    /// Years ascending, without duplicates.
    pub fn years(&self) -> &[Year] {
        &self.years
    }

    pub fn has_year(&self, year: Year) -> bool {
        self.years.binary_search(&year).is_ok()
    }

    /// Largest population over all regions and years.
    pub fn max_population(&self) -> Population {
        self.max_population
    }

    pub fn region(&self, id: &RegionCode) -> Option<&RegionRecord> {
        self.regions.get(id)
    }

    /// Regions in code order.
    pub fn regions(&self) -> impl Iterator<Item = &RegionRecord> {
        self.regions.values()
    }

    pub fn population(&self, id: &RegionCode, year: Year) -> Option<Population> {
        self.regions.get(id).and_then(|r| r.population(year))
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Encoder bound to this dataset's maximum.
    pub fn encoder(&self, params: &VisualParams) -> VisualEncoder {
        VisualEncoder::new(self.max_population, params)
    }
}

/// Suffix polars appends to a repeated column header.
const DUPLICATE_HEADER_MARKER: &str = "_duplicated_";

/// Parse the year headers of a census table, paired with the header each
/// came from. The name column is skipped and the result is ascending.
/// A year named by two headers is an error.
pub fn extract_years<'a>(
    headers: impl IntoIterator<Item = &'a str>,
) -> Result<Vec<(Year, &'a str)>, CensusError> {
    let mut columns = Vec::new();
    for header in headers.into_iter().filter(|h| *h != CENSUS_NAME_COLUMN) {
        let (text, renamed) = match header.split_once(DUPLICATE_HEADER_MARKER) {
            Some((base, _)) => (base, true),
            None => (header, false),
        };
        let year = text
            .trim()
            .parse::<Year>()
            .map_err(|_| CensusError::InvalidYear(header.to_string()))?;
        if renamed {
            return Err(CensusError::DuplicateYear(year));
        }
        columns.push((year, header));
    }
    columns.sort_unstable_by_key(|(year, _)| *year);
    if let Some(pair) = columns.windows(2).find(|pair| pair[0].0 == pair[1].0) {
        return Err(CensusError::DuplicateYear(pair[0].0));
    }
    Ok(columns)
}

#[derive(Debug)]
struct PendingRecord {
    name: String,
    population_by_year: BTreeMap<Year, Population>,
    contour: Option<Contour>,
}

/// Single-use builder. Ingests the table once, takes the contours once,
/// and is consumed by [`finish`](Self::finish).
#[derive(Debug)]
pub struct CensusBuilder {
    years: Vec<Year>,
    records: BTreeMap<RegionCode, PendingRecord>,
    max_population: Population,
}

impl CensusBuilder {
    /// Read every row of the census table, resolving names to codes and
    /// parsing every year cell.
    pub fn from_table(df: &DataFrame, ids: &IdTable) -> Result<Self, CensusError> {
        let headers = table::column_names(df);
        let columns = extract_years(headers.iter().map(String::as_str))?;
        if df.height() == 0 {
            return Err(CensusError::EmptyTable);
        }

        let names = df
            .column(CENSUS_NAME_COLUMN)
            .map_err(|_| CensusError::MissingNameColumn)?
            .str()?;
        let cells = columns
            .iter()
            .map(|(year, header)| Ok((*year, df.column(header)?.str()?)))
            .collect::<Result<Vec<_>, PolarsError>>()?;

        let mut records = BTreeMap::new();
        let mut max_population: Population = 0;
        for row in 0..df.height() {
            let name = names
                .get(row)
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .ok_or(CensusError::MissingName(row))?;
            let id = ids
                .resolve(name)
                .cloned()
                .ok_or_else(|| CensusError::UnknownRegion(name.to_string()))?;

            let mut population_by_year = BTreeMap::new();
            for (year, column) in &cells {
                let raw = column.get(row).unwrap_or("");
                let value = raw.trim().parse::<Population>().map_err(|_| {
                    CensusError::InvalidPopulation {
                        region: name.to_string(),
                        year: *year,
                        value: raw.to_string(),
                    }
                })?;
                max_population = max_population.max(value);
                population_by_year.insert(*year, value);
            }

            let pending = PendingRecord {
                name: name.to_string(),
                population_by_year,
                contour: None,
            };
            if records.insert(id, pending).is_some() {
                return Err(CensusError::DuplicateRegion(name.to_string()));
            }
        }

        let years: Vec<Year> = columns.iter().map(|(year, _)| *year).collect();
        log::debug!(
            "Census table: {} regions, {} years",
            records.len(),
            years.len()
        );
        Ok(Self {
            years,
            records,
            max_population,
        })
    }

    /// Attach a contour to every region. The feature's display name, when
    /// present, replaces the census name.
    pub fn attach_geometry(&mut self, contours: Vec<RegionContour>) -> Result<(), CensusError> {
        for RegionContour {
            region,
            name,
            contour,
        } in contours
        {
            let record = self
                .records
                .get_mut(&region)
                .ok_or_else(|| CensusError::MissingCensus(region.clone()))?;
            if let Some(name) = name {
                record.name = name;
            }
            record.contour = Some(contour);
        }
        Ok(())
    }

    pub fn finish(self) -> Result<CensusDataset, CensusError> {
        let mut regions = BTreeMap::new();
        for (id, pending) in self.records {
            let contour = pending
                .contour
                .ok_or_else(|| CensusError::MissingGeometry(id.clone()))?;
            regions.insert(
                id.clone(),
                RegionRecord {
                    id,
                    name: pending.name,
                    contour,
                    population_by_year: pending.population_by_year,
                },
            );
        }
        Ok(CensusDataset {
            regions,
            years: self.years,
            max_population: self.max_population,
        })
    }
}

/// Build the dataset in one go.
pub fn build_dataset(
    df: &DataFrame,
    ids: &IdTable,
    contours: Vec<RegionContour>,
) -> Result<CensusDataset, CensusError> {
    let mut builder = CensusBuilder::from_table(df, ids)?;
    builder.attach_geometry(contours)?;
    builder.finish()
}
