use relief_core::format::format_population;
use relief_core::{Population, VisualEncoder, Year};
use relief_data::CensusDataset;

/// One region's visual encoding for a year.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionRow {
    pub code: String,
    pub name: String,
    pub population: Population,
    pub height: f32,
    pub luminance: f32,
}

impl RegionRow {
    pub fn new(code: &str, name: &str, population: Population, encoder: &VisualEncoder) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            population,
            height: encoder.extrusion(population),
            luminance: encoder.luminance(population),
        }
    }
}

/// Rows for every region with data in `year`, most populous first.
pub fn year_rows(dataset: &CensusDataset, encoder: &VisualEncoder, year: Year) -> Vec<RegionRow> {
    let mut rows: Vec<RegionRow> = dataset
        .regions()
        .filter_map(|record| {
            let population = record.population(year)?;
            Some(RegionRow::new(
                record.id().as_str(),
                record.name(),
                population,
                encoder,
            ))
        })
        .collect();
    rows.sort_by(|a, b| {
        b.population
            .cmp(&a.population)
            .then_with(|| a.code.cmp(&b.code))
    });
    rows
}

/// Format one year as a markdown table.
pub fn format_markdown(year: Year, rows: &[RegionRow]) -> String {
    let mut out = format!("### {year}\n\n");
    out.push_str("| Code | Region | Population | Height | Luminance |\n");
    out.push_str("|------|--------|------------|--------|-----------|\n");

    for r in rows {
        out.push_str(&format!(
            "| {} | {} | {} | {:.3} | {:.3} |\n",
            r.code,
            r.name,
            format_population(r.population),
            r.height,
            r.luminance,
        ));
    }

    out
}
