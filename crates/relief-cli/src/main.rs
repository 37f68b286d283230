mod fs_fetch;
mod report;

use std::path::PathBuf;
use std::process;

use relief_core::{MapConfig, Year};
use relief_data::{assemble_dataset, load_all, standard_sources, CensusDataset};
use relief_scene::{overlay_for, pick_ray, Camera, Scene, SceneManager};

use fs_fetch::FsFetcher;

/// Aspect ratio of the virtual viewport used for `--pick`.
const PICK_ASPECT: f32 = 1.0;

struct Args {
    data_dir: PathBuf,
    config_path: Option<PathBuf>,
    year: Option<Year>,
    pick: Option<(f32, f32)>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();

    let config = match load_config(args.config_path.as_deref()) {
        Ok(config) => config,
        Err(e) => fail(&e),
    };

    let fetcher = FsFetcher::new(&args.data_dir);
    let dataset = match pollster::block_on(load_all(&fetcher, &standard_sources(&config)))
        .map_err(|e| e.to_string())
        .and_then(|resources| assemble_dataset(resources, &config).map_err(|e| e.to_string()))
    {
        Ok(dataset) => dataset,
        Err(e) => fail(&format!("loading {}: {e}", args.data_dir.display())),
    };

    let years: Vec<Year> = match args.year {
        Some(year) if dataset.has_year(year) => vec![year],
        Some(year) => fail(&format!(
            "no census for {year}; available years: {:?}",
            dataset.years()
        )),
        None => dataset.years().to_vec(),
    };

    let encoder = dataset.encoder(&config.visual);
    println!("\n## Population relief\n");
    for &year in &years {
        let rows = report::year_rows(&dataset, &encoder, year);
        println!("{}", report::format_markdown(year, &rows));
    }

    if let Some((x, y)) = args.pick {
        let year = args.year.or_else(|| dataset.years().first().copied());
        match year {
            Some(year) => pick(&config, &dataset, year, x, y),
            None => log::warn!("Dataset has no years, nothing to pick"),
        }
    }
}

/// Build the scene for `year` and print the overlay line for the pointer at
/// normalized device coordinates (`x`, `y`).
fn pick(config: &MapConfig, dataset: &CensusDataset, year: Year, x: f32, y: f32) {
    let mut scene = Scene::new();
    let mut manager = SceneManager::new(config);
    if let Err(e) = manager.select_year(&mut scene, dataset, year) {
        fail(&e.to_string());
    }

    let camera = Camera::new(&config.camera, PICK_ASPECT);
    let overlay = pick_ray(&scene, camera.ray_from_ndc(x, y))
        .and_then(|hit| overlay_for(&hit, dataset, year))
        .unwrap_or_default();

    println!("Pick ({x}, {y}) in {year}: \"{overlay}\"");
}

fn load_config(path: Option<&std::path::Path>) -> Result<MapConfig, String> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|e| format!("reading {}: {e}", path.display()))?;
            MapConfig::from_ron_str(&text).map_err(|e| e.to_string())
        }
        None => MapConfig::from_ron_str(include_str!("../../../data/map.ron"))
            .map_err(|e| e.to_string()),
    }
}

fn parse_args() -> Args {
    let args: Vec<String> = std::env::args().collect();

    let mut data_dir: Option<PathBuf> = None;
    let mut config_path: Option<PathBuf> = None;
    let mut year: Option<Year> = None;
    let mut pick: Option<(f32, f32)> = None;

    let mut i = 1;
    while i < args.len() {
        let value = |i: usize| {
            args.get(i)
                .cloned()
                .unwrap_or_else(|| fail(&format!("{} needs a value", args[i - 1])))
        };
        match args[i].as_str() {
            "--data" => {
                i += 1;
                data_dir = Some(PathBuf::from(value(i)));
            }
            "--config" => {
                i += 1;
                config_path = Some(PathBuf::from(value(i)));
            }
            "--year" => {
                i += 1;
                year = Some(
                    value(i)
                        .parse()
                        .unwrap_or_else(|_| fail("invalid --year value")),
                );
            }
            "--pick" => {
                i += 1;
                pick = Some(parse_pick(&value(i)).unwrap_or_else(|| fail("invalid --pick value")));
            }
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {}", other);
                process::exit(1);
            }
        }
        i += 1;
    }

    let Some(data_dir) = data_dir else {
        print_usage();
        process::exit(1);
    };

    Args {
        data_dir,
        config_path,
        year,
        pick,
    }
}

/// `"X,Y"` in normalized device coordinates, both in [-1, 1].
fn parse_pick(value: &str) -> Option<(f32, f32)> {
    let (x, y) = value.split_once(',')?;
    let x: f32 = x.trim().parse().ok()?;
    let y: f32 = y.trim().parse().ok()?;
    ((-1.0..=1.0).contains(&x) && (-1.0..=1.0).contains(&y)).then_some((x, y))
}

fn print_usage() {
    eprintln!("Usage: relief --data <dir> [OPTIONS]");
    eprintln!("  --data <dir>      Directory holding the topology, id and census files");
    eprintln!("  --config <path>   Viewer config RON (default: built-in data/map.ron)");
    eprintln!("  --year <year>     Only report this census year");
    eprintln!("  --pick <x,y>      Print the overlay for a pointer at NDC x,y");
}

fn fail(message: &str) -> ! {
    log::error!("{message}");
    process::exit(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pick() {
        assert_eq!(parse_pick("0,0"), Some((0.0, 0.0)));
        assert_eq!(parse_pick("-0.5, 0.25"), Some((-0.5, 0.25)));
        assert_eq!(parse_pick("1.5,0"), None);
        assert_eq!(parse_pick("0"), None);
        assert_eq!(parse_pick("a,b"), None);
    }

    #[test]
    fn test_builtin_config_loads() {
        let config = load_config(None).expect("built-in config should parse");
        assert_eq!(config.sources.census, "data/recensaminte.csv");
    }
}
