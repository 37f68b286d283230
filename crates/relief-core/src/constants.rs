//! Single source of truth for shared constants.
//! Dataset-specific values (projection, placement, sources) live in `MapConfig`.

/// Census table column holding the region display name. Every other column is a year.
pub const CENSUS_NAME_COLUMN: &str = "name";

/// Prefix of every persisted camera key, e.g. `camera.position`.
pub const CAMERA_KEY_PREFIX: &str = "camera.";

/// URL hash prefix selecting a census year, e.g. `#/an/2011`.
pub const YEAR_ROUTE_PREFIX: &str = "#/an/";

/// Number of digits in a routed year.
pub const YEAR_ROUTE_DIGITS: usize = 4;

/// Default height of the most populated region, in scene units.
pub const DEFAULT_MAX_EXTRUSION: f32 = 10.0;

/// Default HSL hue of every region (green).
pub const DEFAULT_HUE_DEGREES: f32 = 105.0;

/// Default HSL saturation of every region.
pub const DEFAULT_SATURATION: f32 = 0.8;

/// Separator inserted between digit groups of a formatted population.
pub const THOUSANDS_SEPARATOR: char = ',';

/// World-space position of the single point light.
pub const LIGHT_POSITION: [f32; 3] = [800.0, 800.0, 800.0];

/// Ambient light added on top of the diffuse term.
pub const AMBIENT_LIGHT: [f32; 3] = [0.2, 0.2, 0.2];

/// Background clear color of the frame.
pub const CLEAR_COLOR: [f64; 3] = [0.0, 0.0, 0.0];
