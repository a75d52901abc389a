//! Handling the `efl_finder` CLI
//!
//! This module handles the command line parsing, reading of the search description and writing of the solutions.
use crate::{
    beam::InputBeam,
    distance_grid::{
        DistanceGrid, GapRange, DEFAULT_FIRST_GAP_RATIO, DEFAULT_SECOND_GAP_RATIO,
    },
    error::{EflError, EflResult},
    get_version,
    search::SearchConfig,
    solution::Solution,
    topology::{ThreeLens, Topology, TwoLens},
};
use clap::{builder::OsStr, builder::Str, Parser};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use uom::si::{
    angle::radian,
    f64::{Angle, Length},
    length::{millimeter, nanometer},
};

/// Command line arguments of the `efl_finder` application.
#[derive(Debug)]
pub struct Args {
    /// file path of the search description
    pub config_path: PathBuf,
    /// file path of the CSV output. Solutions are written to stdout if not given.
    pub output_path: Option<PathBuf>,
    /// number of worker threads. Overrides the value of the search description.
    pub nr_of_threads: Option<usize>,
}

#[derive(Parser, Debug)]
#[command(author, version = Str::from(get_version()), about, long_about = None)]
pub struct PartialArgs {
    /// path of the search description (YAML)
    #[arg(short, long)]
    config: String,

    /// path of the CSV file the solutions are written to. If not given, stdout is used.
    #[arg(short, long)]
    output: Option<String>,

    /// number of worker threads (default: one per core)
    #[arg(short, long)]
    threads: Option<usize>,
}

/// Checks if the passed file path is valid.
/// # Attributes
/// * `path`: Path to the file
/// # Returns
/// Returns true if the file exists and has a `yaml` or `yml` extension, false otherwise
fn config_path_is_valid(path: &Path) -> bool {
    path.is_file()
        && (path.extension() == Some(&OsStr::from("yaml"))
            || path.extension() == Some(&OsStr::from("yml")))
}

/// Evaluates if the passed output path is valid.
/// # Attributes
/// * `output_path`: path of the CSV file
/// # Returns
/// Returns true if the parent directory of the file exists.
fn output_path_is_valid(output_path: &Path) -> bool {
    match output_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir.is_dir(),
        _ => true,
    }
}

impl TryFrom<PartialArgs> for Args {
    type Error = EflError;

    fn try_from(part_args: PartialArgs) -> EflResult<Self> {
        let config_path = PathBuf::from(part_args.config);
        if !config_path_is_valid(&config_path) {
            return Err(EflError::Console(format!(
                "search description {} does not exist or is not a YAML file",
                config_path.display()
            )));
        }
        let output_path = part_args.output.map(PathBuf::from);
        if let Some(path) = &output_path {
            if !output_path_is_valid(path) {
                return Err(EflError::Console(format!(
                    "directory of output file {} does not exist",
                    path.display()
                )));
            }
        }
        if part_args.threads == Some(0) {
            return Err(EflError::Console("number of threads must be > 0".into()));
        }
        Ok(Self {
            config_path,
            output_path,
            nr_of_threads: part_args.threads,
        })
    }
}

const fn default_efl_tolerance() -> f64 {
    1.0
}
const fn default_prefilter() -> bool {
    true
}

/// Distance grid of a single gap in the search description (values in mm).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GapDescription {
    start: f64,
    stop: f64,
    step: f64,
    /// maximum ratio between gap and the focal length in front of it. Defaults to 2.5 for the first and 1.0 for
    /// the second gap.
    #[serde(default)]
    max_focal_ratio: Option<f64>,
}
impl GapDescription {
    fn gap_range(&self, default_ratio: f64) -> EflResult<GapRange> {
        GapRange::new(
            DistanceGrid::new(
                Length::new::<millimeter>(self.start),
                Length::new::<millimeter>(self.stop),
                Length::new::<millimeter>(self.step),
            )?,
            self.max_focal_ratio.unwrap_or(default_ratio),
        )
    }
}

/// Search description as read from a YAML file.
///
/// Lengths are given in mm, the wavelength in nm and the beam divergence in mrad. The number of focal length sets
/// (two or three) selects the lens train topology.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchDescription {
    focal_lengths: Vec<Vec<f64>>,
    gaps: Vec<GapDescription>,
    target_efl: f64,
    #[serde(default = "default_efl_tolerance")]
    efl_tolerance: f64,
    enclosure_length: f64,
    wavelength_nm: f64,
    beam_radius: f64,
    half_divergence_mrad: f64,
    clipping_margin: f64,
    #[serde(default = "default_prefilter")]
    prefilter: bool,
    #[serde(default)]
    nr_of_threads: Option<usize>,
}
impl SearchDescription {
    /// Read a [`SearchDescription`] from the given YAML file.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Console`] if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> EflResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            EflError::Console(format!("cannot read file {} : {}", path.display(), e))
        })?;
        Self::from_yaml(&contents)
    }
    /// Parse a [`SearchDescription`] from a YAML string.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Console`] if the string cannot be parsed.
    pub fn from_yaml(yaml: &str) -> EflResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| EflError::Console(format!("parsing of search description failed: {e}")))
    }
    /// Create the lens train [`Topology`] of this description.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Configuration`] if
    ///   - the number of focal length sets is not two or three.
    ///   - the number of gaps does not match the number of lenses.
    ///   - one of the focal length sets or gap grids is invalid.
    pub fn topology(&self) -> EflResult<Box<dyn Topology>> {
        let sets: Vec<Vec<Length>> = self
            .focal_lengths
            .iter()
            .map(|set| set.iter().map(|f| Length::new::<millimeter>(*f)).collect())
            .collect();
        if self.gaps.len() + 1 != sets.len() {
            return Err(EflError::Configuration(format!(
                "{} lenses need {} gaps but {} are given",
                sets.len(),
                sets.len().saturating_sub(1),
                self.gaps.len()
            )));
        }
        match (sets.as_slice(), self.gaps.as_slice()) {
            ([f1, f2], [gap]) => Ok(Box::new(TwoLens::new(
                f1,
                f2,
                gap.gap_range(DEFAULT_FIRST_GAP_RATIO)?,
            )?)),
            ([f1, f2, f3], [gap1, gap2]) => Ok(Box::new(ThreeLens::new(
                f1,
                f2,
                f3,
                gap1.gap_range(DEFAULT_FIRST_GAP_RATIO)?,
                gap2.gap_range(DEFAULT_SECOND_GAP_RATIO)?,
            )?)),
            _ => Err(EflError::Configuration(format!(
                "only systems of two or three lenses are supported, got {}",
                sets.len()
            ))),
        }
    }
    /// Create the [`SearchConfig`] of this description.
    ///
    /// # Errors
    ///
    /// This function returns an [`EflError::Configuration`] if the configuration is invalid.
    pub fn config(&self) -> EflResult<SearchConfig> {
        let input_beam = InputBeam::new(
            Length::new::<millimeter>(self.beam_radius),
            Angle::new::<radian>(1e-3 * self.half_divergence_mrad),
        )?;
        let config = SearchConfig::new(
            Length::new::<millimeter>(self.target_efl),
            Length::new::<millimeter>(self.enclosure_length),
            Length::new::<nanometer>(self.wavelength_nm),
            input_beam,
            self.clipping_margin,
        )?
        .with_efl_tolerance(Length::new::<millimeter>(self.efl_tolerance))?
        .with_prefilter(self.prefilter);
        match self.nr_of_threads {
            Some(nr_of_threads) => config.with_nr_of_threads(nr_of_threads),
            None => Ok(config),
        }
    }
}

/// A single CSV row (values in mm).
#[derive(Serialize)]
struct SolutionRecord {
    f1: f64,
    f2: f64,
    f3: Option<f64>,
    d1: f64,
    d2: Option<f64>,
    back_principal_plane: f64,
    enclosure_length: f64,
    effective_focal_length: f64,
    focal_spot_radius: f64,
}
impl From<&Solution> for SolutionRecord {
    fn from(solution: &Solution) -> Self {
        Self {
            f1: solution.f1().get::<millimeter>(),
            f2: solution.f2().get::<millimeter>(),
            f3: solution.f3().map(|f| f.get::<millimeter>()),
            d1: solution.d1().get::<millimeter>(),
            d2: solution.d2().map(|d| d.get::<millimeter>()),
            back_principal_plane: solution.back_principal_plane().get::<millimeter>(),
            enclosure_length: solution.enclosure_length().get::<millimeter>(),
            effective_focal_length: solution.effective_focal_length().get::<millimeter>(),
            focal_spot_radius: solution.focal_spot_radius().get::<millimeter>(),
        }
    }
}

/// Write the given solutions as CSV (one row per solution, values in mm) to `writer`.
///
/// # Errors
///
/// This function returns an [`EflError::Console`] if writing fails.
pub fn write_solutions<W: Write>(solutions: &[Solution], writer: W) -> EflResult<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    for solution in solutions {
        wtr.serialize(SolutionRecord::from(solution))
            .map_err(|e| EflError::Console(format!("writing solution failed: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| EflError::Console(format!("writing solutions failed: {e}")))
}
