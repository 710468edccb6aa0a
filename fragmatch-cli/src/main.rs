use clap::Parser;
use fragmatch::io::{load_color_image, save_color_image, save_gray_image, write_variants, DirectorySource};
use fragmatch::{
    BatchSummary, BilinearTransform, FailurePolicy, FragMatchError, FragmentSource, MatchConfig,
    Matcher, PreprocessConfig, ReportSink, Sweep, TransformSource, VariantDriver, VariantKind,
    VariantPlan, VariantRecord, VariantReport,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "FragMatch CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Write the configured variants under `variants_root` instead of matching.
    #[arg(long)]
    generate: bool,
    /// Enable tracing output (per-variant results, per-row progress at debug).
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
enum FailurePolicyConfig {
    #[default]
    Skip,
    Abort,
}

impl From<FailurePolicyConfig> for FailurePolicy {
    fn from(value: FailurePolicyConfig) -> Self {
        match value {
            FailurePolicyConfig::Skip => FailurePolicy::Skip,
            FailurePolicyConfig::Abort => FailurePolicy::Abort,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct PreprocessConfigJson {
    sharpen: bool,
    blur_kernel: usize,
    original_weight: f32,
    blurred_weight: f32,
}

impl Default for PreprocessConfigJson {
    fn default() -> Self {
        let cfg = PreprocessConfig::default();
        Self {
            sharpen: cfg.sharpen,
            blur_kernel: cfg.blur_kernel,
            original_weight: cfg.original_weight,
            blurred_weight: cfg.blurred_weight,
        }
    }
}

impl From<PreprocessConfigJson> for PreprocessConfig {
    fn from(value: PreprocessConfigJson) -> Self {
        Self {
            sharpen: value.sharpen,
            blur_kernel: value.blur_kernel,
            original_weight: value.original_weight,
            blurred_weight: value.blurred_weight,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct ScaleSweepJson {
    start: f32,
    limit: f32,
    step: f32,
}

impl Default for ScaleSweepJson {
    fn default() -> Self {
        Self {
            start: 0.9,
            limit: 1.1,
            step: 0.025,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct RotationSweepJson {
    start: f32,
    limit: f32,
    step: f32,
}

impl Default for RotationSweepJson {
    fn default() -> Self {
        Self {
            start: 2.0,
            limit: 10.0,
            step: 2.0,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct VariantsJson {
    identity: bool,
    scale: Option<ScaleSweepJson>,
    rotation: Option<RotationSweepJson>,
    fill: [u8; 3],
}

impl Default for VariantsJson {
    fn default() -> Self {
        Self {
            identity: true,
            scale: None,
            rotation: None,
            fill: [0, 0, 0],
        }
    }
}

impl VariantsJson {
    fn plan(&self) -> Result<VariantPlan, FragMatchError> {
        let scale = match &self.scale {
            Some(s) => Some(Sweep::new(s.start, s.limit, s.step)?),
            None => None,
        };
        let rotation = match &self.rotation {
            Some(r) => Some(Sweep::new(r.start, r.limit, r.step)?),
            None => None,
        };
        Ok(VariantPlan {
            identity: self.identity,
            scale,
            rotation,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    reference_path: String,
    fragment_path: String,
    variants_root: Option<String>,
    fragment_id: String,
    output_path: Option<String>,
    surface_dir: Option<String>,
    annotated_path: Option<String>,
    parallel: bool,
    on_failure: FailurePolicyConfig,
    preprocess: PreprocessConfigJson,
    variants: VariantsJson,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            reference_path: String::new(),
            fragment_path: String::new(),
            variants_root: None,
            fragment_id: "1".to_string(),
            output_path: None,
            surface_dir: None,
            annotated_path: None,
            parallel: true,
            on_failure: FailurePolicyConfig::Skip,
            preprocess: PreprocessConfigJson::default(),
            variants: VariantsJson::default(),
        }
    }
}

#[derive(Debug, Serialize)]
struct RecordJson {
    variant: String,
    x: usize,
    y: usize,
    score: f32,
    width: usize,
    height: usize,
    elapsed_ms: u128,
}

impl From<&VariantRecord> for RecordJson {
    fn from(value: &VariantRecord) -> Self {
        Self {
            variant: value.kind.label(),
            x: value.result.x,
            y: value.result.y,
            score: value.result.score,
            width: value.fragment_width,
            height: value.fragment_height,
            elapsed_ms: value.elapsed.as_millis(),
        }
    }
}

#[derive(Debug, Serialize)]
struct FailureJson {
    variant: String,
    error: String,
}

#[derive(Debug, Serialize)]
struct Output {
    best: Option<RecordJson>,
    records: Vec<RecordJson>,
    failures: Vec<FailureJson>,
}

impl From<&BatchSummary> for Output {
    fn from(summary: &BatchSummary) -> Self {
        Self {
            best: summary.best().map(RecordJson::from),
            records: summary.records.iter().map(RecordJson::from).collect(),
            failures: summary
                .failures
                .iter()
                .map(|(kind, err)| FailureJson {
                    variant: kind.label(),
                    error: err.to_string(),
                })
                .collect(),
        }
    }
}

/// Logs every outcome and optionally writes normalized surfaces as PNG.
struct CliSink {
    surface_dir: Option<PathBuf>,
}

impl ReportSink for CliSink {
    fn on_result(&mut self, report: &VariantReport) {
        tracing::info!(
            variant = %report.kind,
            x = report.result.x,
            y = report.result.y,
            score = report.result.score,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "variant evaluated"
        );
        let Some(dir) = &self.surface_dir else {
            return;
        };
        let path = dir.join(format!("surface_{}.png", report.kind.label().replace(' ', "_")));
        let written = report
            .surface
            .normalize_to_u8()
            .and_then(|img| save_gray_image(&img, &path));
        if let Err(err) = written {
            tracing::warn!(path = %path.display(), error = %err, "failed to write surface");
        }
    }

    fn on_failure(&mut self, kind: VariantKind, error: &FragMatchError) {
        tracing::warn!(variant = %kind, error = %error, "variant failed");
    }
}

fn generate(config: &Config, kinds: &[VariantKind]) -> Result<(), Box<dyn std::error::Error>> {
    let root = config
        .variants_root
        .as_deref()
        .ok_or("variants_root must be set to generate variants")?;
    if config.fragment_path.is_empty() {
        return Err("fragment_path must be set to generate variants".into());
    }
    let canonical = load_color_image(&config.fragment_path)?;
    let transform = BilinearTransform::new(config.variants.fill);
    let written = write_variants(
        &PathBuf::from(root),
        &config.fragment_id,
        &canonical,
        kinds,
        &transform,
    )?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive("fragmatch=info".parse()?),
            )
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    let kinds = config.variants.plan()?.kinds();
    if kinds.is_empty() {
        return Err("the variant plan selects no variants".into());
    }

    if cli.generate {
        return generate(&config, &kinds);
    }

    if config.reference_path.is_empty() {
        return Err("reference_path must be set in the config".into());
    }
    let reference = load_color_image(&config.reference_path)?;
    let matcher = Matcher::new(
        &reference,
        MatchConfig {
            parallel: config.parallel,
            preprocess: config.preprocess.into(),
            on_failure: config.on_failure.into(),
        },
    )?;

    let mut source: Box<dyn FragmentSource> = match &config.variants_root {
        Some(root) => Box::new(DirectorySource::new(root, config.fragment_id.as_str())),
        None => {
            if config.fragment_path.is_empty() {
                return Err("fragment_path or variants_root must be set in the config".into());
            }
            let canonical = load_color_image(&config.fragment_path)?;
            Box::new(TransformSource::new(
                canonical,
                BilinearTransform::new(config.variants.fill),
            ))
        }
    };

    let surface_dir = config.surface_dir.as_ref().map(PathBuf::from);
    if let Some(dir) = &surface_dir {
        fs::create_dir_all(dir)?;
    }
    let mut sink = CliSink { surface_dir };
    let summary = VariantDriver::new(&matcher).run(source.as_mut(), &kinds, &mut sink)?;

    if let (Some(path), Some(best)) = (&config.annotated_path, summary.best()) {
        let mut annotated = reference.clone();
        annotated.draw_rect(
            best.result.x,
            best.result.y,
            best.fragment_width,
            best.fragment_height,
            [255, 0, 0],
            2,
        );
        save_color_image(&annotated, path)?;
    }

    let output = Output::from(&summary);
    let json = serde_json::to_string_pretty(&output)?;
    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
