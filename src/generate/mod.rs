//! Gig-to-PDF generation.
//!
//! A generation pass loads the configuration once, then handles every gig
//! file of the gigs folder in file name order. Each gig is resolved,
//! planned and written on its own; a gig that fails is reported and the
//! batch moves on.

mod resolve;

pub use resolve::{Resolved, Resolver};

use crate::config::{discover_gigs, Config, ConfigPaths, Gig};
use crate::error::{Error, Result};
use crate::layout::{plan, resolve_spacing, LayoutConstants, PagePlan};
use crate::render::{emit, ImageAssets, PdfWriter};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";

/// Options for one generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateOptions {
    /// Path to the configuration file
    pub config_path: PathBuf,

    /// Spacing override in millimetres (takes precedence over the config)
    pub spacing: Option<f64>,

    /// Variant to prefer for every song that has it
    pub image_override: Option<String>,

    /// Output folder override
    pub output_override: Option<PathBuf>,

    /// Also write a document containing every configured song
    pub all_songs: bool,

    /// Plan only, do not write PDFs
    pub dry_run: bool,

    /// Report per-gig diagnostics at info level
    pub debug: bool,
}

impl GenerateOptions {
    /// Create options for the given configuration file.
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            spacing: None,
            image_override: None,
            output_override: None,
            all_songs: false,
            dry_run: false,
            debug: false,
        }
    }

    /// Override the spacing between images.
    pub fn with_spacing(mut self, spacing: Option<f64>) -> Self {
        self.spacing = spacing;
        self
    }

    /// Prefer a named image variant.
    pub fn with_image_override(mut self, variant: impl Into<String>) -> Self {
        let variant = variant.into();
        self.image_override = (!variant.is_empty()).then_some(variant);
        self
    }

    /// Write PDFs to another folder.
    pub fn with_output(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_override = Some(dir.into());
        self
    }

    /// Also generate the all-songs document.
    pub fn with_all_songs(mut self, all_songs: bool) -> Self {
        self.all_songs = all_songs;
        self
    }

    /// Plan without writing.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Enable debug diagnostics.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// File name of the all-songs document.
    pub fn all_songs_file_name(&self) -> String {
        match &self.image_override {
            Some(variant) => format!("_all_{}.pdf", variant),
            None => "_all.pdf".to_string(),
        }
    }
}

impl Default for GenerateOptions {
    fn default() -> Self {
        Self::new(DEFAULT_CONFIG_FILE)
    }
}

/// Configuration, folders and layout shared by every gig of a run.
#[derive(Debug, Clone)]
pub struct GenerationContext {
    pub options: GenerateOptions,
    pub config: Config,
    pub paths: ConfigPaths,
    pub layout: LayoutConstants,
}

impl GenerationContext {
    /// Load the configuration and resolve folders and spacing.
    pub fn load(options: &GenerateOptions) -> Result<Self> {
        let config = Config::load(&options.config_path)?;
        Ok(Self::with_config(options, config))
    }

    /// Build a context from an already loaded configuration.
    pub fn with_config(options: &GenerateOptions, config: Config) -> Self {
        let paths = config.paths(&options.config_path, options.output_override.as_deref());
        let spacing = resolve_spacing(options.spacing, config.spacing);
        log::debug!("Using spacing of {}mm", spacing);

        Self {
            options: options.clone(),
            layout: LayoutConstants::a4().with_spacing(spacing),
            config,
            paths,
        }
    }

    fn resolver<'a>(&'a self, label: &'a str) -> Resolver<'a> {
        Resolver::new(&self.config, &self.paths.image_dir, label)
            .with_image_override(self.options.image_override.as_deref())
    }
}

/// What happened to one gig.
#[derive(Debug, Clone)]
pub struct GigOutcome {
    /// Gig file, or `None` for the all-songs document
    pub source: Option<PathBuf>,

    /// Target PDF path
    pub output: PathBuf,

    /// Document name shown in footers
    pub name: String,

    pub pages: u32,
    pub entries: usize,
    pub errors: usize,

    /// Whether the PDF was written (false for dry runs)
    pub written: bool,

    pub plan: PagePlan,
}

/// A gig that could not be generated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GigFailure {
    pub source: PathBuf,
    pub message: String,
}

/// Progress notifications from [`generate_all`].
#[derive(Debug)]
pub enum BatchEvent<'a> {
    /// Gig files were found
    Discovered { count: usize, dir: &'a Path },

    /// The gigs folder holds no gig files
    NoGigs { dir: &'a Path },

    /// A gig was planned (and written, unless dry run)
    Generated(&'a GigOutcome),

    /// A gig failed; the batch continues
    Failed(&'a GigFailure),
}

/// Summary of a batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub outcomes: Vec<GigOutcome>,
    pub failures: Vec<GigFailure>,
}

impl BatchReport {
    /// True when no gig failed.
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Plans of every generated document.
    pub fn plans(&self) -> Vec<&PagePlan> {
        self.outcomes.iter().map(|o| &o.plan).collect()
    }
}

/// Plan a resolved document and, unless `dry_run`, write it to `output`.
///
/// Returns the plan. The PDF is fully written and flushed before returning.
pub fn render_document(
    resolved: &Resolved,
    layout: &LayoutConstants,
    output: &Path,
    dry_run: bool,
) -> Result<PagePlan> {
    let page_plan = plan(&resolved.document, layout);
    if !dry_run {
        write_pdf(&page_plan, layout, &resolved.assets, output)?;
    }
    Ok(page_plan)
}

fn write_pdf(
    plan: &PagePlan,
    layout: &LayoutConstants,
    assets: &ImageAssets,
    output: &Path,
) -> Result<()> {
    let mut writer = PdfWriter::new(plan.document.clone());
    emit(plan, layout, assets, &mut writer)?;
    writer.save(output)
}

/// Generate one gig into `output`.
///
/// `label` identifies the gig in warnings.
pub fn generate_gig(
    context: &GenerationContext,
    gig: &Gig,
    label: &str,
    output: &Path,
) -> Result<GigOutcome> {
    let resolved = context.resolver(label).resolve(gig);
    let dry_run = context.options.dry_run;
    let plan = render_document(&resolved, &context.layout, output, dry_run)?;

    let level = if context.options.debug {
        log::Level::Info
    } else {
        log::Level::Debug
    };
    log::log!(
        level,
        "{}: {} entries ({} unresolved) on {} page(s)",
        label,
        resolved.document.entry_count(),
        resolved.document.error_count(),
        plan.page_count()
    );

    Ok(GigOutcome {
        source: None,
        output: output.to_path_buf(),
        name: resolved.document.name.clone(),
        pages: plan.page_count(),
        entries: resolved.document.entry_count(),
        errors: resolved.document.error_count(),
        written: !dry_run,
        plan,
    })
}

/// Load a gig file and generate `{output folder}/{file stem}.pdf`.
pub fn generate_gig_file(context: &GenerationContext, gig_path: &Path) -> Result<GigOutcome> {
    let gig = Gig::load(gig_path)?;
    let stem = gig_path
        .file_stem()
        .ok_or_else(|| Error::Config(format!("invalid gig file name: {}", gig_path.display())))?;
    let output = context
        .paths
        .output_dir
        .join(format!("{}.pdf", stem.to_string_lossy()));
    let label = gig_path.display().to_string();

    let mut outcome = generate_gig(context, &gig, &label, &output)?;
    outcome.source = Some(gig_path.to_path_buf());
    Ok(outcome)
}

/// Generate every gig of the configured gigs folder.
///
/// Only configuration and output folder problems are returned as errors;
/// failures of individual gigs are collected in the report. A missing gigs
/// folder counts as an empty one.
pub fn generate_all(
    options: &GenerateOptions,
    on_event: &mut dyn FnMut(BatchEvent<'_>),
) -> Result<BatchReport> {
    let context = GenerationContext::load(options)?;
    generate_with_context(&context, on_event)
}

/// [`generate_all`] with an already loaded context.
pub fn generate_with_context(
    context: &GenerationContext,
    on_event: &mut dyn FnMut(BatchEvent<'_>),
) -> Result<BatchReport> {
    if !context.options.dry_run {
        fs::create_dir_all(&context.paths.output_dir)?;
    }

    let mut report = BatchReport::default();
    let gigs_dir = &context.paths.gigs_dir;
    let gig_files = match discover_gigs(gigs_dir) {
        Ok(files) => files,
        Err(Error::NotFound(dir)) => {
            log::warn!("Gigs folder {} does not exist", dir.display());
            Vec::new()
        }
        Err(e) => return Err(e),
    };

    if gig_files.is_empty() {
        log::warn!("No gig files found in {}", gigs_dir.display());
        on_event(BatchEvent::NoGigs { dir: gigs_dir });
    } else {
        on_event(BatchEvent::Discovered {
            count: gig_files.len(),
            dir: gigs_dir,
        });
    }

    for gig_path in &gig_files {
        match generate_gig_file(context, gig_path) {
            Ok(outcome) => {
                on_event(BatchEvent::Generated(&outcome));
                report.outcomes.push(outcome);
            }
            Err(e) => {
                log::error!("Error generating PDF for {}: {}", gig_path.display(), e);
                let failure = GigFailure {
                    source: gig_path.clone(),
                    message: e.to_string(),
                };
                on_event(BatchEvent::Failed(&failure));
                report.failures.push(failure);
            }
        }
    }

    if context.options.all_songs {
        let output = context
            .paths
            .output_dir
            .join(context.options.all_songs_file_name());
        match generate_gig(context, &Gig::all_songs(&context.config), "config", &output) {
            Ok(outcome) => {
                on_event(BatchEvent::Generated(&outcome));
                report.outcomes.push(outcome);
            }
            Err(e) => {
                log::error!("Error generating {}: {}", output.display(), e);
                let failure = GigFailure {
                    source: context.options.config_path.clone(),
                    message: e.to_string(),
                };
                on_event(BatchEvent::Failed(&failure));
                report.failures.push(failure);
            }
        }
    }

    Ok(report)
}
