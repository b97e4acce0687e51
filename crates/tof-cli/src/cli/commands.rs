use super::CliError;
use super::documents::{BankDocument, ScaleSummary, SpectrumDocument, read_document};
use anyhow::Context;
use serde::Serialize;
use std::fs;
use std::path::PathBuf;
use tof_core::{
    AppliedFocus, BankFocus, FocusRequest, FocusTarget, FocusedSpectrum, FocusedSpectrumBuilder,
};

pub(super) struct CommandContext {
    builder: FocusedSpectrumBuilder,
    output: Option<PathBuf>,
}

impl CommandContext {
    pub(super) fn new(builder: FocusedSpectrumBuilder, output: Option<PathBuf>) -> Self {
        Self { builder, output }
    }

    fn uniform_tolerance(&self) -> f32 {
        self.builder.config().uniform_tolerance
    }
}

#[derive(clap::Args)]
pub(super) struct TargetArgs {
    /// Destination scattering angle 2θ in degrees
    #[arg(long, allow_negative_numbers = true)]
    angle: f32,

    /// Destination final flight path in metres
    #[arg(long, allow_negative_numbers = true)]
    path: f32,

    /// Group id of the focused spectrum (default: the input group id)
    #[arg(long)]
    group_id: Option<i32>,
}

impl TargetArgs {
    fn target(&self, source_group_id: i32) -> FocusTarget {
        FocusTarget::new(
            self.path,
            self.angle,
            self.group_id.unwrap_or(source_group_id),
        )
    }
}

#[derive(clap::Args)]
pub(super) struct RelabelArgs {
    /// Spectrum document to relabel
    #[arg(long)]
    input: PathBuf,

    #[command(flatten)]
    target: TargetArgs,
}

#[derive(clap::Args)]
pub(super) struct BankArgs {
    /// Monitor spectrum document
    #[arg(long)]
    input: PathBuf,

    /// Bank geometry document
    #[arg(long)]
    bank: PathBuf,

    #[command(flatten)]
    target: TargetArgs,
}

#[derive(clap::Args)]
pub(super) struct InspectArgs {
    /// Spectrum document to summarise
    #[arg(long)]
    input: PathBuf,
}

pub(super) fn run_relabel_command(
    context: &CommandContext,
    args: RelabelArgs,
) -> Result<i32, CliError> {
    let document: SpectrumDocument = read_document(&args.input)?;
    tracing::info!(path = %args.input.display(), group_id = document.group_id, "loaded spectrum");

    let histogram = document.to_histogram(context.uniform_tolerance())?;
    let metadata = document.metadata();
    let target = args.target.target(histogram.group_id());

    let focused = context.builder.relabel(&histogram, &metadata, &target)?;
    log_applied(&focused);
    write_output(context, &SpectrumDocument::from_focused(&focused)?)
}

pub(super) fn run_bank_command(context: &CommandContext, args: BankArgs) -> Result<i32, CliError> {
    let document: SpectrumDocument = read_document(&args.input)?;
    tracing::info!(path = %args.input.display(), group_id = document.group_id, "loaded monitor");
    let bank: BankDocument = read_document(&args.bank)?;
    tracing::info!(path = %args.bank.display(), "loaded bank geometry");

    let histogram = document.to_histogram(context.uniform_tolerance())?;
    let metadata = document.metadata();
    let destination = bank.destination(context.uniform_tolerance())?;
    let mut bank_focus = BankFocus::new(bank.geometry());
    if let Some(destination) = &destination {
        bank_focus = bank_focus.with_destination(destination);
    }

    let request = FocusRequest::new(
        &histogram,
        &metadata,
        args.target.target(histogram.group_id()),
    )
    .with_bank(bank_focus);
    let focused = context.builder.build(request)?;
    log_applied(&focused);
    write_output(context, &SpectrumDocument::from_focused(&focused)?)
}

pub(super) fn run_inspect_command(
    context: &CommandContext,
    args: InspectArgs,
) -> Result<i32, CliError> {
    let document: SpectrumDocument = read_document(&args.input)?;
    let histogram = document.to_histogram(context.uniform_tolerance())?;
    write_output(context, &ScaleSummary::of(&histogram))
}

fn log_applied(focused: &FocusedSpectrum) {
    let group_id = focused.histogram.group_id();
    match focused.applied {
        AppliedFocus::Relabel { mode, factor } => {
            tracing::info!(group_id, mode = mode.name(), factor, "relabelled spectrum");
        }
        AppliedFocus::Bank {
            out_of_coverage, ..
        } => {
            tracing::info!(group_id, out_of_coverage, "focused monitor onto bank");
            if out_of_coverage > 0 {
                tracing::warn!(
                    group_id,
                    out_of_coverage,
                    "bank bins outside monitor coverage were set to zero"
                );
            }
        }
    }
}

fn write_output<T: Serialize>(context: &CommandContext, document: &T) -> Result<i32, CliError> {
    let rendered =
        serde_json::to_string_pretty(document).context("failed to render output document")?;

    match &context.output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|source| CliError::Write {
                    path: path.clone(),
                    source,
                })?;
            }
            fs::write(path, format!("{rendered}\n")).map_err(|source| CliError::Write {
                path: path.clone(),
                source,
            })?;
            tracing::info!(path = %path.display(), "wrote output");
        }
        None => println!("{rendered}"),
    }
    Ok(0)
}
