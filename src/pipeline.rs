//! Per-release pipeline and the batch driver
//!
//! One candidate directory goes through
//! origin -> probe -> validate -> group query -> match -> plan ->
//! (transcode -> package)* -> assemble -> submit.
//! Candidates are processed strictly one after another.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::catalogue::Catalogue;
use crate::config::RunConfig;
use crate::edition::EditionGroup;
use crate::error::Result;
use crate::naming::OutputLayout;
use crate::origin::descriptor::LOSSLESS_FORMAT;
use crate::origin::OriginDescriptor;
use crate::package::PackageBuilder;
use crate::plan::{plan_transcodes, PlanInput, VariantPlan};
use crate::probe::{probe_all, Prober};
use crate::release::{assemble, ProducedPackage};
use crate::transcode::Transcoder;
use crate::validation::{check_required_tags, consistent_sample_rate, MissingTags};

/// How one candidate ended, short of an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateOutcome {
    /// Source is not in the lossless format
    Skipped { format: String },
    /// Required tags are missing; nothing was queried or produced
    ValidationFailed(MissingTags),
    /// Every variant already exists in the edition
    NothingToDo,
    /// Dry run: what would have been produced
    Planned(Vec<VariantPlan>),
    /// Packages were uploaded; `incomplete` names the variant that failed, if any
    Submitted {
        packages: usize,
        planned: usize,
        incomplete: Option<String>,
    },
}

/// Outcomes of a batch, in input order
#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<(PathBuf, CandidateOutcome)>,
    pub failures: Vec<(PathBuf, String)>,
}

impl BatchReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Everything needed to process candidates
pub struct Pipeline<P, T, B, C> {
    prober: Arc<P>,
    transcoder: T,
    packager: B,
    catalogue: C,
    transcode_dir: PathBuf,
    torrent_dir: PathBuf,
    dry_run: bool,
}

impl<P, T, B, C> Pipeline<P, T, B, C>
where
    P: Prober,
    T: Transcoder,
    B: PackageBuilder,
    C: Catalogue,
{
    pub fn new(prober: P, transcoder: T, packager: B, catalogue: C, config: &RunConfig) -> Self {
        Self {
            prober: Arc::new(prober),
            transcoder,
            packager,
            catalogue,
            transcode_dir: config.transcode_dir.clone(),
            torrent_dir: config.torrent_dir.clone(),
            dry_run: config.dry_run,
        }
    }

    /// Process every input directory, logging and continuing past failures
    pub async fn run_batch(&self, dirs: &[PathBuf]) -> BatchReport {
        let mut report = BatchReport::default();

        for dir in dirs {
            let dir = strip_trailing_slash(dir);
            tracing::info!("Processing {:?}", dir);
            match self.process(&dir).await {
                Ok(outcome) => {
                    tracing::info!("{:?}: {:?}", dir, outcome);
                    report.outcomes.push((dir, outcome));
                }
                Err(e) => {
                    tracing::error!("{:?} failed: {}", dir, e);
                    report.failures.push((dir, e.to_string()));
                }
            }
        }

        tracing::info!(
            "Batch finished: {} processed, {} failed",
            report.outcomes.len(),
            report.failures.len()
        );
        report
    }

    /// Run one candidate start to finish
    pub async fn process(&self, input_dir: &Path) -> Result<CandidateOutcome> {
        let origin = OriginDescriptor::from_dir(input_dir)?;
        if !origin.is_lossless_source() {
            tracing::info!(
                "Source format is {}, not {}. Skipping",
                origin.format,
                LOSSLESS_FORMAT
            );
            return Ok(CandidateOutcome::Skipped {
                format: origin.format,
            });
        }

        let paths = origin.flac_paths(input_dir);
        let probes = probe_all(Arc::clone(&self.prober), &paths).await?;

        if let Err(missing) = check_required_tags(&probes) {
            tracing::warn!("{}", missing);
            return Ok(CandidateOutcome::ValidationFailed(missing));
        }
        let sample_rate = consistent_sample_rate(&probes);

        let identity = origin.edition_identity();
        tracing::info!("Info hash: {}", origin.info_hash);
        tracing::info!("Permalink: {}", origin.permalink);
        tracing::info!("Edition: {:?}", identity);

        let group = self.catalogue.torrent_group(&origin.info_hash).await?;
        let edition_group = EditionGroup::matching(&identity, &group.torrents);
        tracing::info!(
            "Group {} ({}): {} torrents, {} in this edition",
            group.group.id,
            group.group.name,
            group.torrents.len(),
            edition_group.len()
        );

        let plan = plan_transcodes(PlanInput {
            edition_group: &edition_group,
            source_is_24bit: origin.is_24bit_lossless(),
            probes: &probes,
            sample_rate: &sample_rate,
        });
        for warning in &plan.warnings {
            tracing::warn!("{}", warning);
        }
        if plan.is_empty() {
            tracing::info!("Nothing to transcode");
            return Ok(CandidateOutcome::NothingToDo);
        }

        let layout = OutputLayout::new(&origin, &self.transcode_dir, &self.torrent_dir);
        for variant in &plan.variants {
            tracing::info!("Planned {} -> {:?}", variant, layout.output_dir(variant));
        }
        if self.dry_run {
            return Ok(CandidateOutcome::Planned(plan.variants));
        }

        let mut packages = Vec::with_capacity(plan.variants.len());
        let mut incomplete = None;
        for variant in &plan.variants {
            match self.produce(variant, input_dir, &layout).await {
                Ok(package) => packages.push(package),
                Err(e) if packages.is_empty() => return Err(e),
                Err(e) => {
                    tracing::error!("{} failed, submitting what was produced: {}", variant, e);
                    incomplete = Some(format!("{}: {}", variant, e));
                    break;
                }
            }
        }

        let payload = assemble(group.group.id, &identity, &origin.permalink, packages)?;
        let response = self.catalogue.upload(&payload).await?;
        tracing::info!("Done! {}", response);

        Ok(CandidateOutcome::Submitted {
            packages: payload.entries.len(),
            planned: plan.variants.len(),
            incomplete,
        })
    }

    async fn produce(
        &self,
        variant: &VariantPlan,
        input_dir: &Path,
        layout: &OutputLayout,
    ) -> Result<ProducedPackage> {
        let output_dir = layout.output_dir(variant);
        let torrent_path = layout.torrent_path(&output_dir);

        let method = self
            .transcoder
            .transcode(variant, input_dir, &output_dir)
            .await?;
        self.packager.build(&output_dir, &torrent_path).await?;

        Ok(ProducedPackage::new(variant, output_dir, torrent_path, method))
    }
}

fn strip_trailing_slash(dir: &Path) -> PathBuf {
    let text = dir.to_string_lossy();
    let trimmed = text.trim_end_matches('/');
    if trimmed.is_empty() {
        dir.to_path_buf()
    } else {
        PathBuf::from(trimmed)
    }
}
