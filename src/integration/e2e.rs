//! End-to-end pipeline scenarios with in-memory collaborators

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use async_trait::async_trait;
use tempfile::TempDir;

use crate::catalogue::models::GroupInfo;
use crate::catalogue::{Catalogue, ExistingVariant, TorrentGroup};
use crate::config::RunConfig;
use crate::error::{CatalogueError, ProbeError, Result, ToolError, TranscodeError};
use crate::integration::fixtures::{origin, origin_yaml, probe, variant};
use crate::origin::OriginDescriptor;
use crate::package::PackageBuilder;
use crate::pipeline::{CandidateOutcome, Pipeline};
use crate::plan::{FormatKind, Mp3Preset, VariantPlan};
use crate::probe::{ProbeResult, Prober};
use crate::release::{FormValue, SubmissionPayload};
use crate::transcode::Transcoder;

/// Answers from a table keyed by file name
struct FakeProber {
    probes: BTreeMap<String, ProbeResult>,
}

impl FakeProber {
    /// Every file of the fixture origin at the same rate and depth
    fn uniform(sample_rate: u32, bits: u32) -> Self {
        Self::per_file(&[(sample_rate, bits), (sample_rate, bits)])
    }

    /// One (rate, depth) per FLAC file of the fixture origin, in order
    fn per_file(specs: &[(u32, u32)]) -> Self {
        let names = origin()
            .files
            .into_iter()
            .map(|f| f.name)
            .filter(|n| n.ends_with(".flac"));
        let probes = names
            .zip(specs)
            .map(|(name, (rate, bits))| (name.clone(), probe(&name, *rate, *bits)))
            .collect();
        Self { probes }
    }

    fn without_tag(mut self, tag: &str) -> Self {
        for p in self.probes.values_mut() {
            p.tags.remove(tag);
        }
        self
    }
}

impl Prober for FakeProber {
    fn probe(&self, path: &Path) -> Result<ProbeResult> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut result = self
            .probes
            .get(&name)
            .cloned()
            .ok_or_else(|| ProbeError::OpenInput(name.clone()))?;
        result.path = path.to_path_buf();
        Ok(result)
    }
}

/// Creates the output directory; fails on the variant with `fail_label`
#[derive(Default)]
struct FakeTranscoder {
    fail_label: Option<&'static str>,
    calls: Mutex<Vec<VariantPlan>>,
}

#[async_trait]
impl Transcoder for FakeTranscoder {
    async fn transcode(&self, plan: &VariantPlan, _in_dir: &Path, out_dir: &Path) -> Result<String> {
        self.calls.lock().unwrap().push(*plan);
        if self.fail_label == Some(plan.label) {
            return Err(TranscodeError::Tool(ToolError::MissingOutput {
                program: "encoder".to_string(),
                path: out_dir.to_path_buf(),
            }));
        }
        tokio::fs::create_dir_all(out_dir).await?;
        Ok(format!("encode {}", plan.dir_suffix()))
    }
}

/// Writes an empty torrent file
#[derive(Default)]
struct FakePackager {
    built: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl PackageBuilder for FakePackager {
    async fn build(&self, _dir: &Path, torrent_path: &Path) -> Result<()> {
        tokio::fs::write(torrent_path, b"d8:announce0:e").await?;
        self.built.lock().unwrap().push(torrent_path.to_path_buf());
        Ok(())
    }
}

/// Serves one group and records every exchange
struct FakeCatalogue {
    group: TorrentGroup,
    reject_upload: bool,
    queries: Mutex<Vec<String>>,
    uploads: Mutex<Vec<SubmissionPayload>>,
}

impl FakeCatalogue {
    fn with_torrents(torrents: Vec<ExistingVariant>) -> Self {
        Self {
            group: TorrentGroup {
                group: GroupInfo {
                    id: 4242,
                    name: "Pointbreak".to_string(),
                },
                torrents,
            },
            reject_upload: false,
            queries: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
        }
    }

    fn query_count(&self) -> usize {
        self.queries.lock().unwrap().len()
    }

    fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl Catalogue for FakeCatalogue {
    async fn torrent_group(&self, info_hash: &str) -> Result<TorrentGroup> {
        self.queries.lock().unwrap().push(info_hash.to_string());
        Ok(self.group.clone())
    }

    async fn upload(&self, payload: &SubmissionPayload) -> Result<serde_json::Value> {
        self.uploads.lock().unwrap().push(payload.clone());
        if self.reject_upload {
            return Err(TranscodeError::Catalogue(CatalogueError::Rejected {
                action: "upload",
                status: "failure".to_string(),
                error: "Duplicate".to_string(),
            }));
        }
        Ok(serde_json::json!({ "torrentid": 99, "groupid": 4242 }))
    }
}

/// Input, transcode and torrent directories for one run
struct Workspace {
    _root: TempDir,
    input: PathBuf,
    config: RunConfig,
}

impl Workspace {
    fn new(origin: &OriginDescriptor) -> Self {
        let root = tempfile::tempdir().unwrap();
        let input = root.path().join("Vanilla - Pointbreak (2021) [FLAC 24]");
        let transcode_dir = root.path().join("transcodes");
        let torrent_dir = root.path().join("torrents");
        for dir in [&input, &transcode_dir, &torrent_dir] {
            std::fs::create_dir_all(dir).unwrap();
        }
        std::fs::write(input.join("origin.yaml"), origin_yaml(origin)).unwrap();

        let config = RunConfig {
            transcode_dir,
            torrent_dir,
            ..Default::default()
        };
        Self {
            _root: root,
            input,
            config,
        }
    }

    fn pipeline<'a>(
        &self,
        prober: FakeProber,
        transcoder: &'a FakeTranscoder,
        packager: &'a FakePackager,
        catalogue: &'a FakeCatalogue,
    ) -> Pipeline<FakeProber, &'a FakeTranscoder, &'a FakePackager, &'a FakeCatalogue> {
        Pipeline::new(prober, transcoder, packager, catalogue, &self.config)
    }
}

#[async_trait]
impl<T: Transcoder> Transcoder for &T {
    async fn transcode(&self, plan: &VariantPlan, in_dir: &Path, out_dir: &Path) -> Result<String> {
        (**self).transcode(plan, in_dir, out_dir).await
    }
}

#[async_trait]
impl<B: PackageBuilder> PackageBuilder for &B {
    async fn build(&self, dir: &Path, torrent_path: &Path) -> Result<()> {
        (**self).build(dir, torrent_path).await
    }
}

#[async_trait]
impl<C: Catalogue> Catalogue for &C {
    async fn torrent_group(&self, info_hash: &str) -> Result<TorrentGroup> {
        (**self).torrent_group(info_hash).await
    }

    async fn upload(&self, payload: &SubmissionPayload) -> Result<serde_json::Value> {
        (**self).upload(payload).await
    }
}

fn form_text(payload: &SubmissionPayload, name: &str) -> Vec<String> {
    payload
        .form_fields()
        .into_iter()
        .filter(|f| f.name == name)
        .filter_map(|f| match f.value {
            FormValue::Text(text) => Some(text),
            _ => None,
        })
        .collect()
}

#[tokio::test]
async fn test_fresh_24bit_release_gets_all_three_variants() {
    let ws = Workspace::new(&origin());
    let transcoder = FakeTranscoder::default();
    let packager = FakePackager::default();
    let catalogue = FakeCatalogue::with_torrents(vec![variant(
        "WEB",
        "24bit Lossless",
        None,
        None,
        Some(2021),
        None,
    )]);

    let outcome = ws
        .pipeline(FakeProber::uniform(96_000, 24), &transcoder, &packager, &catalogue)
        .process(&ws.input)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CandidateOutcome::Submitted {
            packages: 3,
            planned: 3,
            incomplete: None
        }
    );
    assert_eq!(
        *transcoder.calls.lock().unwrap(),
        vec![
            VariantPlan::flac16(48_000),
            VariantPlan::mp3(Mp3Preset::V0),
            VariantPlan::mp3(Mp3Preset::Cbr320),
        ]
    );

    let built = packager.built.lock().unwrap().clone();
    let names: Vec<_> = built
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        vec![
            "Vanilla - Pointbreak (2021) - WEB FLAC.torrent",
            "Vanilla - Pointbreak (2021) - WEB V0.torrent",
            "Vanilla - Pointbreak (2021) - WEB 320.torrent",
        ]
    );
    assert!(ws
        .config
        .transcode_dir
        .join("Vanilla - Pointbreak (2021) - WEB V0")
        .is_dir());

    let uploads = catalogue.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    let payload = &uploads[0];
    assert_eq!(payload.group_id, 4242);
    assert_eq!(payload.entries[0].package.format, FormatKind::Flac);
    assert_eq!(form_text(payload, "bitrate"), vec!["Lossless"]);
    assert_eq!(form_text(payload, "extra_format[]"), vec!["MP3", "MP3"]);
    assert_eq!(form_text(payload, "extra_bitrate[]"), vec!["V0 (VBR)", "320"]);
    assert_eq!(
        form_text(payload, "extra_release_desc[]"),
        vec![
            "Source: https://redacted.ch/torrents.php?torrentid=1. Method: encode V0",
            "Source: https://redacted.ch/torrents.php?torrentid=1. Method: encode 320",
        ]
    );
}

#[tokio::test]
async fn test_16bit_release_with_320_gets_only_v0() {
    let mut o = origin();
    o.encoding = "Lossless".to_string();
    let ws = Workspace::new(&o);
    let transcoder = FakeTranscoder::default();
    let packager = FakePackager::default();
    let catalogue = FakeCatalogue::with_torrents(vec![
        variant("WEB", "Lossless", None, None, Some(2021), None),
        variant("WEB", "320", None, None, Some(2021), None),
    ]);

    let outcome = ws
        .pipeline(FakeProber::uniform(44_100, 16), &transcoder, &packager, &catalogue)
        .process(&ws.input)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CandidateOutcome::Submitted {
            packages: 1,
            planned: 1,
            incomplete: None
        }
    );
    assert_eq!(
        *transcoder.calls.lock().unwrap(),
        vec![VariantPlan::mp3(Mp3Preset::V0)]
    );
    let uploads = catalogue.uploads.lock().unwrap();
    assert_eq!(form_text(&uploads[0], "bitrate"), vec!["V0 (VBR)"]);
    assert!(uploads[0].extras().is_empty());
}

#[tokio::test]
async fn test_mixed_bit_depth_skips_flac16_only() {
    let ws = Workspace::new(&origin());
    let transcoder = FakeTranscoder::default();
    let packager = FakePackager::default();
    let catalogue = FakeCatalogue::with_torrents(vec![]);

    let prober = FakeProber::per_file(&[(96_000, 24), (96_000, 16)]);
    ws.pipeline(prober, &transcoder, &packager, &catalogue)
        .process(&ws.input)
        .await
        .unwrap();

    assert_eq!(
        *transcoder.calls.lock().unwrap(),
        vec![
            VariantPlan::mp3(Mp3Preset::V0),
            VariantPlan::mp3(Mp3Preset::Cbr320),
        ]
    );
}

#[tokio::test]
async fn test_missing_artist_tag_makes_no_network_call() {
    let ws = Workspace::new(&origin());
    let transcoder = FakeTranscoder::default();
    let packager = FakePackager::default();
    let catalogue = FakeCatalogue::with_torrents(vec![]);

    let prober = FakeProber::uniform(96_000, 24).without_tag("ARTIST");
    let outcome = ws
        .pipeline(prober, &transcoder, &packager, &catalogue)
        .process(&ws.input)
        .await
        .unwrap();

    match outcome {
        CandidateOutcome::ValidationFailed(missing) => {
            assert_eq!(missing.files.len(), 2);
            assert!(missing.files.iter().all(|(_, tags)| tags == &vec!["ARTIST"]));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(catalogue.query_count(), 0);
    assert_eq!(catalogue.upload_count(), 0);
    assert!(transcoder.calls.lock().unwrap().is_empty());
    assert!(packager.built.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_executor_failure_submits_what_was_produced() {
    let ws = Workspace::new(&origin());
    let transcoder = FakeTranscoder {
        fail_label: Some("V0 (VBR)"),
        ..Default::default()
    };
    let packager = FakePackager::default();
    let catalogue = FakeCatalogue::with_torrents(vec![]);

    let outcome = ws
        .pipeline(FakeProber::uniform(88_200, 24), &transcoder, &packager, &catalogue)
        .process(&ws.input)
        .await
        .unwrap();

    match outcome {
        CandidateOutcome::Submitted {
            packages,
            planned,
            incomplete,
        } => {
            assert_eq!(packages, 1);
            assert_eq!(planned, 3);
            assert!(incomplete.unwrap().starts_with("MP3 V0 (VBR)"));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    // 320 is never attempted once V0 fails
    assert_eq!(transcoder.calls.lock().unwrap().len(), 2);

    let uploads = catalogue.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].entries.len(), 1);
    assert_eq!(
        uploads[0].entries[0].package.output_dir.file_name().unwrap(),
        "Vanilla - Pointbreak (2021) - WEB FLAC"
    );
}

#[tokio::test]
async fn test_first_executor_failure_is_an_error() {
    let ws = Workspace::new(&origin());
    let transcoder = FakeTranscoder {
        fail_label: Some("Lossless"),
        ..Default::default()
    };
    let packager = FakePackager::default();
    let catalogue = FakeCatalogue::with_torrents(vec![]);

    let result = ws
        .pipeline(FakeProber::uniform(96_000, 24), &transcoder, &packager, &catalogue)
        .process(&ws.input)
        .await;

    assert!(matches!(result, Err(TranscodeError::Tool(_))));
    assert_eq!(catalogue.upload_count(), 0);
}

#[tokio::test]
async fn test_non_flac_source_is_skipped() {
    let mut o = origin();
    o.format = "MP3".to_string();
    let ws = Workspace::new(&o);
    let transcoder = FakeTranscoder::default();
    let packager = FakePackager::default();
    let catalogue = FakeCatalogue::with_torrents(vec![]);

    let outcome = ws
        .pipeline(FakeProber::uniform(44_100, 16), &transcoder, &packager, &catalogue)
        .process(&ws.input)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CandidateOutcome::Skipped {
            format: "MP3".to_string()
        }
    );
    assert_eq!(catalogue.query_count(), 0);
}

#[tokio::test]
async fn test_everything_present_is_nothing_to_do() {
    let ws = Workspace::new(&origin());
    let transcoder = FakeTranscoder::default();
    let packager = FakePackager::default();
    let catalogue = FakeCatalogue::with_torrents(vec![
        variant("WEB", "Lossless", None, None, Some(2021), None),
        variant("WEB", "V0 (VBR)", None, None, Some(2021), None),
        variant("WEB", "320", None, None, Some(2021), None),
    ]);

    let outcome = ws
        .pipeline(FakeProber::uniform(96_000, 24), &transcoder, &packager, &catalogue)
        .process(&ws.input)
        .await
        .unwrap();

    assert_eq!(outcome, CandidateOutcome::NothingToDo);
    assert_eq!(catalogue.query_count(), 1);
    assert_eq!(catalogue.upload_count(), 0);
}

#[tokio::test]
async fn test_other_edition_does_not_count() {
    let ws = Workspace::new(&origin());
    let transcoder = FakeTranscoder::default();
    let packager = FakePackager::default();
    // Same encodings, but on CD
    let catalogue = FakeCatalogue::with_torrents(vec![
        variant("CD", "Lossless", None, None, Some(2021), None),
        variant("CD", "V0 (VBR)", None, None, Some(2021), None),
        variant("CD", "320", None, None, Some(2021), None),
    ]);

    let outcome = ws
        .pipeline(FakeProber::uniform(96_000, 24), &transcoder, &packager, &catalogue)
        .process(&ws.input)
        .await
        .unwrap();

    assert!(matches!(
        outcome,
        CandidateOutcome::Submitted { packages: 3, .. }
    ));
}

#[tokio::test]
async fn test_dry_run_plans_without_side_effects() {
    let mut ws = Workspace::new(&origin());
    ws.config.dry_run = true;
    let transcoder = FakeTranscoder::default();
    let packager = FakePackager::default();
    let catalogue = FakeCatalogue::with_torrents(vec![]);

    let outcome = ws
        .pipeline(FakeProber::uniform(192_000, 24), &transcoder, &packager, &catalogue)
        .process(&ws.input)
        .await
        .unwrap();

    assert_eq!(
        outcome,
        CandidateOutcome::Planned(vec![
            VariantPlan::flac16(48_000),
            VariantPlan::mp3(Mp3Preset::V0),
            VariantPlan::mp3(Mp3Preset::Cbr320),
        ])
    );
    assert!(transcoder.calls.lock().unwrap().is_empty());
    assert!(packager.built.lock().unwrap().is_empty());
    assert_eq!(catalogue.upload_count(), 0);
}

#[tokio::test]
async fn test_rejected_upload_is_an_error() {
    let ws = Workspace::new(&origin());
    let transcoder = FakeTranscoder::default();
    let packager = FakePackager::default();
    let mut catalogue = FakeCatalogue::with_torrents(vec![]);
    catalogue.reject_upload = true;

    let result = ws
        .pipeline(FakeProber::uniform(96_000, 24), &transcoder, &packager, &catalogue)
        .process(&ws.input)
        .await;

    assert!(matches!(
        result,
        Err(TranscodeError::Catalogue(CatalogueError::Rejected { .. }))
    ));
    assert_eq!(catalogue.upload_count(), 1);
}

#[tokio::test]
async fn test_batch_continues_past_failures() {
    let ws = Workspace::new(&origin());
    let transcoder = FakeTranscoder::default();
    let packager = FakePackager::default();
    let catalogue = FakeCatalogue::with_torrents(vec![]);

    let missing = ws.input.with_file_name("no such release");
    let mut with_slash = ws.input.clone().into_os_string();
    with_slash.push("/");
    let dirs = vec![missing.clone(), PathBuf::from(with_slash)];

    let report = ws
        .pipeline(FakeProber::uniform(96_000, 24), &transcoder, &packager, &catalogue)
        .run_batch(&dirs)
        .await;

    assert!(!report.is_success());
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].0, missing);
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(report.outcomes[0].0, ws.input);
    assert_eq!(catalogue.upload_count(), 1);
}
