//! Submission payload assembly

use std::path::PathBuf;

use thiserror::Error;

use crate::origin::EditionIdentity;
use crate::plan::{FormatKind, VariantPlan};

/// The remote form takes one primary file plus this many extras
pub const MAX_EXTRA_FILES: usize = 2;

/// A variant that was transcoded and packaged
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducedPackage {
    pub format: FormatKind,
    /// Bitrate label ("Lossless", "V0 (VBR)", "320")
    pub label: &'static str,
    pub output_dir: PathBuf,
    pub torrent_path: PathBuf,
    /// The exact encoder invocation, for the release description
    pub method: String,
}

impl ProducedPackage {
    pub fn new(plan: &VariantPlan, output_dir: PathBuf, torrent_path: PathBuf, method: String) -> Self {
        Self {
            format: plan.format,
            label: plan.label,
            output_dir,
            torrent_path,
            method,
        }
    }
}

/// One package with its release description
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionEntry {
    pub package: ProducedPackage,
    pub release_desc: String,
}

/// Everything sent to the catalogue for one release, packages in slot order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionPayload {
    pub group_id: u64,
    pub edition: EditionIdentity,
    pub scene: bool,
    pub unknown: bool,
    pub entries: Vec<SubmissionEntry>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AssemblyError {
    #[error("No packages were produced")]
    NoPackages,

    #[error("{0} packages produced, at most {} fit one submission", MAX_EXTRA_FILES + 1)]
    TooManyPackages(usize),
}

/// A value in the flat form layout
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormValue {
    Text(String),
    Flag(bool),
    File(PathBuf),
}

/// One named form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub value: FormValue,
}

impl FormField {
    fn text(name: &str, value: impl Into<String>) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::Text(value.into()),
        }
    }

    fn flag(name: &str, value: bool) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::Flag(value),
        }
    }

    fn file(name: &str, path: PathBuf) -> Self {
        Self {
            name: name.to_string(),
            value: FormValue::File(path),
        }
    }

    /// Falsy values (false flags, empty text) are not sent at all
    pub fn is_sent(&self) -> bool {
        match &self.value {
            FormValue::Text(text) => !text.is_empty(),
            FormValue::Flag(flag) => *flag,
            FormValue::File(_) => true,
        }
    }
}

/// Source attribution plus the encoder invocation
pub fn release_description(permalink: &str, method: &str) -> String {
    format!("Source: {}. Method: {}", permalink, method)
}

/// Build the submission from packages in production order
pub fn assemble(
    group_id: u64,
    edition: &EditionIdentity,
    permalink: &str,
    packages: Vec<ProducedPackage>,
) -> Result<SubmissionPayload, AssemblyError> {
    if packages.is_empty() {
        return Err(AssemblyError::NoPackages);
    }
    if packages.len() > MAX_EXTRA_FILES + 1 {
        return Err(AssemblyError::TooManyPackages(packages.len()));
    }

    let entries = packages
        .into_iter()
        .map(|package| SubmissionEntry {
            release_desc: release_description(permalink, &package.method),
            package,
        })
        .collect();

    Ok(SubmissionPayload {
        group_id,
        edition: edition.clone(),
        scene: false,
        unknown: false,
        entries,
    })
}

impl SubmissionPayload {
    /// The primary package
    pub fn primary(&self) -> Option<&SubmissionEntry> {
        self.entries.first()
    }

    /// Packages after the primary, in slot order
    pub fn extras(&self) -> &[SubmissionEntry] {
        self.entries.get(1..).unwrap_or(&[])
    }

    /// Flatten into the remote form layout: the primary package fills the
    /// `file_input`/`format`/`bitrate`/`release_desc` slot, later packages
    /// fill `extra_file_N` plus parallel `extra_*[]` arrays.
    pub fn form_fields(&self) -> Vec<FormField> {
        let edition = &self.edition;
        let mut fields = vec![
            FormField::text("groupid", self.group_id.to_string()),
            FormField::flag("unknown", self.unknown),
            FormField::text(
                "remaster_year",
                edition
                    .remaster_year
                    .map(|y| y.to_string())
                    .unwrap_or_default(),
            ),
            FormField::text(
                "remaster_title",
                edition.remaster_title.clone().unwrap_or_default(),
            ),
            FormField::text(
                "remaster_record_label",
                edition.remaster_record_label.clone().unwrap_or_default(),
            ),
            FormField::text(
                "remaster_catalogue_number",
                edition.remaster_catalogue_number.clone().unwrap_or_default(),
            ),
            FormField::flag("scene", self.scene),
            FormField::text("media", edition.media.clone()),
        ];

        if let Some(primary) = self.primary() {
            fields.push(FormField::file(
                "file_input",
                primary.package.torrent_path.clone(),
            ));
            fields.push(FormField::text("bitrate", primary.package.label));
            fields.push(FormField::text("format", primary.package.format.as_str()));
            fields.push(FormField::text("release_desc", primary.release_desc.clone()));
        }

        let extras = self.extras();
        for (i, extra) in extras.iter().enumerate() {
            fields.push(FormField::file(
                &format!("extra_file_{}", i + 1),
                extra.package.torrent_path.clone(),
            ));
        }
        for extra in extras {
            fields.push(FormField::text("extra_format[]", extra.package.format.as_str()));
        }
        for extra in extras {
            fields.push(FormField::text("extra_bitrate[]", extra.package.label));
        }
        for extra in extras {
            fields.push(FormField::text("extra_release_desc[]", extra.release_desc.clone()));
        }

        fields
    }
}
