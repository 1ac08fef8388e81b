//! Output directory and torrent file naming

use std::path::{Path, PathBuf};

use crate::origin::OriginDescriptor;
use crate::plan::VariantPlan;

// helper.
macro_rules! regex {
    ($re:literal $(,)?) => {{
        static RE: std::sync::OnceLock<regex::Regex> = std::sync::OnceLock::new();
        RE.get_or_init(|| regex::Regex::new($re).unwrap())
    }};
}

/// Make a string safe to use as a single path component
pub fn sanitize_filename(name: &str) -> String {
    let name = name.replace('/', "\u{2215}");
    let name = name.strip_prefix('~').unwrap_or(&name);
    let name = match name.strip_suffix('.') {
        Some(stem) => format!("{}_", stem),
        None => name.to_string(),
    };
    let name = regex!(r"[\x01-\x1f]").replace_all(&name, "_");
    let name = regex!(r#"[<>:"?*|]"#).replace_all(&name, "_");
    name.trim().to_string()
}

/// Where the variants of one release are written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    /// Shared prefix of all variant directories
    base: PathBuf,
    torrent_dir: PathBuf,
}

impl OutputLayout {
    /// `{artist} - {name} [({edition})] [({year})] - {media}` under the
    /// transcode dir. The year is left out when neither an edition year nor
    /// an original year is known.
    pub fn new(origin: &OriginDescriptor, transcode_dir: &Path, torrent_dir: &Path) -> Self {
        let mut name = sanitize_filename(&format!("{} - {}", origin.artist, origin.name));
        if let Some(title) = origin.edition.as_deref().filter(|t| !t.is_empty()) {
            name.push_str(&format!(" ({})", title));
        }
        if let Some(year) = origin.year() {
            name.push_str(&format!(" ({})", year));
        }
        name.push_str(&format!(" - {}", origin.media));

        Self {
            base: transcode_dir.join(name),
            torrent_dir: torrent_dir.to_path_buf(),
        }
    }

    /// Output directory of one variant, e.g. `... - WEB V0`
    pub fn output_dir(&self, plan: &VariantPlan) -> PathBuf {
        let mut dir = self.base.clone().into_os_string();
        dir.push(" ");
        dir.push(plan.dir_suffix());
        PathBuf::from(dir)
    }

    /// Torrent file for an output directory, named after it
    pub fn torrent_path(&self, output_dir: &Path) -> PathBuf {
        let mut file = output_dir
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        file.push(".torrent");
        self.torrent_dir.join(file)
    }
}
