//! Render once per size, then write every requested artifact.

use crate::bundle::{IconBundle, RenderedIcon};
use crate::error::ExportError;
use crate::icns_export::{self, write_iconset};
use crate::ico_export::{write_ico, ICO_SIZES};
use crate::packager::IconsetPackager;
use crate::source::SourceImage;
use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

/// Default location of generated icons, relative to the project root.
pub const DEFAULT_OUT_DIR: &str = "resources/icons";

/// Stem shared by every output file.
pub const BASE_NAME: &str = "app_icon";

/// Sizes written as flat `app_icon_<N>x<N>.png` files.
pub const PNG_SIZES: &[u32] = &[16, 32, 48, 64, 128, 256, 512, 1024];

/// Size of `app_icon.png`.
pub const STANDARD_PNG_SIZE: u32 = 64;

/// Size of `app_icon_hires.png`.
pub const HIRES_PNG_SIZE: u32 = 1024;

/// What to produce and where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportPlan {
    pub out_dir: PathBuf,
    pub base_name: String,
    pub png_sizes: Vec<u32>,
    pub ico_sizes: Vec<u32>,
    pub pngs: bool,
    pub ico: bool,
    pub icns: bool,
}

impl ExportPlan {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        ExportPlan {
            out_dir: out_dir.into(),
            base_name: BASE_NAME.to_string(),
            png_sizes: PNG_SIZES.to_vec(),
            ico_sizes: ICO_SIZES.to_vec(),
            pngs: true,
            ico: true,
            icns: true,
        }
    }

    /// Every size some enabled artifact needs, ascending.
    pub fn required_sizes(&self) -> Vec<u32> {
        let mut sizes = BTreeSet::new();
        if self.pngs {
            sizes.extend(self.png_sizes.iter().copied());
            sizes.insert(STANDARD_PNG_SIZE);
            sizes.insert(HIRES_PNG_SIZE);
        }
        if self.ico {
            sizes.extend(self.ico_sizes.iter().copied());
        }
        if self.icns {
            sizes.extend(icns_export::required_sizes());
        }
        sizes.into_iter().collect()
    }

    pub fn path_for(&self, suffix: &str) -> PathBuf {
        self.out_dir.join(format!("{}{}", self.base_name, suffix))
    }

    /// Report name standing for the whole set of PNG files.
    pub fn png_group_name(&self) -> String {
        format!("{}*.png", self.base_name)
    }
}

/// Progress event emitted during an export.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportEvent {
    /// A size rendered successfully
    Rendered { size: u32, index: usize, total: usize },
    /// A size failed to render and was skipped
    RenderFailed { size: u32, reason: String },
    /// A file was written
    Wrote { path: PathBuf },
    /// A container was written without some of its sizes
    Incomplete { path: PathBuf, missing: Vec<u32> },
    /// An artifact could not be produced
    NotProduced { artifact: String, reason: String },
    /// An artifact was left out of the plan
    Skipped { artifact: String },
}

/// Final state of one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactStatus {
    Produced { path: PathBuf },
    Incomplete { path: PathBuf, missing: Vec<u32> },
    NotProduced { reason: String },
    Skipped,
}

impl ArtifactStatus {
    /// True when the artifact counts toward a fully successful run.
    pub fn is_success(&self) -> bool {
        matches!(self, ArtifactStatus::Produced { .. } | ArtifactStatus::Skipped)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReport {
    pub name: String,
    pub status: ArtifactStatus,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFailure {
    pub size: u32,
    pub reason: String,
}

/// Summary of a whole export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportReport {
    pub rendered: Vec<u32>,
    pub render_failures: Vec<RenderFailure>,
    pub artifacts: Vec<ArtifactReport>,
}

impl ExportReport {
    /// True only if every size rendered and every artifact was produced.
    pub fn is_complete(&self) -> bool {
        self.render_failures.is_empty() && self.artifacts.iter().all(|a| a.status.is_success())
    }

    pub fn artifact(&self, name: &str) -> Option<&ArtifactStatus> {
        self.artifacts
            .iter()
            .find(|a| a.name == name)
            .map(|a| &a.status)
    }
}

/// Render every size once, skipping (and reporting) sizes that fail.
pub fn render_bundle<F>(
    source: &SourceImage,
    sizes: &[u32],
    mut on_event: F,
) -> (IconBundle, Vec<RenderFailure>)
where
    F: FnMut(ExportEvent),
{
    let mut bundle = IconBundle::new();
    let mut failures = Vec::new();
    let total = sizes.len();

    for (index, &size) in sizes.iter().enumerate() {
        let result = source
            .render(size)
            .map_err(|e| e.to_string())
            .and_then(|image| RenderedIcon::new(image).map_err(|e| e.to_string()))
            .and_then(|icon| bundle.insert(icon).map_err(|e| e.to_string()));

        match result {
            Ok(()) => on_event(ExportEvent::Rendered { size, index, total }),
            Err(reason) => {
                log::warn!("render of {}x{} failed: {}", size, size, reason);
                on_event(ExportEvent::RenderFailed {
                    size,
                    reason: reason.clone(),
                });
                failures.push(RenderFailure { size, reason });
            }
        }
    }

    (bundle, failures)
}

/// Write an ICO with the requested sizes that rendered.
pub fn export_ico(bundle: &IconBundle, sizes: &[u32], path: &Path) -> ArtifactStatus {
    let (icons, missing) = bundle.select(sizes);
    if icons.is_empty() {
        return ArtifactStatus::NotProduced {
            reason: "none of the ICO sizes rendered".to_string(),
        };
    }

    match write_ico(&icons, path) {
        Ok(_) if missing.is_empty() => ArtifactStatus::Produced {
            path: path.to_path_buf(),
        },
        Ok(_) => ArtifactStatus::Incomplete {
            path: path.to_path_buf(),
            missing,
        },
        Err(e) => ArtifactStatus::NotProduced {
            reason: e.to_string(),
        },
    }
}

/// Stage an iconset in a temporary directory and hand it to `packager`.
///
/// Staging problems are reported as `NotProduced` like any packager failure.
pub fn export_icns(
    bundle: &IconBundle,
    base_name: &str,
    packager: &dyn IconsetPackager,
    path: &Path,
) -> ArtifactStatus {
    let staging = match tempfile::Builder::new().prefix("icon-gen").tempdir() {
        Ok(staging) => staging,
        Err(e) => return not_produced(ExportError::TempDirFailed(e)),
    };
    let iconset = staging.path().join(format!("{}.iconset", base_name));
    package_iconset(bundle, &iconset, packager, path)
}

fn package_iconset(
    bundle: &IconBundle,
    iconset: &Path,
    packager: &dyn IconsetPackager,
    path: &Path,
) -> ArtifactStatus {
    let contents = match write_iconset(bundle, iconset) {
        Ok(contents) => contents,
        Err(e) => return not_produced(e),
    };
    if contents.written.is_empty() {
        return ArtifactStatus::NotProduced {
            reason: "none of the ICNS sizes rendered".to_string(),
        };
    }

    match packager.package(iconset, path) {
        Ok(()) if contents.is_complete() => ArtifactStatus::Produced {
            path: path.to_path_buf(),
        },
        Ok(()) => ArtifactStatus::Incomplete {
            path: path.to_path_buf(),
            missing: contents.missing_sizes(),
        },
        Err(e) => not_produced(e),
    }
}

fn not_produced(error: impl std::fmt::Display) -> ArtifactStatus {
    log::warn!("{}", error);
    ArtifactStatus::NotProduced {
        reason: error.to_string(),
    }
}

/// Write one PNG, or report why it could not be written.
fn export_png(bundle: &IconBundle, size: u32, path: &Path) -> ArtifactStatus {
    let Some(icon) = bundle.get(size) else {
        return ArtifactStatus::NotProduced {
            reason: format!("{}x{} did not render", size, size),
        };
    };

    match icon.image().save_with_format(path, image::ImageFormat::Png) {
        Ok(()) => ArtifactStatus::Produced {
            path: path.to_path_buf(),
        },
        Err(e) => ArtifactStatus::NotProduced {
            reason: format!("failed to write {}: {}", path.display(), e),
        },
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Run the full export described by `plan`.
///
/// Individual render or artifact failures are recorded in the report and
/// do not stop the run. Only an unusable output directory is fatal.
pub fn export<F>(
    source: &SourceImage,
    plan: &ExportPlan,
    packager: &dyn IconsetPackager,
    mut on_event: F,
) -> Result<ExportReport, ExportError>
where
    F: FnMut(ExportEvent),
{
    fs::create_dir_all(&plan.out_dir).map_err(|e| ExportError::OutputDirCreationFailed {
        path: plan.out_dir.clone(),
        source: e,
    })?;

    let sizes = plan.required_sizes();
    let (bundle, render_failures) = render_bundle(source, &sizes, &mut on_event);

    let mut report = ExportReport {
        rendered: bundle.sizes(),
        render_failures,
        artifacts: Vec::new(),
    };

    let mut record = |name: String, status: ArtifactStatus, on_event: &mut F| {
        match &status {
            ArtifactStatus::Produced { path } => {
                on_event(ExportEvent::Wrote { path: path.clone() })
            }
            ArtifactStatus::Incomplete { path, missing } => on_event(ExportEvent::Incomplete {
                path: path.clone(),
                missing: missing.clone(),
            }),
            ArtifactStatus::NotProduced { reason } => on_event(ExportEvent::NotProduced {
                artifact: name.clone(),
                reason: reason.clone(),
            }),
            ArtifactStatus::Skipped => on_event(ExportEvent::Skipped {
                artifact: name.clone(),
            }),
        }
        report.artifacts.push(ArtifactReport { name, status });
    };

    if plan.pngs {
        let mut targets: Vec<(u32, PathBuf)> = plan
            .png_sizes
            .iter()
            .map(|&size| (size, plan.path_for(&format!("_{}x{}.png", size, size))))
            .collect();
        targets.push((STANDARD_PNG_SIZE, plan.path_for(".png")));
        targets.push((HIRES_PNG_SIZE, plan.path_for("_hires.png")));

        for (size, path) in targets {
            let status = export_png(&bundle, size, &path);
            record(file_name(&path), status, &mut on_event);
        }
    } else {
        record(plan.png_group_name(), ArtifactStatus::Skipped, &mut on_event);
    }

    let ico_path = plan.path_for(".ico");
    let ico_status = if plan.ico {
        export_ico(&bundle, &plan.ico_sizes, &ico_path)
    } else {
        ArtifactStatus::Skipped
    };
    record(file_name(&ico_path), ico_status, &mut on_event);

    let icns_path = plan.path_for(".icns");
    let icns_status = if plan.icns {
        export_icns(&bundle, &plan.base_name, packager, &icns_path)
    } else {
        ArtifactStatus::Skipped
    };
    record(file_name(&icns_path), icns_status, &mut on_event);

    Ok(report)
}
