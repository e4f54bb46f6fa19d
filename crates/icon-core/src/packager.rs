//! Turning an `.iconset` directory into an `.icns` file.

use crate::icns_export::ICNS_SLOTS;
use icns::{IconFamily, Image};
use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Error type for packaging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackagerError {
    /// The packager cannot run in this environment
    Unavailable { packager: &'static str, reason: String },
    /// The packager ran and failed
    Failed {
        packager: &'static str,
        exit_code: Option<i32>,
        reason: String,
    },
}

impl fmt::Display for PackagerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PackagerError::Unavailable { packager, reason } => {
                write!(f, "{} unavailable: {}", packager, reason)
            }
            PackagerError::Failed {
                packager,
                exit_code: Some(code),
                reason,
            } => write!(f, "{} failed (exit code {}): {}", packager, code, reason),
            PackagerError::Failed {
                packager, reason, ..
            } => write!(f, "{} failed: {}", packager, reason),
        }
    }
}

impl std::error::Error for PackagerError {}

/// Remove a leftover output so only a fresh write can satisfy the caller.
fn remove_stale_output(packager: &'static str, output: &Path) -> Result<(), PackagerError> {
    match fs::remove_file(output) {
        Ok(()) => {
            log::debug!("removed stale {}", output.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PackagerError::Failed {
            packager,
            exit_code: None,
            reason: format!("cannot replace {}: {}", output.display(), e),
        }),
    }
}

/// Capability that assembles an `.icns` container from an iconset directory.
pub trait IconsetPackager {
    fn name(&self) -> &'static str;

    /// Cheap check for whether `package` can work here.
    fn is_available(&self) -> bool;

    fn package(&self, iconset: &Path, output: &Path) -> Result<(), PackagerError>;
}

/// Apple's `iconutil`, run as a subprocess.
#[derive(Debug, Clone)]
pub struct Iconutil {
    program: PathBuf,
}

impl Iconutil {
    pub fn new() -> Self {
        Self::with_program("iconutil")
    }

    /// Use a specific executable instead of looking up `iconutil` on PATH.
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Iconutil {
            program: program.into(),
        }
    }
}

impl Default for Iconutil {
    fn default() -> Self {
        Self::new()
    }
}

impl IconsetPackager for Iconutil {
    fn name(&self) -> &'static str {
        "iconutil"
    }

    fn is_available(&self) -> bool {
        // iconutil has no version flag; being able to spawn it is enough
        Command::new(&self.program).arg("--help").output().is_ok()
    }

    fn package(&self, iconset: &Path, output: &Path) -> Result<(), PackagerError> {
        remove_stale_output(self.name(), output)?;
        log::debug!(
            "running {} -c icns {} -o {}",
            self.program.display(),
            iconset.display(),
            output.display()
        );
        let result = Command::new(&self.program)
            .args(["-c", "icns"])
            .arg(iconset)
            .arg("-o")
            .arg(output)
            .output();

        let output_status = match result {
            Ok(out) => out,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(PackagerError::Unavailable {
                    packager: self.name(),
                    reason: format!("'{}' not found", self.program.display()),
                });
            }
            Err(e) => {
                return Err(PackagerError::Failed {
                    packager: self.name(),
                    exit_code: None,
                    reason: e.to_string(),
                });
            }
        };

        if !output_status.status.success() {
            return Err(PackagerError::Failed {
                packager: self.name(),
                exit_code: output_status.status.code(),
                reason: String::from_utf8_lossy(&output_status.stderr).trim().to_string(),
            });
        }

        if !output.exists() {
            return Err(PackagerError::Failed {
                packager: self.name(),
                exit_code: output_status.status.code(),
                reason: format!("no file written at {}", output.display()),
            });
        }

        Ok(())
    }
}

/// In-process ICNS writer built on the `icns` crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeIcns;

impl NativeIcns {
    fn fail(reason: String) -> PackagerError {
        PackagerError::Failed {
            packager: "native",
            exit_code: None,
            reason,
        }
    }
}

impl IconsetPackager for NativeIcns {
    fn name(&self) -> &'static str {
        "native"
    }

    fn is_available(&self) -> bool {
        true
    }

    fn package(&self, iconset: &Path, output: &Path) -> Result<(), PackagerError> {
        remove_stale_output(self.name(), output)?;
        let mut family = IconFamily::new();
        let mut added = 0;

        for slot in ICNS_SLOTS {
            let path = iconset.join(slot.file_name());
            if !path.exists() {
                continue;
            }

            let file = File::open(&path)
                .map_err(|e| Self::fail(format!("failed to open {}: {}", path.display(), e)))?;
            let image = Image::read_png(BufReader::new(file))
                .map_err(|e| Self::fail(format!("failed to read {}: {}", path.display(), e)))?;
            family
                .add_icon_with_type(&image, slot.icon_type)
                .map_err(|e| Self::fail(format!("failed to add {}: {}", slot.name, e)))?;
            added += 1;
        }

        if added == 0 {
            return Err(Self::fail(format!(
                "iconset {} has no recognised slots",
                iconset.display()
            )));
        }

        let file = File::create(output)
            .map_err(|e| Self::fail(format!("failed to create {}: {}", output.display(), e)))?;
        let mut writer = BufWriter::new(file);
        family
            .write(&mut writer)
            .and_then(|()| writer.flush())
            .map_err(|e| Self::fail(format!("failed to write {}: {}", output.display(), e)))?;

        log::debug!("packed {} icns elements into {}", added, output.display());
        Ok(())
    }
}

/// Stand-in for environments without any packager.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPackager;

impl IconsetPackager for NoPackager {
    fn name(&self) -> &'static str {
        "none"
    }

    fn is_available(&self) -> bool {
        false
    }

    fn package(&self, _iconset: &Path, _output: &Path) -> Result<(), PackagerError> {
        Err(PackagerError::Unavailable {
            packager: self.name(),
            reason: "ICNS packaging is disabled".to_string(),
        })
    }
}

/// Which packager to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PackagerChoice {
    /// `iconutil` on macOS, the native writer elsewhere
    #[default]
    Auto,
    Iconutil,
    Native,
    None,
}

impl PackagerChoice {
    pub fn select(self) -> Box<dyn IconsetPackager> {
        match self {
            PackagerChoice::Auto if cfg!(target_os = "macos") => Box::new(Iconutil::new()),
            PackagerChoice::Auto => Box::new(NativeIcns),
            PackagerChoice::Iconutil => Box::new(Iconutil::new()),
            PackagerChoice::Native => Box::new(NativeIcns),
            PackagerChoice::None => Box::new(NoPackager),
        }
    }
}

/// Every packager this build knows about, for availability reports.
pub fn all_packagers() -> Vec<Box<dyn IconsetPackager>> {
    vec![Box::new(Iconutil::new()), Box::new(NativeIcns), Box::new(NoPackager)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bundle::{IconBundle, RenderedIcon};
    use crate::icns_export::{required_sizes, write_iconset};
    use crate::render::{render_glyph, GlyphStyle};
    use tempfile::tempdir;

    fn full_iconset(dir: &Path) -> PathBuf {
        let mut bundle = IconBundle::new();
        for size in required_sizes() {
            let image = render_glyph(size, &GlyphStyle::canonical()).unwrap();
            bundle.insert(RenderedIcon::new(image).unwrap()).unwrap();
        }
        let iconset = dir.join("app_icon.iconset");
        write_iconset(&bundle, &iconset).unwrap();
        iconset
    }

    #[test]
    fn no_packager_reports_unavailable() {
        let dir = tempdir().unwrap();
        let packager = NoPackager;
        assert!(!packager.is_available());

        let result = packager.package(dir.path(), &dir.path().join("out.icns"));
        assert!(matches!(
            result,
            Err(PackagerError::Unavailable { packager: "none", .. })
        ));
    }

    #[test]
    fn missing_iconutil_binary_is_unavailable() {
        let dir = tempdir().unwrap();
        let packager = Iconutil::with_program("/nonexistent/bin/iconutil");
        assert!(!packager.is_available());

        let result = packager.package(dir.path(), &dir.path().join("out.icns"));
        assert!(matches!(result, Err(PackagerError::Unavailable { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_reports_exit_code() {
        let dir = tempdir().unwrap();
        let packager = Iconutil::with_program("false");

        let result = packager.package(dir.path(), &dir.path().join("out.icns"));
        assert!(matches!(
            result,
            Err(PackagerError::Failed {
                exit_code: Some(1),
                ..
            })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn succeeding_tool_without_output_is_a_failure() {
        let dir = tempdir().unwrap();
        let packager = Iconutil::with_program("true");

        let result = packager.package(dir.path(), &dir.path().join("out.icns"));
        assert!(matches!(result, Err(PackagerError::Failed { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn stale_output_does_not_count_as_written() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("app_icon.icns");
        fs::write(&output, b"left over from an earlier run").unwrap();
        let packager = Iconutil::with_program("true");

        let result = packager.package(dir.path(), &output);
        assert!(matches!(result, Err(PackagerError::Failed { .. })));
        assert!(!output.exists());
    }

    #[test]
    fn native_packager_replaces_stale_output() {
        let dir = tempdir().unwrap();
        let iconset = full_iconset(dir.path());
        let output = dir.path().join("app_icon.icns");
        fs::write(&output, b"stale").unwrap();

        NativeIcns.package(&iconset, &output).unwrap();
        let family = IconFamily::read(BufReader::new(File::open(&output).unwrap())).unwrap();
        assert!(!family.elements.is_empty());
    }

    #[test]
    fn native_packager_failure_removes_stale_output() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("out.icns");
        let empty = dir.path().join("empty.iconset");
        fs::create_dir(&empty).unwrap();
        fs::write(&output, b"stale").unwrap();

        assert!(NativeIcns.package(&empty, &output).is_err());
        assert!(!output.exists());
    }

    #[test]
    fn native_packager_writes_all_slots() {
        let dir = tempdir().unwrap();
        let iconset = full_iconset(dir.path());
        let output = dir.path().join("app_icon.icns");

        NativeIcns.package(&iconset, &output).unwrap();

        let family = IconFamily::read(BufReader::new(File::open(&output).unwrap())).unwrap();
        for slot in ICNS_SLOTS {
            assert!(
                family.has_icon_with_type(slot.icon_type),
                "missing {}",
                slot.name
            );
        }
    }

    #[test]
    fn native_packager_rejects_empty_iconset() {
        let dir = tempdir().unwrap();
        let result = NativeIcns.package(dir.path(), &dir.path().join("out.icns"));
        assert!(matches!(result, Err(PackagerError::Failed { .. })));
    }

    #[test]
    fn choice_selects_expected_packager() {
        assert_eq!(PackagerChoice::Native.select().name(), "native");
        assert_eq!(PackagerChoice::Iconutil.select().name(), "iconutil");
        assert_eq!(PackagerChoice::None.select().name(), "none");

        let expected = if cfg!(target_os = "macos") { "iconutil" } else { "native" };
        assert_eq!(PackagerChoice::Auto.select().name(), expected);
    }
}
