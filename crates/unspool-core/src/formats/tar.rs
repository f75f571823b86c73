//! Tar-family expander (`.tar`, `.tar.gz`/`.tgz`, `.tar.bz2`/`.tbz2`).

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::ExpandError;
use crate::ExpandLimits;
use crate::ExpandOptions;
use crate::ExtractionReport;
use crate::Result;
use crate::extraction::extract_tar;
use crate::security::expand_home;

use super::compression::CompressionCodec;
use super::traits::Expand;

/// Name fragments this expander claims.
const TAR_HINTS: [&str; 3] = ["tar", "tgz", "tbz2"];

/// Expander for tar archives, optionally gzip- or bzip2-compressed.
///
/// # Examples
///
/// ```no_run
/// use std::path::Path;
/// use unspool_core::Expand;
/// use unspool_core::ExpandLimits;
/// use unspool_core::ExpandOptions;
/// use unspool_core::TarExpander;
///
/// # fn main() -> Result<(), unspool_core::ExpandError> {
/// let expander = TarExpander::new(ExpandLimits::recommended());
/// let report = expander.expand(
///     Path::new("release.tar.gz"),
///     Path::new("/tmp/release"),
///     &ExpandOptions::directory(),
/// )?;
/// println!("{} files", report.files_extracted);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TarExpander {
    limits: ExpandLimits,
}

impl TarExpander {
    /// Creates a tar expander with the given limits.
    #[must_use]
    pub const fn new(limits: ExpandLimits) -> Self {
        Self { limits }
    }

    /// Returns the configured limits.
    #[must_use]
    pub const fn limits(&self) -> ExpandLimits {
        self.limits
    }
}

impl Expand for TarExpander {
    fn expand(
        &self,
        source: &Path,
        destination: &Path,
        options: &ExpandOptions,
    ) -> Result<ExtractionReport> {
        let source = expand_home(source)?;
        let destination = expand_home(destination)?;

        let file = File::open(&source).map_err(|e| ExpandError::Open {
            path: source.clone(),
            source: e,
        })?;

        let codec = options.codec.unwrap_or_else(|| {
            source
                .file_name()
                .map_or(CompressionCodec::None, |name| {
                    CompressionCodec::from_file_name(&name.to_string_lossy())
                })
        });
        tracing::debug!(
            "Expanding {} as {} into {}",
            source.display(),
            codec.name(),
            destination.display()
        );

        let reader = codec.decoder(BufReader::new(file))?;
        extract_tar(reader, &destination, self.limits, options)
    }

    fn matches(&self, hint: &str) -> bool {
        TAR_HINTS.iter().any(|fragment| hint.contains(fragment))
    }

    fn name(&self) -> &'static str {
        "tar"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::test_utils;
    use crate::test_utils::create_test_tar;
    use tempfile::TempDir;

    fn write_source(dir: &Path, name: &str, data: &[u8]) -> std::path::PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, data).unwrap();
        path
    }

    #[test]
    fn test_matches() {
        let expander = TarExpander::default();
        assert!(expander.matches("a.tar"));
        assert!(expander.matches("a.tar.gz"));
        assert!(expander.matches("a.tgz"));
        assert!(expander.matches("a.tbz2"));
        assert!(expander.matches("a.tar.bz2"));
        assert!(!expander.matches("a.bz2"));
        assert!(!expander.matches("a.zip"));
    }

    #[test]
    fn test_expand_each_codec() {
        let temp = TempDir::new().unwrap();
        let tar = create_test_tar(vec![("hello.txt", b"hello")]);
        let sources = [
            ("plain.tar", tar.clone()),
            ("gz.tar.gz", test_utils::gzip(&tar)),
            ("gz.tgz", test_utils::gzip(&tar)),
            ("bz.tar.bz2", test_utils::bzip2(&tar)),
            ("bz.tbz2", test_utils::bzip2(&tar)),
        ];

        for (name, data) in sources {
            let source = write_source(temp.path(), name, &data);
            let dest = temp.path().join(format!("out-{name}"));
            let report = TarExpander::default()
                .expand(&source, &dest, &ExpandOptions::directory())
                .unwrap();
            assert_eq!(report.files_extracted, 1, "{name}");
            assert_eq!(std::fs::read(dest.join("hello.txt")).unwrap(), b"hello");
        }
    }

    #[test]
    fn test_forced_codec_overrides_name() {
        let temp = TempDir::new().unwrap();
        let tar = create_test_tar(vec![("a.txt", b"a")]);
        let source = write_source(temp.path(), "download.bin", &test_utils::gzip(&tar));

        let options = ExpandOptions::directory().with_codec(Some(CompressionCodec::Gzip));
        TarExpander::default()
            .expand(&source, &temp.path().join("out"), &options)
            .unwrap();
        assert!(temp.path().join("out/a.txt").exists());
    }

    #[test]
    fn test_bad_gzip_header() {
        let temp = TempDir::new().unwrap();
        let source = write_source(temp.path(), "broken.tar.gz", b"not gzip at all");
        let err = TarExpander::default()
            .expand(&source, &temp.path().join("out"), &ExpandOptions::directory())
            .unwrap_err();
        assert!(matches!(err, ExpandError::Format { format: "gzip", .. }));
    }

    #[test]
    fn test_missing_source() {
        let temp = TempDir::new().unwrap();
        let err = TarExpander::default()
            .expand(
                &temp.path().join("absent.tar"),
                &temp.path().join("out"),
                &ExpandOptions::directory(),
            )
            .unwrap_err();
        assert!(matches!(err, ExpandError::Open { .. }));
    }

    #[test]
    fn test_limits_are_applied() {
        let temp = TempDir::new().unwrap();
        let tar = create_test_tar(vec![("a.txt", b"a"), ("b.txt", b"b")]);
        let source = write_source(temp.path(), "two.tar", &tar);

        let expander = TarExpander::new(ExpandLimits::default().with_files_limit(1));
        assert_eq!(expander.limits().files_limit, 1);
        let err = expander
            .expand(&source, &temp.path().join("out"), &ExpandOptions::directory())
            .unwrap_err();
        assert!(matches!(
            err,
            ExpandError::EntryCountExceeded { count: 2, limit: 1 }
        ));
    }
}
