//! Expander registry.
//!
//! The registry is an ordinary value built once by the application and
//! passed to whatever selects expanders. Lookup walks expanders in
//! registration order, so earlier registrations win ambiguous names.

use std::borrow::Cow;
use std::path::Path;

use crate::ExpandError;
use crate::ExpandLimits;
use crate::ExpandOptions;
use crate::ExtractionReport;
use crate::Result;
use crate::formats::Bzip2Expander;
use crate::formats::CompressionCodec;
use crate::formats::Expand;
use crate::formats::Expander;
use crate::formats::MagicFormat;
use crate::formats::TarExpander;
use crate::security::expand_home;

/// Ordered list of registered expanders.
///
/// # Examples
///
/// ```
/// use unspool_core::Expand;
/// use unspool_core::ExpandLimits;
/// use unspool_core::Registry;
///
/// let registry = Registry::with_defaults(ExpandLimits::recommended());
/// assert_eq!(registry.lookup("site.tar.gz").map(|e| e.name()), Some("tar"));
/// assert_eq!(registry.lookup("notes.bz2").map(|e| e.name()), Some("bzip2"));
/// assert!(registry.lookup("photo.png").is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct Registry {
    expanders: Vec<Expander>,
}

/// An expander chosen for a file, plus the codec to force when the choice
/// came from content sniffing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection<'r> {
    /// The chosen expander.
    pub expander: &'r Expander,
    /// Codec implied by the file's magic number, if sniffing was needed.
    pub codec: Option<CompressionCodec>,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the tar expander followed by the bzip2
    /// expander, both configured with `limits`.
    #[must_use]
    pub fn with_defaults(limits: ExpandLimits) -> Self {
        let mut registry = Self::new();
        registry.register(TarExpander::new(limits));
        registry.register(Bzip2Expander::new(limits));
        registry
    }

    /// Appends an expander. Duplicates are kept.
    pub fn register(&mut self, expander: impl Into<Expander>) {
        self.expanders.push(expander.into());
    }

    /// Returns the registered expanders in priority order.
    #[must_use]
    pub fn expanders(&self) -> &[Expander] {
        &self.expanders
    }

    /// Returns the first expander whose matcher accepts `hint`.
    #[must_use]
    pub fn lookup(&self, hint: &str) -> Option<&Expander> {
        self.expanders.iter().find(|expander| expander.matches(hint))
    }

    /// Identifies `path` by its leading bytes.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::Open`] if the file cannot be read or is empty.
    #[allow(clippy::unused_self)]
    pub fn sniff_format(&self, path: &Path) -> Result<Option<MagicFormat>> {
        crate::formats::sniff_format(path)
    }

    /// Picks an expander for `path`: by file name first, then by magic
    /// number.
    ///
    /// # Errors
    ///
    /// Returns an error only if sniffing was needed and the file could not
    /// be read.
    pub fn select(&self, path: &Path) -> Result<Option<Selection<'_>>> {
        let path = expand_home(path)?;
        let name = path
            .file_name()
            .map_or(Cow::Borrowed(""), |name| name.to_string_lossy());

        if let Some(expander) = self.lookup(&name) {
            return Ok(Some(Selection {
                expander,
                codec: None,
            }));
        }

        let Some(format) = self.sniff_format(&path)? else {
            return Ok(None);
        };
        tracing::debug!("Sniffed {} as {format}", path.display());

        let codec = match format {
            MagicFormat::Gzip => Some(CompressionCodec::Gzip),
            MagicFormat::Tar => Some(CompressionCodec::None),
            _ => None,
        };
        Ok(self
            .lookup(format.extension_hint())
            .map(|expander| Selection { expander, codec }))
    }

    /// Selects an expander for `source` and runs it.
    ///
    /// # Errors
    ///
    /// Returns [`ExpandError::UnsupportedFormat`] when no expander handles
    /// `source`, otherwise whatever the chosen expander returns.
    pub fn expand(
        &self,
        source: &Path,
        destination: &Path,
        options: &ExpandOptions,
    ) -> Result<ExtractionReport> {
        let Some(selection) = self.select(source)? else {
            return Err(ExpandError::UnsupportedFormat {
                path: source.to_path_buf(),
            });
        };

        tracing::debug!(
            "Selected {} expander for {}",
            selection.expander.name(),
            source.display()
        );

        match selection.codec {
            Some(codec) if options.codec.is_none() => {
                let options = options.clone().with_codec(Some(codec));
                selection.expander.expand(source, destination, &options)
            }
            _ => selection.expander.expand(source, destination, options),
        }
    }
}
