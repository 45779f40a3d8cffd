//! Shared catalog handle with atomic reload.
//!
//! # Invariants
//!
//! 1. **Build then swap**: a reload parses and indexes the new catalog
//!    completely before the active translator is replaced, so readers see
//!    either the old catalog or the new one, never a mix.
//!
//! 2. **Failed reloads are inert**: a parse or index error leaves the active
//!    translator untouched.
//!
//! 3. **Serialized writers**: reloads run one at a time; reads never wait on
//!    a reload's parse, only on the pointer swap.
//!
//! 4. **Thread safety**: `Catalog` is `Send + Sync`; clones share state.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Unreadable file | I/O error | `CatalogError::Io`, previous catalog kept |
//! | Malformed catalog | Parser error | `CatalogError::Parse`, previous catalog kept |
//! | Duplicate key | `DuplicatePolicy::Reject` | `CatalogError::Index`, previous catalog kept |
//! | Lock poisoned | Panic while holding a lock | Lock recovered; state is always a whole `Arc` |

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use crate::config::CatalogConfig;
use crate::index::{CatalogIndex, IndexError};
use crate::parser::{CatalogParser, ParseError};
use crate::placeholder::SubstitutionError;
use crate::translator::Translator;

/// Errors from loading or reloading a catalog.
#[derive(Debug)]
pub enum CatalogError {
    /// The catalog file could not be read.
    Io { path: PathBuf, source: io::Error },
    /// The catalog could not be parsed.
    Parse(ParseError),
    /// The entries could not be indexed.
    Index(IndexError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => write!(f, "cannot read {}: {source}", path.display()),
            Self::Parse(err) => write!(f, "parse error: {err}"),
            Self::Index(err) => write!(f, "index error: {err}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Index(err) => Some(err),
        }
    }
}

impl From<ParseError> for CatalogError {
    fn from(err: ParseError) -> Self {
        Self::Parse(err)
    }
}

impl From<IndexError> for CatalogError {
    fn from(err: IndexError) -> Self {
        Self::Index(err)
    }
}

/// Parse and index catalog bytes under `config`.
pub fn build_translator(bytes: &[u8], config: CatalogConfig) -> Result<Translator, CatalogError> {
    let parsed = CatalogParser::new(config.status_policy).parse(bytes)?;
    let index = CatalogIndex::from_parsed(parsed, config.duplicates)?;
    Ok(Translator::new(index, config))
}

fn read_file(path: &Path) -> Result<Vec<u8>, CatalogError> {
    fs::read(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

struct Shared {
    current: RwLock<Arc<Translator>>,
    reload: Mutex<()>,
    generation: AtomicU64,
    config: CatalogConfig,
}

/// The active catalog of a running application.
///
/// # Example
///
/// ```
/// use tscat::{Catalog, CatalogConfig};
///
/// let catalog = Catalog::load(
///     br#"<TS language="fr"><context><name>Main</name>
///         <message><source>Value: %1 of %2</source>
///         <translation>Valeur : %1 sur %2</translation></message>
///     </context></TS>"#,
///     CatalogConfig::default(),
/// )
/// .unwrap();
///
/// assert_eq!(
///     catalog.translate("Main", "Value: %1 of %2", &["3", "10"], None),
///     "Valeur : 3 sur 10"
/// );
/// assert_eq!(catalog.translate("Main", "Missing %1", &["x"], None), "Missing x");
/// ```
#[derive(Clone)]
pub struct Catalog {
    shared: Arc<Shared>,
}

impl fmt::Debug for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let snapshot = self.snapshot();
        f.debug_struct("Catalog")
            .field("loaded", &snapshot.is_loaded())
            .field("entries", &snapshot.index().len())
            .field("generation", &self.generation())
            .finish()
    }
}

impl Catalog {
    fn with_translator(translator: Translator, config: CatalogConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                current: RwLock::new(Arc::new(translator)),
                reload: Mutex::new(()),
                generation: AtomicU64::new(0),
                config,
            }),
        }
    }

    /// A handle with no catalog loaded; every lookup falls back to source.
    #[must_use]
    pub fn unloaded(config: CatalogConfig) -> Self {
        Self::with_translator(Translator::empty(config), config)
    }

    /// Load a catalog from bytes.
    pub fn load(bytes: &[u8], config: CatalogConfig) -> Result<Self, CatalogError> {
        let translator = build_translator(bytes, config)?;
        tracing::info!(
            entries = translator.index().len(),
            config = %config.summary(),
            "catalog loaded"
        );
        Ok(Self::with_translator(translator, config))
    }

    /// Load a catalog from a file.
    pub fn load_file(path: impl AsRef<Path>, config: CatalogConfig) -> Result<Self, CatalogError> {
        let bytes = read_file(path.as_ref())?;
        Self::load(&bytes, config)
    }

    /// Wrap an already-built translator.
    #[must_use]
    pub fn from_translator(translator: Translator) -> Self {
        let config = *translator.config();
        Self::with_translator(translator, config)
    }

    #[must_use]
    pub fn config(&self) -> &CatalogConfig {
        &self.shared.config
    }

    /// The active translator. Holding the snapshot keeps that catalog alive
    /// across reloads.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Translator> {
        let guard = self
            .shared
            .current
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Number of successful swaps since creation.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.snapshot().is_loaded()
    }

    /// Replace the active catalog with one parsed from `bytes`.
    pub fn reload(&self, bytes: &[u8]) -> Result<(), CatalogError> {
        self.reload_with(|config| build_translator(bytes, config))
    }

    /// Replace the active catalog with the contents of a file.
    pub fn reload_file(&self, path: impl AsRef<Path>) -> Result<(), CatalogError> {
        let path = path.as_ref();
        self.reload_with(|config| build_translator(&read_file(path)?, config))
    }

    fn reload_with<F>(&self, build: F) -> Result<(), CatalogError>
    where
        F: FnOnce(CatalogConfig) -> Result<Translator, CatalogError>,
    {
        let _writer = self
            .shared
            .reload
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match build(self.shared.config) {
            Ok(translator) => {
                let entries = translator.index().len();
                self.swap(translator);
                tracing::info!(entries, generation = self.generation(), "catalog reloaded");
                Ok(())
            }
            Err(err) => {
                tracing::warn!(error = %err, "catalog reload failed, keeping previous catalog");
                Err(err)
            }
        }
    }

    /// Replace the active catalog with a prebuilt translator (for example
    /// the result of [`crate::merge`]).
    pub fn replace(&self, translator: Translator) {
        let _writer = self
            .shared
            .reload
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.swap(translator);
    }

    /// Return to the "no catalog loaded" state.
    pub fn unload(&self) {
        self.replace(Translator::empty(self.shared.config));
        tracing::info!("catalog unloaded");
    }

    fn swap(&self, translator: Translator) {
        let next = Arc::new(translator);
        let previous = {
            let mut guard = self
                .shared
                .current
                .write()
                .unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *guard, next)
        };
        self.shared.generation.fetch_add(1, Ordering::AcqRel);
        // The old catalog is freed here (or by the last reader), outside the lock.
        drop(previous);
    }

    /// See [`Translator::translate`].
    #[must_use]
    pub fn translate(
        &self,
        context: &str,
        source: &str,
        args: &[&str],
        disambiguator: Option<&str>,
    ) -> String {
        self.snapshot().translate(context, source, args, disambiguator)
    }

    /// See [`Translator::try_translate`].
    pub fn try_translate(
        &self,
        context: &str,
        source: &str,
        args: &[&str],
        disambiguator: Option<&str>,
    ) -> Result<String, SubstitutionError> {
        self.snapshot()
            .try_translate(context, source, args, disambiguator)
    }

    /// See [`Translator::translate_plural`].
    #[must_use]
    pub fn translate_plural(
        &self,
        context: &str,
        source: &str,
        n: i64,
        args: &[&str],
        disambiguator: Option<&str>,
    ) -> String {
        self.snapshot()
            .translate_plural(context, source, n, args, disambiguator)
    }

    /// See [`Translator::try_translate_plural`].
    pub fn try_translate_plural(
        &self,
        context: &str,
        source: &str,
        n: i64,
        args: &[&str],
        disambiguator: Option<&str>,
    ) -> Result<String, SubstitutionError> {
        self.snapshot()
            .try_translate_plural(context, source, n, args, disambiguator)
    }
}
