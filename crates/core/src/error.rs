//! Error types shared across the govm crates.

use miette::Diagnostic;
use thiserror::Error;

use crate::install_mode::InstallMode;

/// Error type for govm operations.
///
/// Variants map onto the recovery policy each failure class gets: fetch
/// errors are retried across candidate URLs within a strategy, checkout and
/// build errors fail the owning strategy, specifier and not-found errors
/// surface immediately, and `StrategyExhausted` is the terminal failure after
/// every configured strategy has been tried.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// Malformed or unrecognized version specifier.
    #[error("unrecognized version specifier: {input}")]
    #[diagnostic(
        code(govm::specifier),
        help("expected a version (1.21.5), a prefix (1.21.x), stable, oldstable, tip, or a git ref")
    )]
    Specifier {
        /// The offending input, verbatim.
        input: String,
    },

    /// A well-formed specifier that matches nothing in the catalog.
    #[error("no known version matches '{requested}'")]
    #[diagnostic(
        code(govm::not_found),
        help("run `govm known --refresh` to update the local version catalog")
    )]
    NotFound {
        /// The requested version or prefix.
        requested: String,
    },

    /// Network or digest failure while retrieving an artifact.
    #[error("fetch failed for {url}: {message}")]
    #[diagnostic(code(govm::fetch))]
    Fetch {
        /// Last URL attempted.
        url: String,
        /// Transport- or digest-level detail.
        message: String,
    },

    /// Source-control resolution or reset failure.
    #[error("checkout of '{git_ref}' failed: {message}")]
    #[diagnostic(code(govm::checkout))]
    Checkout {
        /// The ref that could not be resolved.
        git_ref: String,
        /// Detail from the underlying git invocation.
        message: String,
    },

    /// External build step failure.
    #[error("build failed in {dir}: {message}")]
    #[diagnostic(code(govm::build))]
    Build {
        /// Directory the build ran in.
        dir: String,
        /// Captured failure detail.
        message: String,
    },

    /// Every configured strategy failed.
    #[error("all install strategies for mode '{mode}' failed; last error: {last}")]
    #[diagnostic(
        code(govm::strategy_exhausted),
        help("re-run with --level debug to see each strategy's failure")
    )]
    StrategyExhausted {
        /// The install mode whose strategy chain was exhausted.
        mode: InstallMode,
        /// The final strategy's error.
        #[source]
        last: Box<Error>,
    },

    /// Configuration error.
    #[error("configuration error: {0}")]
    #[diagnostic(code(govm::config))]
    Configuration(String),

    /// I/O error with operation context.
    #[error("I/O {operation} failed: {source}")]
    #[diagnostic(code(govm::io))]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Operation that failed (e.g. "write snapshot", "create install dir").
        operation: String,
    },
}

impl Error {
    /// Create a specifier error.
    #[must_use]
    pub fn specifier(input: impl Into<String>) -> Self {
        Self::Specifier {
            input: input.into(),
        }
    }

    /// Create a not-found error for a version or prefix.
    #[must_use]
    pub fn not_found(requested: impl Into<String>) -> Self {
        Self::NotFound {
            requested: requested.into(),
        }
    }

    /// Create a fetch error.
    #[must_use]
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a checkout error.
    #[must_use]
    pub fn checkout(git_ref: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Checkout {
            git_ref: git_ref.into(),
            message: message.into(),
        }
    }

    /// Create a build error.
    #[must_use]
    pub fn build(dir: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Build {
            dir: dir.into(),
            message: message.into(),
        }
    }

    /// Create a configuration error.
    #[must_use]
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Create an I/O error with operation context.
    #[must_use]
    pub fn io(source: std::io::Error, operation: impl Into<String>) -> Self {
        Self::Io {
            source,
            operation: operation.into(),
        }
    }

    /// Whether this error means "the specifier was not recognized or matched
    /// nothing", as opposed to a hard failure. Pure resolve queries report
    /// this distinction through the process exit status.
    #[must_use]
    pub fn is_unrecognized(&self) -> bool {
        matches!(self, Self::Specifier { .. } | Self::NotFound { .. })
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            operation: "filesystem".to_string(),
        }
    }
}

/// Result type alias for govm operations.
pub type Result<T> = std::result::Result<T, Error>;
