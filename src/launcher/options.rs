//! Target process command-line options.
//!
//! # Example
//!
//! ```
//! use devtools_inject::LaunchOptions;
//!
//! let options = LaunchOptions::new(9222).with_arg("--disable-gpu");
//!
//! assert_eq!(
//!     options.to_args(),
//!     vec!["--remote-debugging-port=9222", "--disable-gpu"]
//! );
//! ```

// ============================================================================
// LaunchOptions
// ============================================================================

/// How the target application is launched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchOptions {
    /// Remote debugging port passed to the target.
    pub port: u16,

    /// Forward the target's stdout/stderr to the log.
    pub debug: bool,

    /// Additional command-line arguments, appended after the port flag.
    pub extra_args: Vec<String>,
}

// ============================================================================
// Constructors
// ============================================================================

impl LaunchOptions {
    /// Creates options for the given debugging port.
    #[inline]
    #[must_use]
    pub const fn new(port: u16) -> Self {
        Self {
            port,
            debug: false,
            extra_args: Vec::new(),
        }
    }
}

// ============================================================================
// Builder Methods
// ============================================================================

impl LaunchOptions {
    /// Enables output forwarding.
    #[inline]
    #[must_use]
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Adds a custom command-line argument.
    #[inline]
    #[must_use]
    pub fn with_arg(mut self, arg: impl Into<String>) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Adds multiple custom command-line arguments.
    #[inline]
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.extra_args.extend(args.into_iter().map(Into::into));
        self
    }
}

// ============================================================================
// Conversion Methods
// ============================================================================

impl LaunchOptions {
    /// Converts options to target command-line arguments.
    ///
    /// The debugging port flag always comes first.
    #[must_use]
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(1 + self.extra_args.len());
        args.push(self.port_flag());
        args.extend(self.extra_args.iter().cloned());
        args
    }

    /// Returns the `--remote-debugging-port` flag.
    #[inline]
    #[must_use]
    pub fn port_flag(&self) -> String {
        format!("--remote-debugging-port={}", self.port)
    }
}

// ============================================================================
// Tests
// ============================================================================
