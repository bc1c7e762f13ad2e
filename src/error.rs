//! Error types for the bridge
//!
//! Every failure that crosses the bridge is fatal for the operator that hit
//! it. The variants only exist so callers can tell which phase failed.

use std::path::PathBuf;

use derive_more::{Display, From};

pub type BridgeResult<T> = Result<T, BridgeError>;

#[derive(Display, Debug, From)]
#[display("{kind}")]
pub struct BridgeError {
    #[from]
    kind: Box<BridgeErrorKind>,
}

impl<E> From<E> for BridgeError
where
    BridgeErrorKind: From<E>,
{
    fn from(error: E) -> Self {
        BridgeError {
            kind: Box::new(BridgeErrorKind::from(error)),
        }
    }
}

/// Phase of the bridge an error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Bootstrap,
    Load,
    Invocation,
    Conversion,
}

impl BridgeError {
    pub(crate) fn symbol_preload(library: &str, reason: impl std::fmt::Display) -> Self {
        BridgeErrorKind::SymbolPreload {
            library: library.to_string(),
            reason: reason.to_string(),
        }
        .into()
    }

    pub(crate) fn invocation(function: &str, message: impl std::fmt::Display) -> Self {
        BridgeErrorKind::Invocation {
            function: function.to_string(),
            message: message.to_string(),
        }
        .into()
    }

    pub(crate) fn conversion(function: &str, message: impl std::fmt::Display) -> Self {
        BridgeErrorKind::Conversion {
            function: function.to_string(),
            message: message.to_string(),
        }
        .into()
    }

    pub fn kind(&self) -> &BridgeErrorKind {
        &self.kind
    }

    pub fn category(&self) -> ErrorCategory {
        match &*self.kind {
            BridgeErrorKind::SymbolPreload { .. }
            | BridgeErrorKind::SetupScriptMissing { .. }
            | BridgeErrorKind::SetupScriptFailed { .. }
            | BridgeErrorKind::NotInitialized => ErrorCategory::Bootstrap,
            BridgeErrorKind::ModuleImport { .. }
            | BridgeErrorKind::FunctionMissing { .. }
            | BridgeErrorKind::NotCallable { .. } => ErrorCategory::Load,
            BridgeErrorKind::Invocation { .. } | BridgeErrorKind::NotAnInteger { .. } => {
                ErrorCategory::Invocation
            }
            BridgeErrorKind::Conversion { .. } => ErrorCategory::Conversion,
        }
    }

    /// No bridge error is recoverable per record.
    pub fn is_fatal(&self) -> bool {
        true
    }
}

#[derive(Display, Debug)]
pub enum BridgeErrorKind {
    #[display("Could not preload {library}: {reason}")]
    SymbolPreload { library: String, reason: String },

    #[display("Setup script {} not readable: {reason}", path.display())]
    SetupScriptMissing { path: PathBuf, reason: String },

    #[display("Setup script {} failed: {message}", path.display())]
    SetupScriptFailed { path: PathBuf, message: String },

    #[display("Embedded interpreter is not initialized")]
    NotInitialized,

    #[display("Missing module {module}: {message}")]
    ModuleImport { module: String, message: String },

    #[display("Function {function} not found in module {module}: {message}")]
    FunctionMissing {
        module: String,
        function: String,
        message: String,
    },

    #[display("Function {function} in module {module} not callable")]
    NotCallable { module: String, function: String },

    #[display("Call to {function} failed: {message}")]
    Invocation { function: String, message: String },

    #[display("Conversion for {function} failed: {message}")]
    Conversion { function: String, message: String },

    #[display("Function {function} did not return an integer: {message}")]
    NotAnInteger { function: String, message: String },
}

impl std::error::Error for BridgeError {}
