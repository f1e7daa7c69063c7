//! Error types for the module loader.

use thiserror::Error;

use crate::loader::LoaderPhase;

/// Errors produced by [`ModuleLoader`](crate::ModuleLoader).
///
/// `E` is the error type of the instantiation capability. It is carried
/// unchanged so the caller sees exactly what the host rejected with.
///
/// Failures raised by the module's own `run` entry point never appear here:
/// they travel inside [`EntryPoint::Output`](crate::EntryPoint::Output).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LoaderError<E> {
    /// The asynchronous instantiation call rejected.
    #[error("module instantiation failed: {0}")]
    Instantiation(E),

    /// Another `init` call is still waiting on instantiation.
    #[error("module initialization is already in progress")]
    InitInProgress,

    /// The loader is `Ready` and its options refuse a second `init`.
    #[error("module is already initialized")]
    AlreadyInitialized,

    /// The entry point was requested through the readiness gate too early.
    #[error("module is not ready (loader is {phase})")]
    NotReady {
        /// Phase the loader was in when the request was refused
        phase: LoaderPhase,
    },
}

impl<E> LoaderError<E> {
    /// Returns the rejection value if this is an instantiation failure.
    pub fn instantiation_error(&self) -> Option<&E> {
        match self {
            LoaderError::Instantiation(err) => Some(err),
            _ => None,
        }
    }

    /// Consumes the error, returning the rejection value of an
    /// instantiation failure.
    pub fn into_instantiation_error(self) -> Option<E> {
        match self {
            LoaderError::Instantiation(err) => Some(err),
            _ => None,
        }
    }

    /// Maps the rejection value with `f`, leaving other variants as they are.
    pub fn map_instantiation<F, O>(self, f: F) -> LoaderError<O>
    where
        F: FnOnce(E) -> O,
    {
        match self {
            LoaderError::Instantiation(err) => LoaderError::Instantiation(f(err)),
            LoaderError::InitInProgress => LoaderError::InitInProgress,
            LoaderError::AlreadyInitialized => LoaderError::AlreadyInitialized,
            LoaderError::NotReady { phase } => LoaderError::NotReady { phase },
        }
    }
}
