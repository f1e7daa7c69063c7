//! The asynchronous instantiation capability.
//!
//! In the browser this is the `default` export of the wasm-bindgen JS glue
//! (`init_wasm`), which compiles and instantiates the emulator module and
//! resolves with its exports. Natively any async closure will do.

use std::future::Future;

/// Something that can asynchronously produce a live module handle.
///
/// The loader calls [`instantiate`](Instantiate::instantiate) once per
/// `init` and awaits the returned future. That await is the only
/// suspension point of the whole bootstrap.
///
/// # Examples
///
/// ```rust
/// use gbemu_site::Instantiate;
///
/// struct Stub;
///
/// impl Instantiate for Stub {
///     type Handle = &'static str;
///     type Error = String;
///
///     fn instantiate(&self) -> impl std::future::Future<Output = Result<Self::Handle, Self::Error>> {
///         async { Ok("exports") }
///     }
/// }
/// ```
pub trait Instantiate {
    /// Opaque capability object for the instantiated module.
    type Handle;

    /// Rejection value of a failed instantiation.
    type Error;

    /// Start instantiating the module.
    ///
    /// # Returns
    ///
    /// A future resolving to the module handle, or to the host's rejection
    fn instantiate(&self) -> impl Future<Output = Result<Self::Handle, Self::Error>>;
}

impl<F, Fut, H, E> Instantiate for F
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<H, E>>,
{
    type Handle = H;
    type Error = E;

    fn instantiate(&self) -> impl Future<Output = Result<H, E>> {
        self()
    }
}
