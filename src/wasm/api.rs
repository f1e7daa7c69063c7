//! WASM API for the page bootstrap.
//!
//! The emulator is built separately with wasm-pack into `./gbemu/`, next to
//! this crate's own output. Its glue module provides the two things the
//! page needs: a `default` export that instantiates the module, and `run`.
//!
//! ```js
//! import { init, run } from "./gbemu_site.js";
//!
//! await init();
//! runReady([romBytes]);
//! ```

use std::future::Future;
use std::rc::Rc;

use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use crate::{EntryPoint, Instantiate, LoaderError, ModuleLoader};

#[wasm_bindgen(raw_module = "./gbemu/gbemu.js")]
extern "C" {
    /// Compile and instantiate the emulator, resolving with its exports.
    #[wasm_bindgen(js_name = "default", catch)]
    fn init_wasm() -> Result<Promise, JsValue>;

    /// The emulator's own execution entry point.
    #[wasm_bindgen(js_name = run, variadic, catch)]
    fn module_run(args: &[JsValue]) -> Result<JsValue, JsValue>;
}

/// Instantiates the emulator through its glue module.
struct GlueInstantiator;

impl Instantiate for GlueInstantiator {
    type Handle = JsValue;
    type Error = JsValue;

    fn instantiate(&self) -> impl Future<Output = Result<JsValue, JsValue>> {
        async {
            let exports = JsFuture::from(init_wasm()?).await?;
            web_sys::console::log_1(&exports);
            Ok(exports)
        }
    }
}

/// Calls the glue module's `run` with the arguments spread out.
struct GlueRun;

impl<'a> EntryPoint<&'a [JsValue]> for GlueRun {
    type Output = Result<JsValue, JsValue>;

    fn run(&self, args: &'a [JsValue]) -> Self::Output {
        module_run(args)
    }
}

type PageLoader = ModuleLoader<GlueInstantiator, GlueRun>;

thread_local! {
    // One loader per page.
    static LOADER: Rc<PageLoader> = Rc::new(ModuleLoader::new(GlueInstantiator, GlueRun));
}

fn page_loader() -> Rc<PageLoader> {
    LOADER.with(Rc::clone)
}

/// Instantiation rejections reach JavaScript as the original rejection
/// value; loader errors become `Error` objects.
///
/// The rejection value is the one carried by `LoaderError::Instantiation`,
/// which the native `init` tests check is passed through as-is.
impl From<LoaderError<JsValue>> for JsValue {
    fn from(err: LoaderError<JsValue>) -> Self {
        match err {
            LoaderError::Instantiation(rejection) => rejection,
            other => {
                let message = other.map_instantiation(|_| String::new()).to_string();
                JsError::new(&message).into()
            }
        }
    }
}

/// Instantiate the emulator and record its exports.
///
/// Resolves with `undefined` once the module is ready. Rejects with the
/// host's error if instantiation fails, or with an `Error` if another
/// `init` is still pending.
#[wasm_bindgen]
pub async fn init() -> Result<(), JsValue> {
    page_loader().init().await?;
    Ok(())
}

/// Run the emulator with `args` spread as arguments to its `run` export.
///
/// The call goes straight to the emulator whatever state the page is in.
/// Anything the emulator throws is rethrown unchanged.
#[wasm_bindgen]
pub fn run(args: Vec<JsValue>) -> Result<JsValue, JsValue> {
    page_loader().run(args.as_slice())
}

/// Like `run`, but throws an `Error` if called before `init` has resolved.
#[wasm_bindgen(js_name = runReady)]
pub fn run_ready(args: Vec<JsValue>) -> Result<JsValue, JsValue> {
    page_loader().run_ready(args.as_slice())?
}

/// Whether `init` has completed successfully.
#[wasm_bindgen(js_name = isReady)]
pub fn is_ready() -> bool {
    page_loader().is_ready()
}

/// Current loader phase: `uninitialized`, `initializing`, `ready` or `failed`.
#[wasm_bindgen(js_name = loaderPhase)]
pub fn loader_phase() -> String {
    page_loader().phase().to_string()
}
