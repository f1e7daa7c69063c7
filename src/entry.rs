//! The module's own execution entry point.

/// The `run` export of the compiled module.
///
/// The loader forwards arguments to it as-is and hands back whatever it
/// returns. If the module fails, that failure is part of `Output` and is
/// never wrapped or translated.
///
/// Any `Fn(Args) -> R` is an entry point:
///
/// ```rust
/// use gbemu_site::EntryPoint;
///
/// let run = |rom: Vec<u8>| rom.len();
/// assert_eq!(run.run(vec![0x00, 0xC3]), 2);
/// ```
pub trait EntryPoint<Args> {
    /// Value (or result) produced by the module.
    type Output;

    /// Invoke the module's execution routine.
    fn run(&self, args: Args) -> Self::Output;
}

impl<F, Args, R> EntryPoint<Args> for F
where
    F: Fn(Args) -> R,
{
    type Output = R;

    fn run(&self, args: Args) -> R {
        self(args)
    }
}
