/// RAII handle for one open output block. Closes the block when dropped,
/// whether that happens because the target finished normally or because its
/// actions returned an error and the caller's `?` unwound past the guard.
pub struct BlockGuard<'a> {
    close: Option<Box<dyn FnMut() + 'a>>,
}

impl<'a> BlockGuard<'a> {
    pub fn new(close: impl FnMut() + 'a) -> Self {
        Self {
            close: Some(Box::new(close)),
        }
    }

    /// A guard for sinks with no block boundaries to emit (e.g. a plain
    /// line-oriented writer).
    pub fn noop() -> Self {
        Self { close: None }
    }
}

impl Drop for BlockGuard<'_> {
    fn drop(&mut self) {
        if let Some(close) = self.close.as_mut() {
            close();
        }
    }
}
