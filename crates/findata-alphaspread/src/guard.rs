//! Surface ownership.

use std::ops::{Deref, DerefMut};
use tracing::warn;

use findata_core::Surface;

/// An open surface that is closed when dropped, on success and error paths alike.
#[derive(Debug)]
pub(crate) struct OpenSurface<S: Surface> {
    surface: S,
}

impl<S: Surface> OpenSurface<S> {
    pub(crate) const fn new(surface: S) -> Self {
        Self { surface }
    }
}

impl<S: Surface> Deref for OpenSurface<S> {
    type Target = S;

    fn deref(&self) -> &S {
        &self.surface
    }
}

impl<S: Surface> DerefMut for OpenSurface<S> {
    fn deref_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}

impl<S: Surface> Drop for OpenSurface<S> {
    fn drop(&mut self) {
        if let Err(e) = self.surface.close() {
            warn!(error = %e, "Failed to close surface");
        }
    }
}
