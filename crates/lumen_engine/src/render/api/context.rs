//! Explicit "current renderer" tracking
//!
//! Several renderers may share one GPU context (for example an offscreen and an
//! onscreen pass). Switching between them means re-applying global pipeline state,
//! which is pointless when the same renderer draws twice in a row. The
//! [`GraphicsContext`] owns the device together with a marker of the renderer whose
//! state is currently applied, so that check is a plain equality test on a value
//! the caller threads through the render loop.

use std::sync::atomic::{AtomicU64, Ordering};

use super::device::GraphicsDevice;

/// Identity of a renderer, unique for the lifetime of the process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RendererId(u64);

impl RendererId {
    /// Allocate a fresh id
    pub(crate) fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// A GPU device plus the render-state marker that goes with it
pub struct GraphicsContext<D: GraphicsDevice> {
    device: D,
    active_renderer: Option<RendererId>,
}

impl<D: GraphicsDevice> GraphicsContext<D> {
    /// Wrap a device; no renderer is active yet
    pub fn new(device: D) -> Self {
        Self {
            device,
            active_renderer: None,
        }
    }

    /// Shared access to the device
    pub fn device(&self) -> &D {
        &self.device
    }

    /// Mutable access to the device, e.g. for resource creation
    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    /// Renderer whose pipeline state is currently applied
    pub fn active_renderer(&self) -> Option<RendererId> {
        self.active_renderer
    }

    /// Record `renderer` as active. Returns `false` when it already was.
    pub(crate) fn switch_to(&mut self, renderer: RendererId) -> bool {
        if self.active_renderer == Some(renderer) {
            return false;
        }
        self.active_renderer = Some(renderer);
        true
    }

    /// Forget the active renderer so the next render re-applies its state.
    ///
    /// Call this after anything outside the renderer has touched global GPU state.
    pub fn invalidate_state(&mut self) {
        self.active_renderer = None;
    }

    /// Unwrap the device
    pub fn into_device(self) -> D {
        self.device
    }
}
