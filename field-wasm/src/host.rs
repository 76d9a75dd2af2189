//! Browser implementations of the driver's scheduling and resize seams.

use field_core::{FrameScheduler, Viewport, ViewportObserver};
use log::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::Window;

/// Current inner size and device pixel ratio of the window
pub fn current_viewport(window: &Window) -> Option<Viewport> {
    let width = window.inner_width().ok()?.as_f64()?;
    let height = window.inner_height().ok()?.as_f64()?;
    Some(Viewport::new(
        width as f32,
        height as f32,
        window.device_pixel_ratio() as f32,
    ))
}

/// `requestAnimationFrame`-backed scheduler. The frame callback is bound
/// after construction because it needs a handle back to the driver.
pub struct AnimationFrameScheduler {
    window: Window,
    callback: Option<Closure<dyn FnMut(f64)>>,
    handle: Option<i32>,
}

impl AnimationFrameScheduler {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: None,
            handle: None,
        }
    }

    pub fn bind(&mut self, callback: Closure<dyn FnMut(f64)>) {
        self.callback = Some(callback);
    }
}

impl FrameScheduler for AnimationFrameScheduler {
    fn request_frame(&mut self) -> bool {
        let Some(callback) = self.callback.as_ref() else {
            warn!("frame requested before a callback was bound");
            return false;
        };

        match self
            .window
            .request_animation_frame(callback.as_ref().unchecked_ref())
        {
            Ok(handle) => {
                self.handle = Some(handle);
                true
            }
            Err(err) => {
                warn!("requestAnimationFrame failed: {:?}", err);
                false
            }
        }
    }

    fn cancel_frame(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = self.window.cancel_animation_frame(handle) {
                warn!("cancelAnimationFrame failed: {:?}", err);
            }
        }
    }
}

/// Window `resize` listener
pub struct WindowResizeObserver {
    window: Window,
    callback: Option<Closure<dyn FnMut()>>,
    listening: bool,
}

impl WindowResizeObserver {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            callback: None,
            listening: false,
        }
    }

    pub fn bind(&mut self, callback: Closure<dyn FnMut()>) {
        self.callback = Some(callback);
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

impl ViewportObserver for WindowResizeObserver {
    fn subscribe(&mut self) {
        if self.listening {
            return;
        }
        let Some(callback) = self.callback.as_ref() else {
            warn!("resize subscription before a callback was bound");
            return;
        };

        match self
            .window
            .add_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
        {
            Ok(()) => self.listening = true,
            Err(err) => warn!("failed to add resize listener: {:?}", err),
        }
    }

    fn unsubscribe(&mut self) {
        if !self.listening {
            return;
        }
        if let Some(callback) = self.callback.as_ref() {
            if let Err(err) = self
                .window
                .remove_event_listener_with_callback("resize", callback.as_ref().unchecked_ref())
            {
                warn!("failed to remove resize listener: {:?}", err);
            }
        }
        self.listening = false;
    }
}
