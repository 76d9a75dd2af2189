//! Browser host for the particle field: a canvas surface, a
//! `requestAnimationFrame` scheduler and a window resize listener wired
//! into [`FrameDriver`].

mod canvas;
mod host;
mod logger;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use field_core::{FrameDriver, LatticeRenderer, SimulationConfig, Surface, ViewportObserver};
use field_shared::{DotGridSettings, FieldSettings};
use log::{debug, LevelFilter};
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, Window};

pub use canvas::CanvasSurface;
pub use host::{current_viewport, AnimationFrameScheduler, WindowResizeObserver};

type CanvasDriver = FrameDriver<CanvasSurface, AnimationFrameScheduler, WindowResizeObserver>;

/// Install the panic hook and console logger. Safe to call more than once.
#[wasm_bindgen]
pub fn init(verbose: bool) {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();

    logger::install(if verbose { LevelFilter::Debug } else { LevelFilter::Info });
}

fn window() -> Result<Window, JsValue> {
    web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))
}

/// `undefined` and `null` mean defaults; anything else goes through JSON
fn settings_json(settings: &JsValue) -> Result<Option<String>, JsValue> {
    if settings.is_undefined() || settings.is_null() {
        return Ok(None);
    }
    js_sys::JSON::stringify(settings)?
        .as_string()
        .map(Some)
        .ok_or_else(|| JsValue::from_str("settings are not serializable"))
}

fn parse_config(settings: &JsValue) -> Result<SimulationConfig, JsValue> {
    let settings = match settings_json(settings)? {
        Some(json) => FieldSettings::from_json(&json)
            .map_err(|err| JsValue::from_str(&format!("invalid settings: {}", err)))?,
        None => FieldSettings::default(),
    };
    SimulationConfig::try_from(&settings).map_err(|err| JsValue::from_str(&err.to_string()))
}

/// Animated flocking background drawn over a dot lattice
#[wasm_bindgen]
pub struct ParticleField {
    driver: Rc<RefCell<CanvasDriver>>,
    window: Window,
}

#[wasm_bindgen]
impl ParticleField {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, settings: JsValue) -> Result<ParticleField, JsValue> {
        let config = parse_config(&settings)?;
        let window = window()?;
        let surface = CanvasSurface::new(canvas)?;

        let driver = Rc::new(RefCell::new(FrameDriver::new(
            config,
            surface,
            AnimationFrameScheduler::new(window.clone()),
            WindowResizeObserver::new(window.clone()),
        )));
        bind_callbacks(&driver, &window);

        Ok(ParticleField { driver, window })
    }

    pub fn start(&self) -> Result<(), JsValue> {
        let viewport = current_viewport(&self.window)
            .ok_or_else(|| JsValue::from_str("viewport size unavailable"))?;
        self.driver
            .borrow_mut()
            .start(viewport, &mut rand::thread_rng())
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    pub fn stop(&self) {
        self.driver.borrow_mut().stop();
    }

    /// Replace the settings. Takes effect immediately while running.
    pub fn reset(&self, settings: JsValue) -> Result<(), JsValue> {
        let config = parse_config(&settings)?;
        self.driver
            .borrow_mut()
            .reset(config, &mut rand::thread_rng())
            .map_err(|err| JsValue::from_str(&err.to_string()))
    }

    #[wasm_bindgen(getter, js_name = isRunning)]
    pub fn is_running(&self) -> bool {
        self.driver.borrow().state() == field_core::DriverState::Running
    }

    #[wasm_bindgen(getter, js_name = particleCount)]
    pub fn particle_count(&self) -> usize {
        self.driver.borrow().flock().map_or(0, |flock| flock.len())
    }

    #[wasm_bindgen(getter, js_name = frameCount)]
    pub fn frame_count(&self) -> f64 {
        self.driver.borrow().frame_count() as f64
    }
}

/// The closures only hold weak handles, so dropping the `ParticleField`
/// drops the driver, which cancels the frame and the listener.
fn bind_callbacks(driver: &Rc<RefCell<CanvasDriver>>, window: &Window) {
    let on_frame: Weak<RefCell<CanvasDriver>> = Rc::downgrade(driver);
    let on_frame = Closure::wrap(Box::new(move |_timestamp: f64| {
        if let Some(driver) = on_frame.upgrade() {
            driver.borrow_mut().tick();
        }
    }) as Box<dyn FnMut(f64)>);

    let on_resize: Weak<RefCell<CanvasDriver>> = Rc::downgrade(driver);
    let resize_window = window.clone();
    let on_resize = Closure::wrap(Box::new(move || {
        let Some(driver) = on_resize.upgrade() else {
            return;
        };
        if let Some(viewport) = current_viewport(&resize_window) {
            driver.borrow_mut().on_resize(viewport);
        }
    }) as Box<dyn FnMut()>);

    let mut driver = driver.borrow_mut();
    driver.scheduler_mut().bind(on_frame);
    driver.observer_mut().bind(on_resize);
}

struct DotGrid {
    surface: CanvasSurface,
    lattice: LatticeRenderer,
}

impl DotGrid {
    fn redraw(&mut self, window: &Window) {
        match current_viewport(window) {
            Some(viewport) => self.lattice.resize(&mut self.surface, viewport),
            None => debug!("dot grid redraw skipped, viewport unavailable"),
        }
    }
}

/// The lattice alone, repainted on resize but never animated
#[wasm_bindgen]
pub struct StaticDotGrid {
    grid: Rc<RefCell<DotGrid>>,
    observer: WindowResizeObserver,
    window: Window,
}

#[wasm_bindgen]
impl StaticDotGrid {
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, settings: JsValue) -> Result<StaticDotGrid, JsValue> {
        let settings = match settings_json(&settings)? {
            Some(json) => DotGridSettings::from_json(&json)
                .map_err(|err| JsValue::from_str(&format!("invalid settings: {}", err)))?,
            None => DotGridSettings::default(),
        };
        let lattice = LatticeRenderer::try_from(&settings)
            .map_err(|err| JsValue::from_str(&err.to_string()))?;

        let window = window()?;
        let grid = Rc::new(RefCell::new(DotGrid {
            surface: CanvasSurface::new(canvas)?,
            lattice,
        }));

        let weak = Rc::downgrade(&grid);
        let resize_window = window.clone();
        let on_resize = Closure::wrap(Box::new(move || {
            if let Some(grid) = weak.upgrade() {
                grid.borrow_mut().redraw(&resize_window);
            }
        }) as Box<dyn FnMut()>);

        let mut observer = WindowResizeObserver::new(window.clone());
        observer.bind(on_resize);

        Ok(StaticDotGrid {
            grid,
            observer,
            window,
        })
    }

    /// Draw once and follow window resizes
    pub fn mount(&mut self) {
        self.grid.borrow_mut().redraw(&self.window);
        self.observer.subscribe();
    }

    pub fn unmount(&mut self) {
        self.observer.unsubscribe();
        self.grid.borrow_mut().surface.clear();
    }

    #[wasm_bindgen(getter, js_name = isMounted)]
    pub fn is_mounted(&self) -> bool {
        self.observer.is_listening()
    }
}

impl Drop for StaticDotGrid {
    fn drop(&mut self) {
        self.observer.unsubscribe();
    }
}
