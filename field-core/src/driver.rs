//! Lifecycle and timing of the animated background.
//!
//! The driver never talks to a host directly: frame callbacks come through a
//! [`FrameScheduler`] and resize notifications through a [`ViewportObserver`].
//! The host calls [`FrameDriver::tick`] once per scheduled frame and
//! [`FrameDriver::on_resize`] for every resize it observes.

use log::{debug, info, warn};
use rand::Rng;

use crate::config::{ConfigurationError, SimulationConfig};
use crate::flock::Flock;
use crate::lattice::LatticeRenderer;
use crate::surface::{Surface, Viewport};

/// Requests one callback per display refresh
pub trait FrameScheduler {
    /// Ask for the next frame. The host answers by calling `tick` once.
    /// Returns `false` when the host could not register the request.
    fn request_frame(&mut self) -> bool;

    /// Drop a pending frame request, if any
    fn cancel_frame(&mut self);
}

/// Delivers viewport changes to the driver
pub trait ViewportObserver {
    fn subscribe(&mut self);

    fn unsubscribe(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    /// Terminal
    Stopped,
}

pub struct FrameDriver<S, C, V>
where
    S: Surface,
    C: FrameScheduler,
    V: ViewportObserver,
{
    config: SimulationConfig,
    lattice: LatticeRenderer,
    flock: Option<Flock>,
    surface: Option<S>,
    scheduler: C,
    observer: V,
    viewport: Viewport,
    state: DriverState,
    frame_pending: bool,
    subscribed: bool,
    /// The attached surface matches `viewport`
    sized: bool,
    frames: u64,
}

impl<S, C, V> FrameDriver<S, C, V>
where
    S: Surface,
    C: FrameScheduler,
    V: ViewportObserver,
{
    /// The config is only validated on `start`, so a broken one leaves the
    /// driver idle instead of failing here
    pub fn new(config: SimulationConfig, surface: S, scheduler: C, observer: V) -> Self {
        Self {
            lattice: LatticeRenderer::from_config(&config),
            config,
            flock: None,
            surface: Some(surface),
            scheduler,
            observer,
            viewport: Viewport::default(),
            state: DriverState::Idle,
            frame_pending: false,
            subscribed: false,
            sized: false,
            frames: 0,
        }
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn flock(&self) -> Option<&Flock> {
        self.flock.as_ref()
    }

    pub fn surface(&self) -> Option<&S> {
        self.surface.as_ref()
    }

    pub fn scheduler(&self) -> &C {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut C {
        &mut self.scheduler
    }

    pub fn observer(&self) -> &V {
        &self.observer
    }

    pub fn observer_mut(&mut self) -> &mut V {
        &mut self.observer
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Frames drawn since `start`
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn detach_surface(&mut self) -> Option<S> {
        self.sized = false;
        self.surface.take()
    }

    /// Attach a surface and, while running, size it for the current viewport
    pub fn attach_surface(&mut self, surface: S) {
        self.surface = Some(surface);
        self.sized = false;
        if self.state == DriverState::Running {
            self.resize_surface();
        }
    }

    /// Idle → Running. On a configuration error the driver stays idle with
    /// nothing scheduled or subscribed.
    pub fn start<R: Rng + ?Sized>(
        &mut self,
        viewport: Viewport,
        rng: &mut R,
    ) -> Result<(), ConfigurationError> {
        if self.state != DriverState::Idle {
            warn!("start ignored while {:?}", self.state);
            return Ok(());
        }

        let viewport = Viewport::new(viewport.width, viewport.height, viewport.pixel_ratio);
        let flock = Flock::init(self.config, viewport.width, viewport.height, rng).map_err(|err| {
            warn!("particle field not started: {}", err);
            err
        })?;

        self.viewport = viewport;
        self.resize_surface();
        self.flock = Some(flock);
        self.frames = 0;

        self.observer.subscribe();
        self.subscribed = true;
        self.state = DriverState::Running;
        self.schedule();

        info!(
            "particle field started: {} particles on {}x{} @{}x",
            self.config.population, viewport.width, viewport.height, viewport.pixel_ratio
        );
        Ok(())
    }

    /// Cancel the pending frame and the resize subscription. Valid from any
    /// state, idempotent, and the end of the driver's life.
    pub fn stop(&mut self) {
        if self.frame_pending {
            self.scheduler.cancel_frame();
            self.frame_pending = false;
        }
        if self.subscribed {
            self.observer.unsubscribe();
            self.subscribed = false;
        }
        if self.state != DriverState::Stopped {
            info!("particle field stopped after {} frames", self.frames);
            self.state = DriverState::Stopped;
            self.flock = None;
        }
    }

    /// One frame: step, repaint background, draw particles, schedule the next
    pub fn tick(&mut self) {
        if self.state != DriverState::Running {
            return;
        }
        self.frame_pending = false;

        let viewport = self.viewport;
        if let Some(flock) = self.flock.as_mut() {
            flock.step(viewport.width, viewport.height);
        }

        // A surface attached after `start` has never been sized
        let attached = self.surface.as_ref().is_some_and(|surface| surface.is_attached());
        if attached && !self.sized {
            debug!("surface attached late, sizing for the current viewport");
            self.resize_surface();
        }

        let surface = self.surface.as_mut().filter(|surface| surface.is_attached());
        if let (Some(surface), false) = (surface, viewport.is_empty()) {
            surface.fill(self.config.background_color);
            self.lattice.draw(surface, viewport);
            if let Some(flock) = self.flock.as_ref() {
                flock.render(surface, viewport.pixel_ratio);
            }
            self.frames += 1;
        }

        self.schedule();
    }

    /// Resize the surface, repaint the lattice and pull particles back in
    pub fn on_resize(&mut self, viewport: Viewport) {
        if self.state != DriverState::Running {
            debug!("resize ignored while {:?}", self.state);
            return;
        }

        self.viewport = Viewport::new(viewport.width, viewport.height, viewport.pixel_ratio);
        self.resize_surface();
        if let Some(flock) = self.flock.as_mut() {
            flock.on_resize(self.viewport.width, self.viewport.height);
        }
        // Picks the loop back up if the last frame request failed
        self.schedule();

        debug!(
            "particle field resized to {}x{} @{}x",
            self.viewport.width, self.viewport.height, self.viewport.pixel_ratio
        );
    }

    /// Swap in a new configuration. Re-initializes the population when
    /// running; on error the previous configuration stays in effect.
    pub fn reset<R: Rng + ?Sized>(
        &mut self,
        config: SimulationConfig,
        rng: &mut R,
    ) -> Result<(), ConfigurationError> {
        if self.state == DriverState::Stopped {
            warn!("reset ignored after stop");
            return Ok(());
        }

        config.validate()?;
        self.config = config;
        self.lattice = LatticeRenderer::from_config(&config);

        if self.state == DriverState::Running {
            self.flock = Some(Flock::init(config, self.viewport.width, self.viewport.height, rng)?);
            self.resize_surface();
            info!("particle field reset with {} particles", config.population);
        }
        Ok(())
    }

    fn schedule(&mut self) {
        if !self.frame_pending {
            self.frame_pending = self.scheduler.request_frame();
            if !self.frame_pending {
                warn!("frame request failed, animation paused until the next resize");
            }
        }
    }

    fn resize_surface(&mut self) {
        self.sized = match self.surface.as_mut() {
            Some(surface) => {
                self.lattice.resize(surface, self.viewport);
                surface.is_attached()
            }
            None => false,
        };
    }
}

impl<S, C, V> Drop for FrameDriver<S, C, V>
where
    S: Surface,
    C: FrameScheduler,
    V: ViewportObserver,
{
    fn drop(&mut self) {
        self.stop();
    }
}
