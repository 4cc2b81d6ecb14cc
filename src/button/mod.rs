//! Buttons: the instance table, the rendered image and the jobs of one
//! on-screen control.
//!
//! `Button` is the host-facing handle; its state lives in a shared
//! `ButtonCore` that background jobs also hold. Instance tables are
//! copy-on-write so a render works from an immutable snapshot, and every
//! finished render is published as a new `Arc<RenderedImage>`.

mod definition;
mod interaction;
mod kinds;
mod services;
mod setters;

pub use definition::ButtonDefinition;
pub use services::{CredentialPrompt, DisplayFrame, DisplaySink, Services};
pub use setters::InstanceSel;

use crate::error::{ButtonError, Result};
use crate::jobs::{
    animation, drag, refresh, AnimationTarget, JobEngine, JobKind, LevelMove, LevelTarget,
    RangeAnimation, RefreshTarget,
};
use crate::lock;
use crate::network::{dispatch, ProtocolCommand};
use crate::storage::{decode_image, CacheKind, LevelSignature, LevelSnapshot, PendingRemoteImage, SharedLevelState};
use crate::types::{BitmapSource, ButtonGeometry, ButtonHandle, ButtonInstance, ButtonType, RemoteSource};
use crate::ui::compositing::{PendingLayer, RenderContext};
use crate::ui::raster::Raster;
use crate::ui::AssetAccess;
use kinds::Behaviour;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

/// Most recent composite of a button
#[derive(Debug)]
pub struct RenderedImage {
    pub raster: Arc<Raster>,
    /// Instance the image shows
    pub instance: usize,
    /// Text drawn into the image
    pub text: String,
    /// Level and joystick position the image was drawn from
    pub level: LevelSnapshot,
}

impl RenderedImage {
    pub fn width(&self) -> usize {
        self.raster.width()
    }

    pub fn height(&self) -> usize {
        self.raster.height()
    }

    pub fn is_transparent_at(&self, x: i32, y: i32) -> bool {
        self.raster.is_transparent_at(x, y)
    }

    /// Whether the drawn level and joystick position match `level`
    pub fn shows_level(&self, level: &LevelSnapshot) -> bool {
        (self.level.level, self.level.joy_x, self.level.joy_y) == (level.level, level.joy_x, level.joy_y)
    }
}

/// Immutable view of the state a render reads
pub(crate) struct FrameState {
    pub instances: Arc<Vec<ButtonInstance>>,
    pub active: usize,
    pub level: LevelSnapshot,
    pub global_opacity: u8,
}

impl FrameState {
    pub fn active_instance(&self) -> &ButtonInstance {
        &self.instances[self.active.min(self.instances.len() - 1)]
    }
}

/// Where a drag started
#[derive(Clone, Copy, Debug)]
pub(crate) struct DragOrigin {
    pub point: (i32, i32),
    pub level: i32,
    pub joystick: (i32, i32),
}

#[derive(Debug, Default)]
pub(crate) struct PasswordGate {
    pub unlocked: bool,
    /// Press (and release) held back until the password is supplied
    pub press: Option<(i32, i32)>,
    pub release: Option<(i32, i32)>,
}

pub(crate) struct ButtonState {
    pub instances: Arc<Vec<ButtonInstance>>,
    pub active: usize,
    /// Bumped by every change that needs a redraw
    pub generation: u64,
    pub rendered_generation: Option<u64>,
    pub visible: bool,
    pub pressed: bool,
    pub global_opacity: u8,
    pub drag: Option<DragOrigin>,
    pub gate: PasswordGate,
}

impl ButtonState {
    pub fn is_dirty(&self) -> bool {
        self.rendered_generation != Some(self.generation)
    }

    pub fn touch(&mut self) {
        self.generation = self.generation.wrapping_add(1);
    }
}

pub(crate) struct ButtonCore {
    me: Weak<ButtonCore>,
    geometry: ButtonGeometry,
    services: Services,
    behaviour: Box<dyn Behaviour>,
    state: Mutex<ButtonState>,
    rendered: Mutex<Option<Arc<RenderedImage>>>,
    level: Arc<SharedLevelState>,
    jobs: JobEngine,
    destroyed: AtomicBool,
}

impl ButtonCore {
    pub fn state(&self) -> std::sync::MutexGuard<'_, ButtonState> {
        lock(&self.state)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    pub fn instance_count(&self) -> usize {
        self.state().instances.len()
    }

    pub fn rendered(&self) -> Option<Arc<RenderedImage>> {
        lock(&self.rendered).clone()
    }

    fn context(&self) -> RenderContext<'_> {
        RenderContext {
            geometry: &self.geometry,
            assets: AssetAccess {
                catalogue: self.services.catalogue.as_ref(),
                loader: self.services.loader.as_ref(),
                cache: &self.services.images,
            },
            fonts: self.services.fonts.as_ref(),
            shaper: &self.services.shaper,
            config: &self.services.config,
        }
    }

    pub fn check_instance(&self, index: usize) -> Result<()> {
        let count = self.instance_count();
        if index >= count {
            let e = ButtonError::InvalidInstance { index, count };
            log::error!("Button {}: {}", self.geometry.handle, e);
            return Err(e);
        }
        Ok(())
    }

    /// Mark the button as needing a redraw
    pub fn touch(&self) {
        self.state().touch();
    }

    /// Composite the active instance, unless the last image is still current.
    ///
    /// On failure the previous image stays in place.
    pub fn redraw(&self, force: bool) -> Result<Arc<RenderedImage>> {
        if self.is_destroyed() {
            return Err(ButtonError::Destroyed(self.geometry.handle.to_string()));
        }
        let previous = self.rendered();
        let (frame, generation, dirty) = {
            let mut st = self.state();
            let level = self.level.snapshot();
            // Another button on the same level may have moved it since the last frame
            let level_moved = self.geometry.kind.is_level_driven()
                && previous.as_ref().is_some_and(|image| !image.shows_level(&level));
            if level_moved {
                if let Some(index) = self.behaviour.instance_for_level(level.level, st.instances.len()) {
                    if st.active != index {
                        st.active = index;
                        st.touch();
                    }
                }
            }
            let frame = FrameState {
                instances: Arc::clone(&st.instances),
                active: st.active,
                level,
                global_opacity: st.global_opacity,
            };
            (frame, st.generation, st.is_dirty() || level_moved)
        };

        if !force && !dirty {
            if let Some(image) = previous.filter(|i| i.instance == frame.active) {
                log::trace!("Button {}: redelivering cached image", self.geometry.handle);
                self.deliver(&image);
                return Ok(image);
            }
        }

        let composed = self.behaviour.compose(&self.context(), &frame).map_err(|e| {
            log::error!("Button {}: render failed: {}", self.geometry.handle, e);
            e
        })?;
        let image = Arc::new(RenderedImage {
            raster: Arc::new(composed.raster),
            instance: frame.active,
            text: composed.text,
            level: frame.level,
        });
        *lock(&self.rendered) = Some(Arc::clone(&image));
        {
            let mut st = self.state();
            if st.generation == generation {
                st.rendered_generation = Some(generation);
            }
        }

        self.deliver(&image);
        self.track_remote_layers(&frame, &composed.pending, &image);
        Ok(image)
    }

    /// Redraw and deliver when the button is on screen; errors are logged
    pub fn refresh_if_visible(&self) {
        if !self.state().visible {
            return;
        }
        let _ = self.redraw(false);
    }

    fn deliver(&self, image: &RenderedImage) {
        if self.is_destroyed() {
            return;
        }
        let (visible, marquee) = {
            let st = self.state();
            let marquee = st
                .instances
                .get(image.instance)
                .and_then(|i| i.marquee)
                .filter(|m| m.enabled);
            (st.visible, marquee)
        };
        if !visible {
            return;
        }
        let Some(display) = &self.services.display else {
            return;
        };
        display.display(DisplayFrame {
            handle: self.geometry.handle,
            parent: self.geometry.handle.parent(),
            raster: Arc::clone(&image.raster),
            left: self.geometry.rect.left,
            top: self.geometry.rect.top,
            pass_through: self.geometry.pass_through,
            marquee,
        });
    }

    /// Make `index` the active instance and redraw if visible
    pub fn select_instance(&self, index: usize) -> Result<()> {
        self.check_instance(index)?;
        {
            let mut st = self.state();
            if st.active != index {
                st.active = index;
                st.touch();
            }
        }
        self.refresh_if_visible();
        Ok(())
    }

    /// Send a command through the transport (logged and skipped when there is none)
    pub fn send(&self, command: ProtocolCommand) -> bool {
        dispatch(self.services.transport.as_deref(), command)
    }

    pub fn device(&self) -> u16 {
        self.services.config.device
    }

    /// Stage fetches for remote layers with no image yet and keep periodic
    /// refresh jobs running
    fn track_remote_layers(&self, frame: &FrameState, pending: &[PendingLayer], image: &RenderedImage) {
        for p in pending {
            self.services.pending.stage(PendingRemoteImage {
                handle: self.geometry.handle,
                layer: p.layer,
                url: p.source.url.clone(),
                target: self.geometry.rect,
                partial: Arc::clone(&image.raster),
                ready: false,
                valid: true,
            });
        }

        let mut wanted: Vec<(usize, RemoteSource)> = pending.iter().map(|p| (p.layer, p.source.clone())).collect();
        for (layer, bitmap) in frame.active_instance().bitmaps.iter().enumerate() {
            if let BitmapSource::Remote(source) = &bitmap.source {
                if source.refresh.is_some() && !wanted.iter().any(|(l, s)| *l == layer && s.url == source.url) {
                    wanted.push((layer, source.clone()));
                }
            }
        }

        // Only sources the active instance shows keep a refresh job
        let keep: Vec<JobKind> = wanted
            .iter()
            .map(|(layer, source)| JobKind::image_refresh(*layer, &source.url))
            .collect();
        for kind in self.jobs.running() {
            if matches!(kind, JobKind::ImageRefresh { .. }) && !keep.contains(&kind) {
                log::debug!("Button {}: stopping {:?}", self.geometry.handle, kind);
                self.jobs.request_stop(kind);
            }
        }

        for (layer, source) in wanted {
            self.start_refresh(layer, source);
        }
    }

    fn start_refresh(&self, layer: usize, source: RemoteSource) -> bool {
        if self.services.fetcher.is_none() {
            log::warn!(
                "Button {}: no fetcher for remote image {}",
                self.geometry.handle,
                source.url
            );
            self.services.pending.mark_invalid(self.geometry.handle, layer, &source.url);
            self.services.pending.discard_invalid();
            return false;
        }
        let Some(core) = self.me.upgrade() else {
            return false;
        };
        let poll = self.jobs.poll_interval();
        self.jobs.start(JobKind::image_refresh(layer, &source.url), move |token| {
            refresh::run_refresh(core.as_ref(), layer, &source, &token, poll);
        })
    }

    /// Walk the level to `to`, ramped when ramp times are configured
    pub fn move_level(&self, from: i32, to: i32, send: bool) {
        let range = self.geometry.range;
        let ramp = range.ramp_for(from, to);
        if ramp.is_zero() || from == to {
            self.apply_level(to, send);
            return;
        }
        // A newer target replaces a move in progress
        self.jobs.request_stop(JobKind::DragLevelMove);
        self.jobs
            .await_stopped(JobKind::DragLevelMove, self.services.config.stop_timeout);

        let Some(core) = self.me.upgrade() else {
            return;
        };
        let mv = LevelMove {
            from,
            to,
            full_range: ramp,
            span: range.span(),
            send,
        };
        let poll = self.jobs.poll_interval();
        if !self.jobs.start(JobKind::DragLevelMove, move |token| {
            drag::run_level_move(core.as_ref(), mv, &token, poll);
        }) {
            self.apply_level(to, send);
        }
    }

    pub fn start_animation(&self) -> bool {
        let interval = self.geometry.animation.interval();
        if interval.is_zero() || self.instance_count() < 2 {
            return false;
        }
        let Some(core) = self.me.upgrade() else {
            return false;
        };
        let poll = self.jobs.poll_interval();
        self.jobs.start(JobKind::Animation, move |token| {
            animation::run_cyclic(core.as_ref(), interval, &token, poll);
        })
    }

    pub fn start_range_animation(&self, range: RangeAnimation) -> Result<bool> {
        range.validate(self.instance_count())?;
        let Some(core) = self.me.upgrade() else {
            return Ok(false);
        };
        let poll = self.jobs.poll_interval();
        Ok(self.jobs.start(JobKind::RangeAnimation, move |token| {
            animation::run_range(core.as_ref(), range, &token, poll);
        }))
    }

    /// Stop both animation kinds and wait for them
    pub fn stop_animation(&self) -> bool {
        let timeout = self.services.config.stop_timeout;
        self.jobs.request_stop(JobKind::Animation);
        self.jobs.request_stop(JobKind::RangeAnimation);
        self.jobs.await_stopped(JobKind::Animation, timeout)
            && self.jobs.await_stopped(JobKind::RangeAnimation, timeout)
    }

    /// Stop every job, drop staging records and release the image
    fn teardown(&self) -> bool {
        if self.destroyed.swap(true, Ordering::AcqRel) {
            return true;
        }
        let stopped = self.jobs.stop_all(self.services.config.stop_timeout);
        self.services.pending.remove_button(self.geometry.handle);
        *lock(&self.rendered) = None;
        log::debug!("Button {} destroyed", self.geometry.handle);
        stopped
    }
}

impl AnimationTarget for ButtonCore {
    fn instance_count(&self) -> usize {
        ButtonCore::instance_count(self)
    }

    fn show_instance(&self, index: usize) -> bool {
        if self.is_destroyed() {
            return false;
        }
        if let Err(e) = self.check_instance(index) {
            log::warn!("Button {}: animation stopped: {}", self.geometry.handle, e);
            return false;
        }
        {
            let mut st = self.state();
            st.active = index;
            st.touch();
            if !st.visible {
                return true;
            }
        }
        self.redraw(false).is_ok()
    }
}

impl LevelTarget for ButtonCore {
    fn apply_level(&self, level: i32, send: bool) {
        if self.is_destroyed() {
            return;
        }
        let level = self.geometry.range.clamp(level);
        self.level.set_level(level);
        if send && self.geometry.bindings.level.is_bound() && self.level.mark_level_sent(level) {
            self.send(ProtocolCommand::level(
                self.device(),
                self.geometry.bindings.level,
                level,
            ));
        }
        match self.behaviour.instance_for_level(level, self.instance_count()) {
            Some(index) => {
                let _ = self.select_instance(index);
            }
            None => {
                self.touch();
                self.refresh_if_visible();
            }
        }
    }
}

impl RefreshTarget for ButtonCore {
    fn refresh_layer(&self, layer: usize, source: &RemoteSource) -> Result<()> {
        let handle = self.geometry.handle;
        let fetched = match &self.services.fetcher {
            Some(fetcher) => fetcher
                .fetch(&source.url, source.user.as_deref(), source.password.as_deref())
                .and_then(|bytes| decode_image(&bytes)),
            None => Err(ButtonError::Fetch("no fetcher configured".into())),
        };

        match fetched {
            Ok(raster) => {
                self.services
                    .images
                    .add(&source.url, Arc::new(raster), CacheKind::Remote);
                self.services.pending.mark_ready(handle, layer, &source.url);
                self.services.pending.take(handle, layer, &source.url);
                self.touch();
                self.refresh_if_visible();
                Ok(())
            }
            Err(e) => {
                // No retry: the button keeps the image it had
                self.services.pending.mark_invalid(handle, layer, &source.url);
                self.services.pending.discard_invalid();
                Err(e)
            }
        }
    }
}

/// Host-facing handle of one button. Dropping it tears the button down.
pub struct Button {
    core: Arc<ButtonCore>,
}

impl Button {
    /// Build a button from a validated definition
    pub fn initialize(definition: ButtonDefinition, services: Services) -> Result<Self> {
        definition.validate()?;
        let ButtonDefinition {
            geometry,
            instances,
        } = definition;

        let level = services.levels.lookup(LevelSignature::of(&geometry));
        let behaviour = kinds::behaviour_for(geometry.kind);
        let poll = services.config.stop_poll_interval;
        log::debug!(
            "Button {} '{}' ({:?}, {} instances)",
            geometry.handle,
            geometry.name,
            geometry.kind,
            instances.len()
        );

        let core = Arc::new_cyclic(|me| ButtonCore {
            me: me.clone(),
            jobs: JobEngine::new(&format!("btn{}", geometry.handle.id()), poll),
            geometry,
            services,
            behaviour,
            state: Mutex::new(ButtonState {
                instances: Arc::new(instances),
                active: 0,
                generation: 0,
                rendered_generation: None,
                visible: false,
                pressed: false,
                global_opacity: 255,
                drag: None,
                gate: PasswordGate::default(),
            }),
            rendered: Mutex::new(None),
            level,
            destroyed: AtomicBool::new(false),
        });
        Ok(Self { core })
    }

    pub fn handle(&self) -> ButtonHandle {
        self.core.geometry.handle
    }

    pub fn geometry(&self) -> &ButtonGeometry {
        &self.core.geometry
    }

    pub fn kind(&self) -> ButtonType {
        self.core.geometry.kind
    }

    pub fn instance_count(&self) -> usize {
        self.core.instance_count()
    }

    pub fn active_instance(&self) -> usize {
        self.core.state().active
    }

    /// Copy of one instance
    pub fn instance(&self, index: usize) -> Option<ButtonInstance> {
        self.core.state().instances.get(index).cloned()
    }

    pub fn is_visible(&self) -> bool {
        self.core.state().visible
    }

    pub fn is_dirty(&self) -> bool {
        self.core.state().is_dirty()
    }

    /// Whether a press is being held
    pub fn is_pressed(&self) -> bool {
        self.core.state().pressed
    }

    /// Current level of the shared level state
    pub fn level(&self) -> i32 {
        self.core.level.level()
    }

    pub fn joystick(&self) -> (i32, i32) {
        let s = self.core.level.snapshot();
        (s.joy_x, s.joy_y)
    }

    /// Last published image
    pub fn rendered(&self) -> Option<Arc<RenderedImage>> {
        self.core.rendered()
    }

    /// Render `instance` (or the active one) and deliver it when visible.
    ///
    /// A clean button with a current image is not recomposited; the cached
    /// image is delivered again.
    pub fn render(&self, instance: Option<usize>) -> Result<Arc<RenderedImage>> {
        if let Some(index) = instance {
            self.core.check_instance(index)?;
            let mut st = self.core.state();
            if st.active != index {
                st.active = index;
                st.touch();
            }
        }
        self.core.redraw(false)
    }

    /// Put the button on screen and deliver its image
    pub fn show(&self) -> Result<()> {
        self.core.state().visible = true;
        self.core.redraw(false).map(|_| ())
    }

    pub fn hide(&self) {
        self.core.state().visible = false;
    }

    /// Start the cyclic animation; `false` when it already runs or the button
    /// has no animation timing
    pub fn start_animation(&self) -> bool {
        self.core.start_animation()
    }

    /// Animate over an instance range. Invalid ranges are rejected.
    pub fn start_range_animation(&self, range: RangeAnimation) -> Result<bool> {
        self.core.start_range_animation(range)
    }

    /// Stop any animation and wait until it has ended
    pub fn stop_animation(&self) -> bool {
        self.core.stop_animation()
    }

    pub fn is_job_running(&self, kind: JobKind) -> bool {
        self.core.jobs.is_running(kind)
    }

    /// Stop all jobs (waiting for each) and release the button.
    /// Returns `false` when a job didn't stop in time.
    pub fn destroy(self) -> bool {
        self.core.teardown()
    }
}

impl Drop for Button {
    fn drop(&mut self) {
        self.core.teardown();
    }
}
