use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::EventLoopError;
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::window::WindowBuilder;

use crate::{AppPaths, InitError, InitStage};

use super::clock::{Clock, SystemClock};
use super::input::InputCollector;
use super::metrics::MetricsAccumulator;
use super::rendering::{PixelsRenderer, RenderError, Renderer, Rgba};
use super::Scene;

const CLEAR_COLOR: Rgba = Rgba::WHITE;

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    pub target_fps: u32,
    pub metrics_log_interval_ms: u64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Scrollfire".to_string(),
            window_width: 1280,
            window_height: 720,
            target_fps: 60,
            metrics_log_interval_ms: 1000,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Init(#[from] InitError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the window and drives `scene` until quit. `app_paths` must already be
/// resolved; sprites load from its asset dir.
pub fn run_app(
    config: LoopConfig,
    app_paths: AppPaths,
    scene: Box<dyn Scene>,
) -> Result<(), AppError> {
    info!(
        root = %app_paths.root.display(),
        asset_dir = %app_paths.asset_dir.display(),
        "startup"
    );

    let event_loop =
        EventLoop::new().map_err(|error| InitError::new(InitStage::EventLoop, error))?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(|error| InitError::new(InitStage::Window, error))?,
    );
    let mut renderer = PixelsRenderer::new(
        Arc::clone(&window),
        config.window_width,
        config.window_height,
        app_paths.asset_dir.clone(),
    )
    .map_err(|error| InitError::new(InitStage::Renderer, error))?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let clock = SystemClock::new();
    let mut frame_loop = FrameLoop::new(
        scene,
        config.target_fps,
        config.metrics_log_interval_ms,
        clock.now_millis(),
    );
    frame_loop.load(&mut renderer);
    info!(
        target_fps = frame_loop.target_fps,
        metrics_log_interval_ms = config.metrics_log_interval_ms,
        "loop_config"
    );

    let mut last_applied_title: Option<String> = None;

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    frame_loop.input.mark_quit_requested();
                    info!(reason = "window_close", "shutdown_requested");
                }
                WindowEvent::Resized(new_size) => {
                    if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "renderer_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    frame_loop.input.handle_keyboard_input(&event);
                }
                WindowEvent::RedrawRequested => {
                    if !frame_loop.is_running() {
                        window_target.exit();
                        return;
                    }
                    if let Err(error) = frame_loop.run_frame(&mut renderer, &clock) {
                        warn!(error = %error, "renderer_draw_failed");
                        window_target.exit();
                        return;
                    }
                    let next_title = frame_loop.scene.debug_title();
                    if next_title != last_applied_title {
                        match &next_title {
                            Some(title) => window.set_title(title),
                            None => window.set_title(&config.window_title),
                        }
                        last_applied_title = next_title;
                    }
                }
                _ => {}
            },
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                frame_loop.shutdown();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// One thread, one loop: drain input, update, render, present, then sleep
/// off whatever is left of the frame budget.
pub(crate) struct FrameLoop {
    scene: Box<dyn Scene>,
    input: InputCollector,
    metrics: MetricsAccumulator,
    target_fps: u32,
    frame_target_ms: Option<f64>,
    running: bool,
}

impl FrameLoop {
    pub(crate) fn new(
        scene: Box<dyn Scene>,
        target_fps: u32,
        metrics_log_interval_ms: u64,
        now_ms: u64,
    ) -> Self {
        let target_fps = normalize_target_fps(target_fps);
        Self {
            scene,
            input: InputCollector::new(),
            metrics: MetricsAccumulator::new(now_ms, metrics_log_interval_ms),
            target_fps,
            frame_target_ms: target_frame_millis(Some(target_fps)),
            running: true,
        }
    }

    pub(crate) fn load(&mut self, renderer: &mut dyn Renderer) {
        self.scene.load(renderer);
        info!(entity_count = self.scene.entity_count(), "scene_loaded");
    }

    pub(crate) fn is_running(&self) -> bool {
        self.running
    }

    pub(crate) fn run_frame(
        &mut self,
        renderer: &mut dyn Renderer,
        clock: &dyn Clock,
    ) -> Result<(), RenderError> {
        let frame_start = clock.now_millis();

        let drained = self.input.drain();
        if drained.quit_requested {
            self.running = false;
            info!(reason = "quit_requested", "shutdown_requested");
        }
        for event in drained.events {
            self.scene.handle_input(event);
        }

        self.scene.update(frame_start);

        renderer.clear(CLEAR_COLOR);
        self.scene.render(renderer);
        renderer.present()?;

        let work_ms = clock.now_millis().saturating_sub(frame_start);
        let cap_sleep = compute_cap_sleep_ms(work_ms, self.frame_target_ms);
        if cap_sleep > 0 {
            clock.delay(cap_sleep);
        }

        let frame_end = clock.now_millis();
        self.metrics
            .record_frame(frame_end.saturating_sub(frame_start));
        if let Some(snapshot) = self.metrics.maybe_snapshot(frame_end) {
            info!(
                fps = snapshot.fps,
                frame_time_ms = snapshot.frame_time_ms,
                entity_count = self.scene.entity_count(),
                "loop_metrics"
            );
        }
        Ok(())
    }

    pub(crate) fn shutdown(&mut self) {
        self.running = false;
        self.scene.unload();
    }
}

fn normalize_target_fps(target_fps: u32) -> u32 {
    if target_fps == 0 {
        60
    } else {
        target_fps
    }
}

fn target_frame_millis(target_fps: Option<u32>) -> Option<f64> {
    target_fps
        .filter(|fps| *fps > 0)
        .map(|fps| 1000.0 / fps as f64)
}

fn compute_cap_sleep_ms(elapsed_ms: u64, target_ms: Option<f64>) -> u64 {
    match target_ms {
        Some(frame_target) if (elapsed_ms as f64) < frame_target => {
            (frame_target - elapsed_ms as f64) as u64
        }
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    use super::*;
    use crate::app::{InputEvent, KeyCode, Rect, TextureId};
    use crate::assets::AssetError;

    #[derive(Default)]
    struct ManualClock {
        now: Cell<u64>,
        delays: RefCell<Vec<u64>>,
        work_per_read: Cell<u64>,
    }

    impl Clock for ManualClock {
        fn now_millis(&self) -> u64 {
            let now = self.now.get();
            self.now.set(now + self.work_per_read.get());
            now
        }

        fn delay(&self, millis: u64) {
            self.delays.borrow_mut().push(millis);
            self.now.set(self.now.get() + millis);
        }
    }

    #[derive(Default)]
    struct NullRenderer {
        presented: u32,
        cleared: u32,
    }

    impl Renderer for NullRenderer {
        fn screen_size(&self) -> (u32, u32) {
            (1280, 720)
        }
        fn clear(&mut self, _color: Rgba) {
            self.cleared += 1;
        }
        fn draw_filled_rect(&mut self, _rect: Rect, _color: Rgba) {}
        fn draw_texture_region(&mut self, _texture: TextureId, _src: Rect, _dst: Rect) {}
        fn create_target_texture(&mut self, _width: u32, _height: u32) -> TextureId {
            TextureId(0)
        }
        fn set_render_target(&mut self, _target: Option<TextureId>) {}
        fn load_texture(&mut self, key: &str) -> Result<TextureId, AssetError> {
            Err(AssetError::Open {
                path: key.into(),
                source: std::io::Error::from(std::io::ErrorKind::NotFound),
            })
        }
        fn texture_size(&self, _texture: TextureId) -> Option<(u32, u32)> {
            None
        }
        fn present(&mut self) -> Result<(), RenderError> {
            self.presented += 1;
            Ok(())
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    enum Call {
        Input(InputEvent),
        Update(u64),
        Render,
    }

    struct ScriptedScene {
        calls: Rc<RefCell<Vec<Call>>>,
    }

    impl Scene for ScriptedScene {
        fn load(&mut self, _renderer: &mut dyn Renderer) {}
        fn handle_input(&mut self, event: InputEvent) {
            self.calls.borrow_mut().push(Call::Input(event));
        }
        fn update(&mut self, now_millis: u64) {
            self.calls.borrow_mut().push(Call::Update(now_millis));
        }
        fn render(&mut self, _renderer: &mut dyn Renderer) {
            self.calls.borrow_mut().push(Call::Render);
        }
    }

    fn scripted_loop() -> (FrameLoop, Rc<RefCell<Vec<Call>>>) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let scene = ScriptedScene {
            calls: Rc::clone(&calls),
        };
        (FrameLoop::new(Box::new(scene), 60, 1000, 0), calls)
    }

    #[test]
    fn input_is_delivered_before_update_in_same_frame() {
        let (mut frame_loop, calls) = scripted_loop();
        let clock = ManualClock::default();
        let mut renderer = NullRenderer::default();

        frame_loop.input.push(InputEvent::down(KeyCode::KeyW));
        frame_loop.input.push(InputEvent::up(KeyCode::KeyW));
        frame_loop.run_frame(&mut renderer, &clock).expect("frame");

        assert_eq!(
            *calls.borrow(),
            vec![
                Call::Input(InputEvent::down(KeyCode::KeyW)),
                Call::Input(InputEvent::up(KeyCode::KeyW)),
                Call::Update(0),
                Call::Render,
            ]
        );
        assert_eq!(renderer.cleared, 1);
        assert_eq!(renderer.presented, 1);
    }

    #[test]
    fn quit_finishes_current_frame_then_stops() {
        let (mut frame_loop, calls) = scripted_loop();
        let clock = ManualClock::default();
        let mut renderer = NullRenderer::default();

        frame_loop.input.mark_quit_requested();
        frame_loop.run_frame(&mut renderer, &clock).expect("frame");

        assert!(!frame_loop.is_running());
        assert!(calls.borrow().contains(&Call::Update(0)));
        assert_eq!(renderer.presented, 1);
    }

    #[test]
    fn idle_frame_sleeps_remaining_budget() {
        let (mut frame_loop, _calls) = scripted_loop();
        let clock = ManualClock::default();
        let mut renderer = NullRenderer::default();

        frame_loop.run_frame(&mut renderer, &clock).expect("frame");

        assert_eq!(*clock.delays.borrow(), vec![16]);
    }

    #[test]
    fn slow_frame_does_not_sleep() {
        let (mut frame_loop, _calls) = scripted_loop();
        let clock = ManualClock::default();
        clock.work_per_read.set(20);
        let mut renderer = NullRenderer::default();

        frame_loop.run_frame(&mut renderer, &clock).expect("frame");

        assert!(clock.delays.borrow().is_empty());
    }

    #[test]
    fn target_frame_millis_none_when_cap_off() {
        assert_eq!(target_frame_millis(None), None);
        assert_eq!(target_frame_millis(Some(0)), None);
    }

    #[test]
    fn target_frame_millis_for_60hz_is_expected() {
        let millis = target_frame_millis(Some(60)).expect("millis");
        assert!((millis - 1000.0 / 60.0).abs() < 0.000_001);
    }

    #[test]
    fn compute_cap_sleep_zero_when_over_budget() {
        assert_eq!(compute_cap_sleep_ms(20, target_frame_millis(Some(60))), 0);
    }

    #[test]
    fn compute_cap_sleep_positive_when_under_budget() {
        assert_eq!(compute_cap_sleep_ms(5, target_frame_millis(Some(60))), 11);
    }

    #[test]
    fn zero_target_fps_falls_back_to_sixty() {
        assert_eq!(normalize_target_fps(0), 60);
        assert_eq!(normalize_target_fps(30), 30);
    }
}
