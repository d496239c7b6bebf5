mod clock;
mod input;
mod loop_runner;
mod metrics;
mod rendering;
mod scene;

pub use clock::{Clock, SystemClock};
pub use input::{InputEvent, KeyCode, KeyPhase};
pub use loop_runner::{run_app, AppError, LoopConfig};
pub use metrics::LoopMetricsSnapshot;
pub use rendering::{
    PixelsRenderer, Point, Rect, RenderError, Renderer, Rgba, Surface, TextureId,
};
pub use scene::Scene;
