use super::input::InputEvent;
use super::rendering::Renderer;

/// A game state driven by the frame loop.
///
/// Per frame the loop calls `handle_input` for every drained event, then
/// `update` once, then `render` once, then presents.
pub trait Scene {
    fn load(&mut self, renderer: &mut dyn Renderer);
    fn handle_input(&mut self, event: InputEvent);
    fn update(&mut self, now_millis: u64);
    fn render(&mut self, renderer: &mut dyn Renderer);
    fn unload(&mut self) {}
    fn entity_count(&self) -> usize {
        0
    }
    fn debug_title(&self) -> Option<String> {
        None
    }
}
