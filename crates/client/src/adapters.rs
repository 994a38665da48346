use skirmish_core::command::Buttons;
use skirmish_core::world::World;

/// Source of local input, sampled once per frame. An implementation owns
/// whatever windowing/event-pump library the host binary links against; the
/// frame loop only ever sees this trait.
pub trait InputSource {
    /// Pumps the host event queue. Called once per frame before the other
    /// methods are read.
    fn poll_events(&mut self);

    /// True once the user has asked to exit (window close, `QUIT` button).
    fn quit_requested(&self) -> bool;

    /// Currently held movement/turn buttons, ORed together.
    fn pressed_buttons(&self) -> Buttons;

    /// True on the frame a toggle button (`TOGGLE_DEBUG`, `TOGGLE_PREDICT`)
    /// transitions from held to released; toggles fire once per press, not
    /// once per frame held.
    fn button_released_edge(&mut self, button: Buttons) -> bool;

    /// Accumulated look delta since the last call, in radians.
    fn mouse_delta(&mut self) -> (f32, f32);
}

/// Sink for a rendered frame. An implementation owns the actual graphics or
/// terminal backend; the frame loop only ever sees this trait.
pub trait Presenter {
    fn clear(&mut self);

    /// Draws `world` as seen from `perspective_player_id`. `wireframe`
    /// requests a cheaper debug-overlay style where the backend supports it.
    fn draw_world(&mut self, world: &World, perspective_player_id: u8, wireframe: bool);

    fn present(&mut self);
}

/// A `Presenter` with no graphics backend: logs a one-line world summary at
/// debug level. Useful for headless runs and as a default until a real
/// renderer is wired in.
#[derive(Debug, Default)]
pub struct LoggingPresenter;

impl Presenter for LoggingPresenter {
    fn clear(&mut self) {}

    fn draw_world(&mut self, world: &World, perspective_player_id: u8, wireframe: bool) {
        let style = if wireframe { "wireframe" } else { "solid" };
        log::debug!(
            "[{style}] frame from player {perspective_player_id}: {} player(s)",
            world.player_count()
        );
        for p in world.players() {
            log::trace!(
                "  player {} at ({:.2}, {:.2}, {:.2}) yaw {:.2}",
                p.id,
                p.position.x,
                p.position.y,
                p.position.z,
                p.yaw
            );
        }
    }

    fn present(&mut self) {}
}

/// An `InputSource` that never presses anything and never quits. Stands in
/// for a real input backend in headless runs and tests.
#[derive(Debug, Default)]
pub struct NullInputSource;

impl InputSource for NullInputSource {
    fn poll_events(&mut self) {}

    fn quit_requested(&self) -> bool {
        false
    }

    fn pressed_buttons(&self) -> Buttons {
        Buttons::empty()
    }

    fn button_released_edge(&mut self, _button: Buttons) -> bool {
        false
    }

    fn mouse_delta(&mut self) -> (f32, f32) {
        (0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_input_source_never_presses_or_quits() {
        let mut input = NullInputSource;
        input.poll_events();
        assert!(!input.quit_requested());
        assert_eq!(input.pressed_buttons(), Buttons::empty());
        assert!(!input.button_released_edge(Buttons::TOGGLE_DEBUG));
        assert_eq!(input.mouse_delta(), (0.0, 0.0));
    }

    #[test]
    fn logging_presenter_does_not_panic_on_an_empty_world() {
        let mut presenter = LoggingPresenter;
        presenter.clear();
        presenter.draw_world(&World::new(), 1, false);
        presenter.present();
    }
}
