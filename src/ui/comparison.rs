/// Before/after comparison renderer
///
/// Draws the session's images as stacked layers: the processed image as
/// the base, the original clipped to the region left of the slider, so
/// dragging reveals the edit. The slider position is widget state owned
/// here, never part of the session; it resets to center whenever the
/// comparison pair changes identity. The renderer performs no I/O.

use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Program};
use iced::widget::image::Handle;
use iced::widget::text;
use iced::{alignment, touch, Color, Point, Rectangle, Renderer, Size, Theme};

use crate::Message;

/// Slider center position, also the reset position for a new pair
const DEFAULT_POSITION: f32 = 50.0;

/// Map an absolute cursor x onto a slider position in [0, 100].
///
/// Linear over the widget's width and clamped at both ends, so a pointer
/// dragged far outside the bounds pins the slider to an edge.
pub fn position_from_cursor(bounds: Rectangle, x: f32) -> f32 {
    if bounds.width <= 0.0 {
        return DEFAULT_POSITION;
    }
    ((x - bounds.x) / bounds.width * 100.0).clamp(0.0, 100.0)
}

/// Largest rectangle with the image's aspect ratio that fits the area,
/// centered (letterboxed) inside it.
pub fn fit_rect(width: u32, height: u32, area: Size) -> Rectangle {
    if width == 0 || height == 0 || area.width <= 0.0 || area.height <= 0.0 {
        return Rectangle::new(Point::ORIGIN, area);
    }

    let scale = (area.width / width as f32).min(area.height / height as f32);
    let fitted = Size::new(width as f32 * scale, height as f32 * scale);

    Rectangle::new(
        Point::new(
            (area.width - fitted.width) / 2.0,
            (area.height - fitted.height) / 2.0,
        ),
        fitted,
    )
}

/// Widget-owned slider state
#[derive(Debug, Clone)]
pub struct SliderState {
    position_percent: f32,
    /// Pair token the position belongs to
    pair: u64,
    dragging: bool,
}

impl Default for SliderState {
    fn default() -> Self {
        Self {
            position_percent: DEFAULT_POSITION,
            pair: 0,
            dragging: false,
        }
    }
}

impl SliderState {
    /// Re-center the slider when the comparison pair changed identity
    fn retarget(&mut self, pair: u64) {
        if self.pair != pair {
            self.position_percent = DEFAULT_POSITION;
            self.pair = pair;
            self.dragging = false;
        }
    }

    /// Position to draw for the given pair, ignoring a stale stored value
    fn position_for(&self, pair: u64) -> f32 {
        if self.pair == pair {
            self.position_percent
        } else {
            DEFAULT_POSITION
        }
    }
}

/// One image layer: a renderer handle plus its pixel dimensions
#[derive(Debug, Clone)]
pub struct Layer<'a> {
    pub handle: &'a Handle,
    pub width: u32,
    pub height: u32,
}

/// Canvas program for the comparison view.
///
/// A pure function of (original, processed, in-flight, pair token) plus
/// the widget-owned `SliderState`; rebuilt by `view` on every frame.
pub struct Comparison<'a> {
    original: Layer<'a>,
    processed: Option<Layer<'a>>,
    in_flight: bool,
    pair: u64,
}

impl<'a> Comparison<'a> {
    pub fn new(
        original: Layer<'a>,
        processed: Option<Layer<'a>>,
        in_flight: bool,
        pair: u64,
    ) -> Self {
        Self {
            original,
            processed,
            in_flight,
            pair,
        }
    }

    fn interactive(&self) -> bool {
        self.processed.is_some() && !self.in_flight
    }

    /// Clamp-and-store for one pointer sample; emits a message purely to
    /// wake the runtime so the drag renders continuously
    fn drag_to(&self, state: &mut SliderState, bounds: Rectangle, x: f32) -> Option<Message> {
        state.position_percent = position_from_cursor(bounds, x);
        Some(Message::SliderMoved(state.position_percent))
    }
}

impl Program<Message> for Comparison<'_> {
    type State = SliderState;

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        state.retarget(self.pair);

        // Slider interactions are suppressed until a comparison pair
        // exists and nothing is in flight
        if !self.interactive() {
            return (canvas::event::Status::Ignored, None);
        }

        match event {
            canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                if let Some(position) = cursor.position() {
                    if bounds.contains(position) {
                        state.dragging = true;
                        let message = self.drag_to(state, bounds, position.x);
                        return (canvas::event::Status::Captured, message);
                    }
                }
            }

            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if state.dragging {
                    if let Some(position) = cursor.position() {
                        let message = self.drag_to(state, bounds, position.x);
                        return (canvas::event::Status::Captured, message);
                    }
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                if state.dragging {
                    state.dragging = false;
                    return (canvas::event::Status::Captured, None);
                }
            }

            // Touch maps identically to the mouse path
            canvas::Event::Touch(touch::Event::FingerPressed { position, .. }) => {
                if bounds.contains(position) {
                    state.dragging = true;
                    let message = self.drag_to(state, bounds, position.x);
                    return (canvas::event::Status::Captured, message);
                }
            }

            canvas::Event::Touch(touch::Event::FingerMoved { position, .. }) => {
                if state.dragging {
                    let message = self.drag_to(state, bounds, position.x);
                    return (canvas::event::Status::Captured, message);
                }
            }

            canvas::Event::Touch(touch::Event::FingerLifted { .. })
            | canvas::Event::Touch(touch::Event::FingerLost { .. }) => {
                if state.dragging {
                    state.dragging = false;
                    return (canvas::event::Status::Captured, None);
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn draw(
        &self,
        state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());
        let area = frame.size();

        frame.fill_rectangle(Point::ORIGIN, area, Color::BLACK);

        match (&self.processed, self.in_flight) {
            // Original alone, no slider
            (None, false) => {
                draw_layer(&mut frame, &self.original, area);
            }

            // Processing: best available image under a veil, no slider
            (processed, true) => {
                let layer = processed.as_ref().unwrap_or(&self.original);
                draw_layer(&mut frame, layer, area);
                draw_processing_veil(&mut frame, area);
            }

            // Both images: processed base, original clipped left of slider
            (Some(processed), false) => {
                let position = state.position_for(self.pair);
                let split_x = area.width * position / 100.0;

                draw_layer(&mut frame, processed, area);

                frame.with_clip(
                    Rectangle::new(Point::ORIGIN, Size::new(split_x, area.height)),
                    |frame| {
                        draw_layer(frame, &self.original, area);
                    },
                );

                draw_divider(&mut frame, split_x, area.height);
                draw_label(&mut frame, "Original", Point::new(12.0, 12.0));
                draw_label(&mut frame, "Edited", Point::new(area.width - 72.0, 12.0));
            }
        }

        vec![frame.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if self.interactive() && cursor.is_over(bounds) {
            mouse::Interaction::ResizingHorizontally
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Draw one image aspect-fitted into the area
fn draw_layer(frame: &mut canvas::Frame, layer: &Layer<'_>, area: Size) {
    let target = fit_rect(layer.width, layer.height, area);
    frame.draw_image(target, canvas::Image::new(layer.handle.clone()));
}

/// Dim the view and announce that a request is in flight
fn draw_processing_veil(frame: &mut canvas::Frame, area: Size) {
    frame.fill_rectangle(Point::ORIGIN, area, Color::from_rgba(0.0, 0.0, 0.0, 0.55));

    frame.fill_text(canvas::Text {
        content: "Generating magic...".to_string(),
        position: Point::new(area.width / 2.0, area.height / 2.0),
        color: Color::from_rgb(0.55, 0.60, 1.0),
        size: 20.0.into(),
        horizontal_alignment: alignment::Horizontal::Center,
        vertical_alignment: alignment::Vertical::Center,
        ..canvas::Text::default()
    });
}

/// White divider line with a circular drag handle
fn draw_divider(frame: &mut canvas::Frame, split_x: f32, height: f32) {
    frame.fill_rectangle(
        Point::new(split_x - 1.0, 0.0),
        Size::new(2.0, height),
        Color::WHITE,
    );

    let center = Point::new(split_x, height / 2.0);
    frame.fill(&Path::circle(center, 14.0), Color::WHITE);

    frame.fill_text(canvas::Text {
        content: "◂ ▸".to_string(),
        position: center,
        color: Color::from_rgb(0.1, 0.1, 0.15),
        size: 11.0.into(),
        horizontal_alignment: alignment::Horizontal::Center,
        vertical_alignment: alignment::Vertical::Center,
        shaping: text::Shaping::Advanced,
        ..canvas::Text::default()
    });
}

/// Corner tag naming which side is which
fn draw_label(frame: &mut canvas::Frame, content: &str, position: Point) {
    let width = 12.0 + content.len() as f32 * 7.5;
    frame.fill_rectangle(
        position,
        Size::new(width, 22.0),
        Color::from_rgba(0.0, 0.0, 0.0, 0.55),
    );

    frame.fill_text(canvas::Text {
        content: content.to_string(),
        position: Point::new(position.x + 6.0, position.y + 11.0),
        color: Color::WHITE,
        size: 13.0.into(),
        horizontal_alignment: alignment::Horizontal::Left,
        vertical_alignment: alignment::Vertical::Center,
        ..canvas::Text::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> Rectangle {
        Rectangle::new(Point::new(100.0, 50.0), Size::new(400.0, 300.0))
    }

    #[test]
    fn test_position_is_clamped_far_left_and_right() {
        assert_eq!(position_from_cursor(bounds(), -10_000.0), 0.0);
        assert_eq!(position_from_cursor(bounds(), 10_000.0), 100.0);
    }

    #[test]
    fn test_position_is_linear_inside_bounds() {
        let b = bounds();
        assert_eq!(position_from_cursor(b, 100.0), 0.0);
        assert_eq!(position_from_cursor(b, 300.0), 50.0);
        assert_eq!(position_from_cursor(b, 400.0), 75.0);
        assert_eq!(position_from_cursor(b, 500.0), 100.0);
    }

    #[test]
    fn test_degenerate_bounds_fall_back_to_center() {
        let flat = Rectangle::new(Point::ORIGIN, Size::new(0.0, 100.0));
        assert_eq!(position_from_cursor(flat, 42.0), DEFAULT_POSITION);
    }

    #[test]
    fn test_fit_rect_letterboxes_a_wide_image() {
        let rect = fit_rect(200, 100, Size::new(100.0, 100.0));
        assert_eq!(rect.width, 100.0);
        assert_eq!(rect.height, 50.0);
        assert_eq!(rect.x, 0.0);
        assert_eq!(rect.y, 25.0);
    }

    #[test]
    fn test_fit_rect_pillarboxes_a_tall_image() {
        let rect = fit_rect(100, 200, Size::new(100.0, 100.0));
        assert_eq!(rect.width, 50.0);
        assert_eq!(rect.height, 100.0);
        assert_eq!(rect.x, 25.0);
        assert_eq!(rect.y, 0.0);
    }

    #[test]
    fn test_fit_rect_exact_fit() {
        let rect = fit_rect(640, 480, Size::new(640.0, 480.0));
        assert_eq!(rect, Rectangle::new(Point::ORIGIN, Size::new(640.0, 480.0)));
    }

    #[test]
    fn test_slider_resets_to_center_on_new_pair() {
        let mut state = SliderState::default();
        state.retarget(1);
        state.position_percent = 80.0;

        // Same pair: position sticks
        state.retarget(1);
        assert_eq!(state.position_for(1), 80.0);

        // New pair: back to center
        state.retarget(2);
        assert_eq!(state.position_for(2), DEFAULT_POSITION);
    }

    #[test]
    fn test_stale_state_draws_centered_before_any_event() {
        let mut state = SliderState::default();
        state.retarget(1);
        state.position_percent = 10.0;

        // Draw for a newer pair that update() has not seen yet
        assert_eq!(state.position_for(2), DEFAULT_POSITION);
    }
}
