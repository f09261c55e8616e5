use iced::keyboard::{self, Modifiers};
use iced::mouse::{self, Cursor};
use iced::widget::canvas::{self, Path, Program, Stroke};
use iced::{Color, Point, Rectangle, Renderer, Theme};

use crate::display::Input;
use crate::settings::ZoomModifier;

/// Placeholder border shown when no image could be loaded
const BORDER_COLOR: Color = Color::from_rgba(0.47, 0.47, 0.47, 1.0);
const BAND_FILL: Color = Color::from_rgba(0.2, 0.5, 1.0, 0.2);
const BAND_STROKE: Color = Color::from_rgba(0.2, 0.5, 1.0, 0.9);

/// Transparent canvas stacked over the image.
///
/// Translates pointer events into display [`Input`]s and draws the current
/// rubber band. Plain wheel scrolls are left uncaptured so an enclosing
/// scrollable pans the image.
pub struct SelectionOverlay<Message> {
    /// Rectangle of the band being dragged
    selection: Option<Rectangle>,
    bordered: bool,
    zoom_modifier: ZoomModifier,
    on_input: fn(Input) -> Message,
}

impl<Message> SelectionOverlay<Message> {
    pub fn new(
        selection: Option<Rectangle>,
        bordered: bool,
        zoom_modifier: ZoomModifier,
        on_input: fn(Input) -> Message,
    ) -> Self {
        Self {
            selection,
            bordered,
            zoom_modifier,
            on_input,
        }
    }

    fn captured(&self, input: Input) -> (canvas::event::Status, Option<Message>) {
        (canvas::event::Status::Captured, Some((self.on_input)(input)))
    }
}

/// Keyboard state the overlay needs between events
#[derive(Debug, Clone, Default)]
pub struct InputState {
    pub modifiers: Modifiers,
}

impl<Message> Program<Message> for SelectionOverlay<Message> {
    type State = InputState;

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        if self.bordered {
            frame.stroke(
                &Path::rectangle(Point::ORIGIN, bounds.size()),
                Stroke::default().with_color(BORDER_COLOR).with_width(1.0),
            );
        }

        if let Some(selection) = self.selection {
            let band = Path::rectangle(selection.position(), selection.size());
            frame.fill(&band, BAND_FILL);
            frame.stroke(
                &band,
                Stroke::default().with_color(BAND_STROKE).with_width(1.0),
            );
        }

        vec![frame.into_geometry()]
    }

    fn update(
        &self,
        state: &mut Self::State,
        event: canvas::Event,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> (canvas::event::Status, Option<Message>) {
        match event {
            canvas::Event::Keyboard(keyboard::Event::ModifiersChanged(modifiers)) => {
                state.modifiers = modifiers;
            }

            // Modifier + wheel zooms; anything else scrolls the parent
            canvas::Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                if cursor.is_over(bounds) && self.zoom_modifier.is_held(state.modifiers) {
                    let delta_y = match delta {
                        mouse::ScrollDelta::Lines { y, .. } => y,
                        mouse::ScrollDelta::Pixels { y, .. } => y,
                    };
                    return self.captured(Input::Wheel {
                        delta_y,
                        modifier_held: true,
                    });
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonPressed(button)) => {
                if let Some(position) = cursor.position_in(bounds) {
                    return self.captured(Input::Pressed { button, position });
                }
            }

            // Only track while a band is open
            canvas::Event::Mouse(mouse::Event::CursorMoved { .. }) => {
                if self.selection.is_some() {
                    if let Some(position) = relative_position(cursor, bounds) {
                        return self.captured(Input::Moved(position));
                    }
                }
            }

            canvas::Event::Mouse(mouse::Event::ButtonReleased(button)) => {
                if self.selection.is_some() && button == mouse::Button::Left {
                    if let Some(position) = relative_position(cursor, bounds) {
                        return self.captured(Input::Released { button, position });
                    }
                }
            }

            _ => {}
        }

        (canvas::event::Status::Ignored, None)
    }

    fn mouse_interaction(
        &self,
        _state: &Self::State,
        bounds: Rectangle,
        cursor: Cursor,
    ) -> mouse::Interaction {
        if cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

/// Cursor position in widget coordinates, even outside the bounds
fn relative_position(cursor: Cursor, bounds: Rectangle) -> Option<Point> {
    cursor
        .position()
        .map(|position| Point::new(position.x - bounds.x, position.y - bounds.y))
}

#[cfg(test)]
mod tests {
    use super::*;
    use iced::Size;

    fn bounds() -> Rectangle {
        Rectangle::new(Point::new(10.0, 20.0), Size::new(100.0, 100.0))
    }

    fn overlay(selection: Option<Rectangle>) -> SelectionOverlay<Input> {
        SelectionOverlay::new(selection, false, ZoomModifier::Control, std::convert::identity)
    }

    fn wheel(y: f32) -> canvas::Event {
        canvas::Event::Mouse(mouse::Event::WheelScrolled {
            delta: mouse::ScrollDelta::Lines { x: 0.0, y },
        })
    }

    #[test]
    fn test_plain_wheel_is_left_for_scrolling() {
        let mut state = InputState::default();
        let cursor = Cursor::Available(Point::new(50.0, 50.0));

        let (status, message) = overlay(None).update(&mut state, wheel(1.0), bounds(), cursor);

        assert_eq!(status, canvas::event::Status::Ignored);
        assert_eq!(message, None);
    }

    #[test]
    fn test_modifier_wheel_zooms() {
        let overlay = overlay(None);
        let mut state = InputState::default();
        let cursor = Cursor::Available(Point::new(50.0, 50.0));

        overlay.update(
            &mut state,
            canvas::Event::Keyboard(keyboard::Event::ModifiersChanged(Modifiers::CTRL)),
            bounds(),
            cursor,
        );
        let (status, message) = overlay.update(&mut state, wheel(-1.0), bounds(), cursor);

        assert_eq!(status, canvas::event::Status::Captured);
        assert_eq!(
            message,
            Some(Input::Wheel {
                delta_y: -1.0,
                modifier_held: true
            })
        );
    }

    #[test]
    fn test_press_is_relative_to_bounds() {
        let mut state = InputState::default();
        let cursor = Cursor::Available(Point::new(15.0, 30.0));
        let event = canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left));

        let (_, message) = overlay(None).update(&mut state, event, bounds(), cursor);

        assert_eq!(
            message,
            Some(Input::Pressed {
                button: mouse::Button::Left,
                position: Point::new(5.0, 10.0),
            })
        );
    }

    #[test]
    fn test_press_outside_is_ignored() {
        let mut state = InputState::default();
        let cursor = Cursor::Available(Point::new(500.0, 500.0));
        let event = canvas::Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Right));

        let (status, message) = overlay(None).update(&mut state, event, bounds(), cursor);

        assert_eq!(status, canvas::event::Status::Ignored);
        assert_eq!(message, None);
    }

    #[test]
    fn test_moves_only_tracked_with_open_band() {
        let mut state = InputState::default();
        let cursor = Cursor::Available(Point::new(60.0, 70.0));
        let event = canvas::Event::Mouse(mouse::Event::CursorMoved {
            position: Point::new(60.0, 70.0),
        });

        let (_, idle) = overlay(None).update(&mut state, event.clone(), bounds(), cursor);
        assert_eq!(idle, None);

        let band = Some(Rectangle::new(Point::ORIGIN, Size::ZERO));
        let (_, dragging) = overlay(band).update(&mut state, event, bounds(), cursor);
        assert_eq!(dragging, Some(Input::Moved(Point::new(50.0, 50.0))));
    }

    #[test]
    fn test_release_outside_still_reports_position() {
        let mut state = InputState::default();
        let cursor = Cursor::Available(Point::new(200.0, 10.0));
        let event = canvas::Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left));
        let band = Some(Rectangle::new(Point::ORIGIN, Size::ZERO));

        let (_, message) = overlay(band).update(&mut state, event, bounds(), cursor);

        assert_eq!(
            message,
            Some(Input::Released {
                button: mouse::Button::Left,
                position: Point::new(190.0, -10.0),
            })
        );
    }
}
