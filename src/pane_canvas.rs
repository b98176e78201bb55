use std::time::{Duration, Instant};

use iced::mouse::{self, ScrollDelta};
use iced::widget::canvas::{self, Action, Cache, Event, Geometry};
use iced::widget::image::{FilterMethod, Handle};
use iced::{Color, Point, Rectangle, Renderer, Size, Theme};

use crate::app::Message;
use crate::pane::Pane;
use crate::viewport::{Viewport, ZoomDirection};

const DOUBLE_CLICK: Duration = Duration::from_millis(400);

/// A loaded pane plus the geometry last drawn for it.
///
/// The cache is cleared whenever the shared viewport changes; otherwise a
/// redraw reuses the previous frame and does no resampling at all.
pub struct PaneSlot {
    pub pane: Pane,
    pub cache: Cache,
}

impl PaneSlot {
    pub fn new(pane: Pane) -> Self {
        Self {
            pane,
            cache: Cache::new(),
        }
    }
}

pub struct PaneCanvas<'a> {
    pub slot: &'a PaneSlot,
    pub index: usize,
    pub viewport: Viewport,
    pub background: Color,
}

#[derive(Default)]
pub struct Interaction {
    drag_from: Option<Point>,
    last_press: Option<Instant>,
}

impl canvas::Program<Message> for PaneCanvas<'_> {
    type State = Interaction;

    fn update(
        &self,
        state: &mut Interaction,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<Action<Message>> {
        match event {
            Event::Mouse(mouse::Event::ButtonPressed(mouse::Button::Left)) => {
                let position = cursor.position_over(bounds)?;
                let now = Instant::now();
                let double = state
                    .last_press
                    .is_some_and(|t| now.duration_since(t) < DOUBLE_CLICK);
                if double {
                    state.last_press = None;
                    state.drag_from = None;
                    return Some(Action::publish(Message::Pick(self.index)).and_capture());
                }
                state.last_press = Some(now);
                state.drag_from = Some(position);
                Some(Action::capture())
            }
            Event::Mouse(mouse::Event::CursorMoved { position }) => {
                let from = state.drag_from?;
                state.drag_from = Some(*position);
                let delta = *position - from;
                Some(Action::publish(Message::Panned(delta.x, delta.y)).and_capture())
            }
            Event::Mouse(mouse::Event::ButtonReleased(mouse::Button::Left)) => {
                state.drag_from.take().map(|_| Action::capture())
            }
            Event::Mouse(mouse::Event::WheelScrolled { delta }) => {
                cursor.position_over(bounds)?;
                let y = match delta {
                    ScrollDelta::Lines { y, .. } | ScrollDelta::Pixels { y, .. } => *y,
                };
                // horizontal-only scrolling
                if y == 0.0 {
                    return None;
                }
                let direction = if y < 0.0 {
                    ZoomDirection::Out
                } else {
                    ZoomDirection::In
                };
                Some(Action::publish(Message::Zoomed(direction)).and_capture())
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        _state: &Interaction,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let geometry = self.slot.cache.draw(renderer, bounds.size(), |frame| {
            frame.fill_rectangle(Point::ORIGIN, frame.size(), self.background);

            let pane_size = (frame.width() as u32, frame.height() as u32);
            let Some(rendered) = self.viewport.render(&self.slot.pane.display, pane_size) else {
                return;
            };
            let (w, h) = rendered.image.dimensions();
            let (x, y) = rendered.origin;
            let handle = Handle::from_rgba(w, h, rendered.image.into_raw());
            frame.draw_image(
                Rectangle::new(
                    Point::new(x as f32, y as f32),
                    Size::new(w as f32, h as f32),
                ),
                canvas::Image::new(handle).filter_method(FilterMethod::Nearest),
            );
        });
        vec![geometry]
    }

    fn mouse_interaction(
        &self,
        state: &Interaction,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if state.drag_from.is_some() {
            mouse::Interaction::Grabbing
        } else if cursor.is_over(bounds) {
            mouse::Interaction::Grab
        } else {
            mouse::Interaction::default()
        }
    }
}
