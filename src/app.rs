use std::path::PathBuf;

use iced::widget::{button, canvas, column, container, row, text, Space};
use iced::{window, Color, Element, Length, Point, Size, Subscription, Task, Theme};

use crate::error::ScanError;
use crate::pane::{self, Pane};
use crate::pane_canvas::{PaneCanvas, PaneSlot};
use crate::scanner::{self, ScanResult};
use crate::session::{Session, Step};
use crate::settings::{self, Settings, ThemeChoice, WindowGeometry};
use crate::viewport::{Viewport, ZoomDirection};

const APP_NAME: &str = "MultiCompare";
const SCAN_WARNING_LIMIT: usize = 500;
const DEFAULT_WINDOW: Size = Size::new(1440.0, 810.0);

pub fn run() -> iced::Result {
    let settings_path = settings::default_path();
    let saved = settings_path
        .as_deref()
        .map(Settings::load)
        .unwrap_or_default();
    let window = window_settings(&saved);

    iced::application(
        move || boot(settings_path.clone(), saved.clone()),
        update,
        view,
    )
    .title(title)
    .theme(theme)
    .subscription(subscription)
    .window(window)
    .run()
}

fn boot(settings_path: Option<PathBuf>, settings: Settings) -> (MultiCompare, Task<Message>) {
    let state = MultiCompare {
        settings,
        settings_path,
        ..MultiCompare::default()
    };
    (state, Task::none())
}

fn window_settings(saved: &Settings) -> window::Settings {
    let (size, position) = match saved.geometry() {
        Some(g) => (
            Size::new(g.width as f32, g.height as f32),
            window::Position::Specific(Point::new(g.x as f32, g.y as f32)),
        ),
        None => (DEFAULT_WINDOW, window::Position::Centered),
    };
    window::Settings {
        size,
        position,
        maximized: saved.is_maximized,
        exit_on_close_request: false,
        ..window::Settings::default()
    }
}

#[derive(Default)]
struct MultiCompare {
    settings: Settings,
    settings_path: Option<PathBuf>,
    folders: Vec<PathBuf>,
    session: Session,
    panes: Vec<PaneSlot>,
    viewport: Viewport,
    /// Centre line of the toolbar: current key or what just happened.
    status: String,
    scanning: bool,
    /// Bumped for every group load; a `GroupLoaded` carrying any other value is stale.
    load_generation: u64,
    pending_load: Option<u64>,
}

#[derive(Debug, Clone)]
pub enum Message {
    AddFolder,
    FolderPicked(Option<PathBuf>),
    SetOutput,
    OutputPicked(Option<PathBuf>),
    Scan,
    ScanFinished(ScanResult),
    GroupLoaded(u64, Vec<Pane>),
    Next,
    Prev,
    Pick(usize),
    Panned(f32, f32),
    Zoomed(ZoomDirection),
    ToggleTheme,
    CloseRequested(window::Id),
    Closing {
        id: window::Id,
        maximized: bool,
        size: Size,
        position: Option<Point>,
    },
}

fn subscription(_state: &MultiCompare) -> Subscription<Message> {
    let events = iced::event::listen_with(|event, _status, _window| match event {
        iced::Event::Keyboard(iced::keyboard::Event::KeyPressed { key, .. }) => {
            use iced::keyboard::key::Named;
            use iced::keyboard::Key;
            match key {
                Key::Named(Named::ArrowLeft) => Some(Message::Prev),
                Key::Named(Named::ArrowRight) => Some(Message::Next),
                _ => None,
            }
        }
        _ => None,
    });

    Subscription::batch([
        events,
        window::close_requests().map(Message::CloseRequested),
    ])
}

fn update(state: &mut MultiCompare, message: Message) -> Task<Message> {
    match message {
        Message::AddFolder => {
            return Task::perform(pick_folder("Add a photo folder"), Message::FolderPicked);
        }
        Message::FolderPicked(Some(path)) => {
            if !state.folders.contains(&path) {
                log::info!("Added folder {}", path.display());
                state.folders.push(path);
                state.status = format!("{} Folders Loaded", state.folders.len());
            }
        }
        Message::FolderPicked(None) => {}
        Message::SetOutput => {
            return Task::perform(pick_folder("Choose the output folder"), Message::OutputPicked);
        }
        Message::OutputPicked(Some(path)) => {
            state.settings.output_dir = path.display().to_string();
            persist_settings(state);
        }
        Message::OutputPicked(None) => {}
        Message::Scan => {
            if state.scanning {
                return Task::none();
            }
            state.scanning = true;
            state.status = "Scanning...".to_string();
            let folders = state.folders.clone();
            return Task::perform(
                async move { scanner::scan(&folders) },
                Message::ScanFinished,
            );
        }
        Message::ScanFinished(result) => {
            state.scanning = false;
            let mut tasks = Vec::new();
            if !result.errors.is_empty() {
                tasks.push(show_message(
                    rfd::MessageLevel::Warning,
                    "Scan Issues",
                    format!(
                        "Some folders could not be scanned:\n\n{}",
                        scan_warning(&result.errors)
                    ),
                ));
            }
            let had_errors = !result.errors.is_empty();
            state.session = Session::new(result);

            if state.session.is_empty() {
                state.panes.clear();
                state.pending_load = None;
                state.status = "No Matches Found".to_string();
                if !had_errors {
                    tasks.push(show_message(
                        rfd::MessageLevel::Info,
                        "Result",
                        "No filenames matched across the selected folders.".to_string(),
                    ));
                }
            } else {
                tasks.push(load_current_group(state));
            }
            return Task::batch(tasks);
        }
        Message::GroupLoaded(generation, panes) => {
            if state.pending_load != Some(generation) {
                log::debug!("Discarding stale group load #{}", generation);
                return Task::none();
            }
            state.pending_load = None;
            state.viewport.reset();
            state.panes = panes.into_iter().map(PaneSlot::new).collect();
        }
        Message::Next => {
            if state.session.is_empty() {
                return Task::none();
            }
            match state.session.next() {
                Step::Moved(_) => return load_current_group(state),
                Step::EndReached => state.status = "End of List".to_string(),
            }
        }
        Message::Prev => {
            if state.session.prev().is_some() {
                return load_current_group(state);
            }
        }
        Message::Pick(index) => return pick(state, index),
        Message::Panned(dx, dy) => {
            state.viewport.pan_by(dx, dy);
            invalidate_panes(state);
        }
        Message::Zoomed(direction) => {
            state.viewport.zoom(direction);
            invalidate_panes(state);
        }
        Message::ToggleTheme => {
            let theme = state.settings.toggle_theme();
            log::debug!("Theme switched to {:?}", theme);
            persist_settings(state);
            invalidate_panes(state);
        }
        Message::CloseRequested(id) => {
            return window::is_maximized(id).then(move |maximized| {
                window::size(id).then(move |size| {
                    window::position(id).map(move |position| Message::Closing {
                        id,
                        maximized,
                        size,
                        position,
                    })
                })
            });
        }
        Message::Closing {
            id,
            maximized,
            size,
            position,
        } => {
            state.settings.is_maximized = maximized;
            if !maximized {
                if let Some(geometry) = closing_geometry(size, position, state.settings.geometry()) {
                    state.settings.window_geometry = geometry.to_string();
                }
            }
            persist_settings(state);
            return window::close(id);
        }
    }
    Task::none()
}

/// Drop the panes on screen and start decoding the session's current group.
fn load_current_group(state: &mut MultiCompare) -> Task<Message> {
    state.panes.clear();
    state.viewport.reset();
    state.load_generation += 1;
    let Some((key, paths)) = state.session.current_group() else {
        state.pending_load = None;
        return Task::none();
    };
    state.status = key.to_string();
    let generation = state.load_generation;
    state.pending_load = Some(generation);
    let paths = paths.to_vec();
    Task::perform(
        async move { pane::load_group(&paths) },
        move |panes| Message::GroupLoaded(generation, panes),
    )
}

/// Geometry to remember for a window closing at `size`.
///
/// Some platforms cannot report the window position; the previously saved
/// offset is kept then, and nothing is recorded if there is none.
fn closing_geometry(
    size: Size,
    position: Option<Point>,
    previous: Option<WindowGeometry>,
) -> Option<WindowGeometry> {
    let (x, y) = match (position, previous) {
        (Some(p), _) => (p.x as i32, p.y as i32),
        (None, Some(g)) => (g.x, g.y),
        (None, None) => return None,
    };
    Some(WindowGeometry {
        width: size.width as u32,
        height: size.height as u32,
        x,
        y,
    })
}

fn pick(state: &mut MultiCompare, index: usize) -> Task<Message> {
    let Some(slot) = state.panes.get(index) else {
        return Task::none();
    };
    let Some(output_dir) = state.settings.output_dir() else {
        return show_message(
            rfd::MessageLevel::Warning,
            "Warning",
            "Set Output Folder first.".to_string(),
        );
    };
    let source = slot.pane.path.clone();

    match state.session.pick(&source, &output_dir) {
        Ok((outcome, step)) => {
            log::info!("{}", outcome.message());
            match step {
                Step::Moved(_) => load_current_group(state),
                Step::EndReached => {
                    state.status = "End of List".to_string();
                    Task::none()
                }
            }
        }
        Err(e) => {
            log::warn!("Copy of {} failed: {}", source.display(), e);
            show_message(rfd::MessageLevel::Error, "Error", e.to_string())
        }
    }
}

fn invalidate_panes(state: &MultiCompare) {
    for slot in &state.panes {
        slot.cache.clear();
    }
}

fn persist_settings(state: &MultiCompare) {
    let Some(path) = state.settings_path.as_deref() else {
        return;
    };
    if let Err(e) = state.settings.save(path) {
        log::warn!("Failed to save settings to {}: {}", path.display(), e);
    }
}

/// All folder errors on one line each, cut off so the dialog stays readable.
fn scan_warning(errors: &[ScanError]) -> String {
    let joined = errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join("\n");
    if joined.chars().count() > SCAN_WARNING_LIMIT {
        let cut: String = joined.chars().take(SCAN_WARNING_LIMIT).collect();
        format!("{}\n...", cut)
    } else {
        joined
    }
}

/// Columns for a group of `panes` members.
fn grid_columns(panes: usize) -> usize {
    match panes {
        0 | 1 => 1,
        2..=4 => 2,
        5 | 6 => 3,
        _ => 4,
    }
}

fn title(state: &MultiCompare) -> String {
    match state.session.current_key() {
        Some(key) => format!("{} - {}", APP_NAME, key),
        None => APP_NAME.to_string(),
    }
}

fn theme(state: &MultiCompare) -> Theme {
    match state.settings.theme {
        ThemeChoice::Dark => Theme::Dark,
        ThemeChoice::Light => Theme::Light,
    }
}

fn canvas_background(choice: ThemeChoice) -> Color {
    match choice {
        ThemeChoice::Dark => Color::from_rgb8(0x0b, 0x0b, 0x0b),
        ThemeChoice::Light => Color::WHITE,
    }
}

fn view(state: &MultiCompare) -> Element<'_, Message> {
    let output_label = match state.settings.output_dir() {
        Some(dir) => {
            let name = dir
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| dir.display().to_string());
            format!("Out: {}", name)
        }
        None => "Set Output".to_string(),
    };

    let browsing = !state.session.is_empty();
    let status = if state.status.is_empty() {
        APP_NAME
    } else {
        state.status.as_str()
    };

    let toolbar = row![
        button("Add Folder").on_press(Message::AddFolder),
        button(text(output_label)).on_press(Message::SetOutput),
        button("Scan").on_press_maybe((!state.scanning).then_some(Message::Scan)),
        button("\u{25D0}").on_press(Message::ToggleTheme),
        Space::new().width(Length::Fill),
        text(status).size(18),
        Space::new().width(Length::Fill),
        text(state.session.position_label()).size(13).color(LABEL_COLOR),
        button("< Prev").on_press_maybe(browsing.then_some(Message::Prev)),
        button("Next >").on_press_maybe(browsing.then_some(Message::Next)),
    ]
    .spacing(6)
    .padding(10)
    .align_y(iced::Alignment::Center);

    let body: Element<'_, Message> = if state.panes.is_empty() {
        let hint = if state.scanning {
            "Scanning..."
        } else if state.pending_load.is_some() {
            "Loading..."
        } else if browsing {
            ""
        } else {
            "Add folders, set an output folder, then Scan"
        };
        container(text(hint)).center(Length::Fill).into()
    } else {
        pane_grid(state)
    };

    column![toolbar, body].into()
}

const LABEL_COLOR: Color = Color::from_rgb(0.5, 0.5, 0.55);

fn pane_grid(state: &MultiCompare) -> Element<'_, Message> {
    let cols = grid_columns(state.panes.len());
    let background = canvas_background(state.settings.theme);

    let rows: Vec<Element<'_, Message>> = state
        .panes
        .chunks(cols)
        .enumerate()
        .map(|(row_idx, chunk)| {
            let cells: Vec<Element<'_, Message>> = chunk
                .iter()
                .enumerate()
                .map(|(col_idx, slot)| {
                    let index = row_idx * cols + col_idx;
                    pane_cell(slot, index, state.viewport, background)
                })
                .collect();
            row(cells)
                .spacing(4)
                .height(Length::Fill)
                .width(Length::Fill)
                .into()
        })
        .collect();

    column(rows).spacing(4).padding(4).into()
}

fn pane_cell(
    slot: &PaneSlot,
    index: usize,
    viewport: Viewport,
    background: Color,
) -> Element<'_, Message> {
    let surface = canvas(PaneCanvas {
        slot,
        index,
        viewport,
        background,
    })
    .width(Length::Fill)
    .height(Length::Fill);

    let cell = column![
        text(slot.pane.caption()).size(12),
        surface,
        button(container(text("SELECT")).center_x(Length::Fill))
            .on_press(Message::Pick(index))
            .style(button::primary)
            .width(Length::Fill),
    ]
    .spacing(2);

    container(cell)
        .padding(2)
        .width(Length::FillPortion(1))
        .height(Length::Fill)
        .style(container::bordered_box)
        .into()
}

fn show_message(level: rfd::MessageLevel, title: &'static str, description: String) -> Task<Message> {
    Task::future(async move {
        rfd::AsyncMessageDialog::new()
            .set_level(level)
            .set_title(title)
            .set_description(description)
            .set_buttons(rfd::MessageButtons::Ok)
            .show()
            .await;
    })
    .discard()
}

async fn pick_folder(title: &'static str) -> Option<PathBuf> {
    rfd::AsyncFileDialog::new()
        .set_title(title)
        .pick_folder()
        .await
        .map(|handle| handle.path().to_path_buf())
}
