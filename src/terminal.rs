// SPDX-License-Identifier: GPL-3.0-only

//! Terminal photo booth
//!
//! Renders the live preview (with the selected filter) and the finished strip
//! to the terminal using Unicode half-block characters for improved vertical
//! resolution. Notifications and the countdown appear in the status bar.

use crate::app::{
    BoothEvent, BoothRuntime, BoothSettings, CameraStatus, CaptureState, Cue, Notification,
    PhotoBooth, View,
};
use crate::backends::camera::{BackendError, CameraBackendManager, CameraFrame};
use crate::config::Config;
use crate::constants::strip::PHOTOS_PER_STRIP;
use crate::pipelines::photo::apply_filter;
use crate::pipelines::strip::StripRenderer;
use crate::storage::{FileStore, KeyValueStore, Photo};
use crate::{FilterType, Message};

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use image::{Rgba, RgbaImage};
use ratatui::{
    Terminal, backend::CrosstermBackend, buffer::Buffer, layout::Rect, style::Color,
    widgets::Widget,
};
use std::io::{self, stdout};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::time::Instant;
use tracing::{info, warn};

/// Redraw interval
const FRAME_INTERVAL: Duration = Duration::from_millis(33);
/// How long the preview stays white after a capture
const FLASH_DURATION: Duration = Duration::from_millis(150);
/// Status bar height in rows
const STATUS_ROWS: u16 = 2;

/// Run the terminal photo booth
pub fn run(config: Config) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    // Set up terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let result = rt.block_on(run_app(&mut terminal, config));

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    config: Config,
) -> Result<(), Box<dyn std::error::Error>> {
    let source = config.camera_source();
    info!(%source, "Starting terminal booth");

    let camera = CameraBackendManager::new(&source);
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::new(config.resolved_data_dir()));
    let (booth, mut events) = PhotoBooth::new(camera, store, BoothSettings::from_config(&config));
    let mut runtime = BoothRuntime::new(booth, StripRenderer::new(), config.resolved_output_dir());
    runtime.start();

    let mut screen = Screen::default();

    loop {
        runtime.poll();
        screen.absorb(&mut events);

        let size = terminal.size()?;
        let preview_area = Rect::new(0, 0, size.width, size.height.saturating_sub(STATUS_ROWS));

        match grab_preview(runtime.booth(), preview_area) {
            Ok(Some(image)) => screen.preview = Some(image),
            Ok(None) => {}
            Err(e) => runtime.dispatch(Message::CameraLost(e.to_string())),
        }
        if runtime.booth().view() == View::Strip {
            screen.refresh_thumbnails(runtime.booth().photos(), preview_area);
        }

        terminal.draw(|f| {
            let area = f.area();
            let main_area = Rect {
                height: area.height.saturating_sub(STATUS_ROWS),
                ..area
            };
            let status_area = Rect {
                y: area.y + main_area.height,
                height: area.height.min(STATUS_ROWS),
                ..area
            };

            let booth = runtime.booth();
            match booth.view() {
                View::Camera => f.render_widget(
                    PreviewWidget {
                        image: screen.preview.as_ref(),
                        flash: screen.flashing(),
                        placeholder: placeholder_text(booth.camera_status()),
                    },
                    main_area,
                ),
                View::Strip => f.render_widget(
                    StripWidget {
                        thumbnails: &screen.thumbnails,
                    },
                    main_area,
                ),
            }

            f.render_widget(
                StatusBar {
                    summary: &summary_line(booth),
                    message: &screen.message_line(),
                },
                status_area,
            );
        })?;

        // Drain input without blocking the loop
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()?
                && key.kind == KeyEventKind::Press
            {
                match map_key(key, runtime.booth()) {
                    KeyAction::Quit => return Ok(()),
                    KeyAction::Help => screen.show_help = !screen.show_help,
                    KeyAction::Send(message) => {
                        screen.show_help = false;
                        runtime.dispatch(message);
                    }
                    KeyAction::None => {}
                }
            }
        }

        tokio::time::sleep(FRAME_INTERVAL).await;
    }
}

// =============================================================================
// Input
// =============================================================================

enum KeyAction {
    Quit,
    Help,
    Send(Message),
    None,
}

fn map_key(key: KeyEvent, booth: &PhotoBooth) -> KeyAction {
    let settings = booth.settings();

    if key.modifiers.contains(KeyModifiers::CONTROL) {
        return match key.code {
            KeyCode::Char('c') => KeyAction::Quit,
            _ => KeyAction::None,
        };
    }

    match key.code {
        KeyCode::Char(' ') => KeyAction::Send(Message::TriggerCapture),
        KeyCode::Enter => KeyAction::Send(Message::StartSequence),
        KeyCode::Char(c @ '1'..='4') => {
            let index = (c as usize) - ('1' as usize);
            if key.modifiers.contains(KeyModifiers::ALT) {
                KeyAction::Send(Message::DeletePhoto(index))
            } else {
                KeyAction::Send(Message::Retake(index))
            }
        }
        KeyCode::Char('x') => match booth.photo_count() {
            0 => KeyAction::None,
            n => KeyAction::Send(Message::DeletePhoto(n - 1)),
        },
        KeyCode::Char('f') => KeyAction::Send(Message::SelectFilter(settings.filter.next())),
        KeyCode::Char('F') => KeyAction::Send(Message::SelectFilter(settings.filter.previous())),
        KeyCode::Char('t') => KeyAction::Send(Message::SelectTemplate(settings.template.next())),
        KeyCode::Char('s') => KeyAction::Send(Message::ToggleSound),
        KeyCode::Char('m') => KeyAction::Send(Message::ToggleManualMode),
        KeyCode::Char('c') => KeyAction::Send(Message::ToggleCamera),
        KeyCode::Char('r') => KeyAction::Send(Message::Reset),
        KeyCode::Char('d') => KeyAction::Send(Message::Download(settings.template)),
        KeyCode::Char('h') => KeyAction::Help,
        KeyCode::Char('q') | KeyCode::Esc => KeyAction::Quit,
        _ => KeyAction::None,
    }
}

// =============================================================================
// Screen state
// =============================================================================

/// What the terminal remembers between frames
#[derive(Default)]
struct Screen {
    preview: Option<RgbaImage>,
    thumbnails: Vec<RgbaImage>,
    /// Photo set and area the thumbnails were built for
    thumbnails_key: Option<(Vec<usize>, Rect)>,
    notification: Option<Notification>,
    flash_until: Option<Instant>,
    show_help: bool,
}

impl Screen {
    fn absorb(&mut self, events: &mut UnboundedReceiver<BoothEvent>) {
        while let Ok(event) = events.try_recv() {
            match event {
                BoothEvent::Notify(notification) => self.notification = Some(notification),
                BoothEvent::Cue(Cue::Flash) => self.flash_until = Some(Instant::now() + FLASH_DURATION),
                BoothEvent::Cue(_) => {}
                BoothEvent::StateChanged(_) | BoothEvent::ViewChanged(_) => {}
            }
        }
    }

    fn flashing(&self) -> bool {
        self.flash_until.is_some_and(|until| Instant::now() < until)
    }

    fn message_line(&self) -> String {
        if self.show_help {
            return help_text().to_string();
        }
        match &self.notification {
            Some(n) => n.to_string(),
            None => "Space: capture | Enter: sequence | h: help | q: quit".to_string(),
        }
    }

    /// Decode the photo set into thumbnails when it or the area changed
    fn refresh_thumbnails(&mut self, photos: &[Photo], area: Rect) {
        let key = (photos.iter().map(|p| p.bytes().len()).collect::<Vec<_>>(), area);
        if self.thumbnails_key.as_ref() == Some(&key) {
            return;
        }

        let cell = grid_cells(area);
        self.thumbnails = photos
            .iter()
            .filter_map(|photo| match image::load_from_memory(photo.bytes()) {
                Ok(img) => {
                    let (w, h) = fit_pixels(img.width(), img.height(), cell[0]);
                    Some(img.thumbnail(w.max(1), h.max(1)).to_rgba8())
                }
                Err(e) => {
                    warn!(error = %e, "Unreadable photo in strip view");
                    None
                }
            })
            .collect();
        self.thumbnails_key = Some(key);
    }
}

fn placeholder_text(status: CameraStatus) -> &'static str {
    match status {
        CameraStatus::Off => "Camera is off (press 'c')",
        CameraStatus::Starting => "Waiting for camera...",
        CameraStatus::Ready => "",
        CameraStatus::Unavailable => "Could not access your camera (press 'c' to retry)",
    }
}

fn summary_line(booth: &PhotoBooth) -> String {
    let settings = booth.settings();
    let state = match booth.capture_state() {
        CaptureState::Countdown(n) => format!(">>> {} <<<", n),
        CaptureState::Capturing => "SNAP!".to_string(),
        CaptureState::Cooldown => "...".to_string(),
        CaptureState::Idle => match booth.camera_status() {
            CameraStatus::Ready => "Ready".to_string(),
            CameraStatus::Starting => "Starting".to_string(),
            CameraStatus::Off => "Camera off".to_string(),
            CameraStatus::Unavailable => "No camera".to_string(),
        },
    };
    format!(
        " {} | Photos {}/{} | Filter: {} | Template: {} | Sound {} | {}",
        state,
        booth.photo_count(),
        PHOTOS_PER_STRIP,
        settings.filter.display_name(),
        settings.template.display_name(),
        if settings.sound_enabled { "on" } else { "off" },
        if settings.manual_mode { "Manual" } else { "Auto" },
    )
}

fn help_text() -> &'static str {
    "Space: capture | Enter: sequence | 1-4: retake | Alt+1-4/x: delete | f/F: filter | \
     t: template | s: sound | m: manual | c: camera | r: reset | d: download | q: quit"
}

// =============================================================================
// Preview
// =============================================================================

/// Sample the current frame down to the preview size and apply the filter
///
/// Returns `Ok(None)` when the camera is not running.
fn grab_preview(booth: &PhotoBooth, area: Rect) -> Result<Option<RgbaImage>, BackendError> {
    if booth.camera_status() != CameraStatus::Ready || area.width == 0 || area.height == 0 {
        return Ok(None);
    }
    let frame = match booth.camera().capture_frame() {
        Ok(frame) => frame,
        Err(BackendError::NotActive) => return Ok(None),
        Err(e) => return Err(e),
    };

    let settings = booth.settings();
    let (w, h) = fit_pixels(frame.width, frame.height, area);
    let small = downsample(&frame, w, h, settings.mirror_preview);
    Ok(Some(match settings.filter {
        FilterType::Normal => small,
        filter => apply_filter(&small, filter),
    }))
}

/// Pixel size (2 pixels per cell vertically) fitting `area` at the source aspect
fn fit_pixels(src_width: u32, src_height: u32, area: Rect) -> (u32, u32) {
    if src_width == 0 || src_height == 0 {
        return (0, 0);
    }
    let aspect = src_width as f64 / src_height as f64;
    let max_w = area.width as f64;
    let max_h = (area.height as u32 * 2) as f64;

    let (w, h) = if max_w / max_h > aspect {
        (max_h * aspect, max_h)
    } else {
        (max_w, max_w / aspect)
    };
    (w as u32, h as u32)
}

/// Nearest-neighbour resample of an RGBA frame
fn downsample(frame: &CameraFrame, width: u32, height: u32, mirror: bool) -> RgbaImage {
    let x_scale = frame.width as f64 / width.max(1) as f64;
    let y_scale = frame.height as f64 / height.max(1) as f64;
    let data = &frame.data;

    RgbaImage::from_fn(width, height, |x, y| {
        let dx = if mirror { width - 1 - x } else { x };
        let sx = ((dx as f64 * x_scale) as u32).min(frame.width - 1);
        let sy = ((y as f64 * y_scale) as u32).min(frame.height - 1);
        let idx = (sy * frame.stride + sx * 4) as usize;
        match data.get(idx..idx + 4) {
            Some(px) => Rgba([px[0], px[1], px[2], px[3]]),
            None => Rgba([0, 0, 0, 255]),
        }
    })
}

/// Draw an image centered in `area`, two pixels per cell
fn paint_image(image: &RgbaImage, area: Rect, buf: &mut Buffer) {
    let cols = image.width().min(area.width as u32) as u16;
    let rows = (image.height() / 2).min(area.height as u32) as u16;
    let x_offset = area.x + (area.width - cols) / 2;
    let y_offset = area.y + (area.height - rows) / 2;

    // Upper half (▀) colored with fg, lower half with bg
    for ty in 0..rows {
        for tx in 0..cols {
            let top = image.get_pixel(tx as u32, ty as u32 * 2).0;
            let bottom = image
                .get_pixel_checked(tx as u32, ty as u32 * 2 + 1)
                .map_or(top, |p| p.0);
            if let Some(cell) = buf.cell_mut((x_offset + tx, y_offset + ty)) {
                cell.set_char('▀');
                cell.set_fg(Color::Rgb(top[0], top[1], top[2]));
                cell.set_bg(Color::Rgb(bottom[0], bottom[1], bottom[2]));
            }
        }
    }
}

fn paint_centered_text(text: &str, area: Rect, buf: &mut Buffer) {
    if area.height == 0 || text.is_empty() {
        return;
    }
    let x = area.x + (area.width.saturating_sub(text.len() as u16)) / 2;
    let y = area.y + area.height / 2;
    buf.set_string(x, y, text, ratatui::style::Style::default());
}

/// Live camera preview
struct PreviewWidget<'a> {
    image: Option<&'a RgbaImage>,
    flash: bool,
    placeholder: &'static str,
}

impl Widget for PreviewWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if self.flash {
            for y in area.top()..area.bottom() {
                for x in area.left()..area.right() {
                    if let Some(cell) = buf.cell_mut((x, y)) {
                        cell.set_char(' ');
                        cell.set_bg(Color::White);
                    }
                }
            }
            return;
        }
        match self.image {
            Some(image) if self.placeholder.is_empty() => paint_image(image, area, buf),
            _ => paint_centered_text(self.placeholder, area, buf),
        }
    }
}

// =============================================================================
// Strip view
// =============================================================================

/// 2x2 cells for the strip view thumbnails
fn grid_cells(area: Rect) -> [Rect; PHOTOS_PER_STRIP] {
    let half_w = area.width / 2;
    let half_h = area.height / 2;
    [
        Rect::new(area.x, area.y, half_w, half_h),
        Rect::new(area.x + half_w, area.y, area.width - half_w, half_h),
        Rect::new(area.x, area.y + half_h, half_w, area.height - half_h),
        Rect::new(
            area.x + half_w,
            area.y + half_h,
            area.width - half_w,
            area.height - half_h,
        ),
    ]
}

struct StripWidget<'a> {
    thumbnails: &'a [RgbaImage],
}

impl Widget for StripWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (i, cell) in grid_cells(area).into_iter().enumerate() {
            match self.thumbnails.get(i) {
                Some(thumb) => paint_image(thumb, cell, buf),
                None => paint_centered_text(&format!("Photo {}", i + 1), cell, buf),
            }
            let label = format!(" {} ", i + 1);
            buf.set_string(
                cell.x,
                cell.y,
                label,
                ratatui::style::Style::default()
                    .fg(Color::Black)
                    .bg(Color::White),
            );
        }
    }
}

// =============================================================================
// Status bar
// =============================================================================

/// Status bar widget: booth summary, then the latest notification
struct StatusBar<'a> {
    summary: &'a str,
    message: &'a str,
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = ratatui::style::Style::default()
            .fg(Color::White)
            .bg(Color::DarkGray);

        for (row, text) in [self.summary, self.message].into_iter().enumerate() {
            let y = area.y + row as u16;
            if y >= area.bottom() {
                break;
            }
            // Fill background
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell_mut((x, y)) {
                    cell.set_char(' ');
                    cell.set_bg(Color::DarkGray);
                }
            }
            let text: String = text.chars().take(area.width as usize).collect();
            buf.set_string(area.x, y, text, style);
        }
    }
}
