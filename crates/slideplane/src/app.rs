use eframe::egui;
use notify_debouncer_mini::notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::camera::{Camera, ease_in_out};
use crate::cli::LaunchOptions;
use crate::config::Config;
use crate::deck::Deck;
use crate::geometry::{Point, Size, Vector2};
use crate::gesture::GestureMachine;
use crate::gesture::drag::DragMachine;
use crate::gesture::input::{InputEvent, Key, Modifiers};
use crate::navigation::{AnimationPolicy, InputFocus, Mode, NavigationState};
use crate::slide::{SlideDescriptor, SlideRegistry};
use crate::theme::Theme;

/// Slide frame size in screen multiples. A slide at scale 1 fills the window.
const SLIDE_FRAME: Size = Size::new(1.0, 1.0);
/// Gap between neighbouring cards, as a fraction of the card size.
const CARD_INSET: f32 = 0.02;
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(250);
const TOAST_DURATION: f32 = 2.0;

/// An in-flight camera move between two complete poses.
#[derive(Debug, Clone, Copy, PartialEq)]
struct CameraAnimation {
    from: Camera,
    to: Camera,
    start: f64,
    seconds: f64,
}

impl CameraAnimation {
    /// Pose at `now`, and whether the move has finished.
    fn sample(&self, now: f64) -> (Camera, bool) {
        let t = (now - self.start) / self.seconds;
        if t >= 1.0 {
            (self.to, true)
        } else {
            (self.from.lerp(self.to, ease_in_out(t)), false)
        }
    }
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let fade_start = TOAST_DURATION - 0.5;
        if elapsed < fade_start {
            1.0
        } else {
            (1.0 - (elapsed - fade_start) / 0.5).max(0.0)
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= TOAST_DURATION
    }
}

/// Watches the deck file and hands debounced change batches to the UI thread.
struct DeckWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
    events: Receiver<DebounceEventResult>,
}

impl DeckWatcher {
    fn start(path: &Path, ctx: egui::Context) -> anyhow::Result<Self> {
        let (tx, events) = mpsc::channel();
        let mut debouncer = new_debouncer(RELOAD_DEBOUNCE, move |result: DebounceEventResult| {
            if tx.send(result).is_ok() {
                ctx.request_repaint();
            }
        })?;
        // Editors often replace the file, so watch the directory and filter by name.
        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        debouncer
            .watcher()
            .watch(dir, RecursiveMode::NonRecursive)?;
        Ok(Self {
            _debouncer: debouncer,
            events,
        })
    }

    /// Drain pending events. Returns whether any of them touched `path`.
    fn deck_changed(&self, path: &Path) -> bool {
        let mut changed = false;
        for result in self.events.try_iter() {
            match result {
                Ok(events) => {
                    changed |= events
                        .iter()
                        .any(|event| event.path.file_name() == path.file_name());
                }
                Err(e) => warn!("Deck watcher error: {e:?}"),
            }
        }
        changed
    }
}

struct SlideplaneApp {
    deck_path: PathBuf,
    registry: SlideRegistry,
    nav: NavigationState,
    gestures: GestureMachine,
    theme: Theme,
    /// Camera currently on screen; trails `nav.camera()` while animating.
    displayed: Camera,
    animation: Option<CameraAnimation>,
    seen_revision: u64,
    modifiers: Modifiers,
    /// Canvas rect from the last frame, used to map pointer positions.
    canvas: egui::Rect,
    show_hints: bool,
    show_help: bool,
    watcher: Option<DeckWatcher>,
    toast: Option<Toast>,
}

impl SlideplaneApp {
    fn new(deck_path: PathBuf, registry: SlideRegistry, nav: NavigationState, config: &Config) -> Self {
        let displayed = nav.camera();
        let seen_revision = nav.camera_revision();
        Self {
            deck_path,
            registry,
            nav,
            gestures: GestureMachine::new(config.gesture_config()),
            theme: Theme::dark(),
            displayed,
            animation: None,
            seen_revision,
            modifiers: Modifiers::default(),
            canvas: egui::Rect::NOTHING,
            show_hints: false,
            show_help: false,
            watcher: None,
            toast: None,
        }
    }

    fn reload_deck(&mut self) {
        match Deck::load(&self.deck_path) {
            Ok(deck) => {
                self.registry.replace_slides(deck.registry);
                match self.nav.replace_focuses(deck.focuses, &self.registry) {
                    Ok(()) => {
                        info!(path = %self.deck_path.display(), "Deck reloaded");
                        self.toast = Some(Toast::new("Deck reloaded"));
                    }
                    Err(e) => {
                        warn!("Reloaded deck has an invalid focus: {e}");
                        self.toast = Some(Toast::new(format!("Reload: {e}")));
                    }
                }
                // Offsets may have moved under an unchanged camera.
                self.nav.refresh_camera();
            }
            Err(e) => {
                warn!("Failed to reload deck: {e}");
                self.toast = Some(Toast::new(format!("Reload failed: {e}")));
            }
        }
    }

    fn toggle_editor(&mut self) {
        self.nav.mode = match self.nav.mode {
            Mode::Presentation => Mode::Editor,
            Mode::Editor => Mode::Presentation,
        };
        debug!(mode = ?self.nav.mode, "Mode switched");
        // Re-arm the drag machines for the new mode.
        self.gestures.handle(
            &InputEvent::ModifiersChanged(self.modifiers),
            &mut self.nav,
            &mut self.registry,
        );
        if self.nav.mode == Mode::Presentation && !self.nav.free_roam {
            let index = self.nav.selected_focus();
            if let Err(e) = self.nav.jump_to(index, &self.registry) {
                warn!("Cannot return to focus {index}: {e}");
            }
        }
    }

    /// Translate this frame's raw egui input into gesture events.
    fn collect_events(&mut self, i: &egui::InputState) -> Vec<InputEvent> {
        let mut events = Vec::new();
        let time = i.time;
        let origin = self.canvas.min;
        let local = |pos: egui::Pos2| Point::new((pos.x - origin.x) as f64, (pos.y - origin.y) as f64);

        let modifiers = Modifiers {
            shift: i.modifiers.shift,
            command: i.modifiers.command,
        };
        if modifiers != self.modifiers {
            self.modifiers = modifiers;
            events.push(InputEvent::ModifiersChanged(modifiers));
        }

        for event in &i.events {
            match event {
                egui::Event::PointerButton {
                    pos,
                    button: egui::PointerButton::Primary,
                    pressed,
                    ..
                } => {
                    if *pressed {
                        if self.canvas.contains(*pos) {
                            events.push(InputEvent::PointerDown {
                                pos: local(*pos),
                                time,
                            });
                        }
                    } else {
                        events.push(InputEvent::PointerUp { pos: local(*pos) });
                    }
                }
                egui::Event::PointerMoved(pos) => events.push(InputEvent::PointerMoved {
                    pos: local(*pos),
                    time,
                }),
                egui::Event::Key {
                    key,
                    pressed: true,
                    repeat: false,
                    ..
                } => {
                    if let Some(key) = map_key(*key) {
                        events.push(InputEvent::KeyDown(key));
                    }
                }
                _ => {}
            }
        }

        let wheel = i.raw_scroll_delta.y;
        if wheel != 0.0 && i.pointer.hover_pos().is_some_and(|p| self.canvas.contains(p)) {
            events.push(InputEvent::Wheel {
                delta_y: wheel as f64,
            });
        }
        events
    }

    /// Shortcuts owned by the window rather than the gesture machine.
    fn handle_app_keys(&mut self, ctx: &egui::Context) {
        if self.nav.input_focus != InputFocus::Surface {
            return;
        }
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut toggle_editor = false;
        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }
            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
            }
            if i.key_pressed(egui::Key::H) {
                self.show_hints = !self.show_hints;
            }
            if i.key_pressed(egui::Key::D) {
                self.theme = self.theme.toggled();
            }
            if i.key_pressed(egui::Key::E) {
                toggle_editor = true;
            }
            if i.key_pressed(egui::Key::F1) {
                self.show_help = !self.show_help;
            }
        });
        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }
        if toggle_editor {
            self.toggle_editor();
        }
    }

    /// Follow camera changes made by navigation, animating when the policy says so.
    fn update_displayed_camera(&mut self, now: f64) -> bool {
        if self.nav.camera_revision() != self.seen_revision {
            self.seen_revision = self.nav.camera_revision();
            let target = self.nav.camera();
            self.animation = match self.nav.animation_policy() {
                AnimationPolicy::Animated { seconds } if seconds > 0.0 && target != self.displayed => {
                    Some(CameraAnimation {
                        from: self.displayed,
                        to: target,
                        start: now,
                        seconds,
                    })
                }
                _ => {
                    self.displayed = target;
                    None
                }
            };
        }

        let Some(animation) = self.animation else {
            return false;
        };
        let (camera, done) = animation.sample(now);
        self.displayed = camera;
        if done {
            self.animation = None;
        }
        !done
    }
}

impl eframe::App for SlideplaneApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if let Some(watcher) = &self.watcher {
            if watcher.deck_changed(&self.deck_path) {
                self.reload_deck();
            }
        }

        // Widgets (the hint text) may hold keyboard focus.
        let widget_focus = ctx.memory(|m| m.focused());
        self.nav.input_focus = if widget_focus.is_some() {
            InputFocus::Elsewhere
        } else {
            InputFocus::Surface
        };

        let window = Size::new(self.canvas.width() as f64, self.canvas.height() as f64);
        self.gestures.set_viewport(window, SLIDE_FRAME);

        let (events, now) = ctx.input(|i| (self.collect_events(i), i.time));
        for event in &events {
            let consumed = self.gestures.handle(event, &mut self.nav, &mut self.registry);
            if !consumed && *event == InputEvent::KeyDown(Key::Escape) {
                ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(false));
            }
        }
        if self.nav.input_focus == InputFocus::Surface {
            if let Some(id) = widget_focus {
                ctx.memory_mut(|m| m.surrender_focus(id));
            }
        }
        self.handle_app_keys(ctx);

        if self.gestures.tick(now, &mut self.nav) {
            let period = 1.0 / self.gestures.config().tick_rate;
            ctx.request_repaint_after(Duration::from_secs_f64(period));
        }
        if self.update_displayed_camera(now) {
            ctx.request_repaint();
        }

        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }

        if self.show_hints {
            egui::SidePanel::right("hints")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| {
                    ui.heading("Hints");
                    ui.separator();
                    let mut text = self.nav.hint().unwrap_or_default();
                    egui::ScrollArea::vertical().show(ui, |ui| {
                        ui.add(
                            egui::TextEdit::multiline(&mut text)
                                .desired_width(f32::INFINITY)
                                .frame(false),
                        );
                    });
                });
        }

        let bg = self.theme.background;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                self.canvas = rect;
                ui.painter().rect_filled(rect, 0.0, bg);

                let painter = ui.painter().with_clip_rect(rect);
                for slide in self.registry.iter() {
                    self.draw_slide(&painter, slide, rect);
                }

                draw_status(ui, &self.theme, rect, &self.nav);

                if let Some(toast) = &self.toast {
                    draw_toast(ui, &self.theme, rect, toast);
                    ctx.request_repaint();
                }
                if self.show_help {
                    draw_help(ui, &self.theme, rect);
                }
            });
    }
}

impl SlideplaneApp {
    fn draw_slide(&self, painter: &egui::Painter, slide: &SlideDescriptor, canvas: egui::Rect) {
        let card = card_rect(slide.offset, self.displayed, canvas);
        if !card.intersects(canvas) {
            return;
        }
        let theme = &self.theme;
        let height = card.height();
        let rounding = height * 0.02;

        let dragged = matches!(
            self.gestures.slide_drag(),
            DragMachine::Dragging { context, .. } if *context == slide.id
        );
        let hovered = self.nav.free_roam && self.nav.hovered_slide.as_ref() == Some(&slide.id);
        let border = if dragged || hovered {
            egui::Stroke::new(3.0, theme.accent)
        } else {
            egui::Stroke::new(1.0, theme.card_border)
        };

        painter.rect_filled(card, rounding, theme.card);
        painter.rect_stroke(card, rounding, border, egui::StrokeKind::Inside);

        // Too small to read; the outline is enough.
        if height < 24.0 {
            return;
        }

        let padding = height * 0.06;
        let content_width = (card.width() - padding * 2.0).max(1.0);
        let mut y = card.top() + padding;

        let title = slide.title.as_deref().unwrap_or(slide.id.as_str());
        let title_galley = painter.layout(
            title.to_string(),
            egui::FontId::proportional(height * theme.title_ratio),
            theme.heading_color,
            content_width,
        );
        let title_height = title_galley.rect.height();
        painter.galley(egui::pos2(card.left() + padding, y), title_galley, theme.heading_color);
        y += title_height + padding * 0.5;

        if let Some(body) = &slide.body {
            let body_galley = painter.layout(
                body.clone(),
                egui::FontId::proportional(height * theme.body_ratio),
                theme.foreground,
                content_width,
            );
            painter.galley(egui::pos2(card.left() + padding, y), body_galley, theme.foreground);
        }

        if self.nav.mode == Mode::Editor {
            painter.text(
                card.right_bottom() - egui::vec2(padding, padding) * 0.5,
                egui::Align2::RIGHT_BOTTOM,
                format!(
                    "{}  ({:.2}, {:.2})",
                    slide.id, slide.offset.dx, slide.offset.dy
                ),
                egui::FontId::monospace((height * 0.03).max(10.0)),
                theme.muted,
            );
        }
    }
}

/// Map a plane point to a window position for `camera` over `canvas`.
fn plane_to_screen(point: Vector2, camera: Camera, canvas: egui::Rect) -> egui::Pos2 {
    let relative = (point - camera.offset) * camera.scale;
    let center = canvas.center();
    egui::pos2(
        center.x + (relative.dx * canvas.width() as f64) as f32,
        center.y - (relative.dy * canvas.height() as f64) as f32,
    )
}

/// On-screen card rectangle for a slide centered at `offset`.
fn card_rect(offset: Vector2, camera: Camera, canvas: egui::Rect) -> egui::Rect {
    let center = plane_to_screen(offset, camera, canvas);
    let scale = camera.scale as f32;
    let size = egui::vec2(
        canvas.width() * SLIDE_FRAME.width as f32 * scale,
        canvas.height() * SLIDE_FRAME.height as f32 * scale,
    );
    egui::Rect::from_center_size(center, size * (1.0 - CARD_INSET))
}

fn map_key(key: egui::Key) -> Option<Key> {
    let key = match key {
        egui::Key::Space => Key::Space,
        egui::Key::Enter => Key::Enter,
        egui::Key::ArrowRight => Key::ArrowRight,
        egui::Key::Backspace => Key::Backspace,
        egui::Key::ArrowLeft => Key::ArrowLeft,
        egui::Key::N => Key::N,
        egui::Key::M => Key::M,
        egui::Key::Escape => Key::Escape,
        _ => return None,
    };
    Some(key)
}

/// Mode badges top-left, focus position bottom-right.
fn draw_status(ui: &egui::Ui, theme: &Theme, rect: egui::Rect, nav: &NavigationState) {
    let font = egui::FontId::proportional(14.0);
    let mut badges = Vec::new();
    if nav.mode == Mode::Editor {
        badges.push("EDITING");
    }
    if nav.free_roam {
        badges.push("\u{1F513} FREE ROAM");
    }

    let mut x = rect.left() + 12.0;
    for badge in badges {
        let galley = ui
            .painter()
            .layout_no_wrap(badge.to_string(), font.clone(), theme.heading_color);
        let badge_rect = egui::Rect::from_min_size(
            egui::pos2(x, rect.top() + 12.0),
            galley.rect.size() + egui::vec2(16.0, 8.0),
        );
        ui.painter()
            .rect_filled(badge_rect, 6.0, Theme::with_opacity(theme.accent, 0.85));
        ui.painter().galley(
            badge_rect.min + egui::vec2(8.0, 4.0),
            galley,
            theme.heading_color,
        );
        x = badge_rect.right() + 8.0;
    }

    let total = nav.focuses().len();
    let index = nav.selected_focus();
    let position = match usize::try_from(index) {
        Ok(i) if i < total => format!("{} / {total}", i + 1),
        _ => format!("- / {total}"),
    };
    ui.painter().text(
        rect.right_bottom() - egui::vec2(12.0, 10.0),
        egui::Align2::RIGHT_BOTTOM,
        position,
        font,
        Theme::with_opacity(theme.muted, 0.8),
    );
}

fn draw_toast(ui: &egui::Ui, theme: &Theme, rect: egui::Rect, toast: &Toast) {
    let opacity = toast.opacity();
    if opacity <= 0.0 {
        return;
    }
    let color = Theme::with_opacity(theme.foreground, opacity * 0.9);
    let galley = ui.painter().layout_no_wrap(
        toast.message.clone(),
        egui::FontId::proportional(18.0),
        color,
    );
    let padding = 14.0;
    let toast_rect = egui::Rect::from_min_size(
        egui::pos2(
            rect.center().x - galley.rect.width() / 2.0 - padding,
            rect.bottom() - 70.0,
        ),
        galley.rect.size() + egui::vec2(padding * 2.0, padding * 2.0),
    );
    ui.painter()
        .rect_filled(toast_rect, 8.0, Theme::with_opacity(theme.card, opacity * 0.9));
    ui.painter()
        .galley(toast_rect.min + egui::vec2(padding, padding), galley, color);
}

fn draw_help(ui: &egui::Ui, theme: &Theme, rect: egui::Rect) {
    let shortcuts = [
        ("Space / Enter / \u{2192}", "Next focus / step"),
        ("Backspace / \u{2190}", "Previous focus"),
        ("M / N", "Zoom in / out"),
        ("Double click", "Toggle free roam"),
        ("Wheel", "Zoom (free roam)"),
        ("Cmd/Ctrl + drag", "Pan camera"),
        ("Shift + drag", "Move slide (editor)"),
        ("E", "Toggle editor mode"),
        ("H", "Toggle hint panel"),
        ("D", "Toggle theme"),
        ("F", "Toggle fullscreen"),
        ("Esc", "Leave free roam / panel"),
        ("Q", "Quit"),
    ];

    let padding = 24.0;
    let line_height = 28.0;
    let height = shortcuts.len() as f32 * line_height + padding * 2.0 + 36.0;
    let hud_rect = egui::Rect::from_center_size(rect.center(), egui::vec2(400.0, height));
    ui.painter()
        .rect_filled(hud_rect, 12.0, Theme::with_opacity(theme.card, 0.95));

    let title = ui.painter().layout_no_wrap(
        "Keyboard Shortcuts".to_string(),
        egui::FontId::proportional(20.0),
        theme.heading_color,
    );
    ui.painter().galley(
        egui::pos2(hud_rect.left() + padding, hud_rect.top() + padding),
        title,
        theme.heading_color,
    );

    let mut y = hud_rect.top() + padding + 36.0;
    for (key, desc) in shortcuts {
        ui.painter().text(
            egui::pos2(hud_rect.left() + padding, y),
            egui::Align2::LEFT_TOP,
            key,
            egui::FontId::monospace(14.0),
            theme.accent,
        );
        ui.painter().text(
            egui::pos2(hud_rect.left() + padding + 190.0, y),
            egui::Align2::LEFT_TOP,
            desc,
            egui::FontId::proportional(14.0),
            theme.foreground,
        );
        y += line_height;
    }
}

pub fn run(options: LaunchOptions) -> anyhow::Result<()> {
    let deck = Deck::load(&options.file)?;
    if deck.registry.is_empty() {
        anyhow::bail!("No slides found in {}", options.file.display());
    }

    let title = deck.title.clone().unwrap_or_else(|| {
        format!(
            "slideplane - {}",
            options.file.file_name().unwrap_or_default().to_string_lossy()
        )
    });

    // CLI flags override config
    let config = Config::load_or_default();
    let mut nav = NavigationState::new(deck.focuses, options.start_focus, &deck.registry)?
        .with_animation_seconds(config.animation_seconds());
    nav.double_click_free_roam = config.double_click_free_roam();
    nav.mode = options.mode.unwrap_or_else(|| config.mode());
    if options.free_roam {
        nav.toggle_free_roam();
    }

    let viewport = if options.windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    let registry = deck.registry;
    let file = options.file;
    eframe::run_native(
        &title,
        native_options,
        Box::new(move |cc| {
            let mut app = SlideplaneApp::new(file, registry, nav, &config);
            match DeckWatcher::start(&app.deck_path, cc.egui_ctx.clone()) {
                Ok(watcher) => app.watcher = Some(watcher),
                Err(e) => warn!("Deck reload disabled: {e}"),
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
