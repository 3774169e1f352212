use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use boxmaker_engine::core::{App, AppControl, FrameCtx};
use boxmaker_engine::coords::{Vec2, Viewport};
use boxmaker_engine::device::GpuInit;
use boxmaker_engine::input::{InputEvent, Key, KeyState, Modifiers, MouseButtonState};
use boxmaker_engine::logging::{LoggingConfig, init_logging};
use boxmaker_engine::paint::{Color, Rgba8};
use boxmaker_engine::scene::{LayerRef, TextEdit};
use boxmaker_engine::window::{Runtime, RuntimeConfig, RuntimeCtx};
use boxmaker_engine::{Editor, EditorConfig};

/// Fonts offered by the F shortcut.
const FONTS: [&str; 5] = ["arial.ttf", "impact.ttf", "verdana.ttf", "times.ttf", "comic.ttf"];

/// Colors offered by the C shortcut.
const COLORS: [Rgba8; 6] = [
    Rgba8::WHITE,
    Rgba8::BLACK,
    Rgba8::rgb(220, 40, 40),
    Rgba8::rgb(40, 120, 220),
    Rgba8::rgb(250, 200, 30),
    Rgba8::rgb(40, 170, 80),
];

const SIZE_STEP: f32 = 5.0;
const SIZE_MIN: f32 = 10.0;
const SIZE_MAX: f32 = 500.0;

/// Interactive 3D product-mockup editor.
///
/// Drag to orbit, wheel to zoom. E toggles edit mode (drag layers), T adds a
/// text layer, Tab selects the next one, Enter types into it, F/C cycle its
/// font and color, +/- resize it, Delete removes it.
#[derive(Debug, Parser)]
#[command(name = "boxmaker", version)]
struct Args {
    /// Image wrapped around the box.
    #[arg(long)]
    wrap: Option<PathBuf>,

    /// Image drawn full-screen behind the box.
    #[arg(long)]
    backdrop: Option<PathBuf>,

    /// Icon overlay at the default position; repeatable.
    #[arg(long = "icon")]
    icons: Vec<PathBuf>,

    /// Initial text layer; repeatable.
    #[arg(long = "text")]
    texts: Vec<String>,

    /// Extra font directory searched before the system ones; repeatable.
    #[arg(long = "font-dir")]
    font_dirs: Vec<PathBuf>,

    /// Box surface color, `#rrggbb` or `#rrggbbaa`.
    #[arg(long, default_value = "#ffffff")]
    background: Rgba8,

    /// env_logger filter, e.g. `boxmaker_engine=debug`.
    #[arg(long)]
    log: Option<String>,

    #[arg(long, default_value_t = 1500.0)]
    width: f64,

    #[arg(long, default_value_t = 950.0)]
    height: f64,
}

struct Studio {
    editor: Editor,
    selected: Option<usize>,
    typing: bool,
    title_dirty: bool,
}

impl Studio {
    fn new(editor: Editor) -> Self {
        let selected = editor.scene().layers.texts().len().checked_sub(1);
        Self { editor, selected, typing: false, title_dirty: true }
    }

    fn handle_key(&mut self, key: Key, modifiers: Modifiers) -> AppControl {
        if self.typing {
            match key {
                Key::Enter | Key::Escape => self.set_typing(false),
                Key::Backspace => self.edit_text(|t| {
                    t.pop();
                }),
                _ => {}
            }
            return AppControl::Continue;
        }

        if modifiers.command() {
            return match key {
                Key::Letter('q') => AppControl::Exit,
                _ => AppControl::Continue,
            };
        }

        match key {
            Key::Letter('e') => {
                let enabled = !self.editor.is_edit_mode();
                self.editor.set_edit_mode(enabled);
                self.title_dirty = true;
            }
            Key::Escape if self.editor.is_edit_mode() => {
                self.editor.set_edit_mode(false);
                self.title_dirty = true;
            }
            Key::Letter('t') => {
                self.selected = Some(self.editor.add_text_layer());
                self.title_dirty = true;
            }
            Key::Tab => self.select_next(),
            Key::Enter if self.selected.is_some() => self.set_typing(true),
            Key::Delete => self.remove_selected(),
            Key::Plus => self.resize_selected(SIZE_STEP),
            Key::Minus => self.resize_selected(-SIZE_STEP),
            Key::Letter('f') => self.cycle_font(),
            Key::Letter('c') => self.cycle_color(),
            _ => {}
        }
        AppControl::Continue
    }

    fn set_typing(&mut self, typing: bool) {
        self.typing = typing;
        self.title_dirty = true;
    }

    fn select_next(&mut self) {
        let count = self.editor.scene().layers.texts().len();
        self.selected = match (self.selected, count) {
            (_, 0) => None,
            (Some(i), n) => Some((i + 1) % n),
            (None, _) => Some(0),
        };
        self.title_dirty = true;
    }

    fn remove_selected(&mut self) {
        let Some(index) = self.selected else { return; };
        if let Err(e) = self.editor.remove_text_layer(index) {
            log::debug!("{e}");
        }
        let count = self.editor.scene().layers.texts().len();
        self.selected = count.checked_sub(1).map(|last| index.min(last));
        self.title_dirty = true;
    }

    fn edit_text(&mut self, f: impl FnOnce(&mut String)) {
        let Some(index) = self.selected else { return; };
        let Some(layer) = self.editor.scene().layers.text(index) else { return; };
        let mut text = layer.text.clone();
        f(&mut text);
        self.apply(index, TextEdit::text(text));
    }

    fn resize_selected(&mut self, step: f32) {
        let Some(index) = self.selected else { return; };
        let Some(layer) = self.editor.scene().layers.text(index) else { return; };
        let size = (layer.size + step).clamp(SIZE_MIN, SIZE_MAX);
        self.apply(index, TextEdit::size(size));
    }

    fn cycle_font(&mut self) {
        let Some(index) = self.selected else { return; };
        let Some(layer) = self.editor.scene().layers.text(index) else { return; };
        let next = FONTS
            .iter()
            .position(|f| f.eq_ignore_ascii_case(&layer.font))
            .map_or(0, |i| (i + 1) % FONTS.len());
        log::info!("font: {}", FONTS[next]);
        self.apply(index, TextEdit::font(FONTS[next]));
    }

    fn cycle_color(&mut self) {
        let Some(index) = self.selected else { return; };
        let Some(layer) = self.editor.scene().layers.text(index) else { return; };
        let next = COLORS
            .iter()
            .position(|c| *c == layer.color)
            .map_or(0, |i| (i + 1) % COLORS.len());
        self.apply(index, TextEdit::color(COLORS[next]));
    }

    fn apply(&mut self, index: usize, edit: TextEdit) {
        if let Err(e) = self.editor.update_text_layer(index, edit) {
            log::debug!("{e}");
        }
    }

    fn handle_event(&mut self, event: &InputEvent, viewport: Viewport) -> AppControl {
        match event {
            InputEvent::PointerMoved(p) => {
                self.editor.on_pointer_move(Vec2::new(p.x, p.y), viewport);
            }
            InputEvent::PointerButton(b) => {
                let pos = Vec2::new(b.x, b.y);
                match b.state {
                    MouseButtonState::Pressed => {
                        if let Some(LayerRef::Text(i)) = self.editor.on_pointer_down(pos, viewport, b.button) {
                            self.selected = Some(i);
                            self.title_dirty = true;
                        }
                    }
                    MouseButtonState::Released => self.editor.on_pointer_up(b.button),
                }
            }
            InputEvent::MouseWheel { delta, .. } => self.editor.on_wheel(*delta),
            InputEvent::Key { key, state: KeyState::Pressed, modifiers, .. } => {
                return self.handle_key(*key, *modifiers);
            }
            InputEvent::Text(t) if self.typing => {
                let typed = t.text.clone();
                self.edit_text(|s| s.push_str(&typed));
            }
            _ => {}
        }
        AppControl::Continue
    }

    fn update_title(&mut self, runtime: &mut RuntimeCtx) {
        if !self.title_dirty {
            return;
        }
        self.title_dirty = false;

        let mode = if self.editor.is_edit_mode() { "edit" } else { "orbit" };
        let selection = match self.selected {
            Some(i) if self.typing => format!(" | typing into text {}", i + 1),
            Some(i) => format!(" | text {} selected", i + 1),
            None => String::new(),
        };
        runtime.set_title(format!("boxmaker [{mode}]{selection}"));
    }
}

impl App for Studio {
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let viewport = ctx.window.viewport();

        for event in &ctx.input_frame.events {
            if self.handle_event(event, viewport) == AppControl::Exit {
                return AppControl::Exit;
            }
        }

        self.update_title(ctx.runtime);

        let clear = Color::from(self.editor.config().clear_color);
        let editor = &mut self.editor;
        ctx.render(clear, |rctx, target| editor.render_frame(rctx, target))
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(LoggingConfig {
        env_filter: args.log.clone(),
        ..Default::default()
    });

    let config = EditorConfig {
        font_dirs: args.font_dirs.clone(),
        background: args.background,
        ..Default::default()
    };
    let mut editor = Editor::new(config);

    if let Some(wrap) = &args.wrap {
        editor.set_wrap_image(wrap);
    }
    if let Some(backdrop) = &args.backdrop {
        if let Err(e) = editor.set_backdrop_image(backdrop) {
            log::debug!("{e}");
        }
    }
    for icon in &args.icons {
        editor.add_icon_layer(icon, 300.0, 300.0, 150.0, 150.0);
    }
    for text in &args.texts {
        let index = editor.add_text_layer();
        editor.update_text_layer(index, TextEdit::text(text.as_str()))?;
    }

    log::info!("fonts available: {}", editor.compositor().fonts().available_fonts().len());

    let runtime = RuntimeConfig {
        initial_size: winit::dpi::LogicalSize::new(args.width, args.height),
        ..Default::default()
    };

    Runtime::run(runtime, GpuInit::default(), Studio::new(editor))
}
