use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Instant;

use image::imageops::{self, FilterType};
use image::{ImageError, RgbaImage};

use crate::coords::{Rect, TextureSize};
use crate::error::AssetError;
use crate::paint::Rgba8;
use crate::scene::{IconLayer, LayerStack, TextLayer};
use crate::text::{FontSystem, GlyphRun};

use super::RasterBuffer;

/// Raster sizes used by the compositor.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CompositorConfig {
    /// Master texture size.
    pub texture_size: TextureSize,
    /// Wrap art is resized to exactly this and drawn at the origin.
    pub wrap_size: TextureSize,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            texture_size: TextureSize::new(2048, 1024),
            wrap_size: TextureSize::new(1024, 1024),
        }
    }
}

/// Outcome of one compositor pass. Failures here never abort the pass.
#[derive(Debug, Default)]
pub struct RebuildReport {
    pub errors: Vec<AssetError>,
    pub texts_drawn: usize,
    pub icons_drawn: usize,
    pub wrap_drawn: bool,
}

impl RebuildReport {
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Rasterizes background, wrap art, text layers and icon layers into the
/// master texture.
///
/// Decoded images are cached per path (wrap art already resized, icons
/// already fitted to their box); entries for paths no longer referenced are
/// dropped at the start of every pass.
pub struct Compositor {
    config: CompositorConfig,
    fonts: FontSystem,
    buffer: RasterBuffer,
    wrap_cache: Option<(PathBuf, RgbaImage)>,
    icon_cache: HashMap<(PathBuf, u32, u32), RgbaImage>,
    generation: u64,
}

impl Compositor {
    pub fn new(config: CompositorConfig, fonts: FontSystem) -> Self {
        Self {
            buffer: RasterBuffer::new(config.texture_size, Rgba8::TRANSPARENT),
            config,
            fonts,
            wrap_cache: None,
            icon_cache: HashMap::new(),
            generation: 0,
        }
    }

    pub fn config(&self) -> CompositorConfig {
        self.config
    }

    pub fn fonts(&self) -> &FontSystem {
        &self.fonts
    }

    pub fn fonts_mut(&mut self) -> &mut FontSystem {
        &mut self.fonts
    }

    /// Result of the last pass.
    pub fn buffer(&self) -> &RasterBuffer {
        &self.buffer
    }

    /// Incremented by every completed pass.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Drops cached decodes of `path` so the next pass reads it from disk again.
    pub fn forget(&mut self, path: &Path) {
        if self.wrap_cache.as_ref().is_some_and(|(p, _)| p == path) {
            self.wrap_cache = None;
        }
        self.icon_cache.retain(|(p, _, _), _| p != path);
    }

    /// Full pass: background, wrap art, text layers, icons, in that order.
    ///
    /// Writes every layer's bounding rectangle and clears the stack's dirty flag.
    pub fn rebuild(&mut self, background: Rgba8, wrap: Option<&Path>, layers: &mut LayerStack) -> RebuildReport {
        let started = Instant::now();
        let mut report = RebuildReport::default();
        self.prune(wrap, layers.icons());

        self.buffer.fill(background);

        if let Some(path) = wrap {
            match self.load_wrap(path) {
                Ok(()) => {
                    if let Some((_, art)) = &self.wrap_cache {
                        self.buffer.overlay(art, 0, 0);
                        report.wrap_drawn = true;
                    }
                }
                Err(e) => {
                    log::warn!("wrap image skipped: {e}");
                    report.errors.push(e);
                }
            }
        }

        let (texts, icons) = layers.layers_mut();
        for layer in texts.iter_mut() {
            match self.draw_text(layer) {
                Ok(()) => report.texts_drawn += 1,
                Err(e) => {
                    log::warn!("text layer '{}' skipped: {e}", layer.text);
                    layer.bounds = None;
                    report.errors.push(e);
                }
            }
        }
        for layer in icons.iter_mut() {
            match self.draw_icon(layer) {
                Ok(()) => report.icons_drawn += 1,
                Err(e) => {
                    log::warn!("icon layer skipped: {e}");
                    layer.bounds = None;
                    report.errors.push(e);
                }
            }
        }

        layers.clear_dirty();
        self.generation += 1;
        log::debug!(
            "texture rebuilt #{}: {} text, {} icons, {} errors in {:?}",
            self.generation,
            report.texts_drawn,
            report.icons_drawn,
            report.errors.len(),
            started.elapsed()
        );
        report
    }

    fn prune(&mut self, wrap: Option<&Path>, icons: &[IconLayer]) {
        if self.wrap_cache.as_ref().is_some_and(|(p, _)| Some(p.as_path()) != wrap) {
            self.wrap_cache = None;
        }
        let live: HashSet<&Path> = icons.iter().map(|i| i.path()).collect();
        self.icon_cache.retain(|(p, _, _), _| live.contains(p.as_path()));
    }

    fn load_wrap(&mut self, path: &Path) -> Result<(), AssetError> {
        if self.wrap_cache.as_ref().is_some_and(|(p, _)| p == path) {
            return Ok(());
        }
        let size = self.config.wrap_size;
        let art = decode_image(path)?;
        let art = imageops::resize(&art, size.width, size.height, FilterType::Lanczos3);
        self.wrap_cache = Some((path.to_path_buf(), art));
        Ok(())
    }

    fn draw_text(&mut self, layer: &mut TextLayer) -> Result<(), AssetError> {
        let font = self.fonts.font(&layer.font)?;
        let run = GlyphRun::layout(&font, &layer.text, layer.size, layer.anchor.round());
        self.buffer.draw_glyph_run(&run, layer.color);
        layer.bounds = Some(run.bounds);
        Ok(())
    }

    fn draw_icon(&mut self, layer: &mut IconLayer) -> Result<(), AssetError> {
        let (box_w, box_h) = (
            layer.max_size.x.round().max(0.0) as u32,
            layer.max_size.y.round().max(0.0) as u32,
        );
        let key = (layer.path.clone(), box_w, box_h);

        if !self.icon_cache.contains_key(&key) {
            let src = decode_image(&layer.path)?;
            let (w, h) = fit_within(src.dimensions(), (box_w, box_h));
            let fitted = if (w, h) == src.dimensions() {
                src
            } else {
                imageops::resize(&src, w, h, FilterType::CatmullRom)
            };
            self.icon_cache.insert(key.clone(), fitted);
        }

        let anchor = layer.anchor.round();
        if let Some(icon) = self.icon_cache.get(&key) {
            self.buffer.overlay(icon, anchor.x as i64, anchor.y as i64);
        }
        layer.bounds = Some(Rect::new(anchor.x, anchor.y, box_w as f32, box_h as f32));
        Ok(())
    }
}

/// Decodes any supported image into RGBA8, mapping I/O and format failures apart.
pub(crate) fn decode_image(path: &Path) -> Result<RgbaImage, AssetError> {
    match image::open(path) {
        Ok(img) => Ok(img.to_rgba8()),
        Err(ImageError::IoError(source)) => Err(AssetError::Io { path: path.to_path_buf(), source }),
        Err(source) => Err(AssetError::Decode { path: path.to_path_buf(), source }),
    }
}

/// Shrinks `img` so neither side exceeds `max_side`, preserving its aspect.
/// Images already within the limit come back untouched.
pub(crate) fn fit_to_texture_limit(img: RgbaImage, max_side: u32) -> RgbaImage {
    let (w, h) = fit_within(img.dimensions(), (max_side, max_side));
    if (w, h) == img.dimensions() {
        return img;
    }
    log::info!("image {}x{} downscaled to {w}x{h} for the GPU", img.width(), img.height());
    imageops::resize(&img, w, h, FilterType::Triangle)
}

/// Aspect-preserving size that fits inside `max`. Never enlarges.
fn fit_within((w, h): (u32, u32), (max_w, max_h): (u32, u32)) -> (u32, u32) {
    if w <= max_w && h <= max_h {
        return (w, h);
    }
    let scale = (max_w as f64 / w as f64).min(max_h as f64 / h as f64);
    let fit = |v: u32| ((v as f64 * scale).round() as u32).max(1);
    (fit(w).min(max_w.max(1)), fit(h).min(max_h.max(1)))
}
