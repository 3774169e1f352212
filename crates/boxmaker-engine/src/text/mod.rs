//! Font resolution and glyph-run rasterization for text layers.

mod font_system;
mod layout;

pub use font_system::FontSystem;
pub use layout::{GlyphRun, MAX_TEXT_SIZE, MIN_TEXT_SIZE, PlacedGlyph, clamp_text_size};

#[cfg(test)]
pub(crate) mod test_fonts {
    use super::FontSystem;
    use crate::scene::TextLayer;

    /// Cantarell Regular, SIL Open Font License 1.1.
    pub const FIXTURE_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/fixtures/Cantarell-Regular.ttf");
    pub const FIXTURE: &[u8] = include_bytes!("../../fixtures/Cantarell-Regular.ttf");

    /// No directories searched; the fixture answers to the default font name.
    pub fn fixture_fonts() -> FontSystem {
        let mut fonts = FontSystem::with_dirs(Vec::new());
        fonts.load_font(TextLayer::DEFAULT_FONT, FIXTURE).unwrap();
        fonts
    }

    pub fn fixture_font() -> std::sync::Arc<fontdue::Font> {
        fixture_fonts().font(TextLayer::DEFAULT_FONT).unwrap()
    }
}
