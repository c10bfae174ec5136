//! SVG to PNG rasterization

use std::io::Cursor;
use std::sync::Arc;
use tracing::debug;

use super::scene::TrackScene;
use crate::config::RenderStyle;
use crate::{Result, TrackError};

/// Largest accepted canvas edge in pixels
pub const MAX_DIMENSION: u32 = 8192;

/// Turns scenes into PNG bytes.
///
/// Cloning is cheap; the font database is loaded once and shared.
#[derive(Clone)]
pub struct Rasterizer {
    fontdb: Arc<usvg::fontdb::Database>,
    style: RenderStyle,
}

impl std::fmt::Debug for Rasterizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rasterizer").field("fonts", &self.fontdb.len()).field("style", &self.style).finish()
    }
}

impl Rasterizer {
    /// Rasterizer using the system fonts
    pub fn new(style: RenderStyle) -> Self {
        let mut db = usvg::fontdb::Database::new();
        db.load_system_fonts();
        debug!(fonts = db.len(), "Loaded system fonts");
        Self::with_fontdb(style, Arc::new(db))
    }

    /// Rasterizer sharing an existing font database
    pub fn with_fontdb(style: RenderStyle, fontdb: Arc<usvg::fontdb::Database>) -> Self {
        Self { fontdb, style }
    }

    pub fn style(&self) -> &RenderStyle {
        &self.style
    }

    /// Render a scene to PNG.
    ///
    /// CPU bound; async callers should run this on a blocking thread.
    pub fn rasterize(&self, scene: &TrackScene) -> Result<Vec<u8>> {
        let (width, height) = (scene.width, scene.height);
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(TrackError::render_error(format!("canvas size {}x{}", width, height)));
        }

        let svg = scene.to_svg(&self.style);
        let options = usvg::Options { fontdb: Arc::clone(&self.fontdb), ..usvg::Options::default() };
        let tree = usvg::Tree::from_data(svg.as_bytes(), &options)
            .map_err(|e| TrackError::render_error_with_source("SVG parse", Box::new(e)))?;

        let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| TrackError::render_error("pixmap allocation"))?;
        resvg::render(&tree, resvg::tiny_skia::Transform::identity(), &mut pixmap.as_mut());

        // Opaque background, so premultiplied and straight alpha coincide
        let image = image::RgbaImage::from_raw(width, height, pixmap.data().to_vec())
            .ok_or_else(|| TrackError::render_error("pixel buffer size"))?;
        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)
            .map_err(|e| TrackError::render_error_with_source("PNG encode", Box::new(e)))?;

        debug!(width, height, bytes = png.len(), "Rasterized track");
        Ok(png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotate::CornerMarker;
    use kurbo::Point;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

    fn rasterizer() -> Rasterizer {
        // Empty font database keeps tests independent of the host
        Rasterizer::with_fontdb(RenderStyle::default(), Arc::new(usvg::fontdb::Database::new()))
    }

    fn square(width: u32, height: u32) -> TrackScene {
        TrackScene {
            width,
            height,
            track: vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(100.0, 100.0),
                Point::new(0.0, 100.0),
                Point::new(0.0, 0.0),
            ],
            markers: vec![CornerMarker { label: "1".into(), position: Point::ZERO, anchor: Point::ZERO }],
            axes: None,
        }
    }

    #[test]
    fn produces_png_of_requested_size() {
        let png = rasterizer().rasterize(&square(320, 180)).unwrap();
        assert!(png.starts_with(PNG_MAGIC));

        let decoded = image::load_from_memory_with_format(&png, image::ImageFormat::Png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (320, 180));
    }

    #[test]
    fn background_uses_palette() {
        let png = rasterizer().rasterize(&square(200, 200)).unwrap();
        let decoded = image::load_from_memory(&png).unwrap().to_rgba8();
        // corner pixel is outside the padded plot area
        assert_eq!(decoded.get_pixel(0, 0).0, [0x0f, 0x17, 0x24, 0xff]);
    }

    #[test]
    fn rejects_degenerate_canvas() {
        let err = rasterizer().rasterize(&square(0, 10)).unwrap_err();
        assert!(matches!(err, TrackError::Render { .. }));
        assert!(rasterizer().rasterize(&square(MAX_DIMENSION + 1, 10)).is_err());
    }
}
