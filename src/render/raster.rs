use super::{Renderer, SvgRenderer};
use crate::config::{ImageFormat, PidFilter};
use crate::error::{Error, Result};
use crate::pages::{GridProjection, HotPage};
use image::{DynamicImage, RgbaImage};
use resvg::{tiny_skia, usvg};
use std::io::Cursor;

/// PNG and JPEG backend: draws the SVG views and rasterizes them at the
/// SVG's pixel size (`inches × dpi`).
pub struct RasterRenderer {
    format: ImageFormat,
    svg: SvgRenderer,
    options: usvg::Options<'static>,
}

impl RasterRenderer {
    pub fn new(format: ImageFormat, dpi: u32) -> Self {
        let mut options = usvg::Options::default();
        options.fontdb_mut().load_system_fonts();
        tracing::debug!(fonts = options.fontdb.len(), "Loaded system fonts");
        Self {
            format,
            svg: SvgRenderer::new(dpi),
            options,
        }
    }

    fn rasterize(&self, svg: &[u8]) -> Result<Vec<u8>> {
        let encoding = match self.format {
            ImageFormat::Png => image::ImageFormat::Png,
            ImageFormat::Jpg => image::ImageFormat::Jpeg,
            ImageFormat::Svg => return Ok(svg.to_vec()),
        };

        let tree = usvg::Tree::from_data(svg, &self.options)
            .map_err(|e| Error::Render(e.to_string()))?;
        let size = tree.size().to_int_size();
        let (width, height) = (size.width(), size.height());
        let mut pixmap = tiny_skia::Pixmap::new(width, height)
            .ok_or_else(|| Error::Render(format!("cannot allocate a {width}x{height} image")))?;
        resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

        // Every drawing starts with an opaque white backdrop, so the
        // premultiplied pixels are already straight RGBA
        let rgba = RgbaImage::from_raw(width, height, pixmap.take())
            .ok_or_else(|| Error::Render("pixel buffer does not match image size".to_string()))?;
        let image = match self.format {
            ImageFormat::Jpg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8()),
            _ => DynamicImage::ImageRgba8(rgba),
        };

        let mut out = Cursor::new(Vec::new());
        image
            .write_to(&mut out, encoding)
            .map_err(|e| Error::Render(e.to_string()))?;
        tracing::debug!(width, height, format = ?self.format, "Rasterized image");
        Ok(out.into_inner())
    }
}

impl Renderer for RasterRenderer {
    fn format(&self) -> ImageFormat {
        self.format
    }

    fn heatmap(&self, grid: &GridProjection, pids: Option<&PidFilter>) -> Result<Vec<u8>> {
        self.rasterize(&self.svg.heatmap(grid, pids)?)
    }

    fn bar_chart(
        &self,
        pages: &[HotPage],
        top_n: usize,
        pids: Option<&PidFilter>,
    ) -> Result<Vec<u8>> {
        self.rasterize(&self.svg.bar_chart(pages, top_n, pids)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::PageTable;

    fn table() -> PageTable {
        PageTable::from_addresses([0x1000, 0x1000, 0x2000, 0x0123_4000])
    }

    #[test]
    fn test_png_heatmap_size_follows_dpi() {
        let bytes = RasterRenderer::new(ImageFormat::Png, 20)
            .heatmap(&table().grid(), None)
            .unwrap();
        assert!(bytes.starts_with(b"\x89PNG\r\n\x1a\n"));
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (160, 160));
        // top-left corner is outside the grid and stays white
        assert_eq!(decoded.to_rgb8().get_pixel(0, 0).0, [255, 255, 255]);
    }

    #[test]
    fn test_jpg_bar_chart() {
        let pages = table().ranked(5);
        let bytes = RasterRenderer::new(ImageFormat::Jpg, 20)
            .bar_chart(&pages, 5, None)
            .unwrap();
        assert!(bytes.starts_with(&[0xff, 0xd8, 0xff]));
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (200, 160));
    }
}
