//! Drawing backend wrapper that keeps plots renderable without system fonts.
//!
//! Text goes through the host's font stack. When no font can be loaded the
//! wrapped backend errors or panics; this wrapper skips the text instead and
//! estimates its size from the requested font size so layout still works.

use plotters_backend::{
    BackendColor, BackendCoord, BackendStyle, BackendTextStyle, DrawingBackend, DrawingErrorKind,
};
use std::panic;
use tracing::debug;

/// Width of one character relative to the font size, for size estimates
const CHAR_WIDTH_RATIO: f64 = 0.6;

pub struct FontSafeBackend<DB> {
    inner: DB,
}

impl<DB> FontSafeBackend<DB> {
    pub fn new(inner: DB) -> Self {
        Self { inner }
    }
}

impl<DB: DrawingBackend> DrawingBackend for FontSafeBackend<DB> {
    type ErrorType = DB::ErrorType;

    fn get_size(&self) -> (u32, u32) {
        self.inner.get_size()
    }

    fn ensure_prepared(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.ensure_prepared()
    }

    fn present(&mut self) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.present()
    }

    fn draw_pixel(
        &mut self,
        point: BackendCoord,
        color: BackendColor,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_pixel(point, color)
    }

    fn draw_line<S: BackendStyle>(
        &mut self,
        from: BackendCoord,
        to: BackendCoord,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_line(from, to, style)
    }

    fn draw_rect<S: BackendStyle>(
        &mut self,
        upper_left: BackendCoord,
        bottom_right: BackendCoord,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_rect(upper_left, bottom_right, style, fill)
    }

    fn draw_path<S: BackendStyle, I: IntoIterator<Item = BackendCoord>>(
        &mut self,
        path: I,
        style: &S,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_path(path, style)
    }

    fn draw_circle<S: BackendStyle>(
        &mut self,
        center: BackendCoord,
        radius: u32,
        style: &S,
        fill: bool,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.draw_circle(center, radius, style, fill)
    }

    fn blit_bitmap(
        &mut self,
        pos: BackendCoord,
        (iw, ih): (u32, u32),
        src: &[u8],
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        self.inner.blit_bitmap(pos, (iw, ih), src)
    }

    fn draw_text<TStyle: BackendTextStyle>(
        &mut self,
        text: &str,
        style: &TStyle,
        pos: BackendCoord,
    ) -> Result<(), DrawingErrorKind<Self::ErrorType>> {
        match panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.draw_text(text, style, pos)
        })) {
            Ok(Ok(())) => Ok(()),
            Ok(Err(DrawingErrorKind::FontError(err))) => {
                debug!("Skipping text '{}': {}", text, err);
                Ok(())
            }
            Ok(Err(err)) => Err(err),
            Err(_) => {
                debug!("Skipping text '{}': font rendering panicked", text);
                Ok(())
            }
        }
    }

    fn estimate_text_size<TStyle: BackendTextStyle>(
        &self,
        text: &str,
        style: &TStyle,
    ) -> Result<(u32, u32), DrawingErrorKind<Self::ErrorType>> {
        match panic::catch_unwind(panic::AssertUnwindSafe(|| {
            self.inner.estimate_text_size(text, style)
        })) {
            Ok(Ok(size)) => Ok(size),
            _ => Ok(approximate_text_size(text, style.size())),
        }
    }
}

/// Bounding box of `text` at `font_size` assuming a fixed character width
fn approximate_text_size(text: &str, font_size: f64) -> (u32, u32) {
    let width = text.chars().count() as f64 * font_size * CHAR_WIDTH_RATIO;
    (width.ceil() as u32, font_size.ceil() as u32)
}
