//! QR representation of wallet addresses: render an address as a QR image,
//! and decode camera frames back to the address within a scan session that
//! accepts exactly one hit.
//!
//! The payload is the raw address string with no envelope.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::path::Path;

use futures_util::{stream, Stream, StreamExt};
use qrcode::{render::unicode, types::QrError, Color, EcLevel, QrCode};
use tracing::debug;

/// Light modules around the symbol, as required for reliable detection.
pub const QUIET_ZONE: usize = 4;
/// Pixels per module edge in encoded images.
pub const MODULE_SIZE: usize = 4;

const DARK: u8 = 0;
const LIGHT: u8 = 255;

/// Errors produced while encoding an address.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// Nothing to encode
    #[error("address is empty")]
    Empty,
    /// The payload does not fit in a QR symbol
    #[error("cannot encode address: {0}")]
    Encode(#[from] QrError),
    /// An image file could not be opened or decoded
    #[error("cannot read image: {0}")]
    Image(#[from] image::ImageError),
}

/// An 8-bit greyscale image, row major. Used both for encoded addresses and
/// for frames handed to the decoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LumaImage {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl LumaImage {
    /// Wrap a raw frame. Returns `None` if `pixels` does not hold exactly
    /// `width * height` bytes.
    pub fn new(width: usize, height: usize, pixels: Vec<u8>) -> Option<Self> {
        (width * height == pixels.len()).then_some(Self {
            width,
            height,
            pixels,
        })
    }

    /// Load a PNG or JPEG file, converting it to greyscale.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CodecError> {
        let luma = image::ImageReader::open(path)
            .map_err(image::ImageError::IoError)?
            .with_guessed_format()
            .map_err(image::ImageError::IoError)?
            .decode()?
            .into_luma8();
        let (width, height) = (luma.width() as usize, luma.height() as usize);
        Ok(Self {
            width,
            height,
            pixels: luma.into_raw(),
        })
    }

    /// An all-light frame.
    pub fn blank(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![LIGHT; width * height],
        }
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Luma at `(x, y)`.
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.pixels[y * self.width + x]
    }

    /// Raw pixel data.
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }
}

fn symbol(address: &str) -> Result<QrCode, CodecError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(CodecError::Empty);
    }
    Ok(QrCode::with_error_correction_level(
        address.as_bytes(),
        EcLevel::M,
    )?)
}

/// Render `address` as a greyscale QR image. Deterministic: the same address
/// always yields the same image.
pub fn encode(address: &str) -> Result<LumaImage, CodecError> {
    let code = symbol(address)?;
    let modules = code.width();
    let colors = code.to_colors();
    let side = (modules + 2 * QUIET_ZONE) * MODULE_SIZE;

    let mut pixels = vec![LIGHT; side * side];
    for (index, color) in colors.iter().enumerate() {
        if *color != Color::Dark {
            continue;
        }
        let (mx, my) = (index % modules + QUIET_ZONE, index / modules + QUIET_ZONE);
        for y in my * MODULE_SIZE..(my + 1) * MODULE_SIZE {
            let row = y * side;
            pixels[row + mx * MODULE_SIZE..row + (mx + 1) * MODULE_SIZE].fill(DARK);
        }
    }

    Ok(LumaImage {
        width: side,
        height: side,
        pixels,
    })
}

/// Render `address` as text for a terminal, two modules per character cell.
pub fn render_terminal(address: &str) -> Result<String, CodecError> {
    let code = symbol(address)?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

/// Decode the first QR symbol found in `frame`. Frames without a readable
/// symbol, or whose payload is blank, yield `None`.
pub fn decode_frame(frame: &LumaImage) -> Option<String> {
    let mut prepared = rqrr::PreparedImage::prepare_from_greyscale(
        frame.width,
        frame.height,
        |x, y| frame.pixel(x, y),
    );
    prepared.detect_grids().into_iter().find_map(|grid| match grid.decode() {
        Ok((_, text)) => {
            let text = text.trim().to_owned();
            (!text.is_empty()).then_some(text)
        }
        Err(err) => {
            debug!(error = ?err, "Unreadable QR grid");
            None
        }
    })
}

/// One user-started scan. The first frame that decodes ends the session;
/// later frames are ignored until the session is started again.
#[derive(Debug, Default)]
pub struct ScanSession {
    active: bool,
}

impl ScanSession {
    /// A stopped session.
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin accepting frames.
    pub fn start(&mut self) {
        self.active = true;
    }

    /// Stop accepting frames.
    pub fn stop(&mut self) {
        self.active = false;
    }

    /// True while frames are accepted.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Try to decode `frame`. The first hit is returned and stops the
    /// session.
    pub fn offer(&mut self, frame: &LumaImage) -> Option<String> {
        if !self.active {
            return None;
        }
        let hit = decode_frame(frame)?;
        self.active = false;
        Some(hit)
    }

    /// Start a session and consume `frames` until one decodes or the stream
    /// ends.
    pub async fn scan<S>(&mut self, frames: S) -> Option<String>
    where
        S: Stream<Item = LumaImage>,
    {
        self.start();
        let mut frames = std::pin::pin!(frames);
        while let Some(frame) = frames.next().await {
            if let Some(hit) = self.offer(&frame) {
                return Some(hit);
            }
        }
        self.stop();
        None
    }
}

/// Scan a still picture of a QR code, such as a screenshot, as a
/// single-frame session. `Ok(None)` means the picture holds no readable
/// symbol.
pub async fn scan_image(path: impl AsRef<Path>) -> Result<Option<String>, CodecError> {
    let frame = LumaImage::open(path)?;
    Ok(ScanSession::new().scan(stream::iter([frame])).await)
}
