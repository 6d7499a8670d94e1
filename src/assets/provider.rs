use anyhow::Context;

use crate::{
    foundation::error::StarlitResult,
    render::surface::Surface,
    timeline::model::Asset,
};

/// Result of asking a provider for a drawable frame.
///
/// `NotReady` is not an error: a still-decoding image or an in-flight
/// video seek renders nothing this pass and is silently retried on the
/// next one.
#[derive(Clone, Debug)]
pub enum SourceFrame {
    /// Decoded pixels for the requested source time.
    Ready(Surface),
    /// Source exists but has no pixels yet.
    NotReady,
}

/// Boundary to the host's media pipeline: given an asset reference and a
/// source time, yield a drawable raster (premultiplied RGBA8) or signal
/// that decoding is still in flight.
///
/// Procedural card assets (solid/gradient/stripe) never reach the
/// provider; the compositor synthesizes those itself.
pub trait AssetProvider {
    /// Fetch the drawable frame for `asset` at `source_time` seconds.
    fn frame(&self, asset: &Asset, source_time: f64) -> SourceFrame;
}

/// Provider with no sources at all; every file-backed asset is reported
/// not ready. Useful for tests and for timelines of procedural cards.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullProvider;

impl AssetProvider for NullProvider {
    fn frame(&self, _asset: &Asset, _source_time: f64) -> SourceFrame {
        SourceFrame::NotReady
    }
}

/// Decode encoded image bytes into a premultiplied RGBA8 surface.
pub fn decode_image(bytes: &[u8]) -> StarlitResult<Surface> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);
    Surface::from_pixels(width, height, rgba8_premul)
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((u16::from(px[0]) * a + 127) / 255) as u8;
        px[1] = ((u16::from(px[1]) * a + 127) / 255) as u8;
        px[2] = ((u16::from(px[2]) * a + 127) / 255) as u8;
    }
}
