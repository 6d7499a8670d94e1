use crate::{
    foundation::core::{Canvas, Rgba8Premul},
    render::surface::Surface,
};

/// Uniform color card at canvas size, straight RGBA in.
pub fn solid_card(canvas: Canvas, color: [u8; 4]) -> Surface {
    let mut surface = Surface::new(canvas.width, canvas.height);
    surface.fill(premul(color));
    surface
}

/// Vertical two-stop gradient card at canvas size.
pub fn gradient_card(canvas: Canvas, top: [u8; 4], bottom: [u8; 4]) -> Surface {
    let mut surface = Surface::new(canvas.width, canvas.height);
    let h = canvas.height.max(1);
    for y in 0..canvas.height {
        let t = if h > 1 {
            f64::from(y) / f64::from(h - 1)
        } else {
            0.0
        };
        let mut straight = [0u8; 4];
        for c in 0..4 {
            straight[c] =
                (f64::from(top[c]) + (f64::from(bottom[c]) - f64::from(top[c])) * t).round() as u8;
        }
        let px = premul(straight);
        for x in 0..canvas.width {
            surface.put_pixel(i64::from(x), i64::from(y), px);
        }
    }
    surface
}

/// Alternating vertical stripes card at canvas size.
pub fn stripe_card(canvas: Canvas, a: [u8; 4], b: [u8; 4], stripe_width: u32) -> Surface {
    let mut surface = Surface::new(canvas.width, canvas.height);
    let stripe = stripe_width.max(1);
    let pa = premul(a);
    let pb = premul(b);
    for x in 0..canvas.width {
        let px = if (x / stripe) % 2 == 0 { pa } else { pb };
        for y in 0..canvas.height {
            surface.put_pixel(i64::from(x), i64::from(y), px);
        }
    }
    surface
}

fn premul(straight: [u8; 4]) -> [u8; 4] {
    Rgba8Premul::from_straight_rgba(straight[0], straight[1], straight[2], straight[3]).to_array()
}
