/// Tightly packed RGBA8 pixels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RgbaFrame {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) pixels: Vec<u8>,
}

impl RgbaFrame {
    pub(crate) fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, String> {
        let expected = (width as usize) * (height as usize) * 4;
        if pixels.len() != expected {
            return Err(format!(
                "RGBA buffer has {} bytes, expected {expected} for {width}x{height}",
                pixels.len()
            ));
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let at = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[at],
            self.pixels[at + 1],
            self.pixels[at + 2],
            self.pixels[at + 3],
        ]
    }
}

/// Source-over blend of `top` on an opaque `bottom`.
fn blend_over(top: [u8; 4], bottom: [u8; 4]) -> [u8; 4] {
    let alpha = top[3] as u32;
    let mix = |t: u8, b: u8| ((t as u32 * alpha + b as u32 * (255 - alpha) + 127) / 255) as u8;
    [
        mix(top[0], bottom[0]),
        mix(top[1], bottom[1]),
        mix(top[2], bottom[2]),
        255,
    ]
}

/// Center and radius of the unread marker drawn in the top-right corner.
fn marker_geometry(width: u32, height: u32) -> (f32, f32, f32) {
    let radius = (width.min(height) as f32 / 5.0).max(1.0);
    (width as f32 - radius - 1.0, radius + 1.0, radius)
}

/// Draws the base icon over a solid accent background and stamps an unread
/// marker in the corner.
pub(crate) fn compose_badge(base: &RgbaFrame, accent: [u8; 4], marker: [u8; 4]) -> RgbaFrame {
    let (cx, cy, radius) = marker_geometry(base.width, base.height);
    let mut pixels = Vec::with_capacity(base.pixels.len());

    for y in 0..base.height {
        for x in 0..base.width {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            let out = if dx * dx + dy * dy <= radius * radius {
                marker
            } else {
                blend_over(base.pixel(x, y), accent)
            };
            pixels.extend_from_slice(&out);
        }
    }

    RgbaFrame {
        width: base.width,
        height: base.height,
        pixels,
    }
}

/// Caches the composed badge so refreshing with an unchanged counter does
/// no pixel work.
pub(crate) struct BadgeCompositor {
    base: RgbaFrame,
    accent: [u8; 4],
    marker: [u8; 4],
    cached: Option<(u64, RgbaFrame)>,
}

impl BadgeCompositor {
    pub(crate) fn new(base: RgbaFrame, accent: [u8; 4], marker: [u8; 4]) -> Self {
        Self {
            base,
            accent,
            marker,
            cached: None,
        }
    }

    pub(crate) fn base(&self) -> &RgbaFrame {
        &self.base
    }

    pub(crate) fn render(&mut self, unread: u64) -> &RgbaFrame {
        let stale = !matches!(&self.cached, Some((count, _)) if *count == unread);
        if stale {
            let frame = compose_badge(&self.base, self.accent, self.marker);
            self.cached = Some((unread, frame));
        }
        match &self.cached {
            Some((_, frame)) => frame,
            None => &self.base,
        }
    }

    pub(crate) fn clear(&mut self) {
        self.cached = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCENT: [u8; 4] = [0xc0, 0x63, 0x25, 0xff];
    const MARKER: [u8; 4] = [0xe0, 0x1b, 0x24, 0xff];

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RgbaFrame {
        let pixels = rgba.repeat((width * height) as usize);
        RgbaFrame::new(width, height, pixels).unwrap()
    }

    #[test]
    fn rejects_mismatched_buffer() {
        assert!(RgbaFrame::new(2, 2, vec![0; 15]).is_err());
    }

    #[test]
    fn transparent_base_shows_accent_and_opaque_base_wins() {
        let clear = compose_badge(&solid(20, 20, [0, 0, 0, 0]), ACCENT, MARKER);
        assert_eq!(clear.pixel(0, 19), ACCENT);

        let opaque = compose_badge(&solid(20, 20, [10, 20, 30, 255]), ACCENT, MARKER);
        assert_eq!(opaque.pixel(0, 19), [10, 20, 30, 255]);
    }

    #[test]
    fn marker_sits_in_top_right_corner() {
        let frame = compose_badge(&solid(20, 20, [0, 0, 0, 0]), ACCENT, MARKER);
        let (cx, cy, _) = marker_geometry(20, 20);
        assert_eq!(frame.pixel(cx as u32, cy as u32), MARKER);
        assert_eq!(frame.pixel(0, 0), ACCENT);
    }

    #[test]
    fn half_transparent_pixels_blend() {
        let blended = blend_over([255, 255, 255, 128], [0, 0, 0, 255]);
        assert_eq!(blended, [128, 128, 128, 255]);
    }

    #[test]
    fn render_is_stable_for_same_counter() {
        let mut compositor = BadgeCompositor::new(solid(8, 8, [0, 0, 0, 0]), ACCENT, MARKER);
        let first = compositor.render(3).clone();
        assert_eq!(compositor.render(3), &first);
        assert_eq!(compositor.render(4), &first);
        compositor.clear();
        assert_eq!(compositor.base().width, 8);
    }
}
