//! Background synthesis for a [`Surface`].
//!
//! All interpolation is done with integer error accumulation, one
//! channel at a time, so a surface always renders to exactly the same
//! pixels. The first pixel of every ramp is its start color and the
//! last is its end color.

use super::appearance::{Bevel, Gradient, Relief, Surface};
use super::color::{darken_channel, lighten_channel, Color};
use super::{pack, pack_rgb, unpack, Rgb};

/// Steps one color towards another over a fixed number of pixels.
#[derive(Debug, Clone, Copy)]
struct Stepper {
    color: [i32; 3],
    delta: [i32; 3],
    inc: [i32; 3],
    error: [i32; 3],
    len: i32,
}

impl Stepper {
    /// A ramp of `n` pixels from `from` to `to`.
    fn new(from: Rgb, to: Rgb, n: usize) -> Self {
        let from = [from.0 as i32, from.1 as i32, from.2 as i32];
        let to = [to.0 as i32, to.1 as i32, to.2 as i32];
        let mut delta = [0; 3];
        let mut inc = [1; 3];
        for i in 0..3 {
            let d = to[i] - from[i];
            delta[i] = d.abs();
            if d < 0 {
                inc[i] = -1;
            }
        }
        Self {
            color: from,
            delta,
            inc,
            error: [0; 3],
            len: (n as i32 - 1).max(1),
        }
    }

    fn rgb(&self) -> Rgb {
        (self.color[0] as u8, self.color[1] as u8, self.color[2] as u8)
    }

    fn pixel(&self) -> u32 {
        pack_rgb(self.rgb())
    }

    fn next(&mut self) {
        for i in 0..3 {
            if self.delta[i] == 0 {
                continue;
            }
            self.error[i] += self.delta[i];
            while self.error[i] * 2 >= self.len {
                self.color[i] += self.inc[i];
                self.error[i] -= self.len;
            }
        }
    }
}

fn rgb_of(color: &Option<Color>) -> Rgb {
    color.as_ref().map(Color::rgb).unwrap_or((0, 0, 0))
}

fn midpoint(a: Rgb, b: Rgb) -> Rgb {
    (
        ((a.0 as u16 + b.0 as u16) / 2) as u8,
        ((a.1 as u16 + b.1 as u16) / 2) as u8,
        ((a.2 as u16 + b.2 as u16) / 2) as u8,
    )
}

/// `c + c >> shift` on every channel, saturating.
pub(crate) fn split_lighten(rgb: Rgb, shift: u32) -> Rgb {
    let f = |c: u8| (c as u32 + (c as u32 >> shift)).min(0xff) as u8;
    (f(rgb.0), f(rgb.1), f(rgb.2))
}

fn light_channel(c: u8, adjust: Option<u16>) -> u8 {
    match adjust {
        None => lighten_channel(c),
        Some(a) => (c as u32 + ((c as u32 * a as u32) >> 8)).min(0xff) as u8,
    }
}

fn dark_channel(c: u8, adjust: Option<u16>) -> u8 {
    match adjust {
        None => darken_channel(c),
        Some(a) => (c as u32).saturating_sub((c as u32 * a.min(256) as u32) >> 8) as u8,
    }
}

/// The bevel highlight of `rgb` under the surface's adjustment.
pub(crate) fn bevel_light(surface: &Surface, rgb: Rgb) -> Rgb {
    let a = surface.bevel_light_adjust;
    (light_channel(rgb.0, a), light_channel(rgb.1, a), light_channel(rgb.2, a))
}

/// The bevel shadow of `rgb` under the surface's adjustment.
pub(crate) fn bevel_dark(surface: &Surface, rgb: Rgb) -> Rgb {
    let a = surface.bevel_dark_adjust;
    (dark_channel(rgb.0, a), dark_channel(rgb.1, a), dark_channel(rgb.2, a))
}

/// Renders `surface` into a new `width`x`height` buffer of canonical pixels.
///
/// A parent-relative surface has no fill of its own and comes back
/// fully transparent; its pixels are taken from the parent by the
/// [`Appearance`](super::Appearance).
pub fn render(surface: &Surface, width: usize, height: usize) -> Vec<u32> {
    let mut data = vec![0u32; width * height];
    if width == 0 || height == 0 {
        return data;
    }

    let w = width;
    let h = height;
    let primary = rgb_of(&surface.primary);
    let secondary = rgb_of(&surface.secondary);

    match surface.grad {
        Gradient::ParentRelative => return data,
        Gradient::Solid => {
            solid(surface, &mut data, w, h);
            return data;
        }
        Gradient::Horizontal => horizontal(&mut data, w, h, primary, secondary),
        Gradient::Vertical => vertical(&mut data, w, h, primary, secondary),
        Gradient::Diagonal => {
            let mid = midpoint(primary, secondary);
            diagonal(&mut data, w, h, (primary, mid), (mid, secondary))
        }
        Gradient::CrossDiagonal => {
            let mid = midpoint(primary, secondary);
            diagonal(&mut data, w, h, (mid, secondary), (primary, mid))
        }
        Gradient::MirrorHorizontal => mirror_horizontal(&mut data, w, h, primary, secondary),
        Gradient::Pyramid => pyramid(&mut data, w, h, primary, secondary),
        Gradient::SplitVertical => {
            let split_primary = surface
                .split_primary
                .as_ref()
                .map(Color::rgb)
                .unwrap_or_else(|| split_lighten(primary, 2));
            let split_secondary = surface
                .split_secondary
                .as_ref()
                .map(Color::rgb)
                .unwrap_or_else(|| split_lighten(secondary, 4));
            split_vertical(
                &mut data,
                w,
                h,
                [split_primary, primary, secondary, split_secondary],
            )
        }
    }

    if surface.interlaced {
        interlace(&mut data, w, h, rgb_of(&surface.interlace_color));
    }

    if surface.relief == Relief::Flat {
        if surface.border {
            outline(&mut data, w, h, pack_rgb(rgb_of(&surface.border_color)));
        }
    } else {
        let raised = surface.relief == Relief::Raised;
        match surface.bevel {
            Bevel::One => {
                for x in 1..w.saturating_sub(1) {
                    highlight(surface, &mut data, x, (h - 1) * w + x, raised);
                }
                for y in 0..h {
                    highlight(surface, &mut data, y * w, y * w + w - 1, raised);
                }
            }
            Bevel::Two if w >= 3 && h >= 3 => {
                for x in 2..w.saturating_sub(2) {
                    highlight(surface, &mut data, w + x, (h - 2) * w + x, raised);
                }
                for y in 1..h - 1 {
                    highlight(surface, &mut data, y * w + 1, y * w + w - 2, raised);
                }
            }
            Bevel::Two => {}
        }
    }
    data
}

/// Lightens the top/left pixel of a pair and darkens the other,
/// or the reverse when sunken.
fn highlight(surface: &Surface, data: &mut [u32], first: usize, second: usize, raised: bool) {
    let (up, down) = if raised { (first, second) } else { (second, first) };

    let (r, g, b, a) = unpack(data[up]);
    let (r, g, b) = bevel_light(surface, (r, g, b));
    data[up] = pack(r, g, b, a);

    let (r, g, b, a) = unpack(data[down]);
    let (r, g, b) = bevel_dark(surface, (r, g, b));
    data[down] = pack(r, g, b, a);
}

fn copy_first_row(data: &mut [u32], w: usize) {
    let (first, rest) = data.split_at_mut(w);
    for row in rest.chunks_mut(w) {
        row.copy_from_slice(first);
    }
}

fn hline(data: &mut [u32], w: usize, h: usize, y: usize, x0: usize, x1: usize, px: u32) {
    if y >= h {
        return;
    }
    for x in x0..=x1.min(w - 1) {
        data[y * w + x] = px;
    }
}

fn vline(data: &mut [u32], w: usize, h: usize, x: usize, y0: usize, y1: usize, px: u32) {
    if x >= w {
        return;
    }
    for y in y0..=y1.min(h - 1) {
        data[y * w + x] = px;
    }
}

fn outline(data: &mut [u32], w: usize, h: usize, px: u32) {
    hline(data, w, h, 0, 0, w - 1, px);
    hline(data, w, h, h - 1, 0, w - 1, px);
    vline(data, w, h, 0, 0, h - 1, px);
    vline(data, w, h, w - 1, 0, h - 1, px);
}

fn interlace(data: &mut [u32], w: usize, h: usize, color: Rgb) {
    let px = pack_rgb(color);
    for y in (0..h).step_by(2) {
        hline(data, w, h, y, 0, w - 1, px);
    }
}

fn solid(surface: &Surface, data: &mut [u32], w: usize, h: usize) {
    let primary = rgb_of(&surface.primary);
    data.fill(pack_rgb(primary));

    if surface.interlaced {
        interlace(data, w, h, rgb_of(&surface.interlace_color));
    }

    let (left, top, right, bottom) = (0, 0, w - 1, h - 1);
    match surface.relief {
        Relief::Flat => {
            if surface.border {
                outline(data, w, h, pack_rgb(rgb_of(&surface.border_color)));
            }
        }
        relief => {
            let light = surface
                .bevel_light
                .as_ref()
                .map(Color::rgb)
                .unwrap_or_else(|| bevel_light(surface, primary));
            let dark = surface
                .bevel_dark
                .as_ref()
                .map(Color::rgb)
                .unwrap_or_else(|| bevel_dark(surface, primary));
            let (light, dark) = if relief == Relief::Raised {
                (pack_rgb(light), pack_rgb(dark))
            } else {
                (pack_rgb(dark), pack_rgb(light))
            };

            match surface.bevel {
                Bevel::One => {
                    hline(data, w, h, bottom, left, right, dark);
                    vline(data, w, h, right, top, bottom, dark);
                    hline(data, w, h, top, left, right, light);
                    vline(data, w, h, left, top, bottom, light);
                }
                Bevel::Two if w >= 3 && h >= 3 => {
                    hline(data, w, h, bottom - 1, left + 2, right.saturating_sub(2), dark);
                    vline(data, w, h, right - 1, top + 1, bottom - 1, dark);
                    hline(data, w, h, top + 1, left + 2, right.saturating_sub(2), light);
                    vline(data, w, h, left + 1, top + 1, bottom - 1, light);
                }
                Bevel::Two => {}
            }
        }
    }
}

fn horizontal(data: &mut [u32], w: usize, _h: usize, from: Rgb, to: Rgb) {
    let mut s = Stepper::new(from, to, w);
    for px in data[..w].iter_mut() {
        *px = s.pixel();
        s.next();
    }
    copy_first_row(data, w);
}

fn vertical(data: &mut [u32], w: usize, _h: usize, from: Rgb, to: Rgb) {
    let mut s = Stepper::new(from, to, data.len() / w);
    for row in data.chunks_mut(w) {
        row.fill(s.pixel());
        s.next();
    }
}

/// Interpolates the left edge along `left`, the right edge along
/// `right`, and every row between the two.
fn diagonal(data: &mut [u32], w: usize, h: usize, left: (Rgb, Rgb), right: (Rgb, Rgb)) {
    let mut l = Stepper::new(left.0, left.1, h);
    let mut r = Stepper::new(right.0, right.1, h);
    for row in data.chunks_mut(w) {
        let mut x = Stepper::new(l.rgb(), r.rgb(), w);
        for px in row.iter_mut() {
            *px = x.pixel();
            x.next();
        }
        l.next();
        r.next();
    }
}

fn mirror_horizontal(data: &mut [u32], w: usize, _h: usize, from: Rgb, to: Rgb) {
    let half1 = (w + 1) / 2;
    let half2 = w / 2;

    let mut s = Stepper::new(from, to, half1);
    for px in data[..half1].iter_mut() {
        *px = s.pixel();
        s.next();
    }
    let mut s = Stepper::new(to, from, half2);
    for px in data[half1..w].iter_mut() {
        *px = s.pixel();
        s.next();
    }
    copy_first_row(data, w);
}

fn pyramid(data: &mut [u32], w: usize, h: usize, from: Rgb, to: Rgb) {
    let mid = midpoint(from, to);
    let half_w = (w + 1) / 2;
    let half_h = (h + 1) / 2;

    let mut l = Stepper::new(from, mid, half_h);
    let mut r = Stepper::new(mid, to, half_h);
    for y in 0..half_h {
        let mut s = Stepper::new(l.rgb(), r.rgb(), half_w);
        for x in 0..half_w {
            let px = s.pixel();
            data[y * w + x] = px;
            data[y * w + w - 1 - x] = px;
            s.next();
        }
        l.next();
        r.next();
    }

    // the bottom half mirrors the top
    for y in half_h..h {
        let src = (h - 1 - y) * w;
        data.copy_within(src..src + w, y * w);
    }
}

/// Three vertical ramps: `colors[0]` to `colors[1]` over the top,
/// a short step from `colors[1]` to `colors[2]`, then `colors[2]`
/// to `colors[3]` over the bottom.
fn split_vertical(data: &mut [u32], w: usize, h: usize, colors: [Rgb; 4]) {
    let (top, middle, bottom) = if h <= 5 {
        (h / 2, if h < 3 { 0 } else { h & 1 }, (h / 2).max(1))
    } else {
        (h / 2 - (1 - (h & 1)), 1, h / 2)
    };

    let mut rows = data.chunks_mut(w);

    let mut s = Stepper::new(colors[0], colors[1], top);
    for row in rows.by_ref().take(top) {
        row.fill(s.pixel());
        s.next();
    }

    if middle > 0 {
        let mut s = Stepper::new(colors[1], colors[2], middle + 2);
        // the first step is the last color of the top ramp
        s.next();
        for row in rows.by_ref().take(middle) {
            row.fill(s.pixel());
            s.next();
        }
    }

    let mut s = Stepper::new(colors[2], colors[3], bottom);
    for row in rows.take(bottom) {
        row.fill(s.pixel());
        s.next();
    }
}
