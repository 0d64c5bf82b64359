//! RGBA images: compositing, resampling and the image cache.
//!
//! An [`Image`] is one logical picture (a window icon, say) that may
//! be available at several original resolutions. When it is drawn at
//! a size it does not have, the closest original is resampled and the
//! result kept in a small most-recently-used list on the image.
//!
//! Every picture is also registered in the shared [`ImageCache`] table
//! under a hash of its content, so an identical picture handed in again
//! can be mapped back to the image that already holds it.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::{Rc, Weak};

use custom_debug_derive::Debug as CustomDebug;
use tracing::debug;

use super::{pack, unpack, Rect};
use crate::{RenderError, Result};

/// Fixed point precision used while resampling.
const FRACTION: u32 = 12;
const ONE: u64 = 1 << FRACTION;

#[inline]
fn floor(v: u64) -> u64 {
    v & !(ONE - 1)
}

/// One picture: a buffer of canonical pixels at a fixed size.
#[derive(CustomDebug, Clone, PartialEq, Eq)]
pub struct ImagePic {
    /// Width in pixels.
    pub width: usize,
    /// Height in pixels.
    pub height: usize,
    /// Canonical pixels, row-major.
    #[debug(skip)]
    pub data: Vec<u32>,
    hash: u32,
}

impl ImagePic {
    /// Creates a picture, checking the buffer matches its dimensions.
    pub fn new(data: Vec<u32>, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(RenderError::InvalidImage(format!(
                "{} pixels for a {}x{} picture",
                data.len(),
                width,
                height
            )));
        }
        let hash = hash_pixels(&data);
        Ok(Self {
            width,
            height,
            data,
            hash,
        })
    }

    /// The content hash of the picture.
    pub fn hash(&self) -> u32 {
        self.hash
    }

    /// Whether `data` at `width`x`height` is exactly this picture.
    pub fn same_content(&self, data: &[u32], width: usize, height: usize) -> bool {
        self.width == width && self.height == height && self.data == data
    }
}

/// A streaming 32-bit mix over the pixel words.
///
/// Every step is invertible, so distinct inputs of the same length
/// spread evenly over the output space.
pub fn hash_pixels(data: &[u32]) -> u32 {
    let mut hash: u32 = 0;
    for &word in data {
        hash = hash.wrapping_add(word);
        hash = hash.wrapping_add(hash << 10);
        hash ^= hash >> 6;
    }
    hash = hash.wrapping_add(hash << 3);
    hash ^= hash >> 11;
    hash.wrapping_add(hash << 15)
}

/// Resamples `src` to fit inside `dst_w`x`dst_h`, keeping its aspect ratio.
///
/// Each destination pixel is the area-weighted average of the source
/// pixels it covers. Returns `None` if the fitted size is the source
/// size, since there is nothing to do.
pub fn resize_image(
    src: &[u32],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    dst_h: usize,
) -> Option<ImagePic> {
    if src_w == 0 || src_h == 0 || src.len() < src_w * src_h {
        return None;
    }
    let (dst_w, dst_h) = fit_aspect(src_w, src_h, dst_w.max(1), dst_h.max(1));
    if dst_w == src_w && dst_h == src_h {
        return None;
    }

    let ratio_x = ((src_w as u64) << FRACTION) / dst_w as u64;
    let ratio_y = ((src_h as u64) << FRACTION) / dst_h as u64;
    let mut out = Vec::with_capacity(dst_w * dst_h);

    let mut src_y2 = 0u64;
    for _ in 0..dst_h {
        let src_y1 = src_y2;
        src_y2 += ratio_y;

        let mut src_x2 = 0u64;
        for _ in 0..dst_w {
            let src_x1 = src_x2;
            src_x2 += ratio_x;

            let (mut red, mut green, mut blue, mut alpha) = (0u64, 0u64, 0u64, 0u64);
            let mut sum = 0u64;

            let mut sy = src_y1;
            while sy < src_y2 {
                let portion_y;
                if sy == src_y1 {
                    sy = floor(sy);
                    portion_y = (ONE - (src_y1 - sy)).min(src_y2 - src_y1);
                } else if sy == floor(src_y2) {
                    portion_y = src_y2 - sy;
                } else {
                    portion_y = ONE;
                }

                let mut sx = src_x1;
                while sx < src_x2 {
                    let portion_x;
                    if sx == src_x1 {
                        sx = floor(sx);
                        portion_x = (ONE - (src_x1 - sx)).min(src_x2 - src_x1);
                    } else if sx == floor(src_x2) {
                        portion_x = src_x2 - sx;
                    } else {
                        portion_x = ONE;
                    }

                    let portion = (portion_x * portion_y) >> FRACTION;
                    sum += portion;

                    let row = ((sy >> FRACTION) as usize).min(src_h - 1);
                    let col = ((sx >> FRACTION) as usize).min(src_w - 1);
                    let (r, g, b, a) = unpack(src[row * src_w + col]);
                    red += r as u64 * portion;
                    green += g as u64 * portion;
                    blue += b as u64 * portion;
                    alpha += a as u64 * portion;

                    sx += ONE;
                }
                sy += ONE;
            }

            if sum == 0 {
                // extreme upscale, every portion rounded away
                let row = ((src_y1 >> FRACTION) as usize).min(src_h - 1);
                let col = ((src_x1 >> FRACTION) as usize).min(src_w - 1);
                out.push(src[row * src_w + col]);
            } else {
                out.push(pack(
                    (red / sum) as u8,
                    (green / sum) as u8,
                    (blue / sum) as u8,
                    (alpha / sum) as u8,
                ));
            }
        }
    }

    let hash = hash_pixels(&out);
    Some(ImagePic {
        width: dst_w,
        height: dst_h,
        data: out,
        hash,
    })
}

/// Shrinks or grows `w`x`h` to the largest size with the same aspect
/// ratio that fits in `box_w`x`box_h`. Never returns a zero dimension.
fn fit_aspect(w: usize, h: usize, box_w: usize, box_h: usize) -> (usize, usize) {
    let mut dw = box_w;
    let mut dh = dw * h / w;
    if dh > box_h {
        dh = box_h;
        dw = dh * w / h;
    }
    (dw.max(1), dh.max(1))
}

/// Composites `src` into `target`, centred in `area` with its aspect
/// ratio kept.
///
/// Each channel is blended as `bg + (fg - bg) * a / 255`, where `a` is
/// the source alpha scaled by `alpha`. Pixels outside the target are
/// clipped. The destination's own alpha is left untouched.
#[allow(clippy::too_many_arguments)]
pub fn draw_rgba(
    target: &mut [u32],
    target_w: usize,
    target_h: usize,
    src: &[u32],
    src_w: usize,
    src_h: usize,
    alpha: u8,
    area: Rect,
) -> Result<()> {
    if src_w == 0 || src_h == 0 || area.is_empty() || alpha == 0 {
        return Ok(());
    }
    if src.len() < src_w * src_h {
        return Err(RenderError::InvalidImage(format!(
            "{} pixels for a {}x{} image",
            src.len(),
            src_w,
            src_h
        )));
    }

    let (dw, dh) = fit_aspect(src_w, src_h, area.width as usize, area.height as usize);
    let resized;
    let (data, w, h) = match resize_image(src, src_w, src_h, dw, dh) {
        Some(pic) => {
            resized = pic;
            (&resized.data[..], resized.width, resized.height)
        }
        None => (src, src_w, src_h),
    };

    let dx = area.x + (area.width - w as i32) / 2;
    let dy = area.y + (area.height - h as i32) / 2;

    for y in 0..h {
        let ty = dy + y as i32;
        if ty < 0 || ty >= target_h as i32 {
            continue;
        }
        for x in 0..w {
            let tx = dx + x as i32;
            if tx < 0 || tx >= target_w as i32 {
                continue;
            }
            let (fr, fg, fb, fa) = unpack(data[y * w + x]);
            let a = fa as i32 * alpha as i32 / 255;
            if a == 0 {
                continue;
            }

            let dst = &mut target[ty as usize * target_w + tx as usize];
            let (br, bg, bb, ba) = unpack(*dst);
            let blend = |f: u8, b: u8| (b as i32 + (f as i32 - b as i32) * a / 255) as u8;
            *dst = pack(blend(fr, br), blend(fg, bg), blend(fb, bb), ba);
        }
    }
    Ok(())
}

/// A picture registered in the cache, and the image holding it.
struct CacheEntry {
    pic: Rc<ImagePic>,
    owner: Weak<ImageShared>,
}

#[derive(Default)]
struct CacheTable {
    max_resized: usize,
    table: HashMap<u32, Vec<CacheEntry>>,
}

impl CacheTable {
    fn insert(&mut self, pic: &Rc<ImagePic>, owner: Weak<ImageShared>) {
        self.table.entry(pic.hash).or_default().push(CacheEntry {
            pic: pic.clone(),
            owner,
        });
    }

    fn remove(&mut self, pic: &Rc<ImagePic>) {
        if let Some(entries) = self.table.get_mut(&pic.hash) {
            entries.retain(|e| !Rc::ptr_eq(&e.pic, pic));
            if entries.is_empty() {
                self.table.remove(&pic.hash);
            }
        }
    }

    fn len(&self) -> usize {
        self.table.values().map(Vec::len).sum()
    }
}

/// The table of every picture held by a live [`Image`].
///
/// Cloning the cache clones a handle to the same table.
#[derive(Clone)]
pub struct ImageCache(Rc<RefCell<CacheTable>>);

impl fmt::Debug for ImageCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let table = self.0.borrow();
        f.debug_struct("ImageCache")
            .field("max_resized", &table.max_resized)
            .field("pictures", &table.len())
            .finish()
    }
}

impl ImageCache {
    /// Creates an empty cache; each image keeps at most `max_resized`
    /// resampled pictures.
    pub fn new(max_resized: usize) -> Self {
        Self(Rc::new(RefCell::new(CacheTable {
            max_resized: max_resized.max(1),
            table: HashMap::new(),
        })))
    }

    /// Creates a new, empty image attached to this cache.
    pub fn new_image(&self) -> Image {
        Image(Rc::new(ImageShared {
            cache: Rc::downgrade(&self.0),
            set: RefCell::new(PictureSet::default()),
        }))
    }

    /// Finds the live image holding a picture with exactly this content.
    pub fn find(&self, data: &[u32], width: usize, height: usize) -> Option<Image> {
        let hash = hash_pixels(data);
        let table = self.0.borrow();
        table
            .table
            .get(&hash)?
            .iter()
            .filter(|e| e.pic.same_content(data, width, height))
            .find_map(|e| e.owner.upgrade())
            .map(Image)
    }

    /// The total number of pictures registered.
    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    /// Whether no pictures are registered.
    pub fn is_empty(&self) -> bool {
        self.0.borrow().table.is_empty()
    }

    /// The maximum resampled pictures kept per image.
    pub fn max_resized(&self) -> usize {
        self.0.borrow().max_resized
    }
}

#[derive(Default)]
struct PictureSet {
    originals: Vec<Rc<ImagePic>>,
    /// Resampled pictures with the box they were made for, most recent first.
    resized: VecDeque<(Rc<ImagePic>, (usize, usize))>,
}

struct ImageShared {
    cache: Weak<RefCell<CacheTable>>,
    set: RefCell<PictureSet>,
}

impl Drop for ImageShared {
    fn drop(&mut self) {
        let Some(cache) = self.cache.upgrade() else {
            return;
        };
        let mut table = cache.borrow_mut();
        let set = self.set.get_mut();
        for pic in set.originals.iter().chain(set.resized.iter().map(|(p, _)| p)) {
            table.remove(pic);
        }
    }
}

/// A reference-counted logical image.
///
/// Dropping the last handle removes its pictures from the cache.
#[derive(Clone)]
pub struct Image(Rc<ImageShared>);

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let set = self.0.set.borrow();
        f.debug_struct("Image")
            .field(
                "originals",
                &set.originals.iter().map(|p| (p.width, p.height)).collect::<Vec<_>>(),
            )
            .field(
                "resized",
                &set.resized.iter().map(|(p, _)| (p.width, p.height)).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Image {
    /// Whether two handles refer to the same image.
    pub fn ptr_eq(a: &Image, b: &Image) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }

    /// Adds an original resolution of this image.
    ///
    /// An original of the same size already present is kept and the
    /// new one ignored. Resampled pictures of that size are dropped,
    /// since an original now serves it.
    pub fn add_picture(&self, data: &[u32], width: usize, height: usize) -> Result<()> {
        let pic = ImagePic::new(data.to_vec(), width, height)?;
        let mut set = self.0.set.borrow_mut();

        if set
            .originals
            .iter()
            .any(|p| p.width == width && p.height == height)
        {
            debug!("image already has a {}x{} original", width, height);
            return Ok(());
        }

        let cache = self.0.cache.upgrade();
        let mut stale = Vec::new();
        set.resized.retain(|(p, _)| {
            let keep = !(p.width == width && p.height == height);
            if !keep {
                stale.push(p.clone());
            }
            keep
        });

        let pic = Rc::new(pic);
        set.originals.push(pic.clone());

        if let Some(cache) = cache {
            let mut table = cache.borrow_mut();
            for p in &stale {
                table.remove(p);
            }
            table.insert(&pic, Rc::downgrade(&self.0));
        }
        Ok(())
    }

    /// The sizes of the originals held.
    pub fn originals(&self) -> Vec<(usize, usize)> {
        self.0
            .set
            .borrow()
            .originals
            .iter()
            .map(|p| (p.width, p.height))
            .collect()
    }

    /// The sizes of the resampled pictures held, most recent first.
    pub fn resized(&self) -> Vec<(usize, usize)> {
        self.0
            .set
            .borrow()
            .resized
            .iter()
            .map(|(p, _)| (p.width, p.height))
            .collect()
    }

    /// Draws the image into `target`, centred in `area`.
    ///
    /// The picture used is, in order of preference: an original that
    /// fits the area exactly, a resampled picture that does, or the
    /// best original resampled to fit and cached.
    pub fn draw(
        &self,
        target: &mut [u32],
        target_w: usize,
        target_h: usize,
        alpha: u8,
        area: Rect,
    ) -> Result<()> {
        if area.is_empty() {
            return Ok(());
        }
        let pic = self.select(area.width as usize, area.height as usize)?;
        draw_rgba(
            target, target_w, target_h, &pic.data, pic.width, pic.height, alpha, area,
        )
    }

    fn select(&self, aw: usize, ah: usize) -> Result<Rc<ImagePic>> {
        // only the larger side has to match, the other fits inside
        let fits = |p: &ImagePic| {
            (p.width == aw && p.height <= ah) || (p.width <= aw && p.height == ah)
        };

        let mut set = self.0.set.borrow_mut();

        if let Some(pic) = set.originals.iter().find(|p| fits(p)) {
            return Ok(pic.clone());
        }

        if let Some(i) = set
            .resized
            .iter()
            .position(|(p, bx)| *bx == (aw, ah) || fits(p))
        {
            let entry = set
                .resized
                .remove(i)
                .ok_or_else(|| RenderError::Paint("resized picture vanished".into()))?;
            let pic = entry.0.clone();
            set.resized.push_front(entry);
            return Ok(pic);
        }

        let best = set
            .originals
            .iter()
            .min_by_key(|p| {
                let aspect_differs = p.width * ah != p.height * aw;
                let dw = p.width as i64 - aw as i64;
                let dh = p.height as i64 - ah as i64;
                (aspect_differs, dw * dw + dh * dh)
            })
            .cloned()
            .ok_or_else(|| RenderError::InvalidImage("image has no pictures".into()))?;

        let pic = match resize_image(&best.data, best.width, best.height, aw, ah) {
            Some(pic) => Rc::new(pic),
            None => return Ok(best),
        };
        trace!(
            "resized {}x{} to {}x{} for {}x{}",
            best.width,
            best.height,
            pic.width,
            pic.height,
            aw,
            ah
        );

        let cache = self.0.cache.upgrade();
        let max = cache
            .as_ref()
            .map(|c| c.borrow().max_resized)
            .unwrap_or(1);

        set.resized.push_front((pic.clone(), (aw, ah)));
        let evicted = if set.resized.len() > max {
            set.resized.pop_back()
        } else {
            None
        };

        if let Some(cache) = cache {
            let mut table = cache.borrow_mut();
            if let Some((old, _)) = &evicted {
                table.remove(old);
            }
            table.insert(&pic, Rc::downgrade(&self.0));
        }
        Ok(pic)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::pack_rgb;
    use proptest::prelude::*;

    fn solid(w: usize, h: usize, px: u32) -> Vec<u32> {
        vec![px; w * h]
    }

    #[test]
    fn test_resize_identity_is_none() {
        let src = solid(16, 8, pack_rgb((1, 2, 3)));
        assert!(resize_image(&src, 16, 8, 16, 8).is_none());
        // box larger in one direction still fits to the same size
        assert!(resize_image(&src, 16, 8, 16, 20).is_none());
    }

    #[test]
    fn test_resize_averages_area() {
        // 2x1 black/white down to 1x1 gives mid grey
        let src = vec![pack(0, 0, 0, 0xff), pack(0xff, 0xff, 0xff, 0xff)];
        let pic = resize_image(&src, 2, 1, 1, 1).unwrap();
        assert_eq!((pic.width, pic.height), (1, 1));
        let (r, g, b, a) = unpack(pic.data[0]);
        assert_eq!((r, g, b, a), (0x7f, 0x7f, 0x7f, 0xff));
    }

    #[test]
    fn test_resize_upscale_replicates() {
        let src = vec![pack_rgb((10, 20, 30))];
        let pic = resize_image(&src, 1, 1, 4, 4).unwrap();
        assert_eq!(pic.data, solid(4, 4, pack_rgb((10, 20, 30))));
    }

    #[test]
    fn test_resize_fits_limiting_side() {
        let src = solid(40, 20, pack_rgb((1, 2, 3)));
        let pic = resize_image(&src, 40, 20, 30, 30).unwrap();
        assert_eq!((pic.width, pic.height), (30, 15));
        let pic = resize_image(&src, 40, 20, 100, 7).unwrap();
        assert_eq!((pic.width, pic.height), (14, 7));

        let tall = solid(3, 48, pack_rgb((1, 2, 3)));
        let pic = resize_image(&tall, 3, 48, 9, 10).unwrap();
        assert_eq!((pic.width, pic.height), (1, 10));
    }

    #[test]
    fn test_resize_zero_box_clamps() {
        let src = solid(4, 4, pack_rgb((1, 1, 1)));
        let pic = resize_image(&src, 4, 4, 0, 0).unwrap();
        assert_eq!((pic.width, pic.height), (1, 1));
    }

    proptest! {
        #[test]
        fn prop_resize_keeps_aspect(
            sw in 1usize..48, sh in 1usize..48,
            bw in 1usize..64, bh in 1usize..64,
        ) {
            let src = solid(sw, sh, pack_rgb((5, 5, 5)));
            if let Some(pic) = resize_image(&src, sw, sh, bw, bh) {
                let round_div = |a: usize, b: usize| ((a + b / 2) / b) as i64;
                prop_assert!(pic.width <= bw && pic.height <= bh);
                // the box side that limits the fit is used in full, and the
                // other side follows the source aspect within a pixel
                if bw * sh / sw <= bh {
                    prop_assert_eq!(pic.width, bw);
                    let want = round_div(sh * bw, sw);
                    prop_assert!((pic.height as i64 - want).abs() <= 1, "{} vs {}", pic.height, want);
                } else {
                    prop_assert_eq!(pic.height, bh);
                    let want = round_div(sw * bh, sh);
                    prop_assert!((pic.width as i64 - want).abs() <= 1, "{} vs {}", pic.width, want);
                }
                prop_assert_eq!(pic.data.len(), pic.width * pic.height);
            }
        }
    }

    #[test]
    fn test_draw_rgba_alpha_zero_is_noop() {
        let bg = pack_rgb((10, 20, 30));
        let mut target = solid(4, 4, bg);
        let src = solid(4, 4, pack_rgb((200, 100, 50)));
        draw_rgba(&mut target, 4, 4, &src, 4, 4, 0, Rect::new(0, 0, 4, 4)).unwrap();
        assert_eq!(target, solid(4, 4, bg));
    }

    #[test]
    fn test_draw_rgba_opaque_copies() {
        let mut target = solid(4, 4, pack_rgb((10, 20, 30)));
        let src: Vec<u32> = (0..16).map(|i| pack(i as u8 * 10, 0, 0, 0xff)).collect();
        draw_rgba(&mut target, 4, 4, &src, 4, 4, 255, Rect::new(0, 0, 4, 4)).unwrap();
        assert_eq!(target, src);
    }

    #[test]
    fn test_draw_rgba_blends_and_centres() {
        let bg = pack(0, 0, 0, 0xff);
        let mut target = solid(6, 2, bg);
        // 2x2 half transparent white in a 6x2 area: centred at x 2..4
        let src = solid(2, 2, pack(0xff, 0xff, 0xff, 0x80));
        draw_rgba(&mut target, 6, 2, &src, 2, 2, 255, Rect::new(0, 0, 6, 2)).unwrap();

        assert_eq!(target[0], bg);
        assert_eq!(target[1], bg);
        let (r, _, _, a) = unpack(target[2]);
        assert_eq!(r, 0x80);
        assert_eq!(a, 0xff);
        assert_eq!(target[4], bg);
    }

    #[test]
    fn test_draw_rgba_clips_to_target() {
        let mut target = solid(2, 2, 0);
        let src = solid(4, 4, pack_rgb((1, 1, 1)));
        draw_rgba(&mut target, 2, 2, &src, 4, 4, 255, Rect::new(-2, -2, 4, 4)).unwrap();
        assert_eq!(target, solid(2, 2, pack(1, 1, 1, 0)));
    }

    #[test]
    fn test_cache_deduplicates_identical_content() {
        let cache = ImageCache::new(3);
        let image = cache.new_image();
        let a = solid(8, 8, pack_rgb((1, 2, 3)));
        let b = a.clone();

        image.add_picture(&a, 8, 8).unwrap();
        image.add_picture(&b, 8, 8).unwrap();

        assert_eq!(image.originals(), vec![(8, 8)]);
        assert_eq!(cache.len(), 1);

        let found = cache.find(&b, 8, 8).unwrap();
        assert!(Image::ptr_eq(&found, &image));
        assert!(cache.find(&b, 4, 16).is_none());
    }

    #[test]
    fn test_cache_drop_removes_pictures() {
        let cache = ImageCache::new(3);
        let image = cache.new_image();
        image.add_picture(&solid(2, 2, 7), 2, 2).unwrap();
        let other = image.clone();

        drop(image);
        assert_eq!(cache.len(), 1);
        drop(other);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_invalid_picture_rejected() {
        let cache = ImageCache::new(3);
        let image = cache.new_image();
        assert!(image.add_picture(&[0; 3], 2, 2).is_err());
        assert!(image.add_picture(&[], 0, 0).is_err());
    }

    #[test]
    fn test_draw_selection_policy() {
        let cache = ImageCache::new(2);
        let image = cache.new_image();
        image.add_picture(&solid(16, 16, pack_rgb((1, 0, 0))), 16, 16).unwrap();
        image.add_picture(&solid(32, 16, pack_rgb((0, 1, 0))), 32, 16).unwrap();

        let mut target = solid(64 * 64, 1, 0);

        // exact original, nothing resized
        image.draw(&mut target, 64, 64, 255, Rect::new(0, 0, 16, 16)).unwrap();
        assert!(image.resized().is_empty());

        // square box picks the square original
        image.draw(&mut target, 64, 64, 255, Rect::new(0, 0, 8, 8)).unwrap();
        assert_eq!(image.resized(), vec![(8, 8)]);

        image.draw(&mut target, 64, 64, 255, Rect::new(0, 0, 4, 4)).unwrap();
        assert_eq!(image.resized(), vec![(4, 4), (8, 8)]);

        // hit moves to the front
        image.draw(&mut target, 64, 64, 255, Rect::new(0, 0, 8, 8)).unwrap();
        assert_eq!(image.resized(), vec![(8, 8), (4, 4)]);

        // at capacity the least recent goes
        image.draw(&mut target, 64, 64, 255, Rect::new(0, 0, 20, 20)).unwrap();
        assert_eq!(image.resized(), vec![(20, 20), (8, 8)]);
        assert_eq!(cache.len(), 4);

        // adding an original drops resizes of its size
        image.add_picture(&solid(8, 8, pack_rgb((0, 0, 1))), 8, 8).unwrap();
        assert_eq!(image.resized(), vec![(20, 20)]);
        assert_eq!(cache.len(), 4);
    }

    #[test]
    fn test_draw_prefers_matching_aspect() {
        let cache = ImageCache::new(3);
        let image = cache.new_image();
        image.add_picture(&solid(7, 7, pack_rgb((0xff, 0, 0))), 7, 7).unwrap();
        image.add_picture(&solid(24, 12, pack_rgb((0, 0xff, 0))), 24, 12).unwrap();

        let mut target = solid(6 * 3, 1, 0);
        // 6x3 is closer in size to 7x7 but matches 24x12's aspect
        image.draw(&mut target, 6, 3, 255, Rect::new(0, 0, 6, 3)).unwrap();
        let (r, g, _, _) = unpack(target[0]);
        assert_eq!((r, g), (0, 0xff));
        assert_eq!(image.resized(), vec![(6, 3)]);
    }

    #[test]
    fn test_hash_spreads() {
        assert_ne!(hash_pixels(&[1, 2]), hash_pixels(&[2, 1]));
        assert_ne!(hash_pixels(&[1]), hash_pixels(&[1, 1]));
    }
}
