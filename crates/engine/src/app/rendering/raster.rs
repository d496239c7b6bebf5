use super::{Rect, Rgba};

/// RGBA8 pixel buffer used for loaded textures and off-screen targets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Surface {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl Surface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Option<Self> {
        let expected = width as usize * height as usize * 4;
        (rgba.len() == expected).then_some(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y as usize * self.width as usize + x as usize) * 4;
        let mut out = [0u8; 4];
        out.copy_from_slice(&self.rgba[offset..offset + 4]);
        Some(out)
    }
}

pub(super) fn clear_frame(frame: &mut [u8], color: Rgba) {
    for chunk in frame.chunks_exact_mut(4) {
        chunk.copy_from_slice(&color.0);
    }
}

pub(super) fn fill_rect_clipped(frame: &mut [u8], width: u32, height: u32, rect: Rect, color: Rgba) {
    let left = rect.x.max(0);
    let top = rect.y.max(0);
    let right = rect.right().min(width as i32);
    let bottom = rect.bottom().min(height as i32);
    if left >= right || top >= bottom {
        return;
    }
    for y in top..bottom {
        for x in left..right {
            blend_pixel_rgba_clipped(frame, width as usize, x, y, color.0);
        }
    }
}

/// Nearest-neighbour blit of `src` region of `sprite` stretched onto `dst`.
pub(super) fn blit_region_clipped(
    frame: &mut [u8],
    width: u32,
    height: u32,
    sprite: &Surface,
    src: Rect,
    dst: Rect,
) {
    let src = clip_to_surface(src, sprite.width, sprite.height);
    if src.is_empty() || dst.is_empty() || width == 0 || height == 0 {
        return;
    }
    let expected_rgba_len = sprite.width as usize * sprite.height as usize * 4;
    if sprite.rgba.len() < expected_rgba_len {
        return;
    }

    let draw_left = dst.x.max(0);
    let draw_top = dst.y.max(0);
    let draw_right = dst.right().min(width as i32);
    let draw_bottom = dst.bottom().min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let scale_x = src.w as f32 / dst.w as f32;
    let scale_y = src.h as f32 / dst.h as f32;
    let sprite_width = sprite.width as usize;

    for out_y in draw_top..draw_bottom {
        let dy = out_y - dst.y;
        let src_y = src.y + ((dy as f32) * scale_y).floor() as i32;
        let src_y = src_y.min(src.bottom() - 1) as usize;
        let src_row_offset = src_y * sprite_width * 4;

        for out_x in draw_left..draw_right {
            let dx = out_x - dst.x;
            let src_x = src.x + ((dx as f32) * scale_x).floor() as i32;
            let src_x = src_x.min(src.right() - 1) as usize;
            let src_offset = src_row_offset + src_x * 4;
            let mut color = [0u8; 4];
            color.copy_from_slice(&sprite.rgba[src_offset..src_offset + 4]);
            if color[3] == 0 {
                continue;
            }
            blend_pixel_rgba_clipped(frame, width as usize, out_x, out_y, color);
        }
    }
}

fn clip_to_surface(rect: Rect, width: u32, height: u32) -> Rect {
    let left = rect.x.max(0);
    let top = rect.y.max(0);
    let right = rect.right().min(width as i32);
    let bottom = rect.bottom().min(height as i32);
    Rect::new(left, top, right - left, bottom - top)
}

fn blend_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 {
        return;
    }
    let x = x as usize;
    let y = y as usize;
    let Some(pixel_offset) = y.checked_mul(width).and_then(|row| row.checked_add(x)) else {
        return;
    };
    let Some(byte_offset) = pixel_offset.checked_mul(4) else {
        return;
    };
    let Some(end) = byte_offset.checked_add(4) else {
        return;
    };
    if end > frame.len() {
        return;
    }
    let dst = &mut frame[byte_offset..end];
    let alpha = color[3] as u32;
    if alpha == 255 {
        dst.copy_from_slice(&color);
        return;
    }
    let inv = 255 - alpha;
    for channel in 0..3 {
        dst[channel] = ((color[channel] as u32 * alpha + dst[channel] as u32 * inv) / 255) as u8;
    }
    dst[3] = (alpha + dst[3] as u32 * inv / 255).min(255) as u8;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, color: [u8; 4]) -> Surface {
        let mut surface = Surface::new(width, height);
        clear_frame(&mut surface.rgba, Rgba(color));
        surface
    }

    #[test]
    fn fill_rect_is_clipped_to_frame() {
        let mut target = Surface::new(4, 4);
        fill_rect_clipped(
            &mut target.rgba,
            4,
            4,
            Rect::new(-2, 2, 10, 10),
            Rgba([9, 9, 9, 255]),
        );

        assert_eq!(target.pixel(0, 1), Some([0, 0, 0, 0]));
        assert_eq!(target.pixel(0, 2), Some([9, 9, 9, 255]));
        assert_eq!(target.pixel(3, 3), Some([9, 9, 9, 255]));
    }

    #[test]
    fn translucent_fill_blends_with_destination() {
        let mut target = solid(1, 1, [0, 0, 0, 255]);
        fill_rect_clipped(
            &mut target.rgba,
            1,
            1,
            Rect::new(0, 0, 1, 1),
            Rgba([255, 255, 255, 51]),
        );
        let pixel = target.pixel(0, 0).expect("pixel");
        assert_eq!(pixel[0], 51);
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn blit_samples_requested_source_region() {
        let mut sheet = Surface::new(4, 2);
        fill_rect_clipped(&mut sheet.rgba, 4, 2, Rect::new(2, 1, 2, 1), Rgba([1, 2, 3, 255]));

        let mut target = Surface::new(2, 2);
        blit_region_clipped(
            &mut target.rgba,
            2,
            2,
            &sheet,
            Rect::new(2, 1, 2, 1),
            Rect::new(0, 0, 2, 2),
        );

        for (x, y) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
            assert_eq!(target.pixel(x, y), Some([1, 2, 3, 255]));
        }
    }

    #[test]
    fn blit_skips_fully_transparent_texels() {
        let sheet = Surface::new(1, 1);
        let mut target = solid(1, 1, [7, 7, 7, 255]);
        blit_region_clipped(
            &mut target.rgba,
            1,
            1,
            &sheet,
            Rect::new(0, 0, 1, 1),
            Rect::new(0, 0, 1, 1),
        );
        assert_eq!(target.pixel(0, 0), Some([7, 7, 7, 255]));
    }

    #[test]
    fn from_rgba_rejects_wrong_length() {
        assert!(Surface::from_rgba(2, 2, vec![0; 15]).is_none());
        assert!(Surface::from_rgba(2, 2, vec![0; 16]).is_some());
    }
}
