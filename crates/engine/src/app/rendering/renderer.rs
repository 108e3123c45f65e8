use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::ImageReader;
use pixels::{Pixels, SurfaceTexture, TextureError};
use thiserror::Error;
use tracing::warn;
use winit::window::Window;

use crate::app::physics::Rect;
use crate::app::{Backdrop, Entity, RenderableKind, SceneWorld, Vec2};
use crate::sprite_keys::sprite_image_path;

use super::PLACEHOLDER_HALF_SIZE_PX;

const CLEAR_COLOR: [u8; 4] = [20, 22, 28, 255];
const WORLD_BOUNDS_COLOR: [u8; 4] = [70, 200, 90, 255];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error(transparent)]
    Pixels(#[from] pixels::Error),
    #[error(transparent)]
    Texture(#[from] TextureError),
}

struct LoadedSprite {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// Software renderer: the pixel buffer covers the scene field one-to-one
/// and `pixels` scales it onto the window surface.
pub struct Renderer {
    pixels: Pixels<'static>,
    buffer_size: (u32, u32),
    sprites_dir: PathBuf,
    sprite_cache: HashMap<String, Option<LoadedSprite>>,
    warned_sprite_keys: HashSet<String>,
}

impl Renderer {
    pub fn new(
        window: Arc<Window>,
        sprites_dir: PathBuf,
        buffer_size: (u32, u32),
    ) -> Result<Self, RenderError> {
        let size = window.inner_size();
        let surface = SurfaceTexture::new(size.width.max(1), size.height.max(1), window);
        let buffer_size = (buffer_size.0.max(1), buffer_size.1.max(1));
        let pixels = Pixels::new(buffer_size.0, buffer_size.1, surface)?;
        Ok(Self {
            pixels,
            buffer_size,
            sprites_dir,
            sprite_cache: HashMap::new(),
            warned_sprite_keys: HashSet::new(),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels.resize_surface(width, height)?;
        Ok(())
    }

    pub(crate) fn render_world(&mut self, world: &SceneWorld) -> Result<(), RenderError> {
        let field = world.field();
        let wanted = (
            (field.width.round() as u32).max(1),
            (field.height.round() as u32).max(1),
        );
        if wanted != self.buffer_size {
            self.pixels.resize_buffer(wanted.0, wanted.1)?;
            self.buffer_size = wanted;
        }

        let Self {
            pixels,
            buffer_size,
            sprites_dir,
            sprite_cache,
            warned_sprite_keys,
        } = self;
        let (width, height) = *buffer_size;
        let frame = pixels.frame_mut();
        for pixel in frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&CLEAR_COLOR);
        }

        if let Some(Backdrop { sprite_key, scale }) = world.backdrop() {
            if let Some(sprite) =
                resolve_cached_sprite(sprite_cache, warned_sprite_keys, sprites_dir, sprite_key)
            {
                draw_sprite_scaled(frame, width, height, 0, 0, sprite, *scale);
            }
        }

        let bounds = world.world_bounds();
        let (left, top) = field_to_buffer_px(field, Vec2::new(bounds.x, bounds.y));
        let (right, bottom) = field_to_buffer_px(field, Vec2::new(bounds.right(), bounds.bottom()));
        draw_rect_outline(frame, width, left, top, right, bottom, WORLD_BOUNDS_COLOR);

        for entity in world.entities() {
            draw_entity(
                frame,
                (width, height),
                field,
                entity,
                sprite_cache,
                warned_sprite_keys,
                sprites_dir,
            );
        }

        pixels.render()?;
        Ok(())
    }
}

fn draw_entity(
    frame: &mut [u8],
    (width, height): (u32, u32),
    field: Rect,
    entity: &Entity,
    sprite_cache: &mut HashMap<String, Option<LoadedSprite>>,
    warned_sprite_keys: &mut HashSet<String>,
    sprites_dir: &Path,
) {
    let (cx, cy) = field_to_buffer_px(field, entity.transform.position);
    let scale = normalized_sprite_scale(entity.renderable.scale);
    if let RenderableKind::Sprite(key) = &entity.renderable.kind {
        if let Some(sprite) = resolve_cached_sprite(sprite_cache, warned_sprite_keys, sprites_dir, key) {
            let (scaled_w, scaled_h) = scaled_sprite_dimensions(sprite, scale);
            let left = cx - scaled_w as i32 / 2;
            let top = cy - scaled_h as i32 / 2;
            draw_sprite_scaled(frame, width, height, left, top, sprite, scale);
            return;
        }
    }
    let half_size = ((PLACEHOLDER_HALF_SIZE_PX as f32) * scale).round().max(1.0) as i32;
    draw_square(frame, width, height, cx, cy, half_size, entity.renderable.tint);
}

fn field_to_buffer_px(field: Rect, position: Vec2) -> (i32, i32) {
    (
        (position.x - field.x).round() as i32,
        (position.y - field.y).round() as i32,
    )
}

fn resolve_cached_sprite<'a>(
    cache: &'a mut HashMap<String, Option<LoadedSprite>>,
    warned_sprite_keys: &mut HashSet<String>,
    sprites_dir: &Path,
    key: &str,
) -> Option<&'a LoadedSprite> {
    if !cache.contains_key(key) {
        let sprite = match sprite_image_path(sprites_dir, key) {
            Ok(path) => match load_sprite_rgba(&path) {
                Ok(sprite) => Some(sprite),
                Err(reason) => {
                    warn_sprite_load_once(warned_sprite_keys, key, Some(&path), &reason);
                    None
                }
            },
            Err(error) => {
                warn_sprite_load_once(warned_sprite_keys, key, None, &format!("invalid_key:{error}"));
                None
            }
        };
        cache.insert(key.to_string(), sprite);
    }
    cache.get(key).and_then(Option::as_ref)
}

fn load_sprite_rgba(path: &Path) -> Result<LoadedSprite, String> {
    let reader = ImageReader::open(path).map_err(|error| format!("file_open_failed:{error}"))?;
    let decoded = reader
        .decode()
        .map_err(|error| format!("decode_failed:{error}"))?;
    let image = decoded.to_rgba8();
    Ok(LoadedSprite {
        width: image.width(),
        height: image.height(),
        rgba: image.into_raw(),
    })
}

fn warn_sprite_load_once(
    warned_keys: &mut HashSet<String>,
    key: &str,
    resolved_path: Option<&Path>,
    reason: &str,
) {
    if !warned_keys.insert(key.to_string()) {
        return;
    }
    let path_display = resolved_path
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<unresolved>".to_string());
    warn!(
        sprite_key = key,
        path = %path_display,
        reason = reason,
        "renderer_sprite_load_failed_using_placeholder"
    );
}

fn write_pixel_rgba_clipped(frame: &mut [u8], width: usize, x: i32, y: i32, color: [u8; 4]) {
    if x < 0 || y < 0 || x as usize >= width {
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
    frame[byte_offset..end].copy_from_slice(&color);
}

fn draw_square(
    frame: &mut [u8],
    width: u32,
    height: u32,
    cx: i32,
    cy: i32,
    half_size: i32,
    color: [u8; 4],
) {
    for y in (cy - half_size).max(0)..=(cy + half_size).min(height as i32 - 1) {
        for x in (cx - half_size).max(0)..=(cx + half_size).min(width as i32 - 1) {
            write_pixel_rgba_clipped(frame, width as usize, x, y, color);
        }
    }
}

fn draw_rect_outline(
    frame: &mut [u8],
    width: u32,
    left: i32,
    top: i32,
    right: i32,
    bottom: i32,
    color: [u8; 4],
) {
    for x in left..=right {
        write_pixel_rgba_clipped(frame, width as usize, x, top, color);
        write_pixel_rgba_clipped(frame, width as usize, x, bottom, color);
    }
    for y in top..=bottom {
        write_pixel_rgba_clipped(frame, width as usize, left, y, color);
        write_pixel_rgba_clipped(frame, width as usize, right, y, color);
    }
}

fn normalized_sprite_scale(scale: f32) -> f32 {
    if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    }
}

fn scaled_sprite_dimensions(sprite: &LoadedSprite, scale: f32) -> (u32, u32) {
    let scale = normalized_sprite_scale(scale);
    let width = (sprite.width as f32 * scale).round().max(1.0) as u32;
    let height = (sprite.height as f32 * scale).round().max(1.0) as u32;
    (width, height)
}

/// Nearest-neighbour blit with its top-left corner at (`left`, `top`);
/// fully transparent texels are skipped.
fn draw_sprite_scaled(
    frame: &mut [u8],
    width: u32,
    height: u32,
    left: i32,
    top: i32,
    sprite: &LoadedSprite,
    scale: f32,
) {
    if sprite.width == 0 || sprite.height == 0 || width == 0 || height == 0 {
        return;
    }
    let expected_rgba_len = sprite.width as usize * sprite.height as usize * 4;
    if sprite.rgba.len() < expected_rgba_len {
        return;
    }

    let scale = normalized_sprite_scale(scale);
    let inv_scale = scale.recip();
    let (scaled_w, scaled_h) = scaled_sprite_dimensions(sprite, scale);
    let right = left + scaled_w as i32;
    let bottom = top + scaled_h as i32;

    let draw_left = left.max(0);
    let draw_top = top.max(0);
    let draw_right = right.min(width as i32);
    let draw_bottom = bottom.min(height as i32);
    if draw_left >= draw_right || draw_top >= draw_bottom {
        return;
    }

    let frame_width = width as usize;
    let sprite_width = sprite.width as usize;

    for out_y in draw_top..draw_bottom {
        let dy = out_y - top;
        let src_y = ((dy as f32) * inv_scale).floor() as u32;
        let src_y = src_y.min(sprite.height - 1) as usize;
        let src_row_offset = src_y * sprite_width * 4;
        let dst_row_offset = out_y as usize * frame_width * 4;

        for out_x in draw_left..draw_right {
            let dx = out_x - left;
            let src_x = ((dx as f32) * inv_scale).floor() as u32;
            let src_x = src_x.min(sprite.width - 1) as usize;
            let src_offset = src_row_offset + src_x * 4;
            let alpha = sprite.rgba[src_offset + 3];
            if alpha == 0 {
                continue;
            }
            let dst_offset = dst_row_offset + out_x as usize * 4;
            frame[dst_offset..dst_offset + 4].copy_from_slice(&sprite.rgba[src_offset..src_offset + 4]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const RED: [u8; 4] = [255, 0, 0, 255];

    fn pixel_at(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let offset = ((y * width + x) * 4) as usize;
        [
            frame[offset],
            frame[offset + 1],
            frame[offset + 2],
            frame[offset + 3],
        ]
    }

    fn solid_sprite(width: u32, height: u32, color: [u8; 4]) -> LoadedSprite {
        LoadedSprite {
            width,
            height,
            rgba: color.repeat((width * height) as usize),
        }
    }

    #[test]
    fn write_pixel_ignores_out_of_range_coordinates() {
        let mut frame = vec![0u8; 4 * 4 * 4];
        write_pixel_rgba_clipped(&mut frame, 4, -1, 0, RED);
        write_pixel_rgba_clipped(&mut frame, 4, 4, 0, RED);
        write_pixel_rgba_clipped(&mut frame, 4, 0, 4, RED);
        assert!(frame.iter().all(|byte| *byte == 0));

        write_pixel_rgba_clipped(&mut frame, 4, 3, 3, RED);
        assert_eq!(pixel_at(&frame, 4, 3, 3), RED);
    }

    #[test]
    fn square_is_clipped_to_buffer_edges() {
        let mut frame = vec![0u8; 8 * 8 * 4];
        draw_square(&mut frame, 8, 8, 0, 0, 2, RED);

        assert_eq!(pixel_at(&frame, 8, 0, 0), RED);
        assert_eq!(pixel_at(&frame, 8, 2, 2), RED);
        assert_eq!(pixel_at(&frame, 8, 3, 3), [0, 0, 0, 0]);
    }

    #[test]
    fn scaled_sprite_fills_scaled_area() {
        let sprite = solid_sprite(2, 2, RED);
        assert_eq!(scaled_sprite_dimensions(&sprite, 3.0), (6, 6));

        let mut frame = vec![0u8; 10 * 10 * 4];
        draw_sprite_scaled(&mut frame, 10, 10, 1, 1, &sprite, 3.0);
        assert_eq!(pixel_at(&frame, 10, 1, 1), RED);
        assert_eq!(pixel_at(&frame, 10, 6, 6), RED);
        assert_eq!(pixel_at(&frame, 10, 7, 7), [0, 0, 0, 0]);
        assert_eq!(pixel_at(&frame, 10, 0, 0), [0, 0, 0, 0]);
    }

    #[test]
    fn transparent_texels_are_skipped() {
        let sprite = solid_sprite(1, 1, [9, 9, 9, 0]);
        let mut frame = vec![7u8; 4 * 4 * 4];
        draw_sprite_scaled(&mut frame, 4, 4, 0, 0, &sprite, 1.0);
        assert_eq!(pixel_at(&frame, 4, 0, 0), [7, 7, 7, 7]);
    }

    #[test]
    fn invalid_scale_falls_back_to_one() {
        assert_eq!(normalized_sprite_scale(f32::NAN), 1.0);
        assert_eq!(normalized_sprite_scale(-2.0), 1.0);
        assert_eq!(normalized_sprite_scale(2.75), 2.75);
    }

    #[test]
    fn field_offset_maps_to_buffer_origin() {
        let field = Rect::new(0.0, 0.0, 700.0, 700.0);
        assert_eq!(field_to_buffer_px(field, Vec2::new(370.4, 369.6)), (370, 370));
        let shifted = Rect::new(10.0, 20.0, 100.0, 100.0);
        assert_eq!(field_to_buffer_px(shifted, Vec2::new(10.0, 20.0)), (0, 0));
    }

    #[test]
    fn missing_sprite_is_cached_as_none_and_warned_once() {
        let temp = TempDir::new().expect("tempdir");
        let mut cache = HashMap::new();
        let mut warned = HashSet::new();

        assert!(resolve_cached_sprite(&mut cache, &mut warned, temp.path(), "enemy").is_none());
        assert!(resolve_cached_sprite(&mut cache, &mut warned, temp.path(), "enemy").is_none());
        assert_eq!(warned.len(), 1);
        assert!(cache.contains_key("enemy"));
    }

    #[test]
    fn png_sprite_is_decoded_and_cached() {
        let temp = TempDir::new().expect("tempdir");
        let image = image::RgbaImage::from_pixel(3, 2, image::Rgba(RED));
        image
            .save(temp.path().join("bullet.png"))
            .expect("write png");
        let mut cache = HashMap::new();
        let mut warned = HashSet::new();

        let sprite = resolve_cached_sprite(&mut cache, &mut warned, temp.path(), "bullet")
            .expect("sprite decoded");
        assert_eq!((sprite.width, sprite.height), (3, 2));
        assert_eq!(&sprite.rgba[0..4], &RED);
        assert!(warned.is_empty());
    }
}
