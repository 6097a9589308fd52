use super::config::*;
use super::database::*;
use super::error::Result;
use super::model::*;
use super::util::*;
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageOutputFormat, Rgb, RgbImage};
use simple_error::SimpleResult;
use sqlx::SqliteConnection;
use std::io::Cursor;
use std::path::Path;


const FALLBACK_IMAGE_TYPES: [ImageType; 3] = [ImageType::Cover, ImageType::Mix, ImageType::Screenshot];
const JPEG_QUALITY: u8 = 95;

/// Preferred type first, then cover, mix and screenshot.
pub fn select_game_image(images: &[GameImage], image_type: ImageType) -> Option<&GameImage> {
    let find = |image_type: ImageType| {
        images
            .iter()
            .find(|image| image.image_type == image_type.to_string())
    };
    find(image_type).or_else(|| {
        FALLBACK_IMAGE_TYPES
            .iter()
            .filter(|fallback| **fallback != image_type)
            .find_map(|fallback| find(*fallback))
    })
}

pub async fn get_game_image(
    connection: &mut SqliteConnection,
    game_id: i64,
    image_type: ImageType,
) -> SimpleResult<Option<GameImage>> {
    let images = find_game_images_by_game_id(connection, game_id).await?;
    Ok(select_game_image(&images, image_type).cloned())
}

fn flatten_on_white(image: &DynamicImage) -> DynamicImage {
    let rgba = image.to_rgba8();
    let rgb = RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let pixel = rgba.get_pixel(x, y);
        let alpha = pixel[3] as u16;
        let blend = |channel: u8| ((channel as u16 * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])])
    });
    DynamicImage::ImageRgb8(rgb)
}

/// Shrinks an image to `max_width` keeping its aspect ratio, then encodes
/// it as JPEG for .jpg/.jpeg sources and PNG otherwise.
pub fn resize_image_to_width<P: AsRef<Path>>(path: &P, max_width: Option<u32>) -> Result<Vec<u8>> {
    let mut image = image::open(path.as_ref())?;
    let (width, height) = image.dimensions();

    if let Some(max_width) = max_width {
        if width > max_width {
            let new_height = ((height as u64 * max_width as u64) / width as u64).max(1) as u32;
            image = image.resize_exact(max_width, new_height, FilterType::Lanczos3);
            log::debug!(
                "Resized image from {}x{} to {}x{}",
                width,
                height,
                max_width,
                new_height
            );
        }
    }

    let mut bytes: Vec<u8> = Vec::new();
    match get_extension(path).as_str() {
        "jpg" | "jpeg" => {
            flatten_on_white(&image)
                .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Jpeg(JPEG_QUALITY))?;
        }
        _ => {
            image.write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        }
    }
    Ok(bytes)
}

/// Image bytes ready to be stored on a device, `None` when the game has no
/// usable image.
pub async fn prepare_image_for_device(
    connection: &mut SqliteConnection,
    game_id: i64,
    image_type: ImageType,
    max_width: Option<u32>,
) -> Result<Option<Vec<u8>>> {
    let image = match get_game_image(connection, game_id, image_type).await? {
        Some(image) => image,
        None => return Ok(None),
    };
    let path = to_absolute_path(connection, &image.file_path).await?;
    if !path.is_file() {
        log::warn!("Image file not found: {}", path.display());
        return Ok(None);
    }
    Ok(Some(resize_image_to_width(&path, max_width)?))
}
