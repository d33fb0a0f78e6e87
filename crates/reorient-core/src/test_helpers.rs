//! Shared test utilities: synthetic images with an EXIF orientation tag.
//!
//! The `image` encoders never write EXIF, so the helpers encode pixels first,
//! build a one-field TIFF block with `kamadak-exif`'s writer and attach it
//! with `img-parts`.

use exif::experimental::Writer;
use exif::{Field, In, Tag, Value};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use img_parts::jpeg::Jpeg;
use img_parts::png::Png;
use img_parts::{Bytes, ImageEXIF};
use std::io::Cursor;
use std::path::Path;

/// A gradient image so encoders have real content to work with.
pub fn sample_image(width: u32, height: u32) -> DynamicImage {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7 % 256) as u8, (y * 13 % 256) as u8, ((x + y) % 256) as u8])
    });
    DynamicImage::ImageRgb8(img)
}

/// TIFF-structured EXIF data holding only an Orientation entry.
pub fn exif_block(orientation: u16) -> Bytes {
    let field = Field {
        tag: Tag::Orientation,
        ifd_num: In::PRIMARY,
        value: Value::Short(vec![orientation]),
    };
    let mut writer = Writer::new();
    writer.push_field(&field);

    let mut buffer = Cursor::new(Vec::new());
    writer.write(&mut buffer, true).unwrap();
    Bytes::from(buffer.into_inner())
}

fn encode(image: &DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image.write_to(&mut buffer, format).unwrap();
    buffer.into_inner()
}

/// Encode a JPEG, optionally tagged with a raw orientation value.
pub fn jpeg_bytes(width: u32, height: u32, orientation: Option<u16>) -> Vec<u8> {
    let encoded = encode(&sample_image(width, height), ImageFormat::Jpeg);
    let Some(orientation) = orientation else {
        return encoded;
    };

    let mut jpeg = Jpeg::from_bytes(Bytes::from(encoded)).unwrap();
    jpeg.set_exif(Some(exif_block(orientation)));
    jpeg.encoder().bytes().to_vec()
}

/// Encode a PNG, optionally tagged with a raw orientation value.
pub fn png_bytes(width: u32, height: u32, orientation: Option<u16>) -> Vec<u8> {
    let encoded = encode(&sample_image(width, height), ImageFormat::Png);
    let Some(orientation) = orientation else {
        return encoded;
    };

    let mut png = Png::from_bytes(Bytes::from(encoded)).unwrap();
    png.set_exif(Some(exif_block(orientation)));

    // eXIf must precede IDAT; keep it right after IHDR
    let chunks = png.chunks_mut();
    if let Some(pos) = chunks.iter().position(|c| c.kind() == *b"eXIf") {
        let chunk = chunks.remove(pos);
        chunks.insert(1, chunk);
    }
    png.encoder().bytes().to_vec()
}

pub fn write_jpeg(path: &Path, width: u32, height: u32, orientation: Option<u16>) {
    write_bytes(path, &jpeg_bytes(width, height, orientation));
}

pub fn write_png(path: &Path, width: u32, height: u32, orientation: Option<u16>) {
    write_bytes(path, &png_bytes(width, height, orientation));
}

/// Write an untagged TIFF.
pub fn write_tiff(path: &Path, width: u32, height: u32) {
    write_bytes(path, &encode(&sample_image(width, height), ImageFormat::Tiff));
}

/// A file that passes the JPEG magic-byte check but is cut off right after.
pub fn write_truncated_jpeg(path: &Path) {
    write_bytes(path, &[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, b'J', b'F']);
}

fn write_bytes(path: &Path, bytes: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
}
