//! Cover art resizing.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader};

/// Default edge length of the square output cover, in pixels.
pub const DEFAULT_COVER_SIZE: u32 = 500;

#[async_trait]
pub trait CoverResizer: Send + Sync {
    /// Scale `src` to a `size`x`size` JPEG at `dst`.
    async fn resize(&self, src: &Path, dst: &Path, size: u32) -> Result<()>;
}

/// Resizes in-process with the `image` crate on the blocking pool.
#[derive(Clone, Debug, Default)]
pub struct ImageResizer;

#[async_trait]
impl CoverResizer for ImageResizer {
    async fn resize(&self, src: &Path, dst: &Path, size: u32) -> Result<()> {
        let src = src.to_path_buf();
        let dst = dst.to_path_buf();
        tokio::task::spawn_blocking(move || resize_square(&src, &dst, size))
            .await
            .context("cover resize task")?
    }
}

/// Fill the square and crop the overflow, so the aspect ratio is never distorted.
fn resize_square(src: &Path, dst: &Path, size: u32) -> Result<()> {
    // Embedded pictures keep their original encoding whatever the file extension says.
    let image = ImageReader::open(src)
        .with_context(|| format!("open cover {:?}", src))?
        .with_guessed_format()
        .with_context(|| format!("probe cover {:?}", src))?
        .decode()
        .with_context(|| format!("decode cover {:?}", src))?;
    let resized = image.resize_to_fill(size, size, FilterType::Lanczos3);
    DynamicImage::ImageRgb8(resized.to_rgb8())
        .save_with_format(dst, ImageFormat::Jpeg)
        .with_context(|| format!("write cover {:?}", dst))?;
    tracing::debug!(src = ?src, dst = ?dst, size, "cover resized");
    Ok(())
}

/// Path of the resized cover inside a working directory.
pub fn resized_cover_path(work_dir: &Path) -> PathBuf {
    work_dir.join("cover-resized.jpg")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::temp_dir;
    use image::{Rgba, RgbaImage};

    #[tokio::test]
    async fn resizes_to_square_jpeg_whatever_the_source_format() {
        let dir = temp_dir("cover");
        let src = dir.join("cover.jpg");
        let dst = resized_cover_path(&dir);
        RgbaImage::from_pixel(64, 32, Rgba([200, 10, 10, 128]))
            .save_with_format(&src, ImageFormat::Png)
            .unwrap();

        ImageResizer.resize(&src, &dst, 24).await.unwrap();

        let reader = ImageReader::open(&dst).unwrap().with_guessed_format().unwrap();
        assert_eq!(reader.format(), Some(ImageFormat::Jpeg));
        let out = reader.decode().unwrap();
        assert_eq!((out.width(), out.height()), (24, 24));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn undecodable_cover_is_an_error() {
        let dir = temp_dir("cover-bad");
        let src = dir.join("cover.jpg");
        std::fs::write(&src, b"not an image").unwrap();
        let result = ImageResizer.resize(&src, &dir.join("out.jpg"), 24).await;
        assert!(result.is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }
}
