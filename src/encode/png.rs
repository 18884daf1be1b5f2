use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::encode::ffmpeg::ensure_parent_dir;
use crate::encode::sink::{FrameOrder, FrameSink, SinkConfig};
use crate::foundation::core::FrameIndex;
use crate::foundation::error::{NebulaError, NebulaResult};
use crate::render::backend::FrameRGBA;

/// Writes each frame as `{prefix}{index:05}.png` under a directory.
///
/// PNG stores straight alpha, so premultiplied frames are converted on the way out.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    prefix: String,
    cfg: Option<SinkConfig>,
    order: FrameOrder,
    scratch: Vec<u8>,
    written: Vec<PathBuf>,
}

impl PngSequenceSink {
    /// Sink writing into `dir`, created on `begin`.
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            cfg: None,
            order: FrameOrder::default(),
            scratch: Vec::new(),
            written: Vec::new(),
        }
    }

    /// Path the frame at `idx` is written to.
    pub fn frame_path(&self, idx: FrameIndex) -> PathBuf {
        self.dir.join(format!("{}{:05}.png", self.prefix, idx.0))
    }

    /// Files written since the last `begin`.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> NebulaResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(NebulaError::validation(
                "png sink width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create frame directory '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.order.reset();
        self.scratch = vec![0u8; cfg.frame_len()];
        self.written.clear();
        Ok(())
    }

    fn push_frame(&mut self, idx: FrameIndex, frame: &FrameRGBA) -> NebulaResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| NebulaError::render("png sink not started"))?;
        cfg.check_frame(frame)?;
        self.order.advance(idx)?;

        let path = self.frame_path(idx);
        let pixels = if frame.premultiplied {
            unpremultiply_rgba8(&mut self.scratch, &frame.data)?;
            &self.scratch
        } else {
            &frame.data
        };
        write_png(&path, pixels, frame.width, frame.height)?;
        tracing::trace!(path = %path.display(), "frame written");
        self.written.push(path);
        Ok(())
    }

    fn end(&mut self) -> NebulaResult<()> {
        if self.cfg.take().is_none() {
            return Err(NebulaError::render("png sink not started"));
        }
        tracing::debug!(
            frames = self.written.len(),
            dir = %self.dir.display(),
            "png sequence done"
        );
        Ok(())
    }
}

/// Save straight-alpha RGBA8 as PNG, creating the parent directory.
pub fn write_png(path: &Path, rgba: &[u8], width: u32, height: u32) -> NebulaResult<()> {
    ensure_parent_dir(path)?;
    image::save_buffer_with_format(
        path,
        rgba,
        width,
        height,
        image::ColorType::Rgba8,
        image::ImageFormat::Png,
    )
    .with_context(|| format!("write png '{}'", path.display()))?;
    Ok(())
}

/// Convert premultiplied RGBA8 to straight alpha.
pub fn unpremultiply_rgba8(dst: &mut [u8], src_premul: &[u8]) -> NebulaResult<()> {
    if dst.len() != src_premul.len() || !dst.len().is_multiple_of(4) {
        return Err(NebulaError::validation(
            "unpremultiply expects equal-length rgba8 buffers",
        ));
    }
    for (d, s) in dst.chunks_exact_mut(4).zip(src_premul.chunks_exact(4)) {
        let a = u32::from(s[3]);
        if a == 0 {
            d.copy_from_slice(&[0, 0, 0, 0]);
            continue;
        }
        for c in 0..3 {
            d[c] = ((u32::from(s[c]) * 255 + a / 2) / a).min(255) as u8;
        }
        d[3] = s[3];
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/encode/png.rs"]
mod tests;
