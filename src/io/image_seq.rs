use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::foundation::core::{Extent, FrameIndex};
use crate::foundation::error::{WeaselError, WeaselResult};
use crate::frame::model::Frame;
use crate::io::colormap::ColorMap;
use crate::io::sink::FrameSink;
use crate::io::source::FrameSource;
use crate::io::template::{FrameFormat, FrameTemplate};

/// Reads one image file per frame, named by a [`FrameTemplate`].
///
/// Greyscale images map to `[0, 1]` by their bit depth; colour images contribute their red channel.
#[derive(Debug)]
pub struct ImageSequenceSource {
    template: FrameTemplate,
    scratch: Vec<f32>,
}

impl ImageSequenceSource {
    /// Source for `template`, which must name `.png` or `.bmp` files.
    pub fn new(template: FrameTemplate) -> WeaselResult<Self> {
        template.format()?;
        Ok(Self {
            template,
            scratch: Vec::new(),
        })
    }
}

impl FrameSource for ImageSequenceSource {
    fn read_frame(&mut self, index: FrameIndex, into: &mut Frame) -> WeaselResult<()> {
        let path = self.template.path_for(index);
        let img = image::open(&path)
            .map_err(|e| WeaselError::decode(format!("read '{}': {e}", path.display())))?;
        let extent = Extent::new(img.width(), img.height());
        decode_intensity(&img, &mut self.scratch);
        into.store(index, extent, &self.scratch)?;
        into.time = 0.0;
        into.is_last = false;
        tracing::trace!(frame = index.0, path = %path.display(), "frame decoded");
        Ok(())
    }
}

fn decode_intensity(img: &DynamicImage, out: &mut Vec<f32>) {
    out.clear();
    match img {
        DynamicImage::ImageLuma8(buf) => {
            out.extend(buf.as_raw().iter().map(|&v| f32::from(v) / 255.0));
        }
        DynamicImage::ImageLumaA8(buf) => {
            out.extend(buf.pixels().map(|p| f32::from(p.0[0]) / 255.0));
        }
        DynamicImage::ImageLuma16(buf) => {
            out.extend(buf.as_raw().iter().map(|&v| f32::from(v) / 65535.0));
        }
        DynamicImage::ImageLumaA16(buf) => {
            out.extend(buf.pixels().map(|p| f32::from(p.0[0]) / 65535.0));
        }
        other => {
            let rgb = other.to_rgb8();
            out.extend(rgb.pixels().map(|p| f32::from(p.0[0]) / 255.0));
        }
    }
}

/// Writes one image file per output frame, named by sequence number.
///
/// Values are clamped to `[0, 1]` and stored as 8-bit grey, or as RGB through a [`ColorMap`].
#[derive(Debug)]
pub struct ImageSequenceSink {
    template: FrameTemplate,
    format: FrameFormat,
    colormap: Option<ColorMap>,
    extent: Option<Extent>,
    raw: Vec<u8>,
    written: u64,
    last_path: Option<PathBuf>,
}

impl ImageSequenceSink {
    /// Sink for `template`, which must name `.png` or `.bmp` files.
    pub fn new(template: FrameTemplate, colormap: Option<ColorMap>) -> WeaselResult<Self> {
        let format = template.format()?;
        Ok(Self {
            template,
            format,
            colormap,
            extent: None,
            raw: Vec::new(),
            written: 0,
            last_path: None,
        })
    }

    /// Number of files written since `begin`.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// Most recently written file.
    pub fn last_path(&self) -> Option<&Path> {
        self.last_path.as_deref()
    }
}

/// Clamp to `[0, 1]` and scale to a byte, rounding half up.
pub fn quantise_grey(v: f32) -> u8 {
    (0.5 + v.clamp(0.0, 1.0) * 255.0) as u8
}

impl FrameSink for ImageSequenceSink {
    fn begin(&mut self) -> WeaselResult<()> {
        self.extent = None;
        self.written = 0;
        self.last_path = None;
        Ok(())
    }

    fn push_frame(&mut self, frame: &Frame) -> WeaselResult<()> {
        let extent = frame.extent();
        match self.extent {
            Some(prev) if prev != extent => {
                return Err(WeaselError::encode(format!(
                    "output frame {} is {}x{}, earlier outputs were {}x{}",
                    frame.index.0, extent.width, extent.height, prev.width, prev.height
                )));
            }
            _ => self.extent = Some(extent),
        }

        self.raw.clear();
        let color = match &self.colormap {
            Some(map) => {
                for &v in frame.pixels() {
                    self.raw.extend_from_slice(&map.map(v));
                }
                image::ColorType::Rgb8
            }
            None => {
                self.raw.extend(frame.pixels().iter().map(|&v| quantise_grey(v)));
                image::ColorType::L8
            }
        };

        let path = self.template.path_for(frame.index);
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                WeaselError::encode(format!("create output dir '{}': {e}", parent.display()))
            })?;
        }
        image::save_buffer_with_format(
            &path,
            &self.raw,
            extent.width,
            extent.height,
            color,
            self.format.image_format(),
        )
        .map_err(|e| WeaselError::encode(format!("write '{}': {e}", path.display())))?;
        tracing::debug!(frame = frame.index.0, path = %path.display(), "frame written");
        self.written += 1;
        self.last_path = Some(path);
        Ok(())
    }

    fn end(&mut self) -> WeaselResult<()> {
        tracing::info!(frames = self.written, "output sequence complete");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/image_seq.rs"]
mod tests;
