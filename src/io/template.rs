use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::foundation::core::FrameIndex;
use crate::foundation::error::{WeaselError, WeaselResult};

/// On-disk image format of a frame sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameFormat {
    /// Portable Network Graphics.
    Png,
    /// Windows bitmap.
    Bmp,
}

impl FrameFormat {
    /// Pick the format from a path's extension.
    pub fn from_path(path: &Path) -> WeaselResult<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "png" => Ok(Self::Png),
            "bmp" => Ok(Self::Bmp),
            "ipx" => Err(WeaselError::validation(
                "IPX movie files are not supported; convert the movie to a PNG sequence",
            )),
            "" => Err(WeaselError::validation(format!(
                "cannot determine the image format of '{}'",
                path.display()
            ))),
            other => Err(WeaselError::validation(format!(
                "unsupported image format '.{other}' (expected .png or .bmp)"
            ))),
        }
    }

    pub(crate) fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Bmp => image::ImageFormat::Bmp,
        }
    }
}

/// File name pattern with a single printf-style integer placeholder (`%d`, `%4d`, `%04d`).
///
/// `%%` stands for a literal percent sign.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameTemplate {
    pattern: String,
    prefix: String,
    suffix: String,
    width: usize,
    zero_pad: bool,
}

impl FrameTemplate {
    /// Parse `pattern`, requiring exactly one integer placeholder.
    pub fn parse(pattern: &str) -> WeaselResult<Self> {
        let bad = |why: &str| WeaselError::validation(format!("frame template '{pattern}': {why}"));

        let mut prefix = String::new();
        let mut suffix = String::new();
        let mut placeholder: Option<(usize, bool)> = None;
        let mut chars = pattern.chars().peekable();
        while let Some(c) = chars.next() {
            let out = if placeholder.is_some() { &mut suffix } else { &mut prefix };
            if c != '%' {
                out.push(c);
                continue;
            }
            if chars.peek() == Some(&'%') {
                chars.next();
                out.push('%');
                continue;
            }
            if placeholder.is_some() {
                return Err(bad("more than one placeholder"));
            }
            let zero_pad = chars.peek() == Some(&'0');
            if zero_pad {
                chars.next();
            }
            let mut digits = String::new();
            while let Some(d) = chars.peek().copied().filter(char::is_ascii_digit) {
                digits.push(d);
                chars.next();
            }
            if chars.next() != Some('d') {
                return Err(bad("placeholder must be an integer conversion such as %d or %04d"));
            }
            let width = if digits.is_empty() {
                0
            } else {
                digits.parse().map_err(|_| bad("placeholder width is too large"))?
            };
            placeholder = Some((width, zero_pad));
        }

        let Some((width, zero_pad)) = placeholder else {
            return Err(bad("missing frame number placeholder"));
        };
        Ok(Self {
            pattern: pattern.to_owned(),
            prefix,
            suffix,
            width,
            zero_pad,
        })
    }

    /// The pattern as given.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Image format implied by the extension.
    pub fn format(&self) -> WeaselResult<FrameFormat> {
        FrameFormat::from_path(&self.path_for(FrameIndex(0)))
    }

    /// File name of frame `index`.
    pub fn path_for(&self, index: FrameIndex) -> PathBuf {
        let n = index.0;
        let number = if self.zero_pad {
            format!("{n:0width$}", width = self.width)
        } else {
            format!("{n:>width$}", width = self.width)
        };
        PathBuf::from(format!("{}{number}{}", self.prefix, self.suffix))
    }
}

impl FromStr for FrameTemplate {
    type Err = WeaselError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/io/template.rs"]
mod tests;
