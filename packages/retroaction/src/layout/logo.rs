//! Header logo: a JPEG embedded as-is (DCTDecode) on every page.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Result, RetroactionError};

/// A decoded-header JPEG image, shared between documents of a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    data: Arc<[u8]>,
    pub width: u32,
    pub height: u32,
    /// Colour components: 1 (gray), 3 (RGB) or 4 (CMYK).
    pub components: u8,
}

impl Logo {
    /// Load a JPEG file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let data = fs::read(path)?;
        Self::from_jpeg(data).ok_or_else(|| RetroactionError::UnsupportedLogo(path.to_path_buf()))
    }

    /// Read the frame header of a JPEG stream; `None` when it is not a JPEG.
    #[must_use]
    pub fn from_jpeg(data: Vec<u8>) -> Option<Self> {
        let (width, height, components) = frame_header(&data)?;
        Some(Self {
            data: data.into(),
            width,
            height,
            components,
        })
    }

    #[must_use]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// PDF colour space matching the component count.
    #[must_use]
    pub fn color_space(&self) -> &'static str {
        match self.components {
            1 => "DeviceGray",
            4 => "DeviceCMYK",
            _ => "DeviceRGB",
        }
    }

    /// Height in inches when drawn `width` inches wide.
    #[must_use]
    pub fn height_for_width(&self, width: f64) -> f64 {
        width * f64::from(self.height) / f64::from(self.width)
    }
}

/// Walk the JPEG markers up to the first start-of-frame segment.
fn frame_header(data: &[u8]) -> Option<(u32, u32, u8)> {
    if data.get(..2)? != [0xFF, 0xD8] {
        return None;
    }

    let mut pos = 2;
    loop {
        if *data.get(pos)? != 0xFF {
            return None;
        }
        let marker = *data.get(pos + 1)?;
        match marker {
            // Fill bytes
            0xFF => {
                pos += 1;
                continue;
            }
            // Standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let length = usize::from(u16::from_be_bytes([*data.get(pos + 2)?, *data.get(pos + 3)?]));
        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            let segment = data.get(pos + 4..pos + 2 + length)?;
            let height = u16::from_be_bytes([*segment.get(1)?, *segment.get(2)?]);
            let width = u16::from_be_bytes([*segment.get(3)?, *segment.get(4)?]);
            let components = *segment.get(5)?;
            if width == 0 || height == 0 {
                return None;
            }
            return Some((u32::from(width), u32::from(height), components));
        }
        pos += 2 + length;
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Smallest marker sequence the header parser accepts: SOI, APP0, SOF0.
    pub(crate) fn tiny_jpeg(width: u16, height: u16) -> Vec<u8> {
        let mut data = vec![0xFF, 0xD8];
        data.extend_from_slice(&[0xFF, 0xE0, 0x00, 0x04, 0x00, 0x00]);
        data.extend_from_slice(&[0xFF, 0xC0, 0x00, 0x11, 0x08]);
        data.extend_from_slice(&height.to_be_bytes());
        data.extend_from_slice(&width.to_be_bytes());
        data.extend_from_slice(&[0x03, 0x01, 0x22, 0x00, 0x02, 0x11, 0x01, 0x03, 0x11, 0x01]);
        data.extend_from_slice(&[0xFF, 0xD9]);
        data
    }

    #[test]
    fn test_reads_frame_header() {
        let logo = Logo::from_jpeg(tiny_jpeg(400, 100)).unwrap();
        assert_eq!((logo.width, logo.height, logo.components), (400, 100, 3));
        assert_eq!(logo.color_space(), "DeviceRGB");
        assert!((logo.height_for_width(2.0) - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_rejects_non_jpeg() {
        assert!(Logo::from_jpeg(b"\x89PNG\r\n\x1a\n".to_vec()).is_none());
        assert!(Logo::from_jpeg(vec![0xFF, 0xD8, 0xFF]).is_none());
    }

    #[test]
    fn test_from_file_reports_unsupported_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logo.png");
        fs::write(&path, b"\x89PNG\r\n\x1a\n").unwrap();

        assert!(matches!(
            Logo::from_file(&path),
            Err(RetroactionError::UnsupportedLogo(p)) if p == path
        ));
    }
}
