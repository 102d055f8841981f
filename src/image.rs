//! Chip image files
//!
//! The CLI runs the driver against an emulated chip whose contents are
//! loaded from and saved back to a plain binary image.

use spiflash_fs_core::config::FlashConfig;
use spiflash_fs_dummy::{DummyChip, DummyConfig};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading or saving a chip image
#[derive(Debug, Error)]
pub enum ImageError {
    /// The image could not be read
    #[error("failed to read image {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The image could not be written
    #[error("failed to write image {path:?}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The image does not fit the configured chip
    #[error("image {path:?} is {actual} bytes, larger than the {expected} byte chip")]
    TooLarge {
        path: PathBuf,
        actual: usize,
        expected: usize,
    },
}

/// Chip size needed to hold the configured region
pub fn chip_size(cfg: &FlashConfig) -> usize {
    cfg.end_addr as usize
}

/// Load an image into an emulated chip
///
/// A missing image yields an erased chip; a short one is padded with 0xFF.
pub fn load(path: &Path, cfg: &FlashConfig) -> Result<DummyChip, ImageError> {
    let config = DummyConfig {
        size: chip_size(cfg),
        page_size: cfg.write_page_size as usize,
        ..DummyConfig::default()
    };

    let data = match fs::read(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("Image {:?} not found, starting from an erased chip", path);
            return Ok(DummyChip::new(config));
        }
        Err(source) => {
            return Err(ImageError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    if data.len() > config.size {
        return Err(ImageError::TooLarge {
            path: path.to_path_buf(),
            actual: data.len(),
            expected: config.size,
        });
    }

    log::debug!("Loaded {} bytes from {:?}", data.len(), path);
    Ok(DummyChip::with_data(config, &data))
}

/// Save the chip contents back to an image
pub fn save(path: &Path, chip: &DummyChip) -> Result<(), ImageError> {
    fs::write(path, chip.data()).map_err(|source| ImageError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    log::debug!("Saved {} bytes to {:?}", chip.data().len(), path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("spiflash-fs-{}-{}", std::process::id(), name))
    }

    #[test]
    fn test_missing_image_is_erased() {
        let cfg = FlashConfig::DEFAULT.with_region(0, 0x2_0000);
        let chip = load(&temp_path("missing.img"), &cfg).unwrap();
        assert_eq!(chip.data().len(), 0x2_0000);
        assert!(chip.data().iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_roundtrip_and_padding() {
        let cfg = FlashConfig::DEFAULT.with_region(0, 0x2_0000);
        let path = temp_path("short.img");
        fs::write(&path, [1u8, 2, 3]).unwrap();

        let chip = load(&path, &cfg).unwrap();
        assert_eq!(&chip.data()[..4], &[1, 2, 3, 0xFF]);

        save(&path, &chip).unwrap();
        assert_eq!(fs::read(&path).unwrap().len(), 0x2_0000);
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_oversized_image_is_rejected() {
        let cfg = FlashConfig::DEFAULT.with_region(0, 0x1_0000);
        let path = temp_path("big.img");
        fs::write(&path, vec![0u8; 0x1_0001]).unwrap();

        let err = load(&path, &cfg).err();
        assert!(matches!(err, Some(ImageError::TooLarge { actual: 0x1_0001, .. })));
        fs::remove_file(&path).unwrap();
    }
}
