//! TOML configuration file parsing
//!
//! Parses flash configuration files in TOML format:
//!
//! ```toml
//! [region]
//! start = 0x000000
//! end = "16 MiB"
//!
//! [geometry]
//! erase_block = "64 KiB"
//! log_block = "64 KiB"
//! log_page = 256
//! write_page = 256
//! address_width = 3
//!
//! [bus]
//! target = 0
//!
//! # Optional, defaults follow the address width
//! [opcodes]
//! read = 0x03
//! write = 0x02
//! erase = 0xD8
//! write_enable = 0x06
//! read_status = 0x05
//!
//! # Optional
//! [busy]
//! program_poll_us = 10
//! program_max_polls = 1000
//! erase_poll_us = 10000
//! erase_max_polls = 400
//! ```

use std::fs;
use std::path::Path;
use std::string::{String, ToString};
use std::format;

use super::{BusyPolicy, FlashConfig, Opcodes};
use crate::spi::AddressWidth;

/// Errors from loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that was being read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML or has wrong field types
    #[error("invalid configuration: {0}")]
    Parse(#[from] ::toml::de::Error),

    /// Values parse but describe an impossible geometry
    #[error("inconsistent configuration: {0}")]
    Invalid(crate::error::Error),
}

#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfigFile {
    region: TomlRegion,
    geometry: TomlGeometry,
    #[serde(default)]
    bus: Option<TomlBus>,
    #[serde(default)]
    opcodes: Option<TomlOpcodes>,
    #[serde(default)]
    busy: Option<TomlBusy>,
}

#[derive(Debug, serde::Deserialize)]
struct TomlRegion {
    #[serde(deserialize_with = "deserialize_size")]
    start: u32,
    #[serde(deserialize_with = "deserialize_size")]
    end: u32,
}

#[derive(Debug, serde::Deserialize)]
struct TomlGeometry {
    #[serde(deserialize_with = "deserialize_size")]
    erase_block: u32,
    #[serde(deserialize_with = "deserialize_size")]
    log_block: u32,
    #[serde(deserialize_with = "deserialize_size")]
    log_page: u32,
    #[serde(deserialize_with = "deserialize_size")]
    write_page: u32,
    #[serde(default)]
    address_width: AddressWidth,
}

#[derive(Debug, serde::Deserialize)]
struct TomlBus {
    target: u8,
}

#[derive(Debug, serde::Deserialize)]
struct TomlOpcodes {
    read: u8,
    write: u8,
    erase: u8,
    write_enable: u8,
    read_status: u8,
}

#[derive(Debug, serde::Deserialize)]
struct TomlBusy {
    program_poll_us: u32,
    program_max_polls: u32,
    erase_poll_us: u32,
    erase_max_polls: u32,
}

/// Deserialize a u32 that can be an integer, a hex string or a size string
fn deserialize_size<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SizeOrInt {
        Int(u32),
        Str(String),
    }

    match SizeOrInt::deserialize(deserializer)? {
        SizeOrInt::Int(n) => Ok(n),
        SizeOrInt::Str(s) => parse_size(&s).map_err(serde::de::Error::custom),
    }
}

/// Parse a size string like "64 KiB", "0x1000" or "4096"
fn parse_size(s: &str) -> Result<u32, String> {
    let s = s.trim();

    if let Ok(n) = s.parse::<u32>() {
        return Ok(n);
    }

    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u32::from_str_radix(hex.trim(), 16).map_err(|e| format!("invalid hex: {}", e));
    }

    let s_lower = s.to_lowercase();
    let (num_str, multiplier) = if let Some(n) = s_lower.strip_suffix("mib") {
        (n.trim(), 1024 * 1024)
    } else if let Some(n) = s_lower.strip_suffix("kib") {
        (n.trim(), 1024)
    } else if let Some(n) = s_lower.strip_suffix('b') {
        (n.trim(), 1)
    } else {
        return Err(format!("invalid size: {}", s));
    };

    let num: u32 = num_str.parse().map_err(|_| format!("invalid size: {}", s))?;
    num.checked_mul(multiplier)
        .ok_or_else(|| format!("size overflows 32 bits: {}", s))
}

impl FlashConfig {
    /// Load a configuration from a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate a configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: TomlConfigFile = ::toml::from_str(content)?;

        let mut cfg = FlashConfig::DEFAULT
            .with_region(file.region.start, file.region.end)
            .with_geometry(
                file.geometry.erase_block,
                file.geometry.log_block,
                file.geometry.log_page,
            )
            .with_write_page(file.geometry.write_page)
            .with_address_width(file.geometry.address_width);

        if let Some(bus) = file.bus {
            cfg = cfg.with_target(bus.target);
        }
        if let Some(op) = file.opcodes {
            cfg = cfg.with_opcodes(Opcodes {
                read: op.read,
                write: op.write,
                erase: op.erase,
                write_enable: op.write_enable,
                read_status: op.read_status,
            });
        }
        if let Some(busy) = file.busy {
            cfg.program_wait = BusyPolicy {
                poll_delay_us: busy.program_poll_us,
                max_polls: busy.program_max_polls,
            };
            cfg.erase_wait = BusyPolicy {
                poll_delay_us: busy.erase_poll_us,
                max_polls: busy.erase_max_polls,
            };
        }

        cfg.validate().map_err(ConfigError::Invalid)?;
        Ok(cfg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_size() {
        assert_eq!(parse_size("4096").unwrap(), 4096);
        assert_eq!(parse_size("0x1000").unwrap(), 4096);
        assert_eq!(parse_size("4 KiB").unwrap(), 4096);
        assert_eq!(parse_size("64KiB").unwrap(), 64 * 1024);
        assert_eq!(parse_size("16 MiB").unwrap(), 16 * 1024 * 1024);
        assert!(parse_size("16 parsecs").is_err());
        assert!(parse_size("8192 MiB").is_err());
    }

    #[test]
    fn test_parse_toml() {
        let toml = r#"
[region]
start = 0x100000
end = "2 MiB"

[geometry]
erase_block = "4 KiB"
log_block = "64 KiB"
log_page = 256
write_page = 256
address_width = 3

[bus]
target = 1
"#;
        let cfg = FlashConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.start_addr, 0x10_0000);
        assert_eq!(cfg.end_addr, 0x20_0000);
        assert_eq!(cfg.erase_block_size, 4096);
        assert_eq!(cfg.log_block_size, 65536);
        assert_eq!(cfg.target, 1);
        assert_eq!(cfg.opcodes, Opcodes::JEDEC_3B);
    }

    #[test]
    fn test_parse_toml_four_byte_with_opcodes() {
        let toml = r#"
[region]
start = 0
end = "32 MiB"

[geometry]
erase_block = "4 KiB"
log_block = "4 KiB"
log_page = 256
write_page = 256
address_width = 4

[opcodes]
read = 0x13
write = 0x12
erase = 0x21
write_enable = 0x06
read_status = 0x05
"#;
        let cfg = FlashConfig::from_toml_str(toml).unwrap();
        assert_eq!(cfg.address_width, AddressWidth::FourByte);
        assert_eq!(cfg.opcodes.erase, 0x21);
    }

    #[test]
    fn test_parse_toml_rejects_bad_width() {
        let toml = r#"
[region]
start = 0
end = "1 MiB"

[geometry]
erase_block = "4 KiB"
log_block = "4 KiB"
log_page = 256
write_page = 256
address_width = 2
"#;
        assert!(matches!(
            FlashConfig::from_toml_str(toml),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_parse_toml_rejects_inconsistent_geometry() {
        let toml = r#"
[region]
start = 0
end = "1 MiB"

[geometry]
erase_block = "64 KiB"
log_block = "4 KiB"
log_page = 256
write_page = 256
"#;
        assert!(matches!(
            FlashConfig::from_toml_str(toml),
            Err(ConfigError::Invalid(_))
        ));
    }
}
