//! Extension header content (GNU long names, PAX records)

use tar::PaxExtensions;

use crate::error::{Result, TarError};

/// Values a PAX header overrides for the next member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaxOverrides {
    pub path: Option<Vec<u8>>,
    pub size: Option<u64>,
}

/// Name carried by a GNU long-name header (NUL padding removed)
pub fn gnu_long_name(content: &[u8]) -> Vec<u8> {
    let end = content
        .iter()
        .rposition(|&b| b != 0)
        .map(|i| i + 1)
        .unwrap_or(0);
    content[..end].to_vec()
}

/// Parse the `path` and `size` records of a PAX header located at `offset`
pub fn pax_overrides(content: &[u8], offset: u64) -> Result<PaxOverrides> {
    let mut overrides = PaxOverrides::default();

    for item in PaxExtensions::new(content) {
        let extension =
            item.map_err(|e| TarError::malformed(offset, format!("bad PAX record: {}", e)))?;
        let key = extension
            .key()
            .map_err(|e| TarError::malformed(offset, format!("bad PAX key: {}", e)))?;

        match key {
            "path" => overrides.path = Some(extension.value_bytes().to_vec()),
            "size" => {
                let size = extension
                    .value()
                    .ok()
                    .and_then(|v| v.parse::<u64>().ok())
                    .ok_or_else(|| TarError::malformed(offset, "bad PAX size record"))?;
                overrides.size = Some(size);
            }
            _ => {}
        }
    }

    Ok(overrides)
}
