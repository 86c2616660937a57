use std::path::Path;

use anyhow::Context;
use ksmscope::{File, KsmFile};
use log::debug;

/// Load a KSM container and decode its payload.
///
/// Returns the container alongside the decoded file so callers can report
/// payload-level facts (size) without re-reading the disk.
pub fn load_ksm(path: &Path) -> anyhow::Result<(File, KsmFile)> {
    let file = File::from_file(path)
        .with_context(|| format!("failed to load KSM container: {}", path.display()))?;
    debug!("decompressed payload: {} bytes", file.len());

    let ksm = file
        .disassemble()
        .with_context(|| format!("failed to decode KSM payload: {}", path.display()))?;
    debug!(
        "decoded {} arguments, {} code units, {} debug lines",
        ksm.arguments().len(),
        ksm.units().len(),
        ksm.debug().lines.len()
    );

    Ok((file, ksm))
}

/// Extract a display-friendly filename from a path.
pub fn file_display_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    )
}
