//! Time formatting helpers.

/// Nominal seconds per block, used only for human-readable estimates.
pub const NOMINAL_BLOCK_SECS: u64 = 600;

/// Format a duration in seconds to a human-readable string.
pub fn format_duration(secs: u64) -> String {
    if secs < 60 {
        format!("{}s", secs)
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else if secs < 86400 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else {
        format!("{}d {}h", secs / 86400, (secs % 86400) / 3600)
    }
}

/// Format a window length in blocks with its approximate wall time.
pub fn format_blocks(blocks: u64) -> String {
    let unit = if blocks == 1 { "block" } else { "blocks" };
    format!(
        "{blocks} {unit} (~{})",
        format_duration(blocks.saturating_mul(NOMINAL_BLOCK_SECS))
    )
}
