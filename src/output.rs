use anyhow::Result;
use serde_json::json;

use crate::estimate::SizeEstimate;
use crate::format::format_bytes;

pub fn text_lines(estimates: &[SizeEstimate]) -> Vec<String> {
    estimates
        .iter()
        .map(|estimate| {
            format!(
                "{}: {} ({} bytes)",
                estimate.label,
                format_bytes(estimate.bytes),
                estimate.bytes
            )
        })
        .collect()
}

pub fn ndjson_lines(estimates: &[SizeEstimate]) -> Result<Vec<String>> {
    let mut lines = Vec::with_capacity(estimates.len());
    for estimate in estimates {
        lines.push(serde_json::to_string(&json!({
            "type": "size_estimate",
            "estimate": estimate,
        }))?);
    }
    Ok(lines)
}
