use chrono::DateTime;

/// Format a ledger timestamp (unix seconds) for display. Timestamps the ledger
/// could not have produced fall back to the raw number.
pub fn format_timestamp(timestamp: u64) -> String {
	match DateTime::from_timestamp(timestamp as i64, 0) {
		Some(datetime) => datetime.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
		None => timestamp.to_string(),
	}
}

/// Shorten an account address for display: `0x1234…abcd`. Counts characters,
/// not bytes, so author strings that are not plain hex are safe to pass.
pub fn shorten_address(address: &str) -> String {
	let chars: Vec<char> = address.chars().collect();
	if chars.len() <= 10 {
		return address.to_string();
	}
	let head: String = chars[..6].iter().collect();
	let tail: String = chars[chars.len() - 4..].iter().collect();
	format!("{head}…{tail}")
}
