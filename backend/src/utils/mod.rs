//! # Utilities Module
//!
//! This module contains helper functions and utilities used
//! across the backend service.

/// Truncate a string to a maximum length.
///
/// Useful for logging long addresses. Keeps both ends and joins
/// them with `...`.
///
/// ## Examples
///
/// ```rust,ignore
/// assert_eq!(
///     truncate_string("0x70997970C51812dc3A010C7d01b50e0d17dc79C8", 13),
///     "0x709...c79C8"
/// );
/// ```
pub fn truncate_string(s: &str, max_len: usize) -> String {
    let len = s.chars().count();
    if len <= max_len {
        return s.to_string();
    }

    let half = max_len.saturating_sub(3) / 2;
    let head: String = s.chars().take(half).collect();
    let tail: String = s.chars().skip(len - half).collect();
    format!("{}...{}", head, tail)
}
