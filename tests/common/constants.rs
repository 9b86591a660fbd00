//! Shared constants for end-to-end tests

// ============================================================================
// Test User Credentials
// ============================================================================

/// Regular test user handle
pub const TEST_USER: &str = "testuser";

/// Regular test user password
pub const TEST_PASS: &str = "testpass123";

// ============================================================================
// Test Library
// ============================================================================

/// Ids of the songs sent with every recommendation request, in order.
/// The model refers to them by 1-based position.
pub const SONG_IDS: [&str; 4] = ["song-a", "song-b", "song-c", "song-d"];

// ============================================================================
// Timing
// ============================================================================

pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

pub const REQUEST_TIMEOUT_SECS: u64 = 10;
