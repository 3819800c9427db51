//! Shared constants used across the application

/// Space reserved for streaming indicator + margin in input areas
/// This must be consistently used in both UI rendering and text calculations
/// to prevent horizontal scrolling issues.
pub const INDICATOR_SPACE: u16 = 4;

/// Rows taken by the input box, borders included.
/// The renderer and the scroll math must agree on this or the last
/// transcript line hides behind the input border.
pub const INPUT_AREA_HEIGHT: u16 = 3;

/// Base URL of the local LM Studio server when `--host` is not given.
pub const DEFAULT_SERVER_HOST: &str = "http://127.0.0.1:1234";

/// Model selected at startup when `-m` is not given; also the sole entry
/// in the selectable list when the model fetch fails.
pub const DEFAULT_MODEL_ID: &str = "meta-llama-3.1-8b-instruct";
