//! Terminal UI layer for the interactive chat session.
//!
//! The UI module owns rendering, keyboard and mouse handling, and loop
//! control for the text user interface.
//!
//! Key submodules include:
//! - [`chat_loop`]: the main interaction loop that dispatches user input to
//!   [`crate::commands`] and coordinates streaming via [`crate::core::chat_stream`].
//! - [`renderer`] and [`markdown`]: view composition and frame output.
//! - [`theme`]: color and style policy.
//! - [`picker`]: the modal model selector.
//!
//! Ownership boundary: this layer presents and captures interaction state, while
//! [`crate::core`] owns conversation state and backend coordination.

pub mod chat_loop;
pub mod markdown;
pub mod picker;
pub mod renderer;
pub mod theme;
