//! # Boundary Layer
//!
//! Collaborators the core calls into but never takes decisions from.
//!
//! ## Modules
//!
//! - **`display_config`**: Loads the presentation settings (`display.toml`) from the
//!   user's config directory.
//! - **`logging`**: Installs the `env_logger` backend at the level picked by the
//!   built-in `--debug` / `--verbose` flags.
//! - **`presenter`**: The `Presenter` trait and the default terminal implementation
//!   used for errors, help, completion candidates and the dispatch header/footer.

pub mod display_config;
pub mod logging;
pub mod presenter;
