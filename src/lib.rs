//! Chess rules engine: pseudo-legal move generation, legality filtering and
//! move execution with castling, en passant and promotion, plus a small
//! line-oriented text session to play through the rules.
//!
//! [`chess::game::GameState`] is the entry point for the rules and
//! [`Session`] drives a game from a text stream.

// Rustdoc lints.
#![warn(
    rustdoc::missing_crate_level_docs,
    rustdoc::broken_intra_doc_links,
    rustdoc::invalid_codeblock_attributes,
    rustdoc::invalid_html_tags,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]
#![deny(clippy::perf)]

pub mod chess;
mod session;

pub use session::Session;
use shadow_rs::shadow;

shadow!(build);

/// Returns the full version that can be used to identify how the binary was
/// built in the first place.
#[must_use]
pub fn engine_version() -> String {
    format!(
        "{} (commit {}, branch {})",
        build::PKG_VERSION,
        build::SHORT_COMMIT,
        build::BRANCH
    )
}

/// Prints information about the version and the build type on startup. The
/// banner goes to stderr, stdout carries session replies only.
pub fn print_engine_info() {
    eprintln!("Gambit chess rules engine {}", engine_version());
    eprintln!("Release build: {}", !shadow_rs::is_debug());
    if !shadow_rs::git_clean() {
        eprintln!("Warning: built with uncommitted changes");
    }
    eprintln!();
}
