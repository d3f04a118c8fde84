//! Retrieves information about the version of the crate from Git and the build
//! environment. The session prints it on startup so that a transcript can be
//! traced back to the exact build that produced it.

fn main() -> shadow_rs::SdResult<()> {
    shadow_rs::new()
}
