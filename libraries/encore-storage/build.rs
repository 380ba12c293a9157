//! Build script for encore-storage.
//!
//! Migrations are embedded with `include_str!`, so the crate must be rebuilt
//! whenever one of them changes.

fn main() {
    // Trigger rebuild when migrations change
    println!("cargo:rerun-if-changed=migrations");
}
