// build.rs - Build script for ShotScan
//
// Rejects a malformed crate version at build time.

use semver::Version;

fn main() {
    let version_str = env!("CARGO_PKG_VERSION");
    Version::parse(version_str).expect("Invalid version format in Cargo.toml");
}
