use rustc_version::{version_meta, Channel};

// Feature-gated items (e.g. JSON lines output) are labeled in the docs when built on nightly.
fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rustc-check-cfg=cfg(CHANNEL_NIGHTLY)");
    let is_nightly = version_meta()
        .map(|meta| meta.channel == Channel::Nightly)
        .unwrap_or(false);
    if is_nightly {
        println!("cargo:rustc-cfg=CHANNEL_NIGHTLY");
    }
}
