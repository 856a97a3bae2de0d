use std::{env, path::PathBuf};

/// Windows builds link FFmpeg through `FFMPEG_DIR`; point at a vcpkg
/// install when one is present but the variable is missing.
fn main() {
    for variable in ["FFMPEG_DIR", "VCPKG_ROOT", "VCPKGRS_TRIPLET"] {
        println!("cargo:rerun-if-env-changed={variable}");
    }

    let is_windows = env::var("CARGO_CFG_TARGET_OS").is_ok_and(|os| os == "windows");
    if !is_windows || env::var_os("FFMPEG_DIR").is_some() {
        return;
    }

    let Some(vcpkg_root) = env::var_os("VCPKG_ROOT") else {
        println!("cargo:warning=framegrab needs FFmpeg: set FFMPEG_DIR (or VCPKG_ROOT) before building on Windows.");
        return;
    };

    let triplet = env::var("VCPKGRS_TRIPLET").unwrap_or_else(|_| "x64-windows".to_string());
    let candidate = PathBuf::from(vcpkg_root).join("installed").join(triplet);
    if candidate.is_dir() {
        println!(
            "cargo:warning=FFMPEG_DIR is unset; vcpkg FFmpeg found at {}, export FFMPEG_DIR to use it.",
            candidate.display()
        );
    } else {
        println!(
            "cargo:warning=No FFmpeg under {}; install it with `vcpkg install ffmpeg`.",
            candidate.display()
        );
    }
}
