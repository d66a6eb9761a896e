//! Build script that reports missing system dependencies.
//!
//! OpenCV and pkg-config are needed to build; `amixer` or `pactl` is only
//! needed at runtime by the volume backends, so all checks just warn.

use std::env;
use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=PKG_CONFIG_PATH");
    println!("cargo:rerun-if-env-changed=OPENCV_LINK_PATHS");
    println!("cargo:rerun-if-env-changed=OPENCV_INCLUDE_PATHS");

    match tool_version("pkg-config", &["--version"]) {
        Some(version) => println!("cargo:warning=Found pkg-config version: {version}"),
        None => hint(
            "pkg-config not found; it is needed to locate OpenCV.",
            &[("Ubuntu", "sudo apt-get install pkg-config"), ("Fedora", "sudo dnf install pkgconf-pkg-config")],
        ),
    }

    let opencv = ["opencv4", "opencv"]
        .into_iter()
        .find_map(|module| tool_version("pkg-config", &["--modversion", module]));
    match opencv {
        Some(version) => println!("cargo:warning=Found OpenCV version: {version}"),
        None => hint(
            "OpenCV not found via pkg-config. Make sure OpenCV is installed.",
            &[
                ("Ubuntu", "sudo apt-get install libopencv-dev clang libclang-dev"),
                ("Fedora", "sudo dnf install opencv-devel clang-devel"),
                ("macOS", "brew install opencv"),
            ],
        ),
    }

    if env::var("TARGET").unwrap_or_default().contains("linux") {
        let mixers: Vec<&str> = ["amixer", "pactl"]
            .into_iter()
            .filter(|tool| tool_version(tool, &["--version"]).is_some())
            .collect();
        if mixers.is_empty() {
            hint(
                "Neither amixer nor pactl found; only the log volume backend will work.",
                &[
                    ("Ubuntu", "sudo apt-get install alsa-utils pulseaudio-utils"),
                    ("Fedora", "sudo dnf install alsa-utils pulseaudio-utils"),
                ],
            );
        } else {
            println!("cargo:warning=Found volume tools: {}", mixers.join(", "));
        }
    }
}

/// First line of a tool's output, if it runs successfully
fn tool_version(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let stdout = String::from_utf8_lossy(&output.stdout);
    Some(stdout.lines().next().unwrap_or_default().trim().to_string())
}

fn hint(problem: &str, installs: &[(&str, &str)]) {
    println!("cargo:warning={problem}");
    for (platform, command) in installs {
        println!("cargo:warning=On {platform}: {command}");
    }
}
