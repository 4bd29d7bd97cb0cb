//! Embeds the release version in the binary.
use std::process::Command;

fn main() {
    // PIPAC_VERSION from the release workflow wins over git describe.
    if let Ok(version) = std::env::var("PIPAC_VERSION") {
        println!("cargo:rustc-env=PIPAC_VERSION={version}");
    } else if let Ok(output) = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output()
        && output.status.success()
    {
        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        println!("cargo:rustc-env=PIPAC_VERSION={version}");
    }

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/");
    println!("cargo:rerun-if-env-changed=PIPAC_VERSION");
}
