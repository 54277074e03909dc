use std::process::Command;

/// `git describe` output without the leading `v`, or `None` outside a checkout.
fn git_describe() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty=+modified"])
        .output()
        .ok()
        .filter(|o| o.status.success())?;
    let described = String::from_utf8(output.stdout).ok()?;
    let described = described.trim();
    let described = described.strip_prefix('v').unwrap_or(described);
    (!described.is_empty()).then(|| described.to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    // Tarball builds report the manifest version.
    let version = git_describe().unwrap_or_else(|| {
        std::env::var("CARGO_PKG_VERSION").unwrap_or_else(|_| "0.0.0".to_string())
    });
    println!("cargo:rustc-env=FETCHWRAP_VERSION={}", version);
}
