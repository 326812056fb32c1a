use std::process::Command;

fn main() {
    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/index");

    let pkg_version = std::env::var("CARGO_PKG_VERSION").unwrap_or_default();

    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty"])
        .output();

    // Long version shown by `--version`; compatibility checks use CARGO_PKG_VERSION.
    let build = match output {
        Ok(o) if o.status.success() => {
            let git_output = String::from_utf8(o.stdout)
                .unwrap_or_default()
                .trim()
                .to_string();
            let describe = git_output.strip_prefix('v').unwrap_or(&git_output);
            if describe.is_empty() || describe == pkg_version {
                pkg_version.clone()
            } else {
                format!("{} ({})", pkg_version, describe)
            }
        }
        _ => pkg_version.clone(),
    };

    println!("cargo:rustc-env=GOPACKED_BUILD_VERSION={}", build);
}
