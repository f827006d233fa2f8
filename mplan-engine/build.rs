//! Build identification for the `mplan` startup log line
//!
//! Exports to the crate at compile time:
//! - `GIT_HASH`: short commit, `-dirty` when the work tree has changes, or
//!   `MPLAN_BUILD_ID` when set (source tarballs have no git metadata)
//! - `BUILD_TIMESTAMP`: RFC 3339, pinned by `SOURCE_DATE_EPOCH` when set
//! - `BUILD_PROFILE`: cargo profile (debug/release)

use std::env;
use std::path::Path;
use std::process::Command;

use chrono::{DateTime, SecondsFormat, Utc};

fn main() {
    let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
    let git_dir = Path::new(&manifest_dir).join("..").join(".git");

    println!("cargo:rerun-if-env-changed=MPLAN_BUILD_ID");
    println!("cargo:rerun-if-env-changed=SOURCE_DATE_EPOCH");
    // Without git metadata there is nothing to watch; cargo then reruns every build
    for watched in ["HEAD", "index"] {
        let path = git_dir.join(watched);
        if path.exists() {
            println!("cargo:rerun-if-changed={}", path.display());
        }
    }

    println!("cargo:rustc-env=GIT_HASH={}", build_id());
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", build_timestamp());
    println!(
        "cargo:rustc-env=BUILD_PROFILE={}",
        env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string())
    );
}

fn build_id() -> String {
    if let Some(id) = env::var("MPLAN_BUILD_ID").ok().filter(|id| !id.trim().is_empty()) {
        return id.trim().to_string();
    }

    let Some(hash) = git(&["rev-parse", "--short=8", "HEAD"]) else {
        return "unknown".to_string();
    };
    match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{}-dirty", hash),
        _ => hash,
    }
}

fn build_timestamp() -> String {
    let pinned = env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.trim().parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    pinned
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Trimmed stdout of a successful git command
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|s| s.trim().to_string())
}
