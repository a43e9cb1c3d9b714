fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    // Reported by `boq --version`
    let target = std::env::var("TARGET").unwrap_or_else(|_| "unknown".to_string());
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    println!("cargo:rustc-env=BOQ_BUILD_TARGET={}", target);
    println!("cargo:rustc-env=BOQ_BUILD_PROFILE={}", profile);
}
