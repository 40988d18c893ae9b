//! Generates `include/fatsecret.h` from the `extern "C"` surface.

use std::path::PathBuf;

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-changed=cbindgen.toml");

    let crate_dir = PathBuf::from(std::env::var("CARGO_MANIFEST_DIR").unwrap());
    let config = cbindgen::Config::from_root_or_default(&crate_dir);

    match cbindgen::generate_with_config(&crate_dir, config) {
        Ok(bindings) => {
            let include = crate_dir.join("include");
            if let Err(e) = std::fs::create_dir_all(&include) {
                println!("cargo:warning=cannot create {}: {e}", include.display());
                return;
            }
            bindings.write_to_file(include.join("fatsecret.h"));
        }
        // best effort; the library builds without a header
        Err(e) => println!("cargo:warning=cbindgen failed: {e}"),
    }
}
