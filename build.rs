use sha2::{Digest, Sha256};
use walkdir::WalkDir;

fn main() -> anyhow::Result<()> {
    println!("cargo:rerun-if-changed=static/css");

    let mut css_hasher = Sha256::new();
    for entry in WalkDir::new("static/css") {
        let entry = entry?;
        if entry.file_type().is_file() {
            css_hasher.update(std::fs::read_to_string(entry.path())?);
        }
    }

    let css_hash = css_hasher.finalize();
    println!("cargo:rustc-env=CSS_VERSION={:x}", css_hash);

    Ok(())
}
