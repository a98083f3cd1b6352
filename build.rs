// build.rs
use cargo_metadata::MetadataCommand;
use std::collections::HashSet;

fn main() {
    println!("cargo:rerun-if-changed=Cargo.toml");

    // Récupère la metadata du projet (non bloquant : hors-ligne ou sandbox, on ignore)
    let metadata = match MetadataCommand::new().exec() {
        Ok(metadata) => metadata,
        Err(e) => {
            println!("cargo:warning=⚪ cargo metadata indisponible ({e}), versions non exportées");
            return;
        }
    };

    // Ensemble des crates qui nous intéressent
    let tracked = HashSet::from(["glam", "rand", "image"]);

    for package in &metadata.packages {
        if tracked.contains(package.name.as_str()) {
            println!(
                "cargo:rustc-env={}_VERSION={}",
                package.name.to_uppercase(),
                package.version
            );
        }
    }
}
