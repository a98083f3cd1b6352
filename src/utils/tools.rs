use log::info;

/// Versions des dépendances principales, injectées par `build.rs`.
pub fn core_dependency_versions() -> [(&'static str, &'static str); 3] {
    [
        ("glam", option_env!("GLAM_VERSION").unwrap_or("Unknown")),
        ("rand", option_env!("RAND_VERSION").unwrap_or("Unknown")),
        ("image", option_env!("IMAGE_VERSION").unwrap_or("Unknown")),
    ]
}

/// Affiche les informations Rust et les dépendances principales de la compilation.
pub fn show_rust_core_dependencies() {
    info!(
        "Rust compiler version: {}",
        rustc_version_runtime::version()
    );
    info!("  Platform    : {}", std::env::consts::OS);
    info!("  Arch        : {}", std::env::consts::ARCH);

    info!("Rust core dependancies");
    for (name, version) in core_dependency_versions() {
        info!("  {:<5} version: {}", name, version);
    }
}
