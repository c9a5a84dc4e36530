use std::path::Path;
use tricks_processing::ImageKind;

/// Every extension a stored image may carry.
pub fn stored_extensions() -> Vec<&'static str> {
    ImageKind::ALL
        .iter()
        .flat_map(|kind| kind.extensions().iter().copied())
        .collect()
}

/// File name of `path`, used as the upload's original name.
pub fn original_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
}


/// Initialize tracing for CLI binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();
}
