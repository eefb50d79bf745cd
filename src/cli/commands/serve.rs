//! Serve command.

use crate::config::Settings;

/// Run serve command.
#[cfg(feature = "http-server")]
pub async fn run(settings: &Settings, bind: Option<String>) {
    if let Err(e) = crate::api::serve(settings, bind).await {
        eprintln!("Server error: {e}");
        std::process::exit(1);
    }
}

#[cfg(not(feature = "http-server"))]
pub async fn run(_settings: &Settings, _bind: Option<String>) {
    eprintln!("HTTP server support is not compiled in.");
    eprintln!("Please rebuild with: cargo build --features http-server");
    std::process::exit(1);
}
