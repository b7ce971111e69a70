//! Serve command handler.

use std::sync::Arc;

use anyhow::Result;
use docconv_runtime::SofficeConverter;
use tracing::{info, warn};

use crate::commands::ServeArgs;

/// Run the HTTP service until Ctrl-C.
pub async fn execute(args: ServeArgs) -> Result<()> {
    let config = args.to_config();
    let converter = SofficeConverter::new(&args.soffice);

    match converter.version().await {
        Ok(version) => info!(engine = %version, "Conversion engine found"),
        Err(e) => warn!(
            error = %e,
            "Conversion engine not runnable; uploads will fail until it is installed"
        ),
    }

    docconv_axum::start_server(config, Arc::new(converter)).await
}
