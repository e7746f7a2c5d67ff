//! Static dashboard assets.
//!
//! Files are served from a fixed root directory. `/` maps to `index.html`,
//! the content type is inferred from the file extension, and a missing file
//! is a plain `404`.

use std::path::Path;

use tower_http::services::ServeDir;

/// Build the service that serves files beneath `root`.
pub fn static_files(root: &Path) -> ServeDir {
    ServeDir::new(root).append_index_html_on_directories(true)
}
