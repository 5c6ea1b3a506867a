// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Input path sources.
//
// The run loop pulls one path at a time from any iterator, so batch
// arguments and the interactive file dialog are interchangeable.

use std::path::PathBuf;

/// Image extensions offered by the file dialog.
#[cfg(feature = "dialog")]
const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff", "webp"];

/// Yields one path per dialog selection and ends when the user cancels.
#[cfg(feature = "dialog")]
#[derive(Debug, Default)]
pub struct DialogPaths {
    done: bool,
}

#[cfg(feature = "dialog")]
impl Iterator for DialogPaths {
    type Item = PathBuf;

    fn next(&mut self) -> Option<PathBuf> {
        if self.done {
            return None;
        }
        let picked = rfd::FileDialog::new()
            .set_title("Choose a photo")
            .add_filter("Images", IMAGE_EXTENSIONS)
            .pick_file();
        match picked {
            Some(path) => {
                tracing::info!(path = %path.display(), "image selected");
                Some(path)
            }
            None => {
                tracing::info!("file selection cancelled");
                self.done = true;
                None
            }
        }
    }
}

/// Pick the path source. The given paths always come first; in interactive
/// mode the dialog then supplies more until cancelled.
pub fn path_source(paths: Vec<PathBuf>, interactive: bool) -> Box<dyn Iterator<Item = PathBuf>> {
    #[cfg(feature = "dialog")]
    if interactive {
        if !paths.is_empty() {
            tracing::info!(count = paths.len(), "reading argument paths before opening the dialog");
        }
        return Box::new(paths.into_iter().chain(DialogPaths::default()));
    }
    #[cfg(not(feature = "dialog"))]
    if interactive {
        tracing::warn!("built without the `dialog` feature; reading paths from arguments");
    }
    Box::new(paths.into_iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn batch_source_yields_paths_in_order() {
        let paths = vec![PathBuf::from("a.jpg"), PathBuf::from("b.png")];
        let collected: Vec<PathBuf> = path_source(paths.clone(), false).collect();
        assert_eq!(collected, paths);
    }

    #[cfg(not(feature = "dialog"))]
    #[test]
    fn interactive_without_dialog_keeps_argument_paths() {
        let paths = vec![PathBuf::from("front.jpg"), PathBuf::from("rear.jpg")];
        let collected: Vec<PathBuf> = path_source(paths.clone(), true).collect();
        assert_eq!(collected, paths);
    }

    #[test]
    fn empty_batch_ends_immediately() {
        assert_eq!(path_source(Vec::new(), false).count(), 0);
    }
}
