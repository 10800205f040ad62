//! Async Level Loading
//!
//! Level retrieval runs on a Tokio task so the frame loop never blocks. The
//! caller gets a [`PendingLoad`] and polls it once per tick; until it
//! resolves, the current level stays authoritative.
//!
//! In-flight loads cannot be cancelled. Dropping the handle only discards
//! the result. Outside a Tokio runtime a load resolves at once to
//! [`LevelError::NoRuntime`].

use std::path::PathBuf;

use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

use crate::game::grid::TileGrid;
use crate::level::codec::{parse_level_text, LevelError};

/// Handle to a level load running in the background.
#[derive(Debug)]
pub struct PendingLoad {
    /// What is being loaded (path or "level code"), for notices
    label: String,
    rx: oneshot::Receiver<Result<TileGrid, LevelError>>,
}

impl PendingLoad {
    fn spawn<F>(label: String, load: F) -> Self
    where
        F: std::future::Future<Output = Result<TileGrid, LevelError>> + Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        match Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    // Receiver may already be gone if the request was superseded
                    let _ = tx.send(load.await);
                });
            }
            Err(_) => {
                tracing::warn!(label = %label, "level load requested outside a Tokio runtime");
                let _ = tx.send(Err(LevelError::NoRuntime));
            }
        }
        Self { label, rx }
    }

    /// What this load is reading.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Non-blocking check. `None` while the load is still running.
    pub fn poll(&mut self) -> Option<Result<TileGrid, LevelError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(LevelError::LoaderDropped)),
        }
    }

    /// Wait for the load to finish.
    pub async fn wait(self) -> Result<TileGrid, LevelError> {
        self.rx.await.unwrap_or_else(|_| Err(LevelError::LoaderDropped))
    }
}

/// Load a level file (JSON row array or hex level code).
pub fn spawn_file_load(path: impl Into<PathBuf>) -> PendingLoad {
    let path = path.into();
    let label = path.display().to_string();
    tracing::debug!(path = %label, "loading level file");

    PendingLoad::spawn(label, async move {
        let text = tokio::fs::read_to_string(&path).await?;
        parse_level_text(&text)
    })
}

/// Decode a pasted level code off the frame loop.
pub fn spawn_code_load(code: impl Into<String>) -> PendingLoad {
    let code = code.into();
    PendingLoad::spawn("level code".to_string(), async move { parse_level_text(&code) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::tile::TileKind;
    use crate::level::codec::encode_level;

    fn sample() -> TileGrid {
        let mut grid = TileGrid::new(4, 6);
        grid.fill_row(3, TileKind::Ground);
        grid.set(2, 4, TileKind::Flag);
        grid
    }

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("tilerun-{}-{}", std::process::id(), name))
    }

    #[tokio::test]
    async fn test_code_load_resolves() {
        let code = encode_level(&sample()).unwrap();
        let grid = spawn_code_load(code).wait().await.unwrap();
        assert_eq!(grid, sample());
    }

    #[tokio::test]
    async fn test_bad_code_reports_error() {
        let result = spawn_code_load("not a level").wait().await;
        assert!(matches!(result, Err(LevelError::Hex(_))));
    }

    #[tokio::test]
    async fn test_file_load_reads_code_file() {
        let path = temp_path("code.lvl");
        tokio::fs::write(&path, encode_level(&sample()).unwrap()).await.unwrap();

        let pending = spawn_file_load(path.clone());
        assert!(pending.label().ends_with("code.lvl"));
        let grid = pending.wait().await.unwrap();
        assert_eq!(grid, sample());

        let _ = tokio::fs::remove_file(&path).await;
    }

    #[tokio::test]
    async fn test_missing_file_is_io_error() {
        let result = spawn_file_load(temp_path("missing.lvl")).wait().await;
        assert!(matches!(result, Err(LevelError::Io(_))));
    }

    #[test]
    fn test_load_without_runtime_resolves_to_error() {
        let mut pending = spawn_code_load("[[1, 1], [1, 1]]");
        assert!(matches!(pending.poll(), Some(Err(LevelError::NoRuntime))));
    }

    #[tokio::test]
    async fn test_poll_until_ready() {
        let mut pending = spawn_code_load("[[1, 1], [1, 1]]");

        let mut result = None;
        for _ in 0..1000 {
            result = pending.poll();
            if result.is_some() {
                break;
            }
            tokio::task::yield_now().await;
        }

        let grid = result.unwrap().unwrap();
        assert_eq!(grid.count(TileKind::Ground), 4);
    }
}
