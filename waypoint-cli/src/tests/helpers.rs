//! Test helpers for writing point files and stubbing the routing backend.

use super::*;
use camino::{Utf8Path, Utf8PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use waypoint_data::routing::test_support::StubTransport;

/// Builds every client over one shared stub transport.
#[derive(Debug, Clone)]
pub(super) struct StubClientFactory {
    pub(super) stub: Arc<StubTransport>,
}

impl StubClientFactory {
    pub(super) fn new(stub: StubTransport) -> Self {
        Self {
            stub: Arc::new(stub),
        }
    }
}

impl ClientFactory for StubClientFactory {
    fn build(&self, config: RoutingClientConfig) -> Result<OsrmRoutingClient, CliError> {
        Ok(OsrmRoutingClient::with_transport(
            config,
            self.stub.clone(),
        )?)
    }
}

/// A temporary directory addressed by a UTF-8 path.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}
