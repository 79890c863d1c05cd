//! Test helpers for composing places files and stub boundary loaders.

use super::*;
use crate::boundary::LoaderFactory;
use camino::{Utf8Path, Utf8PathBuf};
use std::cell::RefCell;
use std::time::Duration;
use tempfile::TempDir;
use waymark_core::test_support::{sample_places, ukraine_boundary};
use waymark_data::PolygonSource;
use waymark_data::boundary::PolygonSourceConfig;
use waymark_data::boundary::test_support::StubBoundarySource;

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write test file");
}

/// Bundled boundary shipped at the repository root.
pub(super) fn bundled_boundary() -> Utf8PathBuf {
    Utf8PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../assets/ukraine.geojson")
}

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

    pub(super) fn root(&self) -> &Utf8Path {
        &self.root
    }

    /// Write the sample places and return the file path.
    pub(super) fn sample_places_file(&self) -> Utf8PathBuf {
        let path = self.path("places.json");
        let payload = serde_json::to_vec_pretty(&sample_places()).expect("serialize places");
        write_utf8(&path, &payload);
        path
    }
}

/// Factory handing out loaders over an in-memory Ukraine boundary.
#[derive(Default)]
pub(super) struct StubLoaderFactory {
    pub(super) configs: RefCell<Vec<PolygonSourceConfig>>,
}

impl LoaderFactory for StubLoaderFactory {
    fn build(&self, config: &PolygonSourceConfig) -> Result<PolygonSource, CliError> {
        self.configs.borrow_mut().push(config.clone());
        let (_, source) = StubBoundarySource::succeeding("stub", ukraine_boundary()).shared();
        Ok(PolygonSource::new([source], Duration::from_secs(1)))
    }
}
