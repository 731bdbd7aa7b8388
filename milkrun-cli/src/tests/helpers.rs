//! Test helpers for composing stops fixtures and temporary databases.

use super::*;
use camino::Utf8PathBuf;
use milkrun_core::{DriverId, FulfillmentStatus, RoutePosition, Stop, StopId};
use tempfile::TempDir;

/// Temporary directory with UTF-8 paths for fixtures and databases.
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

    pub(super) fn write_stops_fixture(&self, name: &str, stops: &[Stop]) -> Utf8PathBuf {
        let path = self.path(name);
        let payload = serde_json::to_string_pretty(stops).expect("serialise stops");
        std::fs::write(&path, payload).expect("write stops fixture");
        path
    }
}

pub(super) fn assigned_stop(id: u64, zip: &str) -> Stop {
    Stop::new(StopId(id), Some(zip.into()))
        .with_driver(DriverId(7))
        .with_status(FulfillmentStatus::DriverAssigned)
}

pub(super) fn delivered_stop(id: u64, zip: &str, position: u32) -> Stop {
    assigned_stop(id, zip)
        .with_status(FulfillmentStatus::Delivered)
        .with_position(RoutePosition::new(position).expect("non-zero position"))
}
