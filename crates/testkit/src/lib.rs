#![warn(missing_docs)]
//! Test fakes and golden-file snapshots shared by the pane3d crates.

mod fakes;
mod snapshot;

pub use fakes::{FakeCamera, FakeImageFetcher, FakeVideoStream, Gate};
pub use snapshot::{assert_json_snapshot, snapshot_path, to_canonical_json, UPDATE_SNAPSHOTS_ENV};
