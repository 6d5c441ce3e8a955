//! Flat relation files, the bundle transport contract and the cross-host
//! aggregation workflow.

mod bundle;
mod flatfile;
mod workflow;

pub use bundle::{bundle_name, discover_bundles, BundleTransport, DirBundle};
pub use flatfile::{read_rows, read_snapshot, write_rows, write_snapshot};
pub use workflow::{load_bundle, load_snapshot, package_snapshot, replay_bundles, BundleState};
