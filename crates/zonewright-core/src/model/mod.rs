// ── Domain model ──
//
// Canonical types shared by every stage of a run.

pub mod domain;
pub mod domain_id;

pub use domain::{DkimState, Domain, PLATFORM_LOGIN};
pub use domain_id::DomainId;
