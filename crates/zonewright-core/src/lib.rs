//! Zone file, BIND configuration and DKIM synthesis for hosted domains.
//!
//! A run reads the hosted domains from a [`DomainStore`], arranges them into
//! a [`DomainForest`] by their delegation links, and walks that forest:
//!
//! - **[`ZoneGenerator`]** renders one domain's records (SOA/NS, MX, SPF,
//!   DKIM, NS delegations, A/AAAA fan-out).
//! - **[`ZoneTreeWalker`]** decides per domain whether it owns a zone file,
//!   is inlined into an ancestor's zone, or is served from an administrator
//!   file, and returns everything it produced as a [`WalkOutcome`].
//! - **[`orchestrator`]** writes the results to disk atomically, persists
//!   serials, reloads the name server and prunes stale zone files. The DKIM
//!   pass provisions key pairs and the signing milter's lists.
//!
//! All behaviour is driven by one immutable [`GeneratorConfig`]. External
//! effects go through small traits ([`DomainStore`], [`CommandRunner`],
//! [`KeyGenerator`], [`HostResolver`]) so runs can be exercised in tests.

pub mod bindconf;
pub mod config;
pub mod dkim;
pub mod error;
pub mod exec;
pub mod fs;
pub mod keygen;
pub mod model;
pub mod orchestrator;
pub mod resolve;
pub mod serial;
pub mod store;
pub mod sync;
pub mod tree;
pub mod walker;
pub mod zone;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{
    AdspPolicy, BindSettings, DkimSettings, GeneratorConfig, NameServer, SpfSettings,
};
pub use error::CoreError;
pub use exec::{CommandOutput, CommandRunner, ExecError, ShellRunner};
pub use keygen::{KeyGenerator, KeyPair, OpensslKeyGenerator};
pub use model::{DkimState, Domain, DomainId};
pub use orchestrator::{DkimReport, RunReport, plan, write_configs, write_dkim_configs};
pub use resolve::{HostResolver, SystemResolver};
pub use store::{DomainRecord, DomainStore, JsonDomainStore, MemoryStore, StoreError};
pub use tree::{DomainForest, LinkAnomaly};
pub use walker::{DomainRole, PlanEntry, WalkOutcome, ZoneTreeWalker};
pub use zone::{ZoneBody, ZoneError, ZoneGenerator};
