//! Directory client contract
//!
//! Capability trait and strongly typed identifiers for the target directory:
//! the platform holding scopes, members and access groups. Concrete
//! transports live in adapter crates such as `rostersync-directory-rest`.

pub mod error;
pub mod ids;
pub mod traits;
pub mod types;

pub use error::{DirectoryError, DirectoryResult};
pub use ids::{GroupId, ParseUserIdError, ScopeId, UserId};
pub use traits::DirectoryClient;
pub use types::{GroupSelector, Member};
