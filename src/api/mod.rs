/// Provider API collaborators: service traits, their HTTP implementation,
/// and the session that hands out clients.
pub mod compute;
pub mod errors;
pub mod http;
pub mod object_store;
pub mod session;

pub use compute::{ComputeApi, ServerListOpts, extract_server, extract_servers};
pub use errors::ApiError;
pub use object_store::{ContainerListOpts, ContainerOpts, ObjectStoreApi};
pub use session::{HttpSession, Service, Session};
