pub mod traits;
pub mod schema;
pub mod error;
pub mod registry;
mod macros;

pub use registry::{FnService, ServiceRegistry};
pub use schema::{ArgSchema, CommandDescriptor};
pub use traits::ServiceFunction;
