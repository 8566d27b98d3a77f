mod api;
mod methods;

pub use api::{RwaBuildRpcApiServer, RwaReadRpcApiServer};
