mod response;

pub use response::{GatewayResponse, ResponseStatus};
