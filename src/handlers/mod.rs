mod health;
mod preflight;
pub mod stream;

pub use health::is_alive;
pub use preflight::preflight;
pub use stream::stream_data;
