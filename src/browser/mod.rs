//! Browser session management and the driver seam the pipeline runs against

pub mod config;
pub mod driver;
pub mod session;

pub use config::{ConnectionOptions, LaunchOptions};
pub use driver::PageDriver;
pub use session::BrowserSession;
