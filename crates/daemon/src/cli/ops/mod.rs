pub mod daemon;
pub mod file;
pub mod health;
pub mod init;
pub mod version;

pub use daemon::Daemon;
pub use file::File;
pub use health::Health;
pub use init::Init;
pub use version::Version;
