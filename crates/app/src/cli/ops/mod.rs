pub mod create;
pub mod download;
pub mod grant;
pub mod health;
pub mod import;
pub mod init;
pub mod ls;
pub mod mkdir;
pub mod put;
pub mod rm;
pub mod update;
pub mod validate;
pub mod version;

pub use create::Create;
pub use download::Download;
pub use grant::Grant;
pub use health::Health;
pub use import::Import;
pub use init::Init;
pub use ls::Ls;
pub use mkdir::Mkdir;
pub use put::Put;
pub use rm::Rm;
pub use update::Update;
pub use validate::Validate;
pub use version::Version;
