pub mod add;
pub mod apply;
pub mod buckets;
pub mod clean;
pub mod create;
pub mod destroy;
pub mod generate;
pub mod import;
pub mod info;
pub mod init;
pub mod issue;
pub mod rename;
pub mod users;

pub use add::Add;
pub use apply::Apply;
pub use buckets::Buckets;
pub use clean::Clean;
pub use create::Create;
pub use destroy::Destroy;
pub use generate::Generate;
pub use import::Import;
pub use info::Info;
pub use init::Init;
pub use issue::Issue;
pub use rename::Rename;
pub use users::Users;
