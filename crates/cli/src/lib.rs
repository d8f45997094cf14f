// Command surface (args, op dispatch, one file per subcommand)
pub mod args;
pub mod op;
pub mod ops;

// Host-side state (paths, config, user directory, authorization)
pub mod config;
pub mod policy;
pub mod state;
pub mod users;

use clap::Subcommand;

use ops::{
    Add, Apply, Buckets, Clean, Create, Destroy, Generate, Import, Info, Init, Issue, Rename,
    Users,
};

// Re-exports for consumers (integration tests, embedding)
pub use args::Args;
pub use op::{resolve_actor, Op, OpContext};
pub use state::{AppState, StateError};

command_enum! {
    (Add, Add),
    (Apply, Apply),
    (Buckets, Buckets),
    (Clean, Clean),
    (Create, Create),
    (Destroy, Destroy),
    (Generate, Generate),
    (Import, Import),
    (Info, Info),
    (Init, Init),
    (Issue, Issue),
    (Rename, Rename),
    (Users, Users),
}
