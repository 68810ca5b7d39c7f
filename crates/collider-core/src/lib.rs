pub mod bus;
pub mod commands;
pub mod error;
pub mod guards;
pub mod instance;
pub mod manager;
pub mod node;
pub mod server;
pub mod synth;
pub mod unit;

pub use bus::{FixNum, FixNumTable, SyncItems};
pub use commands::{opcode, CommandTables, OP_SET_PARAM, OP_SYNC_ITEMS};
pub use error::{CommandError, ServerError};
pub use instance::{Buffer, BufferSource, Instance};
pub use manager::{InstanceManager, MixStrategy};
pub use node::{AddAction, NodeTree};
pub use server::{ServerCommands, SynthServer};
pub use synth::{RenderContext, Synth};
pub use unit::{Unit, UnitTable};
