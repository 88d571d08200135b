mod event;
mod gtid;

pub use event::*;
pub use gtid::*;
