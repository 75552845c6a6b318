//! One module per `srec` subcommand

pub mod decode;
pub mod encode;
pub mod inspect;
pub mod verify;
