//! Core of the raffle wheel: shrinking pools, wheel geometry, the draw state
//! machine and the winners history, persisted through a pluggable store.

pub type Degrees = f64;
pub type Position = usize;

pub mod config;
pub mod draw;
pub mod error;
pub mod history;
pub mod layout;
pub mod pool;
pub mod rotation;
pub mod session;
pub mod storage;
