#![cfg_attr(not(test), no_std)]

pub mod command;
pub mod control;
pub mod fcw;
pub mod logger;
pub mod voice;
