//! Room lifecycle and round management for Chameleon.
//!
//! All mutable game state lives in one [`Engine`]. The engine owns every
//! [`Room`] plus an index from player to room, and guards both with a
//! single lock so compound updates ("room created and leader mapped",
//! "room removed and every member released") are never observed half
//! done.
//!
//! # Key types
//!
//! - [`Engine`]: owns every room and the player index
//! - [`Room`]: membership, leader, lock flag, round counter
//! - [`Round`]: immutable result of starting a round
//! - [`CategoryProvider`]: where secret words come from
//! - [`RoomConfig`]: room code length and lock policy

mod category;
mod config;
mod engine;
mod error;
mod room;
mod round;

pub use category::{BuiltinCategories, Category, CategoryProvider};
pub use config::{RoomConfig, RoomState};
pub use engine::Engine;
pub use error::RoomError;
pub use room::{Room, RoomSnapshot};
pub use round::Round;
