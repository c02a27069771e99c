//! Terminal table: drive a [`DeckRegistry`](crate::registry::DeckRegistry)
//! from the keyboard.

pub mod app;
pub mod controller;
mod ui;
