pub mod auth;
pub mod cart;
pub mod catalog;
pub mod chat;
pub mod escrow;
pub mod orders;
pub mod providers;
