pub mod addresses;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod dashboard;
pub mod orders;
pub mod products;
pub mod profile;
pub mod reviews;
pub mod videos;
pub mod wishlist;
