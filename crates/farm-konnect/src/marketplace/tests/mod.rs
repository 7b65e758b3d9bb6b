mod admin;
mod common;
mod listings;
