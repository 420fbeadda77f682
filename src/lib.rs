pub mod auth;
pub mod banner;
pub mod commands;
pub mod consts;
pub mod flows;
pub mod image;
pub mod model;
pub mod roster;
pub mod spinner;
