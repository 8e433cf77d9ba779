pub mod explore;
pub mod fractional;
pub mod launch;
pub mod portfolio;
pub mod profile;
pub mod setup;
pub mod ui;
