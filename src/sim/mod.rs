pub mod event;
pub mod game;
pub mod level;
pub mod pacer;
pub mod save;
pub mod step;
pub mod view;
pub mod world;
