pub mod ai;
pub mod cell;
pub mod color;
pub mod entity;
pub mod rules;
