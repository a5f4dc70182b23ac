pub mod interval;
pub mod suggest;
