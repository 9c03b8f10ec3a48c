pub mod check;
pub mod forms;
pub mod normalize;
