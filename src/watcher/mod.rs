pub mod debug;
pub mod track;
pub mod trajectory;
