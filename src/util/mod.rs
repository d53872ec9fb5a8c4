pub mod html;
pub mod lines;
