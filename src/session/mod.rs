pub mod accounting;
pub mod guard;
