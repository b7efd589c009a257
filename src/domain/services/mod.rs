pub mod lifecycle;
pub mod transitions;
