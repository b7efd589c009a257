pub mod artist;
pub mod booking;
