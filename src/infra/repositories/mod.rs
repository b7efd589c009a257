pub mod booking_row;

pub mod sqlite_booking_repo;
pub mod sqlite_artist_pricing_repo;

pub mod postgres_booking_repo;
pub mod postgres_artist_pricing_repo;

pub mod memory_booking_repo;
pub mod memory_artist_pricing_repo;
