pub mod booking;
pub mod validator;

pub use booking::BookingService;
pub use validator::BookingValidator;
