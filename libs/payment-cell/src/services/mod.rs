pub mod stripe;

pub use stripe::StripeClient;
