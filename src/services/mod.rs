pub mod checkout;
pub mod events;
pub mod orders;
