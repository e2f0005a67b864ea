pub mod account;
pub mod address;
pub mod balance;
pub mod util;
