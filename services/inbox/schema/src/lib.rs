pub mod accounts;
pub mod conversations;
pub mod messages;
pub mod phonenumbers;
