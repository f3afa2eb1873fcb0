pub mod webhook_subscriptions;
pub mod webhooklogs;
