pub mod accountmodel;
pub mod ticketmodel;
