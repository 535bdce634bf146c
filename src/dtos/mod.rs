pub mod accountdtos;
pub mod ticketdtos;
