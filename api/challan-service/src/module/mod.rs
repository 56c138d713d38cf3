pub mod challan;
pub mod dashboard;
pub mod error;
pub mod evidence;
pub mod fine;
pub mod gate;
pub mod notification;
pub mod payment;
pub mod realtime;
pub mod vehicle;
pub mod violation;
