//! Dispatch ticketing domain.
//!
//! Value objects (Site, Truck, Ticket, TicketQuery) enforce their own
//! construction invariants and expose the views the rest of the system
//! consumes; validation functions check raw input before any domain object
//! is built. Nothing here touches storage.

mod material;
mod query;
mod site;
mod ticket;
mod truck;
mod validation;

pub use material::Material;
pub use query::{DateRange, Page, QueryDescriptor, TicketQuery};
pub use site::Site;
pub use ticket::{Ticket, TicketPresentation};
pub use truck::Truck;
pub use validation::{
    validate_dispatch_time, validate_dispatch_time_uniqueness, validate_material,
    validate_ticket_batch, RawTicket, ValidatedTicket,
};
