pub mod event;
pub mod order;
pub mod payment;

pub use event::{Event, EventDraft, EventStatus, TicketCategory};
pub use order::{EventSnapshot, NewOrder, Order, OrderItem};
pub use payment::PaymentMethod;
