pub mod appointment;
pub mod command;
pub mod conversation;

pub use appointment::{
    validate_appointment, Appointment, AppointmentChanges, AppointmentStatus, NewAppointment,
};
pub use command::{Command, Intent, SlotSet};
pub use conversation::{ConversationEntry, ConversationLog, Speaker};
