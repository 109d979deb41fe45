pub mod address;
pub mod audit;
pub mod envelope;
pub mod error;
pub mod logging;
pub mod message;
pub mod options;
pub mod transaction;

pub use address::{Address, AddressList};
pub use envelope::Envelope;
pub use message::MailMessage;
pub use transaction::{MessageKind, TransactionRecord};
