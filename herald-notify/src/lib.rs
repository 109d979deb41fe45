pub mod disposition;
pub mod dsn;
pub mod error;
pub mod mdn;
pub mod notification;

pub use dsn::{DeliveryFailureProducer, DsnConfig, FailureNotificationProducer};
pub use error::NotifyError;
pub use mdn::{DispositionProducer, NotificationSettings};
pub use notification::{NotificationKind, NotificationMessage};
