//! Application services for alert distribution.

mod audio;
mod broker;
mod dismiss;
mod dispatch;

pub use audio::{AudioAlarmController, AudioError, AudioResult, PlaybackState};
pub use broker::{
    AlertBroker, AlertBrokerError, AlertBrokerResult, AlertUpdate, SubscriptionError,
};
pub use dismiss::DismissStateStore;
pub use dispatch::AlertDispatchService;
