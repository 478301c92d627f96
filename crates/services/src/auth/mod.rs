pub mod callback;
pub mod initiator;

pub use callback::{
    CallbackError, CallbackHandler, CallbackOutcome, CallbackQuery, CallbackResult,
    CallbackStrategy, DirectCallback, ExchangeCallback,
};
pub use initiator::{AuthFlowError, LoginInitiator};
