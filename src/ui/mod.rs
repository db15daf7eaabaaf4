//! Render models for the mobile client's presentational components.
//!
//! Each component maps its props to a plain view description and reacts to
//! presses through an injected [`Haptics`] implementation, so the logic runs
//! without a host view framework.

mod button;
mod transaction_card;

use std::collections::BTreeMap;

pub use button::{Button, ButtonState, ButtonView};
pub use transaction_card::{
    detail_text, format_amount, status_color, CardView, Theme, TransactionCard,
};

#[cfg(test)]
use mockall::automock;

/// Host style overrides passed straight through to the view (`backgroundColor` -> `#000`).
pub type Style = BTreeMap<String, String>;

/// Device haptic feedback.
#[cfg_attr(test, automock)]
pub trait Haptics {
    /// Short, light impact pulse.
    fn impact_light(&self);

    /// Selection-change tick.
    fn selection(&self);
}

/// Haptics for hosts without a vibration motor.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoHaptics;

impl Haptics for NoHaptics {
    fn impact_light(&self) {}

    fn selection(&self) {}
}
